use crate::analyzer::{ScopeId, TypeId};
use crate::utils::Span;
use std::cell::Cell;
use std::fmt;

// --- 1. 分析结果回填槽 ---

/// 语义分析把结果挂回语法树时使用的单元。
/// 语法树本身只被共享借用，所以用 `Cell` 存放。
#[derive(Clone, PartialEq)]
pub struct Slot<T: Copy>(Cell<Option<T>>);

impl<T: Copy> Slot<T> {
    pub fn get(&self) -> Option<T> {
        self.0.get()
    }

    pub fn set(&self, value: T) {
        self.0.set(Some(value));
    }
}

impl<T: Copy> Default for Slot<T> {
    fn default() -> Self {
        Self(Cell::new(None))
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => write!(f, "{:?}", value),
            None => f.write_str("_"),
        }
    }
}

// --- 2. 标识符与程序 ---

/// 一个标识符，例如变量名、函数名或类名。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// AST 的根节点，代表一个完整的 Decaf 源文件。
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub decls: Vec<Decl>,
    pub span: Span,
    pub scope: Slot<ScopeId>,
}

// --- 3. 声明 ---

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Variable(VarDecl),
    Function(FnDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

impl Decl {
    pub fn name(&self) -> &Identifier {
        match self {
            Decl::Variable(decl) => &decl.name,
            Decl::Function(decl) => &decl.name,
            Decl::Class(decl) => &decl.name,
            Decl::Interface(decl) => &decl.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Variable(decl) => decl.span,
            Decl::Function(decl) => decl.span,
            Decl::Class(decl) => decl.span,
            Decl::Interface(decl) => decl.span,
        }
    }
}

/// 变量声明，也用于函数形参和类的字段。
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Identifier,
    pub ty: TypeExpr,
    pub span: Span,
}

/// 函数定义，接口中的原型没有函数体。
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: Identifier,
    pub return_type: TypeExpr,
    pub formals: Vec<VarDecl>,
    pub body: Option<Block>,
    pub span: Span,
    pub scope: Slot<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Identifier,
    pub extends: Option<Identifier>,
    pub implements: Vec<Identifier>,
    /// 字段（变量）和方法（函数）
    pub members: Vec<Decl>,
    pub span: Span,
    pub scope: Slot<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Identifier,
    pub members: Vec<FnDecl>,
    pub span: Span,
    pub scope: Slot<ScopeId>,
}

// --- 4. 类型标注 ---

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    Int,
    Double,
    Bool,
    String,
    Void,
    /// 类或接口名，在语义分析时才解析
    Named(Identifier),
    Array(Box<TypeExpr>),
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Int => f.write_str("int"),
            TypeExprKind::Double => f.write_str("double"),
            TypeExprKind::Bool => f.write_str("bool"),
            TypeExprKind::String => f.write_str("string"),
            TypeExprKind::Void => f.write_str("void"),
            TypeExprKind::Named(ident) => f.write_str(&ident.name),
            TypeExprKind::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}

// --- 5. 语句 ---

/// 由 `{ ... }` 包围的语句块。Decaf 要求变量声明都写在语句之前。
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
    pub scope: Slot<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// 单独的 `;`
    Empty(Span),
    Expr(Expr),
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Break(Span),
    Return(ReturnStmt),
    Print(PrintStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

/// 循环也占用一个作用域节点，`break` 通过向上查找它来判断是否合法。
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
    pub scope: Slot<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Expr>,
    pub test: Expr,
    pub step: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
    pub scope: Slot<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub args: Vec<Expr>,
    pub span: Span,
}

// --- 6. 表达式 ---

/// 表达式。`ty` 在类型检查时被填入。
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub ty: Slot<TypeId>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: Slot::default(),
        }
    }

    /// 赋值的左侧只能是这两种形式。
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::FieldAccess { .. } | ExprKind::ArrayAccess { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntConstant(i32),
    DoubleConstant(f64),
    BoolConstant(bool),
    StringConstant(String),
    Null,
    This,
    ReadInteger,
    ReadLine,
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `x` 或 `base.x`
    FieldAccess {
        base: Option<Box<Expr>>,
        field: Identifier,
    },
    ArrayAccess {
        base: Box<Expr>,
        subscript: Box<Expr>,
    },
    /// `f(...)` 或 `base.f(...)`
    Call {
        base: Option<Box<Expr>>,
        method: Identifier,
        args: Vec<Expr>,
    },
    New {
        class: Identifier,
    },
    NewArray {
        size: Box<Expr>,
        elem_type: TypeExpr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    NotEq,
    And,
    Or,
}

/// 二元运算符按类型规则分成的四类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    Relational,
    Equality,
    Logical,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn class(self) -> OperatorClass {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                OperatorClass::Arithmetic
            }
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => OperatorClass::Relational,
            BinaryOp::Eq | BinaryOp::NotEq => OperatorClass::Equality,
            BinaryOp::And | BinaryOp::Or => OperatorClass::Logical,
        }
    }
}
