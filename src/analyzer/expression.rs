// In src/analyzer/expression.rs

use super::symbols::{DeclId, ScopeId, Symbol};
use super::types::{TypeId, TypeKind};
use super::{Analyzer, LookingFor, SemanticError};
use crate::parser::ast::{
    BinaryOp, Decl, Expr, ExprKind, FnDecl, Identifier, OperatorClass, UnaryOp,
};
use crate::utils::Span;

impl<'a> Analyzer<'a, '_> {
    /// 推导表达式的类型，写入 `expr.ty` 并返回。
    /// 操作数为 `ERROR` 时不再产生新的诊断。
    pub(super) fn check_expr(&mut self, expr: &'a Expr, scope: ScopeId) -> TypeId {
        let ty = match &expr.kind {
            ExprKind::IntConstant(_) => TypeId::INT,
            ExprKind::DoubleConstant(_) => TypeId::DOUBLE,
            ExprKind::BoolConstant(_) => TypeId::BOOL,
            ExprKind::StringConstant(_) => TypeId::STRING,
            ExprKind::Null => TypeId::NULL,
            ExprKind::ReadInteger => TypeId::INT,
            ExprKind::ReadLine => TypeId::STRING,
            ExprKind::This => self.check_this(expr.span, scope),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, expr.span, scope),
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, expr.span, scope),
            ExprKind::Assign { target, value } => {
                let target_ty = self.check_expr(target, scope);
                let value_ty = self.check_expr(value, scope);
                if !self.is_compatible(value_ty, target_ty) {
                    self.report(SemanticError::IncompatibleOperands {
                        op: "=",
                        left: self.types.name(target_ty).to_string(),
                        right: self.types.name(value_ty).to_string(),
                        span: expr.span,
                    });
                }
                target_ty
            }
            ExprKind::ArrayAccess { base, subscript } => self.check_array_access(base, subscript, scope),
            ExprKind::FieldAccess { base, field } => match base {
                Some(base) => self.check_member_field(base, field, scope),
                None => self.check_variable(field, scope),
            },
            ExprKind::Call { base, method, args } => self.check_call(base.as_deref(), method, args, scope),
            ExprKind::New { class } => match self.lookup_global(&class.name) {
                Some(Symbol::Class(id, _)) => self.types.named(id, &class.name),
                _ => {
                    self.report(SemanticError::IdentifierNotDeclared {
                        name: class.name.clone(),
                        expected: LookingFor::Class,
                        span: class.span,
                    });
                    TypeId::ERROR
                }
            },
            ExprKind::NewArray { size, elem_type } => {
                let size_ty = self.check_expr(size, scope);
                if size_ty != TypeId::INT && !size_ty.is_error() {
                    self.report(SemanticError::ArraySizeNotInteger { span: size.span });
                }
                match self.check_type(elem_type) {
                    TypeId::ERROR => TypeId::ERROR,
                    elem => self.types.array(elem),
                }
            }
        };

        expr.ty.set(ty);
        ty
    }

    fn check_this(&mut self, span: Span, scope: ScopeId) -> TypeId {
        let class = self
            .enclosing_class(scope)
            .and_then(|id| self.class_decl(id).map(|class| (id, class)));
        match class {
            // 重复声明的类：名字解析到的是第一个声明，冲突已经报告过
            Some((id, class)) => match self.lookup_global(&class.name.name) {
                Some(Symbol::Class(first, _)) if first == id => self.types.named(id, &class.name.name),
                _ => TypeId::ERROR,
            },
            None => {
                self.report(SemanticError::ThisOutsideClassScope { span });
                TypeId::ERROR
            }
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &'a Expr, span: Span, scope: ScopeId) -> TypeId {
        let ty = self.check_expr(operand, scope);
        let (accepted, result) = match op {
            UnaryOp::Negate if ty.is_numeric() => (true, ty),
            UnaryOp::Negate => (ty.is_error(), TypeId::ERROR),
            UnaryOp::Not => (ty == TypeId::BOOL || ty.is_error(), TypeId::BOOL),
        };

        if !accepted {
            self.report(SemanticError::IncompatibleOperand {
                op: op.symbol(),
                operand: self.types.name(ty).to_string(),
                span,
            });
        }
        result
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &'a Expr,
        right: &'a Expr,
        span: Span,
        scope: ScopeId,
    ) -> TypeId {
        let lt = self.check_expr(left, scope);
        let rt = self.check_expr(right, scope);
        let poisoned = lt.is_error() || rt.is_error();

        let (accepted, result) = match op.class() {
            OperatorClass::Arithmetic => {
                let ok = lt.is_numeric() && lt == rt;
                (ok, if ok { lt } else { TypeId::ERROR })
            }
            OperatorClass::Relational => (lt.is_numeric() && lt == rt, TypeId::BOOL),
            OperatorClass::Equality => (self.is_comparable(lt, rt), TypeId::BOOL),
            OperatorClass::Logical => (lt == TypeId::BOOL && rt == TypeId::BOOL, TypeId::BOOL),
        };

        if !accepted && !poisoned {
            self.report(SemanticError::IncompatibleOperands {
                op: op.symbol(),
                left: self.types.name(lt).to_string(),
                right: self.types.name(rt).to_string(),
                span,
            });
        }
        result
    }

    fn check_array_access(&mut self, base: &'a Expr, subscript: &'a Expr, scope: ScopeId) -> TypeId {
        let base_ty = self.check_expr(base, scope);
        let subscript_ty = self.check_expr(subscript, scope);

        let elem = self.types.element(base_ty);
        if elem.is_none() && !base_ty.is_error() {
            self.report(SemanticError::BracketsOnNonArray { span: base.span });
        }
        if subscript_ty != TypeId::INT && !subscript_ty.is_error() {
            self.report(SemanticError::SubscriptNotInteger { span: subscript.span });
        }
        elem.unwrap_or(TypeId::ERROR)
    }

    /// 没有显式 base 的名字：沿作用域链必须找到变量
    fn check_variable(&mut self, field: &'a Identifier, scope: ScopeId) -> TypeId {
        match self.scopes.lookup(scope, &field.name) {
            Some(Symbol::Variable(var)) => self.resolve_type(&var.ty),
            _ => {
                self.report(SemanticError::IdentifierNotDeclared {
                    name: field.name.clone(),
                    expected: LookingFor::Variable,
                    span: field.span,
                });
                TypeId::ERROR
            }
        }
    }

    /// `base.field`：字段只能在该类自己的方法体内访问。
    fn check_member_field(&mut self, base: &'a Expr, field: &'a Identifier, scope: ScopeId) -> TypeId {
        let base_ty = self.check_expr(base, scope);
        if base_ty.is_error() {
            return TypeId::ERROR;
        }

        let member = self
            .class_of(base_ty)
            .map(|id| (id, self.member(id, &field.name)));

        match member {
            Some((id, Some(Symbol::Variable(var)))) => {
                let field_ty = self.resolve_type(&var.ty);
                if self.enclosing_class(scope) != Some(id) {
                    self.report(SemanticError::InaccessibleField {
                        field: field.name.clone(),
                        base: self.types.name(base_ty).to_string(),
                        span: field.span,
                    });
                }
                field_ty
            }
            _ => {
                self.report(SemanticError::FieldNotFoundInBase {
                    field: field.name.clone(),
                    base: self.types.name(base_ty).to_string(),
                    span: field.span,
                });
                TypeId::ERROR
            }
        }
    }

    fn check_call(
        &mut self,
        base: Option<&'a Expr>,
        method: &'a Identifier,
        args: &'a [Expr],
        scope: ScopeId,
    ) -> TypeId {
        // 先检查实参
        let arg_types: Vec<TypeId> = args.iter().map(|arg| self.check_expr(arg, scope)).collect();

        let function = match base {
            Some(base) => {
                let base_ty = self.check_expr(base, scope);
                if base_ty.is_error() {
                    return TypeId::ERROR;
                }
                let owner = self.types.decl(base_ty);
                match owner.and_then(|id| self.member(id, &method.name)) {
                    Some(Symbol::Function(function)) => function,
                    // 数组只有一个内建方法
                    _ if self.types.element(base_ty).is_some() && method.name == "length" => {
                        return TypeId::INT;
                    }
                    _ => {
                        self.report(SemanticError::FieldNotFoundInBase {
                            field: method.name.clone(),
                            base: self.types.name(base_ty).to_string(),
                            span: method.span,
                        });
                        return TypeId::ERROR;
                    }
                }
            }
            None => match self.scopes.lookup(scope, &method.name) {
                Some(Symbol::Function(function)) => function,
                _ => {
                    self.report(SemanticError::IdentifierNotDeclared {
                        name: method.name.clone(),
                        expected: LookingFor::Function,
                        span: method.span,
                    });
                    return TypeId::ERROR;
                }
            },
        };

        self.check_arguments(function, method, args, &arg_types);
        self.resolve_type(&function.return_type)
    }

    /// 个数不符只报告一次并停止；否则逐个检查实参类型（从 1 开始编号）。
    fn check_arguments(&mut self, function: &'a FnDecl, method: &Identifier, args: &[Expr], arg_types: &[TypeId]) {
        if function.formals.len() != args.len() {
            self.report(SemanticError::ArgumentCountMismatch {
                function: method.name.clone(),
                expected: function.formals.len(),
                given: args.len(),
                span: method.span,
            });
            return;
        }

        for (index, ((formal, arg), &given)) in function.formals.iter().zip(args).zip(arg_types).enumerate() {
            let expected = self.resolve_type(&formal.ty);
            if !self.is_compatible(given, expected) {
                self.report(SemanticError::ArgumentTypeMismatch {
                    index: index + 1,
                    given: self.types.name(given).to_string(),
                    expected: self.types.name(expected).to_string(),
                    span: arg.span,
                });
            }
        }
    }

    /// 类型对应的类声明
    fn class_of(&self, ty: TypeId) -> Option<DeclId> {
        match self.types.kind(ty) {
            TypeKind::Named(id) if matches!(self.program.decls[id.0], Decl::Class(_)) => Some(id),
            _ => None,
        }
    }

    /// 在类或接口的成员表中查找
    fn member(&self, owner: DeclId, name: &str) -> Option<Symbol<'a>> {
        let scope = self.member_scope(owner)?;
        self.scopes.table(scope).lookup(name)
    }
}
