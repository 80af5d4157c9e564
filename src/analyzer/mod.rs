// In src/analyzer/mod.rs

//! 语义分析：两遍扫描。
//!
//! - PASS 1 建立作用域、登记所有声明、检查继承和接口实现、检查类型标注。
//! - PASS 2 自底向上推导每个表达式的类型，并检查语句。
//!
//! 两遍共享 PASS 1 建立的作用域表。所有违规都交给 `DiagnosticSink`，分析不会中途停止。

mod expression;
mod functions;
mod globals;
mod semantic_error;
mod statement;
mod symbols;
mod types;

#[cfg(test)]
mod test;

pub use semantic_error::{DiagnosticSink, LookingFor, SemanticError};
pub use symbols::{DeclId, Scope, ScopeId, ScopeKind, ScopeTable, Scopes, Symbol};
pub use types::{Primitive, TypeId, TypeKind, TypeTable};

use crate::parser::ast::{ClassDecl, Decl, Expr, FnDecl, Identifier, Program, Slot};

/// 对整个程序做语义分析，返回可供查询的分析结果。
pub fn analyze<'a>(program: &'a Program, diagnostics: &mut dyn DiagnosticSink) -> SemanticModel<'a> {
    let mut analyzer = Analyzer::new(program, diagnostics);

    // PASS 1: 作用域与声明
    analyzer.declare_program();
    log::debug!("pass 1 done: {} scopes", analyzer.scopes.len());

    // PASS 2: 类型检查
    analyzer.check_program();
    log::debug!("pass 2 done: {} semantic errors", analyzer.error_count);

    analyzer.finish()
}

/// 一次分析会话的全部状态。
pub(crate) struct Analyzer<'a, 'd> {
    program: &'a Program,
    scopes: Scopes<'a>,
    types: TypeTable,
    diagnostics: &'d mut dyn DiagnosticSink,
    error_count: usize,
}

impl<'a, 'd> Analyzer<'a, 'd> {
    fn new(program: &'a Program, diagnostics: &'d mut dyn DiagnosticSink) -> Self {
        Self {
            program,
            scopes: Scopes::default(),
            types: TypeTable::new(),
            diagnostics,
            error_count: 0,
        }
    }

    fn finish(self) -> SemanticModel<'a> {
        SemanticModel {
            program: self.program,
            scopes: self.scopes,
            types: self.types,
            error_count: self.error_count,
        }
    }

    fn report(&mut self, error: SemanticError) {
        log::debug!("semantic error: {}", error);
        self.error_count += 1;
        self.diagnostics.report(error);
    }

    /// 在 `scope` 中登记一个声明，重名时报告冲突并保留先前的声明。
    fn declare(&mut self, scope: ScopeId, name: &'a Identifier, symbol: Symbol<'a>) {
        if let Err(existing) = self.scopes.table_mut(scope).enter(&name.name, symbol) {
            self.report(SemanticError::DeclarationConflict {
                name: name.name.clone(),
                span: name.span,
                previous: existing.span(),
            });
        }
    }

    fn global_scope(&self) -> ScopeId {
        scope_of(&self.program.scope)
    }

    fn lookup_global(&self, name: &str) -> Option<Symbol<'a>> {
        self.scopes.table(self.global_scope()).lookup(name)
    }

    fn class_decl(&self, id: DeclId) -> Option<&'a ClassDecl> {
        match &self.program.decls[id.0] {
            Decl::Class(class) => Some(class),
            _ => None,
        }
    }

    /// 类或接口自己的作用域（成员表）
    fn member_scope(&self, id: DeclId) -> Option<ScopeId> {
        match &self.program.decls[id.0] {
            Decl::Class(class) => class.scope.get(),
            Decl::Interface(interface) => interface.scope.get(),
            _ => None,
        }
    }

    /// 最近的外层类
    fn enclosing_class(&self, scope: ScopeId) -> Option<DeclId> {
        self.scopes.ancestors(scope).find_map(|scope| match scope.kind {
            ScopeKind::Class(id) => Some(id),
            _ => None,
        })
    }

    /// 最近的外层函数
    fn enclosing_function(&self, scope: ScopeId) -> Option<&'a FnDecl> {
        self.scopes.ancestors(scope).find_map(|scope| match scope.kind {
            ScopeKind::Function(function) => Some(function),
            _ => None,
        })
    }

    /// 在到达函数边界之前是否遇到循环
    fn inside_loop(&self, scope: ScopeId) -> bool {
        self.scopes
            .ancestors(scope)
            .take_while(|scope| !matches!(scope.kind, ScopeKind::Function(_)))
            .any(|scope| matches!(scope.kind, ScopeKind::Loop))
    }
}

/// 读取 PASS 1 写入的作用域槽。
fn scope_of(slot: &Slot<ScopeId>) -> ScopeId {
    slot.get()
        .expect("internal error: scope slot read before pass 1 assigned it")
}

/// 语义分析的结果：作用域和类型表的只读视图。
/// 每个表达式的类型保存在语法树的 `Expr::ty` 中。
pub struct SemanticModel<'a> {
    program: &'a Program,
    scopes: Scopes<'a>,
    types: TypeTable,
    error_count: usize,
}

impl<'a> SemanticModel<'a> {
    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn scopes(&self) -> &Scopes<'a> {
        &self.scopes
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// 报告给 sink 的语义错误数量
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn global_scope(&self) -> ScopeId {
        scope_of(&self.program.scope)
    }

    pub fn lookup_global(&self, name: &str) -> Option<Symbol<'a>> {
        self.scopes.table(self.global_scope()).lookup(name)
    }

    /// 在类或接口的成员表（含继承来的成员）中查找
    pub fn lookup_member(&self, owner: &str, member: &str) -> Option<Symbol<'a>> {
        let scope = match self.lookup_global(owner)? {
            Symbol::Class(_, class) => class.scope.get()?,
            Symbol::Interface(_, interface) => interface.scope.get()?,
            _ => return None,
        };
        self.scopes.table(scope).lookup(member)
    }

    /// 从某个作用域出发沿作用域链查找
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<Symbol<'a>> {
        self.scopes.lookup(scope, name)
    }

    /// 表达式在 PASS 2 中得到的类型的显示名
    pub fn type_name(&self, expr: &Expr) -> Option<&str> {
        expr.ty.get().map(|ty| self.types.name(ty))
    }
}
