// In src/analyzer/functions.rs

use super::symbols::{ScopeId, ScopeKind, Symbol};
use super::{Analyzer, scope_of};
use crate::parser::ast::{Block, Decl, FnDecl, Stmt};

// --- PASS 1: 函数、语句块和循环的作用域 ---

impl<'a> Analyzer<'a, '_> {
    /// 形参进入函数作用域，函数体再开一个作用域放局部变量。
    pub(super) fn declare_function(&mut self, function: &'a FnDecl, parent: ScopeId) {
        let scope = self.scopes.push(ScopeKind::Function(function), Some(parent));
        function.scope.set(scope);

        self.check_type(&function.return_type);
        for formal in &function.formals {
            self.check_type(&formal.ty);
            self.declare(scope, &formal.name, Symbol::Variable(formal));
        }

        if let Some(body) = &function.body {
            self.declare_block(body, scope);
        }
    }

    fn declare_block(&mut self, block: &'a Block, parent: ScopeId) {
        let scope = self.scopes.push(ScopeKind::Block, Some(parent));
        block.scope.set(scope);

        for var in &block.decls {
            self.check_type(&var.ty);
            self.declare(scope, &var.name, Symbol::Variable(var));
        }
        for stmt in &block.stmts {
            self.declare_stmt(stmt, scope);
        }
    }

    fn declare_stmt(&mut self, stmt: &'a Stmt, parent: ScopeId) {
        match stmt {
            Stmt::Block(block) => self.declare_block(block, parent),
            Stmt::If(if_stmt) => {
                self.declare_stmt(&if_stmt.then_branch, parent);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.declare_stmt(else_branch, parent);
                }
            }
            Stmt::While(while_stmt) => {
                let scope = self.scopes.push(ScopeKind::Loop, Some(parent));
                while_stmt.scope.set(scope);
                self.declare_stmt(&while_stmt.body, scope);
            }
            Stmt::For(for_stmt) => {
                let scope = self.scopes.push(ScopeKind::Loop, Some(parent));
                for_stmt.scope.set(scope);
                self.declare_stmt(&for_stmt.body, scope);
            }
            Stmt::Empty(_) | Stmt::Expr(_) | Stmt::Break(_) | Stmt::Return(_) | Stmt::Print(_) => {}
        }
    }
}

// --- PASS 2: 逐个函数做类型检查 ---

impl<'a> Analyzer<'a, '_> {
    pub(super) fn check_program(&mut self) {
        let program = self.program;
        for decl in &program.decls {
            match decl {
                Decl::Function(function) => self.check_function(function),
                Decl::Class(class) => {
                    for member in &class.members {
                        if let Decl::Function(method) = member {
                            self.check_function(method);
                        }
                    }
                }
                // 全局变量和接口原型没有可检查的语句
                Decl::Variable(_) | Decl::Interface(_) => {}
            }
        }
    }

    fn check_function(&mut self, function: &'a FnDecl) {
        log::trace!("checking function '{}'", function.name.name);
        if let Some(body) = &function.body {
            self.check_block(body);
        }
    }

    pub(super) fn check_block(&mut self, block: &'a Block) {
        let scope = scope_of(&block.scope);
        for stmt in &block.stmts {
            self.check_stmt(stmt, scope);
        }
    }
}
