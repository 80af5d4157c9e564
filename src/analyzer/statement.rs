// In src/analyzer/statement.rs

use super::symbols::ScopeId;
use super::types::TypeId;
use super::{Analyzer, SemanticError, scope_of};
use crate::parser::ast::{Expr, PrintStmt, ReturnStmt, Stmt};
use crate::utils::Span;

impl<'a> Analyzer<'a, '_> {
    /// 检查一条语句。`scope` 是语句所在的最内层作用域。
    pub(super) fn check_stmt(&mut self, stmt: &'a Stmt, scope: ScopeId) {
        match stmt {
            Stmt::Empty(_) => {}
            Stmt::Expr(expr) => {
                self.check_expr(expr, scope);
            }
            Stmt::Block(block) => self.check_block(block),
            Stmt::If(if_stmt) => {
                self.check_test(&if_stmt.test, scope);
                self.check_stmt(&if_stmt.then_branch, scope);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.check_stmt(else_branch, scope);
                }
            }
            Stmt::While(while_stmt) => {
                let scope = scope_of(&while_stmt.scope);
                self.check_test(&while_stmt.test, scope);
                self.check_stmt(&while_stmt.body, scope);
            }
            Stmt::For(for_stmt) => {
                let scope = scope_of(&for_stmt.scope);
                if let Some(init) = &for_stmt.init {
                    self.check_expr(init, scope);
                }
                self.check_test(&for_stmt.test, scope);
                if let Some(step) = &for_stmt.step {
                    self.check_expr(step, scope);
                }
                self.check_stmt(&for_stmt.body, scope);
            }
            Stmt::Break(span) => self.check_break(*span, scope),
            Stmt::Return(return_stmt) => self.check_return(return_stmt, scope),
            Stmt::Print(print) => self.check_print(print, scope),
        }
    }

    /// if / while / for 的条件必须是 bool
    fn check_test(&mut self, test: &'a Expr, scope: ScopeId) {
        let ty = self.check_expr(test, scope);
        if ty != TypeId::BOOL && !ty.is_error() {
            self.report(SemanticError::TestNotBoolean { span: test.span });
        }
    }

    fn check_break(&mut self, span: Span, scope: ScopeId) {
        if !self.inside_loop(scope) {
            self.report(SemanticError::BreakOutsideLoop { span });
        }
    }

    fn check_return(&mut self, stmt: &'a ReturnStmt, scope: ScopeId) {
        let given = match &stmt.value {
            Some(value) => self.check_expr(value, scope),
            None => TypeId::VOID,
        };

        // 语句总在某个函数体内
        let Some(function) = self.enclosing_function(scope) else {
            return;
        };
        let expected = self.resolve_type(&function.return_type);

        if !self.is_compatible(given, expected) {
            let span = stmt.value.as_ref().map_or(stmt.span, |value| value.span);
            self.report(SemanticError::ReturnTypeMismatch {
                given: self.types.name(given).to_string(),
                expected: self.types.name(expected).to_string(),
                span,
            });
        }
    }

    fn check_print(&mut self, print: &'a PrintStmt, scope: ScopeId) {
        for (index, arg) in print.args.iter().enumerate() {
            let ty = self.check_expr(arg, scope);
            let printable = matches!(ty, TypeId::INT | TypeId::BOOL | TypeId::STRING) || ty.is_error();
            if !printable {
                self.report(SemanticError::PrintArgumentMismatch {
                    index: index + 1,
                    given: self.types.name(ty).to_string(),
                    span: arg.span,
                });
            }
        }
    }
}
