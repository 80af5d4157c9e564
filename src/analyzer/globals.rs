// In src/analyzer/globals.rs

//! PASS 1 的顶层部分：全局作用域、类的继承与接口实现、接口成员。

use super::symbols::{DeclId, ScopeId, ScopeKind, Symbol};
use super::types::TypeId;
use super::{Analyzer, LookingFor, SemanticError};
use crate::parser::ast::{ClassDecl, Decl, FnDecl, InterfaceDecl, TypeExpr};
use std::collections::HashSet;

fn member_symbol(member: &Decl) -> Option<Symbol<'_>> {
    match member {
        Decl::Variable(var) => Some(Symbol::Variable(var)),
        Decl::Function(function) => Some(Symbol::Function(function)),
        _ => None,
    }
}

impl<'a> Analyzer<'a, '_> {
    /// 执行 PASS 1：先登记所有顶层声明，再逐个深入。
    /// 遇到错误只报告，不中止。
    pub(super) fn declare_program(&mut self) {
        let program = self.program;
        let global = self.scopes.push(ScopeKind::Program, None);
        program.scope.set(global);

        for (index, decl) in program.decls.iter().enumerate() {
            let id = DeclId(index);
            let symbol = match decl {
                Decl::Variable(var) => Symbol::Variable(var),
                Decl::Function(function) => Symbol::Function(function),
                Decl::Class(class) => Symbol::Class(id, class),
                Decl::Interface(interface) => Symbol::Interface(id, interface),
            };
            self.declare(global, decl.name(), symbol);
        }

        for (index, decl) in program.decls.iter().enumerate() {
            match decl {
                Decl::Variable(var) => {
                    self.check_type(&var.ty);
                }
                Decl::Function(function) => self.declare_function(function, global),
                Decl::Class(class) => self.declare_class(DeclId(index), class, global),
                Decl::Interface(interface) => {
                    self.declare_interface(DeclId(index), interface, global)
                }
            }
        }
    }

    fn declare_class(&mut self, id: DeclId, class: &'a ClassDecl, global: ScopeId) {
        let scope = self.scopes.push(ScopeKind::Class(id), Some(global));
        class.scope.set(scope);

        // 1. 自己的成员
        for member in &class.members {
            if let Some(symbol) = member_symbol(member) {
                self.declare(scope, member.name(), symbol);
            }
        }

        // 2. 继承链上的成员
        self.inherit_members(id, class, scope);

        // 3. 接口实现
        for interface in &class.implements {
            match self.lookup_global(&interface.name) {
                Some(Symbol::Interface(_, decl)) => self.check_implementation(class, decl, scope),
                _ => self.report(SemanticError::IdentifierNotDeclared {
                    name: interface.name.clone(),
                    expected: LookingFor::Interface,
                    span: interface.span,
                }),
            }
        }

        // 4. 成员本身
        for member in &class.members {
            match member {
                Decl::Variable(var) => {
                    self.check_type(&var.ty);
                }
                Decl::Function(function) => self.declare_function(function, scope),
                _ => {}
            }
        }
    }

    /// 沿 `extends` 链向上，把祖先中尚未出现的成员复制到本类的表中。
    /// 本类自己声明的名字只和最近的同名祖先成员比较一次。
    fn inherit_members(&mut self, id: DeclId, class: &'a ClassDecl, scope: ScopeId) {
        let local: HashSet<&str> = class.members.iter().map(|m| m.name().name.as_str()).collect();
        let mut compared = HashSet::new();
        let mut visited = HashSet::from([id]);
        let mut next = class.extends.as_ref();
        let mut direct = true;

        while let Some(parent_name) = next {
            let parent = match self.lookup_global(&parent_name.name) {
                Some(Symbol::Class(parent_id, parent)) => {
                    if !visited.insert(parent_id) {
                        log::debug!("inheritance cycle through '{}' stops the walk", parent.name.name);
                        break;
                    }
                    parent
                }
                _ => {
                    // 祖先自己的 extends 错误由祖先报告
                    if direct {
                        self.report(SemanticError::IdentifierNotDeclared {
                            name: parent_name.name.clone(),
                            expected: LookingFor::Class,
                            span: parent_name.span,
                        });
                    }
                    break;
                }
            };
            log::trace!("class '{}' inherits from '{}'", class.name.name, parent.name.name);

            for member in &parent.members {
                let Some(inherited) = member_symbol(member) else {
                    continue;
                };
                let name = member.name().name.as_str();
                match self.scopes.table(scope).lookup(name) {
                    None => {
                        // 不会冲突，名字刚检查过不存在
                        let _ = self.scopes.table_mut(scope).enter(name, inherited);
                    }
                    Some(existing) if local.contains(name) && compared.insert(name) => {
                        self.check_override(existing, inherited);
                    }
                    Some(_) => {}
                }
            }

            next = parent.extends.as_ref();
            direct = false;
        }
    }

    /// 本类声明 `local` 与祖先成员 `inherited` 同名
    fn check_override(&mut self, local: Symbol<'a>, inherited: Symbol<'a>) {
        match (local, inherited) {
            (Symbol::Function(mine), Symbol::Function(theirs)) => {
                if !self.same_signature(mine, theirs) {
                    self.report(SemanticError::OverrideMismatch {
                        name: mine.name.name.clone(),
                        span: mine.name.span,
                    });
                }
            }
            _ => self.report(SemanticError::DeclarationConflict {
                name: local.name().to_string(),
                span: local.span(),
                previous: inherited.span(),
            }),
        }
    }

    fn check_implementation(&mut self, class: &'a ClassDecl, interface: &'a InterfaceDecl, scope: ScopeId) {
        for method in &interface.members {
            match self.scopes.table(scope).lookup(&method.name.name) {
                Some(Symbol::Function(implemented)) => {
                    if !self.same_signature(implemented, method) {
                        self.report(SemanticError::OverrideMismatch {
                            name: implemented.name.name.clone(),
                            span: implemented.name.span,
                        });
                    }
                }
                Some(other) => self.report(SemanticError::DeclarationConflict {
                    name: other.name().to_string(),
                    span: other.span(),
                    previous: method.name.span,
                }),
                None => self.report(SemanticError::InterfaceNotImplemented {
                    class: class.name.name.clone(),
                    interface: interface.name.name.clone(),
                    method: method.name.name.clone(),
                    span: class.name.span,
                }),
            }
        }
    }

    fn declare_interface(&mut self, id: DeclId, interface: &'a InterfaceDecl, global: ScopeId) {
        let scope = self.scopes.push(ScopeKind::Interface(id), Some(global));
        interface.scope.set(scope);

        for method in &interface.members {
            self.declare(scope, &method.name, Symbol::Function(method));
        }
        for method in &interface.members {
            self.declare_function(method, scope);
        }
    }

    /// 返回类型相同，形参个数和类型逐个相同
    fn same_signature(&mut self, a: &FnDecl, b: &FnDecl) -> bool {
        if a.formals.len() != b.formals.len() {
            return false;
        }
        if !self.same_type(&a.return_type, &b.return_type) {
            return false;
        }
        a.formals.iter().zip(&b.formals).all(|(x, y)| self.same_type(&x.ty, &y.ty))
    }

    /// 未声明的类型名解析为 `ERROR`，这时按书写的名字比较
    fn same_type(&mut self, a: &TypeExpr, b: &TypeExpr) -> bool {
        match (self.resolve_type(a), self.resolve_type(b)) {
            (TypeId::ERROR, _) | (_, TypeId::ERROR) => a.to_string() == b.to_string(),
            (x, y) => x == y,
        }
    }
}
