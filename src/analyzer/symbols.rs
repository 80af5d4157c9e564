// src/analyzer/symbols.rs

use crate::parser::ast::{ClassDecl, FnDecl, InterfaceDecl, VarDecl};
use crate::utils::Span;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// 顶层声明在 `Program::decls` 中的下标。类和接口只能出现在顶层。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub usize);

/// 作用域在 `Scopes` 中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

/// 符号表中存储的符号信息，直接借用语法树中的声明
#[derive(Debug, Clone, Copy)]
pub enum Symbol<'a> {
    Variable(&'a VarDecl),
    Function(&'a FnDecl),
    Class(DeclId, &'a ClassDecl),
    Interface(DeclId, &'a InterfaceDecl),
}

impl<'a> Symbol<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Symbol::Variable(decl) => &decl.name.name,
            Symbol::Function(decl) => &decl.name.name,
            Symbol::Class(_, decl) => &decl.name.name,
            Symbol::Interface(_, decl) => &decl.name.name,
        }
    }

    /// 声明中名字的位置
    pub fn span(&self) -> Span {
        match self {
            Symbol::Variable(decl) => decl.name.span,
            Symbol::Function(decl) => decl.name.span,
            Symbol::Class(_, decl) => decl.name.span,
            Symbol::Interface(_, decl) => decl.name.span,
        }
    }
}

/// 一个作用域内从名字到声明的映射。先声明者优先，只增不删。
#[derive(Debug, Default)]
pub struct ScopeTable<'a> {
    symbols: HashMap<&'a str, Symbol<'a>>,
}

impl<'a> ScopeTable<'a> {
    /// 名字已存在时不覆盖，并交还已有的声明。
    pub fn enter(&mut self, name: &'a str, symbol: Symbol<'a>) -> Result<(), Symbol<'a>> {
        match self.symbols.entry(name) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(symbol);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol<'a>> {
        self.symbols.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// 作用域由哪种节点引入
#[derive(Debug, Clone, Copy)]
pub enum ScopeKind<'a> {
    Program,
    Class(DeclId),
    Interface(DeclId),
    Function(&'a FnDecl),
    Block,
    /// `while` 或 `for`
    Loop,
}

#[derive(Debug)]
pub struct Scope<'a> {
    pub kind: ScopeKind<'a>,
    pub parent: Option<ScopeId>,
    pub table: ScopeTable<'a>,
}

/// 所有作用域组成的数组，父链接是下标而不是引用。
#[derive(Debug, Default)]
pub struct Scopes<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> Scopes<'a> {
    pub fn push(&mut self, kind: ScopeKind<'a>, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        log::trace!("scope {:?} ({:?}) opened under {:?}", id, kind, parent);
        self.scopes.push(Scope {
            kind,
            parent,
            table: ScopeTable::default(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope<'a> {
        &self.scopes[id.0]
    }

    pub fn table(&self, id: ScopeId) -> &ScopeTable<'a> {
        &self.scopes[id.0].table
    }

    pub fn table_mut(&mut self, id: ScopeId) -> &mut ScopeTable<'a> {
        &mut self.scopes[id.0].table
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// 从 `from` 开始沿父链向外，依次产出每个作用域（包括 `from` 自己）
    pub fn ancestors(&self, from: ScopeId) -> impl Iterator<Item = &Scope<'a>> + '_ {
        std::iter::successors(Some(self.get(from)), |scope| scope.parent.map(|parent| self.get(parent)))
    }

    /// 沿作用域链查找，第一个命中的声明胜出
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<Symbol<'a>> {
        self.ancestors(from).find_map(|scope| scope.table.lookup(name))
    }
}
