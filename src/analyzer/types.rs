// src/analyzer/types.rs

use super::symbols::{DeclId, Symbol};
use super::{Analyzer, LookingFor, SemanticError};
use crate::parser::ast::{TypeExpr, TypeExprKind};
use std::collections::{HashMap, HashSet};

/// 类型表中的下标。相同的类型总是得到相同的 `TypeId`，比较类型只需比较整数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Double,
    Bool,
    String,
    Void,
    Null,
    /// 出错后的占位类型，与任何类型兼容，用来抑制连锁错误
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(Primitive),
    /// 解析到某个类或接口声明
    Named(DeclId),
    Array(TypeId),
}

impl TypeId {
    pub const INT: TypeId = TypeId(0);
    pub const DOUBLE: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const STRING: TypeId = TypeId(3);
    pub const VOID: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const ERROR: TypeId = TypeId(6);

    pub fn is_numeric(self) -> bool {
        self == TypeId::INT || self == TypeId::DOUBLE
    }

    pub fn is_error(self) -> bool {
        self == TypeId::ERROR
    }
}

// 顺序必须和上面的常量一致
const PRIMITIVES: [(Primitive, &str); 7] = [
    (Primitive::Int, "int"),
    (Primitive::Double, "double"),
    (Primitive::Bool, "bool"),
    (Primitive::String, "string"),
    (Primitive::Void, "void"),
    (Primitive::Null, "null"),
    (Primitive::Error, "error"),
];

/// 类型驻留表
#[derive(Debug)]
pub struct TypeTable {
    kinds: Vec<TypeKind>,
    names: Vec<String>,
    interned: HashMap<TypeKind, TypeId>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            kinds: Vec::new(),
            names: Vec::new(),
            interned: HashMap::new(),
        };
        for (primitive, name) in PRIMITIVES {
            table.insert(TypeKind::Primitive(primitive), name.to_string());
        }
        table
    }

    fn insert(&mut self, kind: TypeKind, name: String) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind);
        self.names.push(name);
        self.interned.insert(kind, id);
        id
    }

    /// 类或接口类型。`name` 只用于显示。
    pub fn named(&mut self, decl: DeclId, name: &str) -> TypeId {
        self.insert(TypeKind::Named(decl), name.to_string())
    }

    pub fn array(&mut self, elem: TypeId) -> TypeId {
        let name = format!("{}[]", self.name(elem));
        self.insert(TypeKind::Array(elem), name)
    }

    pub fn kind(&self, id: TypeId) -> TypeKind {
        self.kinds[id.0 as usize]
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn element(&self, id: TypeId) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Array(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn decl(&self, id: TypeId) -> Option<DeclId> {
        match self.kind(id) {
            TypeKind::Named(decl) => Some(decl),
            _ => None,
        }
    }
}

// --- 类型标注解析与兼容性 ---

impl<'a> Analyzer<'a, '_> {
    /// 解析类型标注，无法解析的名字得到 `ERROR`，不报告。
    pub(super) fn resolve_type(&mut self, ty: &TypeExpr) -> TypeId {
        match &ty.kind {
            TypeExprKind::Int => TypeId::INT,
            TypeExprKind::Double => TypeId::DOUBLE,
            TypeExprKind::Bool => TypeId::BOOL,
            TypeExprKind::String => TypeId::STRING,
            TypeExprKind::Void => TypeId::VOID,
            TypeExprKind::Named(ident) => match self.lookup_global(&ident.name) {
                Some(Symbol::Class(id, _)) | Some(Symbol::Interface(id, _)) => {
                    self.types.named(id, &ident.name)
                }
                _ => TypeId::ERROR,
            },
            TypeExprKind::Array(elem) => match self.resolve_type(elem) {
                TypeId::ERROR => TypeId::ERROR,
                elem => self.types.array(elem),
            },
        }
    }

    /// 解析并检查类型标注，名字不是类或接口时报告一次。
    pub(super) fn check_type(&mut self, ty: &TypeExpr) -> TypeId {
        match &ty.kind {
            TypeExprKind::Named(ident) => {
                let resolved = self.resolve_type(ty);
                if resolved.is_error() {
                    self.report(SemanticError::IdentifierNotDeclared {
                        name: ident.name.clone(),
                        expected: LookingFor::Type,
                        span: ident.span,
                    });
                }
                resolved
            }
            TypeExprKind::Array(elem) => match self.check_type(elem) {
                TypeId::ERROR => TypeId::ERROR,
                elem => self.types.array(elem),
            },
            _ => self.resolve_type(ty),
        }
    }

    /// `source` 的值能否用在需要 `target` 的地方。
    pub(super) fn is_compatible(&self, source: TypeId, target: TypeId) -> bool {
        if source == target || source.is_error() || target.is_error() {
            return true;
        }
        match (self.types.kind(source), self.types.kind(target)) {
            (TypeKind::Primitive(Primitive::Null), TypeKind::Named(_)) => true,
            (TypeKind::Named(sub), TypeKind::Named(sup)) => self.conforms_to(sub, sup),
            _ => false,
        }
    }

    /// 相等比较两边任意一个方向兼容即可
    pub(super) fn is_comparable(&self, left: TypeId, right: TypeId) -> bool {
        self.is_compatible(left, right) || self.is_compatible(right, left)
    }

    /// 类 `sub` 的继承链上是否出现 `sup`，或者链上某个类实现了接口 `sup`。
    fn conforms_to(&self, sub: DeclId, sup: DeclId) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(sub);

        while let Some(id) = current {
            if id == sup {
                return true;
            }
            if !visited.insert(id) {
                return false;
            }
            let Some(class) = self.class_decl(id) else {
                return false;
            };
            let implements = class.implements.iter().any(|ident| {
                matches!(self.lookup_global(&ident.name), Some(Symbol::Interface(iface, _)) if iface == sup)
            });
            if implements {
                return true;
            }
            current = class.extends.as_ref().and_then(|ident| match self.lookup_global(&ident.name) {
                Some(Symbol::Class(parent, _)) => Some(parent),
                _ => None,
            });
        }
        false
    }
}
