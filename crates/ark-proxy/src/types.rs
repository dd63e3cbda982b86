use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProxyError, ProxyResult};

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Whether a type can be implemented by a proxy directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Interface,
    Concrete,
}

/// Declared type of one method parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Any,
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
}

impl ParamType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Null => value.is_null(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Str => value.is_string(),
            Self::List => value.is_array(),
            Self::Map => value.is_object(),
        }
    }
}

/// Method name plus parameter types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<ParamType>,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, params: impl Into<Vec<ParamType>>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
        }
    }

    /// `true` if a call with these arguments fits this signature.
    pub fn accepts(&self, method: &str, args: &[Value]) -> bool {
        self.name == method
            && self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(p, a)| p.accepts(a))
    }
}

// ---------------------------------------------------------------------------
// TypeInfo
// ---------------------------------------------------------------------------

/// Runtime descriptor of a type: its own methods, the interfaces it
/// implements, and an optional base type it extends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    pub methods: Vec<MethodSig>,
    pub interfaces: Vec<Arc<TypeInfo>>,
    pub base: Option<Arc<TypeInfo>>,
}

impl TypeInfo {
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn concrete(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Concrete)
    }

    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            methods: Vec::new(),
            interfaces: Vec::new(),
            base: None,
        }
    }

    pub fn method(mut self, name: impl Into<String>, params: impl Into<Vec<ParamType>>) -> Self {
        self.methods.push(MethodSig::new(name, params));
        self
    }

    pub fn implements(mut self, interface: Arc<TypeInfo>) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn extends(mut self, base: Arc<TypeInfo>) -> Self {
        self.base = Some(base);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Own methods followed by everything inherited, without duplicates.
    pub fn all_methods(&self) -> Vec<MethodSig> {
        let mut out = Vec::new();
        self.collect_methods(&mut out);
        out
    }

    fn collect_methods(&self, out: &mut Vec<MethodSig>) {
        for m in &self.methods {
            if !out.contains(m) {
                out.push(m.clone());
            }
        }
        for iface in &self.interfaces {
            iface.collect_methods(out);
        }
        if let Some(base) = &self.base {
            base.collect_methods(out);
        }
    }

    /// `true` if `sig` is declared here or on any supertype.
    pub fn declares(&self, sig: &MethodSig) -> bool {
        self.methods.contains(sig)
            || self.interfaces.iter().any(|i| i.declares(sig))
            || self.base.as_ref().is_some_and(|b| b.declares(sig))
    }

    /// `true` if this type is, implements, or extends `name`.
    pub fn is_assignable_to(&self, name: &str) -> bool {
        self.name == name
            || self.interfaces.iter().any(|i| i.is_assignable_to(name))
            || self.base.as_ref().is_some_and(|b| b.is_assignable_to(name))
    }
}

// ---------------------------------------------------------------------------
// TypeRegistry
// ---------------------------------------------------------------------------

/// Named type descriptors, used to re-resolve capabilities in another
/// context.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<TypeInfo>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous type of the same name.
    pub fn register(&self, info: TypeInfo) -> Arc<TypeInfo> {
        let info = Arc::new(info);
        self.types
            .write()
            .expect("lock poisoned")
            .insert(info.name.clone(), Arc::clone(&info));
        info
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeInfo>> {
        self.types.read().expect("lock poisoned").get(name).cloned()
    }

    pub fn require(&self, name: &str) -> ProxyResult<Arc<TypeInfo>> {
        self.get(name).ok_or_else(|| ProxyError::UnknownType(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.types.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
