use std::sync::Arc;

use serde_json::Value;

use crate::error::{ProxyError, ProxyResult};
use crate::types::{MethodSig, TypeInfo, TypeKind};

/// An object that can be called by method name.
pub trait Dynamic: Send + Sync {
    fn type_info(&self) -> &TypeInfo;

    fn invoke(&self, method: &str, args: &[Value]) -> ProxyResult<Value>;
}

/// Forwarding object implementing a capability set on behalf of a delegate.
pub struct Proxy {
    info: TypeInfo,
    /// Every signature the capabilities declare, flattened once.
    declared: Vec<MethodSig>,
    delegate: Arc<dyn Dynamic>,
    backend: &'static str,
}

impl Proxy {
    pub(crate) fn new(
        delegate: Arc<dyn Dynamic>,
        base: Option<Arc<TypeInfo>>,
        capabilities: Vec<Arc<TypeInfo>>,
        backend: &'static str,
    ) -> Self {
        let mut names: Vec<&str> = capabilities.iter().map(|c| c.name.as_str()).collect();
        if let Some(b) = &base {
            names.insert(0, b.name.as_str());
        }
        let info = TypeInfo {
            name: format!("Proxy<{}>", names.join(", ")),
            kind: TypeKind::Concrete,
            methods: Vec::new(),
            interfaces: capabilities,
            base,
        };
        Self {
            declared: info.all_methods(),
            info,
            delegate,
            backend,
        }
    }

    pub fn delegate(&self) -> &Arc<dyn Dynamic> {
        &self.delegate
    }

    /// Name of the provider that built this proxy.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn capabilities(&self) -> &[Arc<TypeInfo>] {
        &self.info.interfaces
    }

    /// Signatures callable through this proxy.
    pub fn declared_methods(&self) -> &[MethodSig] {
        &self.declared
    }

    fn declared(&self, method: &str, args: &[Value]) -> Option<&MethodSig> {
        self.declared.iter().find(|sig| sig.accepts(method, args))
    }
}

impl Dynamic for Proxy {
    fn type_info(&self) -> &TypeInfo {
        &self.info
    }

    fn invoke(&self, method: &str, args: &[Value]) -> ProxyResult<Value> {
        let sig = self.declared(method, args).ok_or_else(|| ProxyError::NotDeclared {
            method: method.to_string(),
            proxy: self.info.name.clone(),
        })?;

        let target = self.delegate.type_info();
        if !target.declares(sig) {
            return Err(ProxyError::NoSuchMethod {
                type_name: target.name.clone(),
                method: method.to_string(),
            });
        }

        tracing::trace!(proxy = %self.info.name, %method, "forwarding call");
        self.delegate.invoke(method, args)
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("name", &self.info.name)
            .field("delegate", &self.delegate.type_info().name)
            .field("backend", &self.backend)
            .finish()
    }
}
