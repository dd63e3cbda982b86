use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dynamic::{Dynamic, Proxy};
use crate::error::{ProxyError, ProxyResult};
use crate::types::{TypeInfo, TypeRegistry};

/// Strategy that synthesizes proxies.
pub trait ProxyProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build a proxy around `object` exposing `capabilities` (and `base`,
    /// where the backend supports it). With a `context`, descriptors are
    /// re-resolved by name in that registry first.
    fn create_proxy(
        &self,
        object: Arc<dyn Dynamic>,
        base: Option<Arc<TypeInfo>>,
        capabilities: &[Arc<TypeInfo>],
        context: Option<&TypeRegistry>,
    ) -> ProxyResult<Arc<Proxy>>;
}

/// Which built-in provider to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyBackend {
    #[default]
    Interface,
    Extension,
}

impl ProxyBackend {
    pub fn provider(&self) -> Arc<dyn ProxyProvider> {
        match self {
            Self::Interface => Arc::new(InterfaceProxyProvider),
            Self::Extension => Arc::new(ExtensionProxyProvider),
        }
    }
}

fn rebind(info: &Arc<TypeInfo>, context: Option<&TypeRegistry>) -> ProxyResult<Arc<TypeInfo>> {
    match context {
        Some(registry) => registry.require(&info.name),
        None => Ok(Arc::clone(info)),
    }
}

// ---------------------------------------------------------------------------
// Interface backend
// ---------------------------------------------------------------------------

/// Implements interfaces only. Every capability must be an interface; a base
/// type is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterfaceProxyProvider;

impl ProxyProvider for InterfaceProxyProvider {
    fn name(&self) -> &'static str {
        "interface"
    }

    fn create_proxy(
        &self,
        object: Arc<dyn Dynamic>,
        base: Option<Arc<TypeInfo>>,
        capabilities: &[Arc<TypeInfo>],
        context: Option<&TypeRegistry>,
    ) -> ProxyResult<Arc<Proxy>> {
        if capabilities.is_empty() {
            return Err(ProxyError::EmptyCapabilities);
        }
        if let Some(base) = base {
            tracing::debug!(base = %base.name, "interface proxies cannot extend a base type; ignoring it");
        }

        let capabilities = capabilities
            .iter()
            .map(|c| rebind(c, context))
            .collect::<ProxyResult<Vec<_>>>()?;
        if let Some(bad) = capabilities.iter().find(|c| !c.is_interface()) {
            return Err(ProxyError::NotInterface(bad.name.clone()));
        }

        Ok(Arc::new(Proxy::new(object, None, capabilities, self.name())))
    }
}

// ---------------------------------------------------------------------------
// Extension backend
// ---------------------------------------------------------------------------

/// May extend a concrete base type. Capabilities that are not interfaces
/// are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionProxyProvider;

impl ProxyProvider for ExtensionProxyProvider {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn create_proxy(
        &self,
        object: Arc<dyn Dynamic>,
        base: Option<Arc<TypeInfo>>,
        capabilities: &[Arc<TypeInfo>],
        context: Option<&TypeRegistry>,
    ) -> ProxyResult<Arc<Proxy>> {
        let base = base.map(|b| rebind(&b, context)).transpose()?;
        let mut interfaces = Vec::with_capacity(capabilities.len());
        for capability in capabilities {
            let capability = rebind(capability, context)?;
            if capability.is_interface() {
                interfaces.push(capability);
            } else {
                tracing::debug!(capability = %capability.name, "dropping non-interface capability");
            }
        }

        if base.is_none() && interfaces.is_empty() {
            return Err(ProxyError::EmptyCapabilities);
        }
        Ok(Arc::new(Proxy::new(object, base, interfaces, self.name())))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    use crate::types::ParamType;

    pub(crate) fn greeter() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::interface("Greeter").method("greet", [ParamType::Str]))
    }

    /// Implements `Greeter` plus a method no interface declares.
    pub(crate) struct English {
        info: TypeInfo,
    }

    impl English {
        pub(crate) fn new() -> Arc<Self> {
            let base = Arc::new(TypeInfo::concrete("Speaker").method("volume", []));
            Arc::new(Self {
                info: TypeInfo::concrete("English")
                    .method("greet", [ParamType::Str])
                    .method("secret", [])
                    .implements(greeter())
                    .extends(base),
            })
        }
    }

    impl Dynamic for English {
        fn type_info(&self) -> &TypeInfo {
            &self.info
        }

        fn invoke(&self, method: &str, args: &[Value]) -> ProxyResult<Value> {
            match (method, args) {
                ("greet", [Value::String(who)]) => Ok(json!(format!("Hello, {who}"))),
                ("volume", []) => Ok(json!(11)),
                ("secret", []) => Ok(json!("hidden")),
                _ => Err(ProxyError::Invocation {
                    method: method.to_string(),
                    reason: "unsupported".into(),
                }),
            }
        }
    }

    #[test]
    fn interface_proxy_matches_direct_calls() {
        let object = English::new();
        let proxy = InterfaceProxyProvider
            .create_proxy(object.clone(), None, &[greeter()], None)
            .unwrap();
        let args = [json!("Ada")];
        assert_eq!(
            proxy.invoke("greet", &args).unwrap(),
            object.invoke("greet", &args).unwrap()
        );
        assert_eq!(proxy.backend(), "interface");
        assert!(proxy.type_info().is_assignable_to("Greeter"));
    }

    #[test]
    fn undeclared_methods_are_refused() {
        let proxy = InterfaceProxyProvider
            .create_proxy(English::new(), None, &[greeter()], None)
            .unwrap();
        assert!(matches!(proxy.invoke("secret", &[]), Err(ProxyError::NotDeclared { .. })));
        assert!(matches!(
            proxy.invoke("greet", &[json!(1)]),
            Err(ProxyError::NotDeclared { .. })
        ));
    }

    #[test]
    fn interface_backend_rejects_concrete_and_empty() {
        let concrete = Arc::new(TypeInfo::concrete("Speaker"));
        let err = InterfaceProxyProvider
            .create_proxy(English::new(), None, &[concrete], None)
            .unwrap_err();
        assert_eq!(err, ProxyError::NotInterface("Speaker".into()));
        let err = InterfaceProxyProvider
            .create_proxy(English::new(), None, &[], None)
            .unwrap_err();
        assert_eq!(err, ProxyError::EmptyCapabilities);
    }

    #[test]
    fn extension_backend_extends_base_and_drops_concrete() {
        let base = Arc::new(TypeInfo::concrete("Speaker").method("volume", []));
        let proxy = ExtensionProxyProvider
            .create_proxy(
                English::new(),
                Some(base.clone()),
                &[greeter(), Arc::new(TypeInfo::concrete("Other"))],
                None,
            )
            .unwrap();
        assert_eq!(proxy.capabilities().len(), 1);
        assert_eq!(proxy.invoke("volume", &[]).unwrap(), json!(11));
        assert_eq!(proxy.invoke("greet", &[json!("Bo")]).unwrap(), json!("Hello, Bo"));

        let err = ExtensionProxyProvider
            .create_proxy(English::new(), None, &[Arc::new(TypeInfo::concrete("Other"))], None)
            .unwrap_err();
        assert_eq!(err, ProxyError::EmptyCapabilities);
    }

    #[test]
    fn delegate_without_the_method_fails() {
        struct Mute(TypeInfo);
        impl Dynamic for Mute {
            fn type_info(&self) -> &TypeInfo {
                &self.0
            }
            fn invoke(&self, method: &str, _args: &[Value]) -> ProxyResult<Value> {
                Err(ProxyError::Invocation {
                    method: method.into(),
                    reason: "mute".into(),
                })
            }
        }
        let proxy = InterfaceProxyProvider
            .create_proxy(Arc::new(Mute(TypeInfo::concrete("Mute"))), None, &[greeter()], None)
            .unwrap();
        let err = proxy.invoke("greet", &[json!("x")]).unwrap_err();
        assert!(matches!(err, ProxyError::NoSuchMethod { ref type_name, .. } if type_name == "Mute"));
    }

    #[test]
    fn context_rebinds_capabilities() {
        let registry = TypeRegistry::new();
        registry.register(TypeInfo::interface("Greeter").method("greet", [ParamType::Str]));
        let stale = Arc::new(TypeInfo::interface("Greeter"));
        let proxy = InterfaceProxyProvider
            .create_proxy(English::new(), None, &[stale.clone()], Some(&registry))
            .unwrap();
        assert_eq!(proxy.invoke("greet", &[json!("Cy")]).unwrap(), json!("Hello, Cy"));

        let missing = Arc::new(TypeInfo::interface("Unknown"));
        let err = InterfaceProxyProvider
            .create_proxy(English::new(), None, &[missing], Some(&registry))
            .unwrap_err();
        assert_eq!(err, ProxyError::UnknownType("Unknown".into()));
    }
}
