//! Component provider lifecycle
//!
//! Bridges an orchestrator's provider calls onto schema generation and the
//! component host. The provider starts unparameterized; `parameterize`
//! installs a session and every later call works against it.

use crate::error::ProviderError;
use crate::host::{harvest_state, ComponentHost};
use crate::module::ModuleLoader;
use crate::session::{ProviderSession, SessionSlot};
use crate::value::PropertyMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use comphost_parser::source::normalize_path;
use comphost_schema::{generate, BaseProvider, Parameterization};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the provider parameterized packages are served by
pub const BASE_PROVIDER_NAME: &str = "component";

/// Default version reported as the base provider version
pub const PROVIDER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterizeResult {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructResult {
    pub urn: String,
    /// Output-valued properties of the new instance
    pub state: PropertyMap,
}

/// Capability flags affirmed during configuration negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub accept_secrets: bool,
    pub accept_resources: bool,
    pub accept_outputs: bool,
    pub supports_preview: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        accept_secrets: true,
        accept_resources: true,
        accept_outputs: true,
        supports_preview: true,
    };
}

/// Encode an absolute directory as a parameterization parameter.
pub fn encode_parameter(directory: &Path) -> String {
    STANDARD.encode(directory.to_string_lossy().as_bytes())
}

/// Directory a parameterization parameter was produced from.
pub fn decode_parameter(parameter: &str) -> Result<PathBuf, ProviderError> {
    let bytes = STANDARD
        .decode(parameter.trim())
        .map_err(|e| ProviderError::InvalidParameter(e.to_string()))?;
    let directory = String::from_utf8(bytes).map_err(|e| ProviderError::InvalidParameter(e.to_string()))?;
    Ok(PathBuf::from(directory))
}

/// Component name of a `<package>:<module>:<Name>` type token.
pub fn component_name(type_token: &str) -> Result<&str, ProviderError> {
    match type_token.split(':').nth(2) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ProviderError::InvalidTypeToken(type_token.to_string())),
    }
}

/// Provider serving the components of one parameterized directory at a time.
#[derive(Debug)]
pub struct ComponentProvider {
    version: String,
    host: ComponentHost,
    session: SessionSlot,
}

impl ComponentProvider {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            version: PROVIDER_VERSION.to_string(),
            host: ComponentHost::new(loader),
            session: SessionSlot::new(),
        }
    }

    /// Override the reported base provider version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn host(&self) -> &ComponentHost {
        &self.host
    }

    /// The active session, if parameterized.
    pub fn session(&self) -> Option<Arc<ProviderSession>> {
        self.session.current()
    }

    /// Generate the schema of `directory` and make it the active session.
    ///
    /// On failure the previous session, if any, stays active.
    pub fn parameterize(&self, directory: impl AsRef<Path>) -> Result<ParameterizeResult, ProviderError> {
        let requested = directory.as_ref();
        let directory = std::path::absolute(requested)
            .map(|dir| normalize_path(&dir))
            .map_err(|source| ProviderError::InvalidDirectory {
                directory: requested.to_path_buf(),
                source,
            })?;
        info!(directory = %directory.display(), "parameterizing");

        let generated = generate(&directory).map_err(|source| ProviderError::Parameterize {
            directory: directory.clone(),
            source,
        })?;

        let mut schema = generated.schema;
        schema.parameterization = Some(Parameterization {
            base_provider: BaseProvider {
                name: BASE_PROVIDER_NAME.to_string(),
                version: self.version.clone(),
            },
            parameter: encode_parameter(&directory),
        });
        let serialized_schema = schema.to_json()?;
        let result = ParameterizeResult {
            name: schema.name.clone(),
            version: schema.version.clone(),
        };

        let session = self.session.replace(ProviderSession {
            schema,
            serialized_schema,
            directory,
            source: generated.source,
            generation: 0,
        });
        info!(
            package = %result.name,
            version = %result.version,
            generation = session.generation,
            "parameterized"
        );
        Ok(result)
    }

    /// Construct the component named by `type_token` with `inputs`.
    ///
    /// `name` and `options` are accepted for protocol compatibility; the
    /// instance is created with the host's resource name.
    pub fn construct(
        &self,
        name: &str,
        type_token: &str,
        inputs: &PropertyMap,
        options: &PropertyMap,
    ) -> Result<ConstructResult, ProviderError> {
        let session = self
            .session
            .current()
            .ok_or(ProviderError::NotParameterized { operation: "construct" })?;
        let component = component_name(type_token)?;
        debug!(
            name = %name,
            type_token = %type_token,
            options = options.len(),
            generation = session.generation,
            "construct"
        );

        let instance = self.host.instantiate(&session.source, component, inputs)?;
        Ok(ConstructResult {
            urn: instance.urn().to_string(),
            state: harvest_state(&instance),
        })
    }

    /// Serialized schema of the active session.
    pub fn get_schema(&self) -> Result<String, ProviderError> {
        self.session
            .current()
            .map(|session| session.serialized_schema.clone())
            .ok_or(ProviderError::NotParameterized { operation: "get_schema" })
    }

    pub fn check_config(&self, _config: &PropertyMap) -> Capabilities {
        Capabilities::ALL
    }

    pub fn configure(&self, _variables: &PropertyMap) -> Capabilities {
        Capabilities::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleRegistry;

    fn provider() -> ComponentProvider {
        ComponentProvider::new(Arc::new(ModuleRegistry::new()))
    }

    #[test]
    fn test_component_name() {
        assert_eq!(component_name("pkg:index:MyComponent").unwrap(), "MyComponent");
        assert_eq!(component_name("pkg:index:A:extra").unwrap(), "A");
        assert!(matches!(
            component_name("pkg:index"),
            Err(ProviderError::InvalidTypeToken(token)) if token == "pkg:index"
        ));
        assert!(component_name("pkg:index:").is_err());
    }

    #[test]
    fn test_parameter_round_trip() {
        let dir = Path::new("/home/user/components");
        let parameter = encode_parameter(dir);
        assert_eq!(parameter, "L2hvbWUvdXNlci9jb21wb25lbnRz");
        assert_eq!(decode_parameter(&parameter).unwrap(), dir);
        assert!(matches!(
            decode_parameter("not base64!"),
            Err(ProviderError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_calls_before_parameterize() {
        let provider = provider();
        let err = provider
            .construct("web", "pkg:index:Web", &PropertyMap::new(), &PropertyMap::new())
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotParameterized { operation: "construct" }));
        assert_eq!(err.to_string(), "parameterize must be called before construct");
        assert!(matches!(
            provider.get_schema(),
            Err(ProviderError::NotParameterized { operation: "get_schema" })
        ));
    }

    #[test]
    fn test_configuration_is_affirmed() {
        let provider = provider();
        assert_eq!(provider.check_config(&PropertyMap::new()), Capabilities::ALL);
        assert_eq!(provider.configure(&PropertyMap::new()), Capabilities::ALL);
        assert!(Capabilities::ALL.accept_secrets && Capabilities::ALL.supports_preview);
    }

    #[test]
    fn test_provider_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ComponentProvider>();
        assert_send_sync::<Arc<ProviderSession>>();
    }

    #[test]
    fn test_version_override() {
        assert_eq!(provider().version(), PROVIDER_VERSION);
        assert_eq!(provider().with_version("1.2.3").version(), "1.2.3");
    }
}
