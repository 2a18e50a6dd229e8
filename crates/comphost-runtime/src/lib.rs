//! Component Runtime
//!
//! Serves component packages to an orchestrator:
//! - **Values**: runtime inputs and eventually-resolved outputs (`value`)
//! - **Modules**: loaders and the idempotent module cache (`module`)
//! - **Host**: locating, loading and constructing components (`host`)
//! - **Provider**: the parameterize/construct lifecycle (`provider`, `session`)

#![warn(rust_2018_idioms)]

pub mod error;
pub mod host;
pub mod module;
pub mod provider;
pub mod session;
pub mod value;

pub use error::{ConstructError, HostError, ProviderError};
pub use host::{harvest_state, resource_name, ComponentHost};
pub use module::{ComponentClass, ComponentInstance, Module, ModuleCache, ModuleLoader, ModuleRegistry};
pub use provider::{
    component_name, decode_parameter, encode_parameter, Capabilities, ComponentProvider,
    ConstructResult, ParameterizeResult, BASE_PROVIDER_NAME, PROVIDER_VERSION,
};
pub use session::{ProviderSession, SessionSlot};
pub use value::{Output, PropertyMap, Value};
