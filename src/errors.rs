mod instantiate;
mod registry;
mod resolve;
mod scope;

pub use instantiate::InstantiateErrorKind;
pub use registry::RegistryErrorKind;
pub use resolve::ResolveErrorKind;
pub use scope::{ResolutionFailedError, ScopeErrorKind};
