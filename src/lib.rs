//! Adapts a dual-indexed component store — components keyed independently by
//! type identity and string identity, with lifestyle management and
//! child-table scoping — to a host framework's abstract container contract.
//!
//! The interesting part is the reconciliation layer: resolution succeeds
//! whenever *either* identity was ever registered, because the missing key is
//! synthesized lazily instead of requiring dual registration up front.

pub(crate) mod any;
pub(crate) mod arguments;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod contract;
pub(crate) mod errors;
pub(crate) mod extension;
pub(crate) mod kernel;
pub(crate) mod lifestyle;
pub(crate) mod locator;
pub(crate) mod reconciler;
pub(crate) mod registration;
pub(crate) mod scope;
pub(crate) mod table;

pub use any::{Component, TypeInfo};
pub use arguments::Arguments;
pub use config::Config;
pub use contract::{ContainerProvider, ContainerRegistry};
pub use errors::{
    InstantiateErrorKind, RegistryErrorKind, ResolutionFailedError, ResolveErrorKind, ScopeErrorKind,
};
pub use extension::ContainerExtension;
pub use kernel::Kernel;
pub use lifestyle::Lifestyle;
pub use locator::ServiceLocator;
pub use reconciler::Reconciler;
pub use registration::{Construct, Provider, Registration};
pub use scope::{ScopeManager, ScopedProvider};
pub use table::{ComponentTable, Resolver};
