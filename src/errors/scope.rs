use super::resolve::ResolveErrorKind;

/// Store failure translated at the scope boundary, carrying the requested
/// type name and lookup name for diagnostics.
#[derive(thiserror::Error, Debug)]
#[error("Could not resolve {type_requested} (name: {name_requested:?}) from scope")]
pub struct ResolutionFailedError {
    pub type_requested: &'static str,
    pub name_requested: Option<String>,
    #[source]
    pub source: ResolveErrorKind,
}

#[derive(thiserror::Error, Debug)]
pub enum ScopeErrorKind {
    #[error("No registered type {type_name} with the key {name:?} in scope")]
    NotFound { type_name: &'static str, name: String },
    #[error(transparent)]
    ResolutionFailed(#[from] ResolutionFailedError),
}
