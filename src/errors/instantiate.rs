use super::resolve::ResolveErrorKind;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Type {} has no way to construct itself", type_info.name)]
    NoConstructor { type_info: TypeInfo },
    #[error("Failed to resolve a constructor dependency")]
    Dependency(#[source] Box<ResolveErrorKind>),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    fn from(err: ResolveErrorKind) -> Self {
        Self::Dependency(Box::new(err))
    }
}
