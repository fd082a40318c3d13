use std::any::TypeId;

use super::{instantiate::InstantiateErrorKind, registry::RegistryErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Registration not found in table for type {type_name}, name {name:?}")]
    NoRegistration {
        type_name: &'static str,
        name: Option<String>,
    },
    #[error("Incorrect component type. Actual: {actual:?}, expected: {expected:?}")]
    IncorrectType { expected: TypeInfo, actual: TypeId },
    #[error("Required parameter is missing or empty: {what}")]
    InvalidArgument { what: &'static str },
    #[error("Component table is disposed")]
    Disposed,
    #[error("Auto-registration of the missing key failed")]
    Registration(#[source] RegistryErrorKind),
    #[error(transparent)]
    Instantiator(#[from] InstantiateErrorKind),
}
