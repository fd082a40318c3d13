#[derive(thiserror::Error, Debug)]
pub enum RegistryErrorKind {
    #[error("Required parameter is missing or empty: {what}")]
    InvalidArgument { what: &'static str },
    #[error("Value {value:?} is outside the defined lifestyle set")]
    InvalidEnumValue { value: String },
    #[error("Operation {operation} is not supported by this adapter")]
    NotSupported { operation: &'static str },
    #[error("Component with name {name:?} already registered in table")]
    DuplicateName { name: String },
    #[error("Component table is disposed")]
    Disposed,
}
