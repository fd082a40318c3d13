use std::sync::Arc;

use crate::{
    any::TypeInfo,
    arguments::Arguments,
    errors::{InstantiateErrorKind, RegistryErrorKind, ResolveErrorKind},
    lifestyle::Lifestyle,
    registration::Construct,
    scope::ScopedProvider,
    table::Resolver,
};

/// The host framework's registration contract. Registration methods return
/// `&Self` so calls chain.
///
/// The `register_many*`, `register_scoped*`, and
/// `register_singleton_factory` members exist on the contract but have no
/// equivalent store capability here; an adapter without the capability must
/// fail fast with [`RegistryErrorKind::NotSupported`] and register nothing.
pub trait ContainerRegistry {
    /// # Errors
    /// Fails on a store-level registration failure.
    fn register_instance<T: Send + Sync + 'static>(&self, instance: T) -> Result<&Self, RegistryErrorKind>;

    /// # Errors
    /// Fails on an empty name or a store-level registration failure.
    fn register_instance_named<T: Send + Sync + 'static>(&self, instance: T, name: &str) -> Result<&Self, RegistryErrorKind>;

    /// # Errors
    /// Fails on a store-level registration failure.
    fn register_singleton<S, I, F>(&self, factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static;

    /// # Errors
    /// Fails on an empty name or a store-level registration failure.
    fn register_singleton_named<S, I, F>(&self, factory: F, name: &str) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static;

    /// # Errors
    /// Fails on an empty name, an unsupported lifestyle, or a store-level
    /// registration failure.
    fn register_type<S, I, F>(&self, factory: F, name: &str, lifestyle: Lifestyle) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static;

    /// # Errors
    /// Fails on a store-level registration failure.
    fn register_factory<S, F>(&self, factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static;

    /// # Errors
    /// Always fails with [`RegistryErrorKind::NotSupported`].
    fn register_singleton_factory<S, F>(&self, factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static;

    /// # Errors
    /// Always fails with [`RegistryErrorKind::NotSupported`].
    fn register_many(&self, service: TypeInfo, implementations: &[TypeInfo]) -> Result<&Self, RegistryErrorKind>;

    /// # Errors
    /// Always fails with [`RegistryErrorKind::NotSupported`].
    fn register_many_singleton(&self, service: TypeInfo, implementations: &[TypeInfo]) -> Result<&Self, RegistryErrorKind>;

    /// # Errors
    /// Always fails with [`RegistryErrorKind::NotSupported`].
    fn register_scoped<S, I, F>(&self, factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static;

    /// # Errors
    /// Always fails with [`RegistryErrorKind::NotSupported`].
    fn register_scoped_factory<S, F>(&self, factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static;

    #[must_use]
    fn is_registered<T: 'static>(&self) -> bool;

    #[must_use]
    fn is_registered_named<T: 'static>(&self, name: &str) -> bool;
}

/// The host framework's resolution contract.
pub trait ContainerProvider {
    /// # Errors
    /// Fails when the store cannot produce an instance.
    fn resolve<T: Construct>(&self) -> Result<Arc<T>, ResolveErrorKind>;

    /// # Errors
    /// Fails on an empty name or when the store cannot produce an instance.
    fn resolve_named<T: Construct>(&self, name: &str) -> Result<Arc<T>, ResolveErrorKind>;

    /// # Errors
    /// Fails on an empty override list or when the store cannot produce an
    /// instance.
    fn resolve_with<T: Send + Sync + 'static>(&self, arguments: &Arguments) -> Result<Arc<T>, ResolveErrorKind>;

    /// # Errors
    /// Fails on an empty name, an empty override list, or when the store
    /// cannot produce an instance.
    fn resolve_named_with<T: Send + Sync + 'static>(&self, name: &str, arguments: &Arguments)
        -> Result<Arc<T>, ResolveErrorKind>;

    #[must_use]
    fn try_resolve<T: Send + Sync + 'static>(&self, name: Option<&str>) -> Option<Arc<T>>;

    /// # Errors
    /// Fails when the underlying table refuses the child table.
    fn create_scope(&self) -> Result<Option<Arc<ScopedProvider>>, RegistryErrorKind>;

    /// # Errors
    /// Fails on an empty name or when the underlying table refuses the child
    /// table.
    fn create_scope_named(&self, name: &str) -> Result<Arc<ScopedProvider>, RegistryErrorKind>;

    #[must_use]
    fn current_scope(&self) -> Option<Arc<ScopedProvider>>;
}
