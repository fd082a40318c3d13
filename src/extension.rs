use std::sync::Arc;

use tracing::error;

use crate::{
    any::TypeInfo,
    arguments::Arguments,
    config::Config,
    contract::{ContainerProvider, ContainerRegistry},
    errors::{InstantiateErrorKind, RegistryErrorKind, ResolveErrorKind},
    kernel::Kernel,
    lifestyle::Lifestyle,
    reconciler::Reconciler,
    registration::Construct,
    scope::{ScopeManager, ScopedProvider},
    table::Resolver,
};

/// The boundary adapter: satisfies the host framework's container contract by
/// delegating to the reconciler and the scope manager over one kernel.
///
/// Use one extension per composition root; see [`ScopeManager`] for the
/// single-writer discipline on the current scope.
pub struct ContainerExtension {
    kernel: Arc<Kernel>,
    reconciler: Reconciler,
    scopes: ScopeManager,
}

impl std::fmt::Debug for ContainerExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerExtension").finish_non_exhaustive()
    }
}

impl ContainerExtension {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_kernel(Kernel::new())
    }

    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_kernel(Kernel::with_config(config))
    }

    /// Wraps an existing kernel. The kernel handle is self-registered under
    /// its type and its table name so components and scopes can inject the
    /// store; an already-occupied slot keeps the existing registration.
    #[must_use]
    pub fn with_kernel(kernel: Arc<Kernel>) -> Self {
        let extension = Self {
            kernel: kernel.clone(),
            reconciler: Reconciler::new(kernel.clone()),
            scopes: ScopeManager::new(kernel.clone()),
        };
        let table_name = kernel.name().to_string();
        if let Err(err) = extension.reconciler.register_instance_arc(kernel, Some(table_name.as_str())) {
            error!("{}", err);
        }
        extension
    }

    /// The wrapped store handle.
    #[inline]
    #[must_use]
    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }
}

impl Default for ContainerExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRegistry for ContainerExtension {
    fn register_instance<T: Send + Sync + 'static>(&self, instance: T) -> Result<&Self, RegistryErrorKind> {
        self.reconciler.register_instance(instance, None)?;
        Ok(self)
    }

    fn register_instance_named<T: Send + Sync + 'static>(&self, instance: T, name: &str) -> Result<&Self, RegistryErrorKind> {
        self.reconciler.register_instance(instance, Some(name))?;
        Ok(self)
    }

    fn register_singleton<S, I, F>(&self, factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.reconciler.register_singleton::<S, I, F>(factory, None)?;
        Ok(self)
    }

    fn register_singleton_named<S, I, F>(&self, factory: F, name: &str) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.reconciler.register_singleton::<S, I, F>(factory, Some(name))?;
        Ok(self)
    }

    fn register_type<S, I, F>(&self, factory: F, name: &str, lifestyle: Lifestyle) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.reconciler.register_type::<S, I, F>(factory, name, lifestyle)?;
        Ok(self)
    }

    fn register_factory<S, F>(&self, factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.reconciler.register_factory::<S, F>(factory)?;
        Ok(self)
    }

    fn register_singleton_factory<S, F>(&self, _factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Err(RegistryErrorKind::NotSupported {
            operation: "register_singleton_factory",
        })
    }

    fn register_many(&self, _service: TypeInfo, _implementations: &[TypeInfo]) -> Result<&Self, RegistryErrorKind> {
        Err(RegistryErrorKind::NotSupported {
            operation: "register_many",
        })
    }

    fn register_many_singleton(&self, _service: TypeInfo, _implementations: &[TypeInfo]) -> Result<&Self, RegistryErrorKind> {
        Err(RegistryErrorKind::NotSupported {
            operation: "register_many_singleton",
        })
    }

    fn register_scoped<S, I, F>(&self, _factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Err(RegistryErrorKind::NotSupported {
            operation: "register_scoped",
        })
    }

    fn register_scoped_factory<S, F>(&self, _factory: F) -> Result<&Self, RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Err(RegistryErrorKind::NotSupported {
            operation: "register_scoped_factory",
        })
    }

    fn is_registered<T: 'static>(&self) -> bool {
        self.reconciler.is_registered::<T>()
    }

    fn is_registered_named<T: 'static>(&self, name: &str) -> bool {
        self.reconciler.is_registered_named::<T>(name)
    }
}

impl ContainerProvider for ContainerExtension {
    fn resolve<T: Construct>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.reconciler.resolve::<T>()
    }

    fn resolve_named<T: Construct>(&self, name: &str) -> Result<Arc<T>, ResolveErrorKind> {
        self.reconciler.resolve_named::<T>(name)
    }

    fn resolve_with<T: Send + Sync + 'static>(&self, arguments: &Arguments) -> Result<Arc<T>, ResolveErrorKind> {
        self.reconciler.resolve_with::<T>(arguments)
    }

    fn resolve_named_with<T: Send + Sync + 'static>(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> Result<Arc<T>, ResolveErrorKind> {
        self.reconciler.resolve_named_with::<T>(name, arguments)
    }

    fn try_resolve<T: Send + Sync + 'static>(&self, name: Option<&str>) -> Option<Arc<T>> {
        self.reconciler.try_resolve::<T>(name)
    }

    fn create_scope(&self) -> Result<Option<Arc<ScopedProvider>>, RegistryErrorKind> {
        self.scopes.create_scope()
    }

    fn create_scope_named(&self, name: &str) -> Result<Arc<ScopedProvider>, RegistryErrorKind> {
        self.scopes.create_scope_named(name)
    }

    fn current_scope(&self) -> Option<Arc<ScopedProvider>> {
        self.scopes.current_scope()
    }
}
