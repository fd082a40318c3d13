use std::sync::Arc;

use tracing::{debug, info_span};

use crate::{
    any::TypeInfo,
    arguments::Arguments,
    errors::{InstantiateErrorKind, RegistryErrorKind, ResolveErrorKind},
    lifestyle::Lifestyle,
    registration::{Construct, Registration},
    table::{downcast, ComponentTable, Resolver},
};

/// What the reconciler does about a resolve request, given which of the two
/// key spaces already hold the requested component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReconcileAction {
    /// Both keys present: resolve through the name-and-type pair.
    Reuse,
    /// Name present, type missing: self-register the type, then prefer the
    /// type key.
    RegisterTypeKey,
    /// Type present, name missing: attach the name to the existing entry.
    RegisterNameKey,
    /// Neither present: one fresh self-bound registration fills both spaces
    /// (type key plus the full-name key).
    RegisterBoth,
}

/// The reconciliation decision table, pure over the two presence bits.
#[inline]
#[must_use]
pub(crate) fn reconcile(present_by_type: bool, present_by_name: bool) -> ReconcileAction {
    match (present_by_type, present_by_name) {
        (true, true) => ReconcileAction::Reuse,
        (true, false) => ReconcileAction::RegisterNameKey,
        (false, true) => ReconcileAction::RegisterTypeKey,
        (false, false) => ReconcileAction::RegisterBoth,
    }
}

/// Register/resolve front over a component table that keeps the two key
/// spaces convergent: once a component is registered under a type or a name,
/// resolution through either key (or both) succeeds, with the missing key
/// synthesized lazily.
pub struct Reconciler {
    table: Arc<dyn ComponentTable>,
}

impl Reconciler {
    #[inline]
    #[must_use]
    pub fn new(table: Arc<dyn ComponentTable>) -> Self {
        Self { table }
    }

    #[inline]
    #[must_use]
    pub fn table(&self) -> &Arc<dyn ComponentTable> {
        &self.table
    }

    /// Registers a pre-built instance. Idempotent: a present type key (or
    /// either key when a name is given) makes this a no-op, not an error.
    ///
    /// # Errors
    /// Fails on an empty name or a store-level registration failure.
    pub fn register_instance<T: Send + Sync + 'static>(&self, instance: T, name: Option<&str>) -> Result<(), RegistryErrorKind> {
        self.register_instance_arc(Arc::new(instance), name)
    }

    /// [`Self::register_instance`] for an instance that is already shared.
    ///
    /// # Errors
    /// Fails on an empty name or a store-level registration failure.
    pub fn register_instance_arc<T: Send + Sync + 'static>(
        &self,
        instance: Arc<T>,
        name: Option<&str>,
    ) -> Result<(), RegistryErrorKind> {
        if name == Some("") {
            return Err(RegistryErrorKind::InvalidArgument { what: "name" });
        }
        let info = TypeInfo::of::<T>();
        let present = match name {
            Some(name) => self.table.has_by_type(info.id) || self.table.has_by_name(name),
            None => self.table.has_by_type(info.id),
        };
        if present {
            debug!(service = info.name, "Already registered, instance kept");
            return Ok(());
        }
        let mut registration = Registration::instance(instance);
        if let Some(name) = name {
            registration = registration.named(name);
        }
        self.table.register(registration)
    }

    /// Registers `S -> I` as a singleton, guarded three ways: the service
    /// type, the implementation type, and the name (the implementation's
    /// full-name key when none is given) are checked independently, and the
    /// registration happens only if all three are absent. The guard keeps a
    /// prior unrelated registration of any of the three identities from being
    /// clobbered.
    ///
    /// # Errors
    /// Fails on an empty name or a store-level registration failure.
    pub fn register_singleton<S, I, F>(&self, factory: F, name: Option<&str>) -> Result<(), RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        if name == Some("") {
            return Err(RegistryErrorKind::InvalidArgument { what: "name" });
        }
        let service = TypeInfo::of::<S>();
        let implementation = TypeInfo::of::<I>();
        let key = name.unwrap_or(implementation.name);

        if self.table.has_by_type(service.id) || self.table.has_by_type(implementation.id) || self.table.has_by_name(key) {
            debug!(service = service.name, "Already registered, singleton kept");
            return Ok(());
        }
        self.table.register(
            Registration::factory::<S, I, F>(factory)
                .named(key)
                .with_lifestyle(Lifestyle::Singleton),
        )
    }

    /// Registers `S -> I` under `name` with an explicit lifestyle. `Custom`
    /// and `Bound` have no store instruction and fail fast; the remaining
    /// lifestyles each map to their own instruction inside the store.
    ///
    /// # Errors
    /// Fails on an empty name, an unsupported lifestyle, or a store-level
    /// registration failure.
    pub fn register_type<S, I, F>(&self, factory: F, name: &str, lifestyle: Lifestyle) -> Result<(), RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(RegistryErrorKind::InvalidArgument { what: "name" });
        }
        if !lifestyle.is_supported() {
            return Err(RegistryErrorKind::NotSupported {
                operation: "registration with a custom or bound lifestyle",
            });
        }
        let service = TypeInfo::of::<S>();
        let implementation = TypeInfo::of::<I>();
        if self.table.has_by_type(service.id) || self.table.has_by_type(implementation.id) || self.table.has_by_name(name) {
            debug!(service = service.name, "Already registered, existing entry kept");
            return Ok(());
        }
        self.table
            .register(Registration::factory::<S, I, F>(factory).named(name).with_lifestyle(lifestyle))
    }

    /// Registers a transient factory for `S`, unconditionally and unnamed.
    ///
    /// # Errors
    /// Fails on a store-level registration failure.
    pub fn register_factory<S, F>(&self, factory: F) -> Result<(), RegistryErrorKind>
    where
        S: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.table.register(Registration::factory::<S, S, F>(factory))
    }

    #[inline]
    #[must_use]
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.table.has_by_type(TypeInfo::of::<T>().id)
    }

    #[inline]
    #[must_use]
    pub fn is_registered_named<T: 'static>(&self, name: &str) -> bool {
        self.table.has_by_type(TypeInfo::of::<T>().id) && self.table.has_by_name(name)
    }

    /// Single-key fast path: a missing type key is filled with a self-bound
    /// transient registration under the type's full-name key before
    /// resolving.
    ///
    /// # Errors
    /// Fails when the synthesized registration cannot be stored or the store
    /// cannot produce an instance.
    pub fn resolve<T: Construct>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        let info = TypeInfo::of::<T>();
        if !self.table.has_by_type(info.id) {
            debug!(dependency = info.name, "Type key absent, self-registering");
            self.ensure_self_registration::<T>()?;
        }
        self.table.resolve_by_type(info, &Arguments::new()).and_then(downcast::<T>)
    }

    /// The dual-key reconciliation path. Queries the two key spaces
    /// independently and synthesizes whichever is missing so the resolve
    /// converges; see [`reconcile`] for the branch table.
    ///
    /// # Errors
    /// Fails on an empty name, a failed synthesis, or a store that still
    /// cannot produce an instance — reconciliation itself never fails a
    /// request that either key could serve.
    pub fn resolve_named<T: Construct>(&self, name: &str) -> Result<Arc<T>, ResolveErrorKind> {
        if name.is_empty() {
            return Err(ResolveErrorKind::InvalidArgument { what: "name" });
        }
        let info = TypeInfo::of::<T>();
        let span = info_span!("reconcile", dependency = info.name, name);
        let _guard = span.enter();

        let arguments = Arguments::new();
        let present_by_type = self.table.has_by_type(info.id);
        let present_by_name = self.table.has_by_name(name);

        let component = match reconcile(present_by_type, present_by_name) {
            ReconcileAction::Reuse => {
                debug!("Both keys present");
                self.table.resolve_by_name_and_type(name, info, &arguments)
            }
            ReconcileAction::RegisterNameKey => {
                debug!("Name key absent, aliasing the type entry");
                self.ensure_registration(Registration::alias(info, name))?;
                if self.table.has_by_name(name) {
                    self.table.resolve_by_name_and_type(name, info, &arguments)
                } else {
                    self.table.resolve_by_type(info, &arguments)
                }
            }
            ReconcileAction::RegisterTypeKey => {
                debug!("Type key absent, self-registering");
                self.ensure_self_registration::<T>()?;
                if self.table.has_by_type(info.id) {
                    self.table.resolve_by_type(info, &arguments)
                } else {
                    self.table.resolve_by_name_and_type(name, info, &arguments)
                }
            }
            ReconcileAction::RegisterBoth => {
                debug!("Neither key present, self-registering");
                self.ensure_self_registration::<T>()?;
                self.table.resolve_by_type(info, &arguments)
            }
        }?;

        downcast::<T>(component)
    }

    /// Resolve with explicit override values, passed to the store verbatim.
    /// No key synthesis happens on this path.
    ///
    /// # Errors
    /// Fails when the override list is empty — the caller explicitly opted
    /// into the override-bearing call — or on a store failure.
    pub fn resolve_with<T: Send + Sync + 'static>(&self, arguments: &Arguments) -> Result<Arc<T>, ResolveErrorKind> {
        if arguments.is_empty() {
            return Err(ResolveErrorKind::InvalidArgument { what: "override list" });
        }
        self.table
            .resolve_by_type(TypeInfo::of::<T>(), arguments)
            .and_then(downcast::<T>)
    }

    /// Name-qualified [`Self::resolve_with`].
    ///
    /// # Errors
    /// Fails on an empty name, an empty override list, or a store failure.
    pub fn resolve_named_with<T: Send + Sync + 'static>(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> Result<Arc<T>, ResolveErrorKind> {
        if name.is_empty() {
            return Err(ResolveErrorKind::InvalidArgument { what: "name" });
        }
        if arguments.is_empty() {
            return Err(ResolveErrorKind::InvalidArgument { what: "override list" });
        }
        self.table
            .resolve_by_name_and_type(name, TypeInfo::of::<T>(), arguments)
            .and_then(downcast::<T>)
    }

    /// Presence probe as a value: `None` instead of an error, and no key
    /// synthesis.
    #[must_use]
    pub fn try_resolve<T: Send + Sync + 'static>(&self, name: Option<&str>) -> Option<Arc<T>> {
        let info = TypeInfo::of::<T>();
        let arguments = Arguments::new();
        let component = match name {
            Some(name) => self.table.resolve_by_name_and_type(name, info, &arguments),
            None => self.table.resolve_by_type(info, &arguments),
        };
        component.ok().and_then(|component| component.downcast::<T>().ok())
    }

    fn ensure_self_registration<T: Construct>(&self) -> Result<(), ResolveErrorKind> {
        self.ensure_registration(Registration::self_bound::<T>())
    }

    /// Stores a synthesized registration. A full-name key already occupied in
    /// the name space is fine — the existing entry serves it.
    fn ensure_registration(&self, registration: Registration) -> Result<(), ResolveErrorKind> {
        match self.table.register(registration) {
            Ok(()) | Err(RegistryErrorKind::DuplicateName { .. }) => Ok(()),
            Err(RegistryErrorKind::Disposed) => Err(ResolveErrorKind::Disposed),
            Err(err) => Err(ResolveErrorKind::Registration(err)),
        }
    }
}
