use std::{
    any::TypeId,
    collections::BTreeMap,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::{Component, TypeInfo},
    arguments::Arguments,
    cache::{LifestyleCache, ScopedCache},
    config::Config,
    errors::{RegistryErrorKind, ResolveErrorKind},
    registration::{Provider, Registration},
    table::{ComponentTable, Resolver},
};

struct Entry {
    service: TypeInfo,
    provider: Provider,
    cache: LifestyleCache,
}

struct TableState {
    entries: Vec<Arc<Entry>>,
    /// Type key space. The first entry registered for a type is its default.
    /// Alias entries live only in the name space.
    by_type: BTreeMap<TypeId, Vec<usize>>,
    /// Name key space; names are unique per table.
    by_name: BTreeMap<String, usize>,
    children: BTreeMap<String, Arc<Kernel>>,
    disposed: bool,
}

impl TableState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_type: BTreeMap::new(),
            by_name: BTreeMap::new(),
            children: BTreeMap::new(),
            disposed: false,
        }
    }
}

/// In-memory dual-indexed component table.
///
/// Components are indexed by type identity and string identity
/// independently; presence checks and resolution fall through to the parent
/// table, while registrations stay local. Singleton instances are owned by
/// the table holding the entry; scoped instances by the table that resolved
/// them.
pub struct Kernel {
    name: String,
    config: Config,
    state: Mutex<TableState>,
    scoped: ScopedCache,
    parent: Option<Weak<Kernel>>,
}

impl Kernel {
    #[inline]
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::default())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Arc<Self> {
        Arc::new(Self {
            name: "root".to_string(),
            config,
            state: Mutex::new(TableState::new()),
            scoped: ScopedCache::default(),
            parent: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a child table that sees this table's registrations.
    ///
    /// # Errors
    /// Fails when this table is disposed, `name` is empty, or a live child
    /// with that name already exists.
    pub fn create_child(self: &Arc<Self>, name: &str) -> Result<Arc<Kernel>, RegistryErrorKind> {
        if name.is_empty() {
            return Err(RegistryErrorKind::InvalidArgument { what: "child name" });
        }

        let mut state = self.state.lock();
        if state.disposed {
            return Err(RegistryErrorKind::Disposed);
        }
        if let Some(existing) = state.children.get(name) {
            if !existing.is_disposed() {
                return Err(RegistryErrorKind::DuplicateName { name: name.to_string() });
            }
        }

        let child = Arc::new(Kernel {
            name: name.to_string(),
            config: self.config,
            state: Mutex::new(TableState::new()),
            scoped: ScopedCache::default(),
            parent: Some(Arc::downgrade(self)),
        });
        state.children.insert(name.to_string(), child.clone());
        debug!(child = name, "Created child table");
        Ok(child)
    }

    fn parent(&self) -> Option<Arc<Kernel>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    fn find_entry_by_type(&self, type_id: TypeId) -> Option<Arc<Entry>> {
        let local = {
            let state = self.state.lock();
            state
                .by_type
                .get(&type_id)
                .and_then(|indices| indices.first())
                .map(|&index| state.entries[index].clone())
        };
        local.or_else(|| self.parent()?.find_entry_by_type(type_id))
    }

    fn find_entry_by_name(&self, name: &str) -> Option<Arc<Entry>> {
        let local = {
            let state = self.state.lock();
            state.by_name.get(name).map(|&index| state.entries[index].clone())
        };
        local.or_else(|| self.parent()?.find_entry_by_name(name))
    }

    fn collect_entries_by_type(&self, type_id: TypeId, into: &mut Vec<Arc<Entry>>) {
        {
            let state = self.state.lock();
            if let Some(indices) = state.by_type.get(&type_id) {
                into.extend(indices.iter().map(|&index| state.entries[index].clone()));
            }
        }
        if let Some(parent) = self.parent() {
            parent.collect_entries_by_type(type_id, into);
        }
    }

    /// Produces an instance from the entry's provider, against this table.
    fn produce(&self, entry: &Entry, arguments: &Arguments) -> Result<Component, ResolveErrorKind> {
        match &entry.provider {
            Provider::Instance(component) => Ok(component.clone()),
            Provider::Factory(factory) => {
                let resolver = Resolver {
                    table: self,
                    arguments,
                };
                factory(&resolver).map_err(ResolveErrorKind::Instantiator)
            }
            Provider::Alias(target) => self.resolve_by_type(*target, arguments),
        }
    }

    fn resolve_entry(&self, entry: &Arc<Entry>, arguments: &Arguments) -> Result<Component, ResolveErrorKind> {
        let produce = || self.produce(entry, arguments);
        match &entry.cache {
            // Scoped instances are cached by the resolving table, so a child
            // gets its own instance and releases it on disposal.
            LifestyleCache::Scoped => self.scoped.get_or_produce(entry.service.id, &produce),
            cache => cache.get_or_produce(&produce),
        }
    }
}

impl ComponentTable for Kernel {
    fn has_by_type(&self, type_id: TypeId) -> bool {
        if self.is_disposed() {
            return false;
        }
        let local = {
            let state = self.state.lock();
            state.by_type.get(&type_id).is_some_and(|indices| !indices.is_empty())
        };
        local || self.parent().is_some_and(|parent| parent.has_by_type(type_id))
    }

    fn has_by_name(&self, name: &str) -> bool {
        if self.is_disposed() {
            return false;
        }
        let local = self.state.lock().by_name.contains_key(name);
        local || self.parent().is_some_and(|parent| parent.has_by_name(name))
    }

    fn register(&self, registration: Registration) -> Result<(), RegistryErrorKind> {
        let span = info_span!(
            "register",
            service = registration.service.name,
            name = registration.name.as_deref(),
            lifestyle = registration.lifestyle.name(),
            table = self.name.as_str(),
        );
        let _guard = span.enter();

        if registration.name.as_deref() == Some("") {
            let err = RegistryErrorKind::InvalidArgument { what: "name" };
            error!("{}", err);
            return Err(err);
        }

        let cache = match &registration.provider {
            // Aliases delegate; the target's lifestyle applies.
            Provider::Alias(_) => LifestyleCache::Transient,
            _ => match LifestyleCache::new(registration.lifestyle, self.config) {
                Some(cache) => cache,
                None => {
                    let err = RegistryErrorKind::NotSupported {
                        operation: "registration with a custom or bound lifestyle",
                    };
                    error!("{}", err);
                    return Err(err);
                }
            },
        };

        let mut state = self.state.lock();
        if state.disposed {
            return Err(RegistryErrorKind::Disposed);
        }
        if let Some(name) = &registration.name {
            if state.by_name.contains_key(name) {
                let err = RegistryErrorKind::DuplicateName { name: name.clone() };
                error!("{}", err);
                return Err(err);
            }
        }

        let is_alias = matches!(registration.provider, Provider::Alias(_));
        let index = state.entries.len();
        state.entries.push(Arc::new(Entry {
            service: registration.service,
            provider: registration.provider,
            cache,
        }));
        if !is_alias {
            state.by_type.entry(registration.service.id).or_default().push(index);
        }
        if let Some(name) = registration.name {
            state.by_name.insert(name, index);
        }

        debug!("Registered");
        Ok(())
    }

    fn resolve_by_type(&self, service: TypeInfo, arguments: &Arguments) -> Result<Component, ResolveErrorKind> {
        let span = info_span!("resolve", dependency = service.name, table = self.name.as_str());
        let _guard = span.enter();

        if self.is_disposed() {
            let err = ResolveErrorKind::Disposed;
            error!("{}", err);
            return Err(err);
        }
        let Some(entry) = self.find_entry_by_type(service.id) else {
            let err = ResolveErrorKind::NoRegistration {
                type_name: service.name,
                name: None,
            };
            error!("{}", err);
            return Err(err);
        };
        debug!("Found by type key");
        self.resolve_entry(&entry, arguments)
    }

    fn resolve_by_name_and_type(
        &self,
        name: &str,
        service: TypeInfo,
        arguments: &Arguments,
    ) -> Result<Component, ResolveErrorKind> {
        let span = info_span!("resolve", dependency = service.name, name, table = self.name.as_str());
        let _guard = span.enter();

        if name.is_empty() {
            let err = ResolveErrorKind::InvalidArgument { what: "name" };
            error!("{}", err);
            return Err(err);
        }
        if self.is_disposed() {
            let err = ResolveErrorKind::Disposed;
            error!("{}", err);
            return Err(err);
        }
        let Some(entry) = self.find_entry_by_name(name) else {
            let err = ResolveErrorKind::NoRegistration {
                type_name: service.name,
                name: Some(name.to_string()),
            };
            error!("{}", err);
            return Err(err);
        };
        debug!("Found by name key");
        self.resolve_entry(&entry, arguments)
    }

    fn resolve_all_by_type(&self, service: TypeInfo, arguments: &Arguments) -> Result<Vec<Component>, ResolveErrorKind> {
        if self.is_disposed() {
            return Err(ResolveErrorKind::Disposed);
        }
        let mut entries = Vec::new();
        self.collect_entries_by_type(service.id, &mut entries);
        entries
            .iter()
            .map(|entry| self.resolve_entry(entry, arguments))
            .collect()
    }

    fn create_child(self: Arc<Self>, name: &str) -> Result<Arc<dyn ComponentTable>, RegistryErrorKind> {
        Kernel::create_child(&self, name).map(|child| child as Arc<dyn ComponentTable>)
    }

    fn get_child(&self, name: &str) -> Option<Arc<dyn ComponentTable>> {
        let mut state = self.state.lock();
        match state.children.get(name) {
            Some(child) if child.is_disposed() => {
                state.children.remove(name);
                None
            }
            Some(child) => Some(child.clone() as Arc<dyn ComponentTable>),
            None => None,
        }
    }

    fn dispose(&self) {
        let children = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.entries.clear();
            state.by_type.clear();
            state.by_name.clear();
            std::mem::take(&mut state.children)
        };
        self.scoped.clear();
        for child in children.into_values() {
            child.dispose();
        }
        debug!(table = self.name.as_str(), "Disposed");
    }

    fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

#[cfg(test)]
mod tests {
    use super::Kernel;
    use crate::{
        any::TypeInfo,
        arguments::Arguments,
        errors::{RegistryErrorKind, ResolveErrorKind},
        lifestyle::Lifestyle,
        registration::Registration,
        table::{downcast, ComponentTable, Resolver},
    };
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Widget(u8);

    #[test]
    #[traced_test]
    fn test_register_indexes_both_key_spaces() {
        let kernel = Kernel::new();
        kernel
            .register(Registration::instance(Arc::new(Widget(1))).named("widget"))
            .unwrap();

        assert!(kernel.has_by_type(TypeInfo::of::<Widget>().id));
        assert!(kernel.has_by_name("widget"));
        assert!(!kernel.has_by_name("other"));
    }

    #[test]
    fn test_unnamed_registration_skips_name_space() {
        let kernel = Kernel::new();
        kernel.register(Registration::instance(Arc::new(Widget(1)))).unwrap();

        assert!(kernel.has_by_type(TypeInfo::of::<Widget>().id));
        assert!(!kernel.has_by_name(TypeInfo::of::<Widget>().name));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let kernel = Kernel::new();
        kernel
            .register(Registration::instance(Arc::new(Widget(1))).named("widget"))
            .unwrap();
        let err = kernel
            .register(Registration::instance(Arc::new(Widget(2))).named("widget"))
            .unwrap_err();
        assert!(matches!(err, RegistryErrorKind::DuplicateName { .. }));
    }

    #[test]
    fn test_singleton_entry_shared_with_child() {
        let kernel = Kernel::new();
        kernel
            .register(
                Registration::factory::<Widget, Widget, _>(|_| Ok(Widget(9)))
                    .named("widget")
                    .with_lifestyle(Lifestyle::Singleton),
            )
            .unwrap();
        let child = kernel.clone().create_child("nav").unwrap();

        let from_root = kernel.resolve_by_type(TypeInfo::of::<Widget>(), &Arguments::new()).unwrap();
        let from_child = child.resolve_by_type(TypeInfo::of::<Widget>(), &Arguments::new()).unwrap();
        assert!(Arc::ptr_eq(&from_root, &from_child));
    }

    #[test]
    fn test_scoped_entry_cached_per_resolving_table() {
        let kernel = Kernel::new();
        kernel
            .register(
                Registration::factory::<Widget, Widget, _>(|_| Ok(Widget(9)))
                    .named("widget")
                    .with_lifestyle(Lifestyle::Scoped),
            )
            .unwrap();
        let child = kernel.clone().create_child("nav").unwrap();

        let first = child.resolve_by_type(TypeInfo::of::<Widget>(), &Arguments::new()).unwrap();
        let again = child.resolve_by_type(TypeInfo::of::<Widget>(), &Arguments::new()).unwrap();
        let from_root = kernel.resolve_by_type(TypeInfo::of::<Widget>(), &Arguments::new()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &from_root));
    }

    #[test]
    fn test_child_registration_invisible_to_parent() {
        let kernel = Kernel::new();
        let child = kernel.clone().create_child("nav").unwrap();
        child.register(Registration::instance(Arc::new(Widget(1))).named("widget")).unwrap();

        assert!(child.has_by_name("widget"));
        assert!(!kernel.has_by_name("widget"));
        assert!(matches!(
            kernel.resolve_by_type(TypeInfo::of::<Widget>(), &Arguments::new()),
            Err(ResolveErrorKind::NoRegistration { .. })
        ));
    }

    #[test]
    fn test_factory_resolves_dependencies_from_resolving_table() {
        struct Holder(Arc<Widget>);

        let kernel = Kernel::new();
        kernel
            .register(Registration::instance(Arc::new(Widget(7))).named("widget"))
            .unwrap();
        kernel
            .register(Registration::factory::<Holder, Holder, _>(|resolver: &Resolver<'_>| {
                Ok(Holder(resolver.get::<Widget>()?))
            }))
            .unwrap();

        let component = kernel.resolve_by_type(TypeInfo::of::<Holder>(), &Arguments::new()).unwrap();
        let holder = downcast::<Holder>(component).unwrap();
        assert_eq!(holder.0 .0, 7);
    }

    #[test]
    fn test_override_beats_table() {
        struct Holder(Arc<Widget>);

        let kernel = Kernel::new();
        kernel
            .register(Registration::instance(Arc::new(Widget(7))).named("widget"))
            .unwrap();
        kernel
            .register(Registration::factory::<Holder, Holder, _>(|resolver: &Resolver<'_>| {
                Ok(Holder(resolver.get::<Widget>()?))
            }))
            .unwrap();

        let arguments = Arguments::new().with(Widget(42));
        let component = kernel.resolve_by_type(TypeInfo::of::<Holder>(), &arguments).unwrap();
        let holder = downcast::<Holder>(component).unwrap();
        assert_eq!(holder.0 .0, 42);
    }

    #[test]
    fn test_dispose_cascades_and_blocks_operations() {
        let kernel = Kernel::new();
        kernel
            .register(Registration::instance(Arc::new(Widget(1))).named("widget"))
            .unwrap();
        let child = kernel.clone().create_child("nav").unwrap();

        kernel.dispose();
        assert!(kernel.is_disposed());
        assert!(child.is_disposed());
        assert!(!kernel.has_by_name("widget"));
        assert!(matches!(
            kernel.resolve_by_type(TypeInfo::of::<Widget>(), &Arguments::new()),
            Err(ResolveErrorKind::Disposed)
        ));
        assert!(matches!(
            kernel.register(Registration::instance(Arc::new(Widget(1)))),
            Err(RegistryErrorKind::Disposed)
        ));
    }

    #[test]
    fn test_disposed_child_is_pruned() {
        let kernel = Kernel::new();
        let child = kernel.clone().create_child("nav").unwrap();
        assert!(kernel.get_child("nav").is_some());

        child.dispose();
        assert!(kernel.get_child("nav").is_none());
        // The slot is free again.
        kernel.clone().create_child("nav").unwrap();
    }

    #[test]
    fn test_live_child_name_collision() {
        let kernel = Kernel::new();
        kernel.clone().create_child("nav").unwrap();
        assert!(matches!(
            kernel.clone().create_child("nav"),
            Err(RegistryErrorKind::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_resolve_all_spans_parents() {
        let kernel = Kernel::new();
        kernel.register(Registration::instance(Arc::new(Widget(1)))).unwrap();
        let child = kernel.clone().create_child("nav").unwrap();
        child.register(Registration::instance(Arc::new(Widget(2)))).unwrap();

        let all = child.resolve_all_by_type(TypeInfo::of::<Widget>(), &Arguments::new()).unwrap();
        assert_eq!(all.len(), 2);
        let none = child.resolve_all_by_type(TypeInfo::of::<String>(), &Arguments::new()).unwrap();
        assert!(none.is_empty());
    }
}
