use std::{
    any::TypeId,
    collections::{BTreeMap, HashMap},
    thread::ThreadId,
};

use parking_lot::Mutex;

use crate::{any::Component, config::Config, errors::ResolveErrorKind, lifestyle::Lifestyle};

/// Per-entry instance cache implementing the registration's lifestyle.
///
/// The cache never holds its lock across a produce call: factories may
/// re-enter the table to resolve their own dependencies. Under contention two
/// threads may both produce; the first insert wins and the loser's value is
/// dropped.
pub(crate) enum LifestyleCache {
    /// No caching; every resolution produces.
    Transient,
    /// One instance for the lifetime of the owning table. `Undefined`
    /// registrations land here too: the store default is singleton caching.
    Singleton(Mutex<Option<Component>>),
    /// One instance per resolving thread.
    PerThread(Mutex<HashMap<ThreadId, Component>>),
    /// Up to `capacity` live instances, reused round-robin once full.
    Pooled(Mutex<Pool>),
    /// Cached by the resolving table, not the entry; see [`ScopedCache`].
    Scoped,
}

type Produce<'a> = &'a dyn Fn() -> Result<Component, ResolveErrorKind>;

impl LifestyleCache {
    /// Maps a lifestyle tag to its store instruction. `Custom` and `Bound`
    /// have none.
    #[must_use]
    pub(crate) fn new(lifestyle: Lifestyle, config: Config) -> Option<Self> {
        match lifestyle {
            Lifestyle::Transient => Some(Self::Transient),
            Lifestyle::Singleton | Lifestyle::Undefined => Some(Self::Singleton(Mutex::new(None))),
            Lifestyle::PerThread => Some(Self::PerThread(Mutex::new(HashMap::new()))),
            Lifestyle::Pooled => Some(Self::Pooled(Mutex::new(Pool::new(config.pool_capacity)))),
            Lifestyle::Scoped => Some(Self::Scoped),
            Lifestyle::Custom | Lifestyle::Bound => None,
        }
    }

    pub(crate) fn get_or_produce(&self, produce: Produce<'_>) -> Result<Component, ResolveErrorKind> {
        match self {
            Self::Transient | Self::Scoped => produce(),
            Self::Singleton(slot) => {
                if let Some(component) = slot.lock().clone() {
                    return Ok(component);
                }
                let produced = produce()?;
                let mut guard = slot.lock();
                Ok(guard.get_or_insert(produced).clone())
            }
            Self::PerThread(map) => {
                let thread = std::thread::current().id();
                if let Some(component) = map.lock().get(&thread).cloned() {
                    return Ok(component);
                }
                let produced = produce()?;
                let mut guard = map.lock();
                Ok(guard.entry(thread).or_insert(produced).clone())
            }
            Self::Pooled(pool) => {
                if let Some(component) = pool.lock().reuse() {
                    return Ok(component);
                }
                let produced = produce()?;
                let mut guard = pool.lock();
                Ok(guard.admit(produced))
            }
        }
    }
}

pub(crate) struct Pool {
    items: Vec<Component>,
    next: usize,
    capacity: usize,
}

impl Pool {
    #[must_use]
    fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            next: 0,
            capacity: capacity.max(1),
        }
    }

    /// Hands out an existing instance round-robin once the pool is full.
    fn reuse(&mut self) -> Option<Component> {
        if self.items.len() < self.capacity {
            return None;
        }
        let component = self.items[self.next].clone();
        self.next = (self.next + 1) % self.items.len();
        Some(component)
    }

    fn admit(&mut self, component: Component) -> Component {
        if self.items.len() < self.capacity {
            self.items.push(component.clone());
        }
        component
    }
}

/// Scoped-lifestyle instances, cached in the table that performed the
/// resolution. Disposing a table therefore releases exactly the scoped
/// instances its own resolutions created.
#[derive(Default)]
pub(crate) struct ScopedCache {
    map: Mutex<BTreeMap<TypeId, Component>>,
}

impl ScopedCache {
    pub(crate) fn get_or_produce(&self, type_id: TypeId, produce: Produce<'_>) -> Result<Component, ResolveErrorKind> {
        if let Some(component) = self.map.lock().get(&type_id).cloned() {
            return Ok(component);
        }
        let produced = produce()?;
        let mut guard = self.map.lock();
        Ok(guard.entry(type_id).or_insert(produced).clone())
    }

    pub(crate) fn clear(&self) {
        self.map.lock().clear();
    }
}
