use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    arguments::Arguments,
    errors::{RegistryErrorKind, ResolutionFailedError, ScopeErrorKind},
    table::{downcast, ComponentTable},
};

/// Name of the child table backing anonymous scopes.
pub(crate) const DEFAULT_SCOPE_NAME: &str = "default.child.table";

/// A child component table with its own lifetime, wrapped for scoped
/// resolution.
///
/// Scoped resolution never auto-registers: scopes resolve components that
/// must already be declared (to this table or one of its parents), so the
/// name-qualified form checks presence first and fails with
/// [`ScopeErrorKind::NotFound`] before touching the store. Every store
/// failure is translated into [`ResolutionFailedError`] with the requested
/// type and lookup name attached.
pub struct ScopedProvider {
    table: Arc<dyn ComponentTable>,
    name: String,
    attached: AtomicBool,
    disposed: AtomicBool,
}

impl ScopedProvider {
    #[must_use]
    pub(crate) fn new(table: Arc<dyn ComponentTable>, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
            attached: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scope's own child table. Registrations made here stay invisible to
    /// the parent.
    #[inline]
    #[must_use]
    pub fn table(&self) -> &Arc<dyn ComponentTable> {
        &self.table
    }

    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }

    /// # Errors
    /// Returns [`ScopeErrorKind::ResolutionFailed`] for any store failure.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ScopeErrorKind> {
        self.resolve_with(&Arguments::new())
    }

    /// # Errors
    /// Returns [`ScopeErrorKind::ResolutionFailed`] for any store failure.
    pub fn resolve_with<T: Send + Sync + 'static>(&self, arguments: &Arguments) -> Result<Arc<T>, ScopeErrorKind> {
        let info = TypeInfo::of::<T>();
        let span = info_span!("scope_resolve", dependency = info.name, scope = self.name.as_str());
        let _guard = span.enter();

        self.table
            .resolve_by_type(info, arguments)
            .and_then(downcast::<T>)
            .map_err(|source| {
                error!("{}", source);
                ScopeErrorKind::ResolutionFailed(ResolutionFailedError {
                    type_requested: info.name,
                    name_requested: None,
                    source,
                })
            })
    }

    /// # Errors
    /// Returns [`ScopeErrorKind::NotFound`] when the component is not already
    /// known to the scope, [`ScopeErrorKind::ResolutionFailed`] for any store
    /// failure.
    pub fn resolve_named<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ScopeErrorKind> {
        self.resolve_named_with(name, &Arguments::new())
    }

    /// # Errors
    /// Returns [`ScopeErrorKind::NotFound`] when the component is not already
    /// known to the scope, [`ScopeErrorKind::ResolutionFailed`] for any store
    /// failure.
    pub fn resolve_named_with<T: Send + Sync + 'static>(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> Result<Arc<T>, ScopeErrorKind> {
        let info = TypeInfo::of::<T>();
        let span = info_span!("scope_resolve", dependency = info.name, name, scope = self.name.as_str());
        let _guard = span.enter();

        if !(self.table.has_by_type(info.id) && self.table.has_by_name(name)) {
            let err = ScopeErrorKind::NotFound {
                type_name: info.name,
                name: name.to_string(),
            };
            error!("{}", err);
            return Err(err);
        }
        self.table
            .resolve_by_name_and_type(name, info, arguments)
            .and_then(downcast::<T>)
            .map_err(|source| {
                error!("{}", source);
                ScopeErrorKind::ResolutionFailed(ResolutionFailedError {
                    type_requested: info.name,
                    name_requested: Some(name.to_string()),
                    source,
                })
            })
    }

    /// Releases the owned child table, cascading into everything it owns. A
    /// second call is a no-op.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(scope = self.name.as_str(), "Disposing scope");
        self.table.dispose();
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Tracks the one "current" scope of a container extension.
///
/// The current-scope reference is shared mutable state with single-writer
/// discipline: scope churn from multiple threads must be serialized by the
/// caller — use one container extension per composition root rather than
/// sharing one across threads that create scopes concurrently.
pub struct ScopeManager {
    table: Arc<dyn ComponentTable>,
    current: Mutex<Option<Arc<ScopedProvider>>>,
}

impl ScopeManager {
    #[inline]
    #[must_use]
    pub fn new(table: Arc<dyn ComponentTable>) -> Self {
        Self {
            table,
            current: Mutex::new(None),
        }
    }

    /// Creates the anonymous scope if its default-named slot is free, making
    /// it current. When the slot is taken the call is a no-op and returns the
    /// current reference as-is — `None` is a valid "no scope yet" answer, not
    /// an error.
    ///
    /// # Errors
    /// Fails when the parent table refuses the child (e.g. disposed).
    pub fn create_scope(&self) -> Result<Option<Arc<ScopedProvider>>, RegistryErrorKind> {
        if self.table.get_child(DEFAULT_SCOPE_NAME).is_none() {
            let child = self.table.clone().create_child(DEFAULT_SCOPE_NAME)?;
            let scope = Arc::new(ScopedProvider::new(child, DEFAULT_SCOPE_NAME));
            *self.current.lock() = Some(scope);
        }
        Ok(self.current.lock().clone())
    }

    /// Creates or reuses the named child table and wraps it as the current
    /// scope. Idempotent per name: an existing live child is wrapped, not
    /// re-created; a disposed child's slot is considered free and gets a
    /// fresh table.
    ///
    /// # Errors
    /// Fails on an empty name or when the parent table refuses the child.
    pub fn create_scope_named(&self, name: &str) -> Result<Arc<ScopedProvider>, RegistryErrorKind> {
        if name.is_empty() {
            return Err(RegistryErrorKind::InvalidArgument { what: "scope name" });
        }
        let child = match self.table.get_child(name) {
            Some(child) => {
                debug!(scope = name, "Reusing existing child table");
                child
            }
            None => self.table.clone().create_child(name)?,
        };
        let scope = Arc::new(ScopedProvider::new(child, name));
        *self.current.lock() = Some(scope.clone());
        Ok(scope)
    }

    #[inline]
    #[must_use]
    pub fn current_scope(&self) -> Option<Arc<ScopedProvider>> {
        self.current.lock().clone()
    }
}
