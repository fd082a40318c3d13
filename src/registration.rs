use std::sync::Arc;

use crate::{
    any::{Component, TypeInfo},
    errors::InstantiateErrorKind,
    lifestyle::Lifestyle,
    table::Resolver,
};

pub type BoxedFactory = Arc<dyn Fn(&Resolver<'_>) -> Result<Component, InstantiateErrorKind> + Send + Sync>;

/// How a registration produces instances.
#[derive(Clone)]
pub enum Provider {
    /// A pre-built instance; every resolution hands out this value.
    Instance(Component),
    /// A factory invoked against the resolving table.
    Factory(BoxedFactory),
    /// Delegates to the default entry for another service type. Synthesized
    /// by the reconciler to attach a missing name key to an existing entry
    /// without changing its lifestyle or cached instances.
    Alias(TypeInfo),
}

/// A component registration: the `(service, implementation, name, lifestyle)`
/// tuple plus the provider that produces instances.
#[derive(Clone)]
pub struct Registration {
    pub service: TypeInfo,
    pub implementation: TypeInfo,
    pub name: Option<String>,
    pub lifestyle: Lifestyle,
    pub provider: Provider,
}

impl Registration {
    /// Registration handing out a pre-built instance. Transient lifestyle:
    /// for instance registrations the lifestyle is contract bookkeeping, the
    /// stored value is returned either way.
    #[must_use]
    pub fn instance<T: Send + Sync + 'static>(instance: Arc<T>) -> Self {
        let info = TypeInfo::of::<T>();
        Self {
            service: info,
            implementation: info,
            name: None,
            lifestyle: Lifestyle::Transient,
            provider: Provider::Instance(instance),
        }
    }

    /// Registration mapping service `S` to implementation `I`, produced by
    /// `factory`. `I` is recorded for identity checks only; the factory is
    /// what actually constructs the value.
    #[must_use]
    pub fn factory<S, I, F>(factory: F) -> Self
    where
        S: Send + Sync + 'static,
        I: 'static,
        F: Fn(&Resolver<'_>) -> Result<S, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self {
            service: TypeInfo::of::<S>(),
            implementation: TypeInfo::of::<I>(),
            name: None,
            lifestyle: Lifestyle::Transient,
            provider: Provider::Factory(Arc::new(move |resolver| {
                factory(resolver).map(|value| Arc::new(value) as Component)
            })),
        }
    }

    /// Self-bound transient registration under the type's own full-name key.
    /// This is what the reconciler synthesizes when a resolve call names a
    /// type the table has never seen.
    #[must_use]
    pub fn self_bound<T: Construct>() -> Self {
        let info = TypeInfo::of::<T>();
        Self {
            service: info,
            implementation: info,
            name: Some(info.name.to_string()),
            lifestyle: Lifestyle::Transient,
            provider: Provider::Factory(Arc::new(|resolver| {
                T::construct(resolver).map(|value| Arc::new(value) as Component)
            })),
        }
    }

    /// Name-space entry delegating to the default entry for `target`.
    #[must_use]
    pub fn alias(target: TypeInfo, name: impl Into<String>) -> Self {
        Self {
            service: target,
            implementation: target,
            name: Some(name.into()),
            lifestyle: Lifestyle::Transient,
            provider: Provider::Alias(target),
        }
    }

    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_lifestyle(mut self, lifestyle: Lifestyle) -> Self {
        self.lifestyle = lifestyle;
        self
    }

    /// The string identity this registration occupies: the explicit name, or
    /// the implementation's full-name key when none was supplied.
    #[inline]
    #[must_use]
    pub(crate) fn name_or_full_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.implementation.name)
    }
}

/// Fallible self-instantiation against a table.
///
/// The reconciler's lazy auto-registration needs a way to build a value out
/// of nothing but its type; implementors resolve their constructor
/// dependencies from the [`Resolver`] they are given. Types that are
/// [`Default`] get this for free.
pub trait Construct: Sized + Send + Sync + 'static {
    /// # Errors
    /// Returns [`InstantiateErrorKind`] when the value cannot be built, e.g.
    /// a constructor dependency is missing from the table.
    fn construct(resolver: &Resolver<'_>) -> Result<Self, InstantiateErrorKind>;
}

impl<T> Construct for T
where
    T: Default + Send + Sync + 'static,
{
    #[inline]
    fn construct(_resolver: &Resolver<'_>) -> Result<Self, InstantiateErrorKind> {
        Ok(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{Provider, Registration};
    use crate::lifestyle::Lifestyle;
    use std::sync::Arc;

    #[derive(Default)]
    struct Widget;

    #[test]
    fn test_instance_defaults() {
        let registration = Registration::instance(Arc::new(Widget));
        assert_eq!(registration.service, registration.implementation);
        assert!(registration.name.is_none());
        assert_eq!(registration.lifestyle, Lifestyle::Transient);
        assert!(registration.name_or_full_name().ends_with("::Widget"));
    }

    #[test]
    fn test_self_bound_uses_full_name_key() {
        let registration = Registration::self_bound::<Widget>();
        assert_eq!(registration.name.as_deref(), Some(registration.implementation.name));
        assert!(matches!(registration.provider, Provider::Factory(_)));
    }

    #[test]
    fn test_builder_overrides() {
        let registration = Registration::instance(Arc::new(Widget))
            .named("widget")
            .with_lifestyle(Lifestyle::Singleton);
        assert_eq!(registration.name_or_full_name(), "widget");
        assert_eq!(registration.lifestyle, Lifestyle::Singleton);
    }
}
