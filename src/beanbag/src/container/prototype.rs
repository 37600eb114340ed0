use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::bean::{BeanRef, TypeDescriptor};
use crate::component::{Component, InjectError, InjectionPoint};

/// A type-erased blueprint of a container-built bean.
///
/// Usually you don't need to implement [`Prototype`] manually, since
/// [`ComponentPrototype`] covers every [`Component`].
pub trait Prototype: Debug + Send + Sync + 'static {
    fn descriptor(&self) -> &TypeDescriptor;

    /// Returns the fields of the built type marked for injection.
    fn injection_points(&self) -> Vec<InjectionPoint>;

    /// Allocates a new default-valued instance.
    fn dyn_construct(&self) -> BeanRef;

    /// Stores `dependency` into the field `field` of `target`, which must be
    /// an instance built by [`Prototype::dyn_construct`].
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is foreign to this prototype, or the
    /// field can't hold `dependency`.
    fn dyn_inject(
        &self,
        target: &BeanRef,
        field: &str,
        dependency: &BeanRef,
    ) -> Result<(), InjectError>;
}

pub struct ComponentPrototype<C>
where
    C: Component,
{
    descriptor: Arc<TypeDescriptor>,
    _marker: PhantomData<fn() -> C>,
}

impl<C> ComponentPrototype<C>
where
    C: Component,
{
    pub fn new() -> Self {
        Self {
            descriptor: Arc::new(TypeDescriptor::of::<C>()),
            _marker: PhantomData,
        }
    }
}

impl<C> Debug for ComponentPrototype<C>
where
    C: Component,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ComponentPrototype")
            .field("type", &any::type_name::<C>())
            .finish_non_exhaustive()
    }
}

impl<C> Prototype for ComponentPrototype<C>
where
    C: Component,
{
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn injection_points(&self) -> Vec<InjectionPoint> {
        C::injection_points()
    }

    fn dyn_construct(&self) -> BeanRef {
        BeanRef::from_parts(Arc::new(C::default()), Arc::clone(&self.descriptor))
    }

    fn dyn_inject(
        &self,
        target: &BeanRef,
        field: &str,
        dependency: &BeanRef,
    ) -> Result<(), InjectError> {
        match target.downcast::<C>() {
            Some(target) => target.inject(field, dependency),
            None => Err(InjectError::Incompatible {
                expected: any::type_name::<C>(),
                actual: target.type_name(),
            }),
        }
    }
}
