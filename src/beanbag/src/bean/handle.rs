use std::any::{Any, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::bean::{Bean, TypeDescriptor};

/// A shared, type-erased handle to a managed bean.
///
/// Cloning a [`BeanRef`] never clones the bean itself; every clone points to
/// the same instance, which is what makes a dependency injected into one bean
/// the very instance returned by a later lookup.
#[derive(Clone)]
pub struct BeanRef {
    object: Arc<dyn Any + Send + Sync>,
    descriptor: Arc<TypeDescriptor>,
}

impl BeanRef {
    pub fn new<T: Bean>(bean: Arc<T>) -> Self {
        Self::from_parts(bean, Arc::new(TypeDescriptor::of::<T>()))
    }

    pub(crate) fn from_parts<T: Bean>(bean: Arc<T>, descriptor: Arc<TypeDescriptor>) -> Self {
        debug_assert!(descriptor.is(TypeId::of::<T>()));
        Self {
            object: bean,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor.type_name()
    }

    /// Returns the bean as its concrete type, if it is a `T`.
    pub fn downcast<T: Bean>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    /// Returns the bean viewed as `I`, which is either its concrete type or
    /// one of the interfaces in its capability table.
    pub fn cast<I>(&self) -> Option<Arc<I>>
    where
        I: ?Sized + 'static,
    {
        let interface = self.descriptor.interface(TypeId::of::<I>())?;
        let boxed = interface.upcast(Arc::clone(&self.object))?;
        boxed.downcast::<Arc<I>>().ok().map(|object| *object)
    }

    /// Returns true if both handles point to the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl Debug for BeanRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BeanRef")
            .field("type", &self.descriptor.type_name())
            .finish_non_exhaustive()
    }
}
