use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use crate::bean::BeanRef;
use crate::component::InjectError;

/// A field slot the container fills with a dependency during load.
///
/// `T` is either a concrete bean type or a trait object type such as
/// `dyn Greeter`. A slot is written at most once; after a successful load
/// every slot of every container-built bean is filled, so dereferencing it is
/// safe from then on.
pub struct Inject<T: ?Sized> {
    slot: OnceLock<Arc<T>>,
}

impl<T: ?Sized + 'static> Inject<T> {
    pub fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        self.slot.get()
    }

    pub fn is_injected(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Fills the slot with `dependency` viewed as a `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dependency` can't be viewed as a `T` or the slot
    /// is already filled.
    pub fn fill(&self, dependency: &BeanRef) -> Result<(), InjectError> {
        let object = dependency
            .cast::<T>()
            .ok_or_else(|| InjectError::Incompatible {
                expected: any::type_name::<T>(),
                actual: dependency.type_name(),
            })?;
        self.slot
            .set(object)
            .map_err(|_| InjectError::AlreadyInjected {
                expected: any::type_name::<T>(),
            })
    }
}

impl<T: ?Sized + 'static> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Deref for Inject<T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the slot is accessed before the container injected it.
    fn deref(&self) -> &Self::Target {
        match self.slot.get() {
            Some(object) => object,
            None => panic!(
                "dependency of type `{}` accessed before injection",
                any::type_name::<T>()
            ),
        }
    }
}

impl<T: ?Sized> Debug for Inject<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Inject")
            .field("type", &any::type_name::<T>())
            .field("injected", &self.slot.get().is_some())
            .finish()
    }
}
