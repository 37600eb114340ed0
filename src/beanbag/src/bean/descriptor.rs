use std::any::{self, Any, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::bean::Bean;
use crate::naming;

type ErasedBean = Arc<dyn Any + Send + Sync>;

type UpcastFn = dyn Fn(ErasedBean) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync;

/// An entry of a capability table: a trait object type `I` together with the
/// way to view a concrete bean as an `Arc<I>`.
#[derive(Clone)]
pub struct Interface {
    type_id: TypeId,
    type_name: &'static str,
    upcast: Arc<UpcastFn>,
}

impl Interface {
    /// Creates an entry saying that beans of type `T` can be viewed as `I`
    /// through `upcast`, which is normally an unsizing coercion.
    pub fn new<T, I>(upcast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        T: Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<I>(),
            type_name: any::type_name::<I>(),
            upcast: Arc::new(move |object: ErasedBean| {
                object
                    .downcast::<T>()
                    .ok()
                    .map(|concrete| -> Box<dyn Any + Send + Sync> { Box::new(upcast(concrete)) })
            }),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Views `object` as an `I`, returning the boxed `Arc<I>`.
    pub(crate) fn upcast(&self, object: ErasedBean) -> Option<Box<dyn Any + Send + Sync>> {
        (self.upcast)(object)
    }
}

impl Debug for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("Interface").field(&self.type_name).finish()
    }
}

/// Runtime description of a bean type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    interfaces: Vec<Interface>,
}

impl TypeDescriptor {
    pub fn of<T: Bean>() -> Self {
        let mut interfaces = vec![Interface::new::<T, T>(|bean| bean)];
        interfaces.extend(T::interfaces());
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            interfaces,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The name a bean of this type gets when none is given explicitly.
    pub fn default_bean_name(&self) -> String {
        naming::bean_name_of_type(self.type_name)
    }

    /// Returns true if the described type is exactly the type `type_id`.
    pub fn is(&self, type_id: TypeId) -> bool {
        self.type_id == type_id
    }

    /// Returns true if the described type declares the interface `type_id`.
    pub fn implements(&self, type_id: TypeId) -> bool {
        self.type_id != type_id && self.interface(type_id).is_some()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.iter().skip(1)
    }

    pub(crate) fn interface(&self, type_id: TypeId) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|interface| interface.type_id == type_id)
    }
}
