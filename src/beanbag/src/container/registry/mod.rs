mod definition;

use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::bean::{Bean, BeanRef};
use crate::component::Component;
use crate::container::prototype::{ComponentPrototype, Prototype};

pub use definition::{Definition, DefinitionRegistry};

/// The registration surface of a container, usable as a trait object.
///
/// An empty `name` asks for the default name derived from the bean's type.
pub trait Configurer {
    /// Registers a ready-made bean, which will never be injected into.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is already loaded or the name is
    /// taken by another bean or definition.
    fn dyn_register(&mut self, name: &str, bean: BeanRef) -> Result<(), RegistryError>;

    /// Records a definition the container will construct on load.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is already loaded, the name is taken
    /// by another bean or definition, or the type declares an invalid
    /// injection slot.
    fn dyn_provide(
        &mut self,
        name: &str,
        prototype: Box<dyn Prototype>,
    ) -> Result<(), RegistryError>;
}

/// Typed helpers over [`Configurer`], returning the configurer for chaining.
pub trait TypedConfigurer: Configurer {
    fn register<T>(&mut self, bean: Arc<T>) -> Result<&mut Self, RegistryError>
    where
        T: Bean,
    {
        self.register_named("", bean)
    }

    fn register_named<T>(&mut self, name: &str, bean: Arc<T>) -> Result<&mut Self, RegistryError>
    where
        T: Bean,
    {
        self.dyn_register(name, BeanRef::new(bean))?;
        Ok(self)
    }

    fn provide<C>(&mut self) -> Result<&mut Self, RegistryError>
    where
        C: Component,
    {
        self.provide_named::<C>("")
    }

    fn provide_named<C>(&mut self, name: &str) -> Result<&mut Self, RegistryError>
    where
        C: Component,
    {
        self.dyn_provide(name, Box::new(ComponentPrototype::<C>::new()))?;
        Ok(self)
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("the container is already loaded"))]
    AlreadyLoaded,
    #[snafu(display("bean {name} is already defined by {existing}"))]
    #[non_exhaustive]
    DuplicateDefinition {
        name: String,
        existing: &'static str,
    },
    #[snafu(display("bean {name} already exists as an instance of {existing}"))]
    #[non_exhaustive]
    DuplicateInstance {
        name: String,
        existing: &'static str,
    },
    #[snafu(display(
        "field {field} of bean {name} ({type_name}) is marked for injection but its type {declared} can't hold a bean"
    ))]
    #[non_exhaustive]
    InvalidFieldDeclaration {
        name: String,
        type_name: &'static str,
        field: &'static str,
        declared: &'static str,
    },
    #[snafu(display("module {module} fails to configure the container"))]
    #[non_exhaustive]
    Module {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
}
