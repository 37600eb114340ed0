#![allow(clippy::new_without_default)]

pub mod bean;
pub mod component;
pub mod container;
pub mod lifecycle;
pub mod module;
pub mod naming;
pub mod value;

pub use beanbag_derive::{Bean, Component};

pub mod prelude {
    pub use crate::bean::{Bean, BeanRef, Interface};
    pub use crate::component::{Component, Inject};
    pub use crate::container::registry::{Configurer, RegistryError, TypedConfigurer};
    pub use crate::container::{Container, LoadError};
    pub use crate::lifecycle::{
        AfterPropertiesSet, BeanConstruct, HookResult, Initialized, PreInitialize,
    };
    pub use crate::module::Module;
    pub use crate::value::{Value, ValueStore};
    pub use crate::{Bean, Component};
}
