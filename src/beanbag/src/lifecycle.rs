//! Callbacks a container-built bean may receive while being loaded.
//!
//! A hook only runs when the bean type lists the corresponding trait object in
//! its capability table, e.g. `#[bean(implements(dyn AfterPropertiesSet))]`.
//! Registered instances never receive any hook.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub type HookResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Invoked right after the bean is allocated, before any field is injected.
pub trait BeanConstruct: Send + Sync {
    fn bean_construct(&self) -> HookResult;
}

/// Invoked at the start of the bean's own injection step. Sibling beans may
/// or may not be wired yet.
pub trait PreInitialize: Send + Sync {
    fn pre_initialize(&self) -> HookResult;
}

/// Invoked once every field of the bean has been injected.
pub trait AfterPropertiesSet: Send + Sync {
    fn after_properties_set(&self) -> HookResult;
}

/// Invoked after every container-built bean has been wired.
pub trait Initialized: Send + Sync {
    fn initialized(&self) -> HookResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeanConstruct,
    PreInitialize,
    AfterPropertiesSet,
    Initialized,
}

impl Hook {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::BeanConstruct => "BeanConstruct",
            Self::PreInitialize => "PreInitialize",
            Self::AfterPropertiesSet => "AfterPropertiesSet",
            Self::Initialized => "Initialized",
        }
    }
}

impl Display for Hook {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}
