use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::bean::BeanRef;

/// Where a dependency was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Registered,
    Bean,
    Prototype,
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Bean => write!(f, "bean"),
            Self::Prototype => write!(f, "prototype"),
        }
    }
}

/// The instances known to a container.
///
/// Registered beans are supplied by the caller and never touched. Prototypes
/// are built by the container and move to the bean pool once wired.
#[derive(Debug, Default)]
pub struct InstancePools {
    registered: HashMap<String, BeanRef>,
    prototypes: HashMap<String, BeanRef>,
    beans: HashMap<String, BeanRef>,
}

impl InstancePools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a registered bean, returning the existing one under `name`.
    pub fn register(&mut self, name: String, bean: BeanRef) -> Result<(), &BeanRef> {
        if self.registered.contains_key(&name) {
            return Err(&self.registered[&name]);
        }
        self.registered.insert(name, bean);
        Ok(())
    }

    pub fn registered(&self, name: &str) -> Option<&BeanRef> {
        self.registered.get(name)
    }

    pub fn insert_prototype(&mut self, name: String, bean: BeanRef) {
        self.prototypes.insert(name, bean);
    }

    pub fn prototype(&self, name: &str) -> Option<&BeanRef> {
        self.prototypes.get(name)
    }

    /// Finds the instance a dependency named `name` refers to: registered
    /// beans first, then anything the container has built so far, wired or
    /// not.
    pub fn resolve(&self, name: &str) -> Option<(&BeanRef, Source)> {
        if let Some(bean) = self.registered.get(name) {
            Some((bean, Source::Registered))
        } else if let Some(bean) = self.beans.get(name) {
            Some((bean, Source::Bean))
        } else {
            self.prototypes
                .get(name)
                .map(|bean| (bean, Source::Prototype))
        }
    }

    /// Moves the prototype `name` into the bean pool.
    pub fn promote(&mut self, name: &str) -> Option<&BeanRef> {
        let (name, bean) = self.prototypes.remove_entry(name)?;
        Some(&*self.beans.entry(name).or_insert(bean))
    }

    /// Returns a registered or fully wired bean.
    pub fn lookup(&self, name: &str) -> Option<&BeanRef> {
        self.registered.get(name).or_else(|| self.beans.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registered
            .keys()
            .chain(self.beans.keys())
            .map(String::as_str)
    }

    /// Drops every container-built instance.
    pub fn discard_built(&mut self) {
        self.prototypes.clear();
        self.beans.clear();
    }
}
