use std::collections::HashMap;

use crate::bean::TypeDescriptor;
use crate::component::FieldSpec;
use crate::container::prototype::Prototype;
use crate::container::registry::RegistryError;

/// The blueprint of a bean the container will construct.
#[derive(Debug)]
pub struct Definition {
    name: String,
    prototype: Box<dyn Prototype>,
    fields: Vec<FieldSpec>,
}

impl Definition {
    /// Creates a definition, extracting the field specs of the prototype.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is marked for injection with a type that
    /// can't receive a bean.
    pub fn new(name: String, prototype: Box<dyn Prototype>) -> Result<Self, RegistryError> {
        let fields = prototype
            .injection_points()
            .iter()
            .map(|point| point.extract(&name, prototype.descriptor()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            prototype,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        self.prototype.descriptor()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub(crate) fn prototype(&self) -> &dyn Prototype {
        self.prototype.as_ref()
    }
}

/// All definitions, kept in provision order.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: Vec<Definition>,
    index: HashMap<String, usize>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `definition` unless its name is taken.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateDefinition`] and leaves the registry
    /// unchanged if the name already has a definition.
    pub fn insert(&mut self, definition: Definition) -> Result<(), RegistryError> {
        if let Some(existing) = self.get(definition.name()) {
            return Err(RegistryError::DuplicateDefinition {
                name: definition.name,
                existing: existing.descriptor().type_name(),
            });
        }
        self.index
            .insert(definition.name.clone(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::bean::{Bean, BeanRef};
    use crate::component::{Component, InjectError, InjectionPoint, Visibility};
    use crate::container::prototype::ComponentPrototype;

    use super::*;

    #[derive(Default)]
    struct Db;

    impl Bean for Db {}

    impl Component for Db {}

    #[derive(Default)]
    struct Cache;

    impl Bean for Cache {}

    impl Component for Cache {}

    #[derive(Default)]
    struct Broken;

    impl Bean for Broken {}

    impl Component for Broken {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![
                InjectionPoint::concrete::<Db>("db", None, Visibility::Public),
                InjectionPoint::unsupported("retries", "u32", None, Visibility::Public),
            ]
        }

        fn inject(&self, field: &str, _dependency: &BeanRef) -> Result<(), InjectError> {
            Err(InjectError::UnknownField {
                field: field.to_owned(),
            })
        }
    }

    fn definition<C: Component>(name: &str) -> Definition {
        Definition::new(name.to_owned(), Box::new(ComponentPrototype::<C>::new())).unwrap()
    }

    #[test]
    fn definition_registry_insert_succeeds() {
        let mut registry = DefinitionRegistry::new();
        registry.insert(definition::<Db>("db")).unwrap();
        registry.insert(definition::<Cache>("cache")).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("db"));
        let names: Vec<_> = registry.iter().map(Definition::name).collect();
        assert_eq!(names, ["db", "cache"]);
    }

    #[test]
    fn definition_registry_insert_fails_when_name_is_duplicated() {
        let mut registry = DefinitionRegistry::new();
        registry.insert(definition::<Db>("store")).unwrap();

        let err = registry.insert(definition::<Cache>("store")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateDefinition { ref name, .. } if name == "store"
        ));
        assert_eq!(registry.len(), 1);
        let existing = registry.get("store").unwrap();
        assert_eq!(existing.descriptor().type_name(), std::any::type_name::<Db>());
    }

    #[test]
    fn definition_new_fails_when_field_declaration_is_invalid() {
        let res = Definition::new(
            "broken".to_owned(),
            Box::new(ComponentPrototype::<Broken>::new()),
        );

        assert!(matches!(
            res,
            Err(RegistryError::InvalidFieldDeclaration {
                field: "retries",
                declared: "u32",
                ..
            })
        ));
    }
}
