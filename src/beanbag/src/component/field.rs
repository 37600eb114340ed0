use std::any::{self, TypeId};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::mem;

use crate::bean::TypeDescriptor;
use crate::container::registry::RegistryError;
use crate::naming;

/// Whether a dependency is declared against a concrete type or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Concrete,
    Interface,
}

impl Display for DependencyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Concrete => write!(f, "concrete"),
            Self::Interface => write!(f, "interface"),
        }
    }
}

/// Whether a field can be written from outside its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Restricted,
}

/// The static type of an injection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    type_id: TypeId,
    type_name: &'static str,
}

impl DeclaredType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A field of a component marked for injection, as declared by the type.
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    field: &'static str,
    qualifier: Option<&'static str>,
    declared: Declaration,
    visibility: Visibility,
}

#[derive(Debug, Clone, Copy)]
enum Declaration {
    Valid(DeclaredType, DependencyKind),
    Unsupported(&'static str),
}

impl InjectionPoint {
    /// A slot holding a concrete bean type `T`.
    pub fn concrete<T: 'static>(
        field: &'static str,
        qualifier: Option<&'static str>,
        visibility: Visibility,
    ) -> Self {
        let declared = Declaration::Valid(DeclaredType::of::<T>(), DependencyKind::Concrete);
        Self::new(field, qualifier, declared, visibility)
    }

    /// A slot holding a trait object type `I`.
    pub fn interface<I: ?Sized + 'static>(
        field: &'static str,
        qualifier: Option<&'static str>,
        visibility: Visibility,
    ) -> Self {
        let declared = Declaration::Valid(DeclaredType::of::<I>(), DependencyKind::Interface);
        Self::new(field, qualifier, declared, visibility)
    }

    /// A slot holding `T`, classified by pointer width: a thin `*const T`
    /// makes it a concrete slot and a wide one an interface slot. Unlike the
    /// written-out `dyn Trait` form, this also recognizes type aliases of
    /// trait objects.
    pub fn of<T: ?Sized + 'static>(
        field: &'static str,
        qualifier: Option<&'static str>,
        visibility: Visibility,
    ) -> Self {
        let kind = if mem::size_of::<*const T>() == mem::size_of::<*const ()>() {
            DependencyKind::Concrete
        } else {
            DependencyKind::Interface
        };
        let declared = Declaration::Valid(DeclaredType::of::<T>(), kind);
        Self::new(field, qualifier, declared, visibility)
    }

    /// A field marked for injection whose type can't receive a bean.
    pub fn unsupported(
        field: &'static str,
        type_name: &'static str,
        qualifier: Option<&'static str>,
        visibility: Visibility,
    ) -> Self {
        Self::new(field, qualifier, Declaration::Unsupported(type_name), visibility)
    }

    fn new(
        field: &'static str,
        qualifier: Option<&'static str>,
        declared: Declaration,
        visibility: Visibility,
    ) -> Self {
        Self {
            field,
            qualifier,
            declared,
            visibility,
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Resolves the dependency name and checks the declared type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidFieldDeclaration`] if the declared type
    /// is neither a concrete bean type nor an interface.
    pub fn extract(&self, bean: &str, owner: &TypeDescriptor) -> Result<FieldSpec, RegistryError> {
        let (declared, kind) = match self.declared {
            Declaration::Valid(declared, kind) => (declared, kind),
            Declaration::Unsupported(type_name) => {
                return Err(RegistryError::InvalidFieldDeclaration {
                    name: bean.to_owned(),
                    type_name: owner.type_name(),
                    field: self.field,
                    declared: type_name,
                })
            }
        };

        let dependency = match self.qualifier {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => naming::bean_name_of_field(self.field),
        };

        Ok(FieldSpec {
            field: self.field,
            dependency,
            declared,
            kind,
            visibility: self.visibility,
        })
    }
}

/// The injection requirement of one field, as recorded in a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    field: &'static str,
    dependency: String,
    declared: DeclaredType,
    kind: DependencyKind,
    visibility: Visibility,
}

impl FieldSpec {
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The name of the bean this field depends on.
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    pub fn requires_concrete_type(&self) -> bool {
        self.kind == DependencyKind::Concrete
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}
