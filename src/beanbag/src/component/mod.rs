mod field;
mod inject;

use snafu::prelude::*;

use crate::bean::{Bean, BeanRef};

pub use field::{DeclaredType, DependencyKind, FieldSpec, InjectionPoint, Visibility};
pub use inject::Inject;

/// A bean type the container constructs and wires by itself.
///
/// The container allocates a component with [`Default`], then fills each of
/// its [`InjectionPoint`]s through [`Component::inject`]. Usually you don't
/// need to implement this trait manually, because `#[derive(Component)]`
/// generates both the schema and the setter from `#[inject]` attributes:
///
/// ```rust
/// # use std::sync::Arc;
/// # use beanbag::bean::{Bean, BeanRef};
/// # use beanbag::component::{Component, Inject, InjectError, InjectionPoint, Visibility};
/// #[derive(Default)]
/// struct Db;
///
/// impl Bean for Db {}
///
/// #[derive(Default)]
/// struct UserDao {
///     db: Inject<Db>,
/// }
///
/// impl Bean for UserDao {}
///
/// impl Component for UserDao {
///     fn injection_points() -> Vec<InjectionPoint> {
///         vec![InjectionPoint::concrete::<Db>("db", None, Visibility::Restricted)]
///     }
///
///     fn inject(&self, field: &str, dependency: &BeanRef) -> Result<(), InjectError> {
///         match field {
///             "db" => self.db.fill(dependency),
///             _ => Err(InjectError::UnknownField { field: field.to_owned() }),
///         }
///     }
/// }
/// ```
pub trait Component: Bean + Default {
    /// Returns every field marked for injection, in declaration order.
    fn injection_points() -> Vec<InjectionPoint> {
        Vec::new()
    }

    /// Stores `dependency` into the field named `field`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such injection slot, or the slot can't
    /// hold `dependency`.
    fn inject(&self, field: &str, dependency: &BeanRef) -> Result<(), InjectError> {
        let _ = dependency;
        Err(InjectError::UnknownField {
            field: field.to_owned(),
        })
    }
}

/// Errors reported by [`Component::inject`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InjectError {
    #[snafu(display("no injection slot named {field}"))]
    UnknownField { field: String },
    #[snafu(display("a slot of type {expected} can't hold a {actual}"))]
    Incompatible {
        expected: &'static str,
        actual: &'static str,
    },
    #[snafu(display("the slot of type {expected} is already injected"))]
    AlreadyInjected { expected: &'static str },
}
