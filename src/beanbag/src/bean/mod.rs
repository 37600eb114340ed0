mod descriptor;
mod handle;

use std::sync::Arc;

pub use descriptor::{Interface, TypeDescriptor};
pub use handle::BeanRef;

/// A type whose instances can be managed by a container.
///
/// Besides the marker bounds, a [`Bean`] declares its capability table, i.e.
/// every trait object type an instance can be viewed as. The table is what
/// the container consults when a dependency is declared against an interface
/// and when it looks for lifecycle hooks, so a type implementing
/// [`AfterPropertiesSet`] must also list `dyn AfterPropertiesSet` here.
///
/// Usually this is generated by `#[derive(Bean)]` or `#[derive(Component)]`:
///
/// ```rust
/// # use std::sync::Arc;
/// # use beanbag::bean::{Bean, Interface};
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_owned()
///     }
/// }
///
/// impl Bean for English {
///     fn interfaces() -> Vec<Interface> {
///         vec![Interface::new::<Self, dyn Greeter>(|bean: Arc<Self>| -> Arc<dyn Greeter> { bean })]
///     }
/// }
/// ```
///
/// [`AfterPropertiesSet`]: crate::lifecycle::AfterPropertiesSet
pub trait Bean: Send + Sync + 'static {
    /// Returns the interfaces implemented by `Self`, excluding `Self` itself.
    fn interfaces() -> Vec<Interface>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

impl<T: Bean> From<Arc<T>> for BeanRef {
    fn from(bean: Arc<T>) -> Self {
        BeanRef::new(bean)
    }
}
