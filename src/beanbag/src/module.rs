use std::error::Error;

use crate::container::registry::Configurer;

/// A reusable group of registrations.
///
/// ```rust
/// # use std::error::Error;
/// # use std::sync::Arc;
/// # use beanbag::prelude::*;
/// #[derive(Bean)]
/// struct Settings {
///     verbose: bool,
/// }
///
/// struct SettingsModule;
///
/// impl Module for SettingsModule {
///     fn configure(
///         &self,
///         configurer: &mut dyn Configurer,
///     ) -> Result<(), Box<dyn Error + Send + Sync>> {
///         configurer.register(Arc::new(Settings { verbose: true }))?;
///         Ok(())
///     }
/// }
///
/// let mut container = Container::new();
/// container.install(SettingsModule)?;
/// container.load()?;
/// assert!(container.get::<Settings>("settings").unwrap().verbose);
/// # Ok::<(), Box<dyn Error>>(())
/// ```
pub trait Module {
    /// Registers beans and definitions on `configurer`.
    ///
    /// # Errors
    ///
    /// Returns any error met while configuring; the container reports it as
    /// [`RegistryError::Module`].
    ///
    /// [`RegistryError::Module`]: crate::container::registry::RegistryError::Module
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
