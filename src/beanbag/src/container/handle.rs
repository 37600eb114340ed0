use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::bean::BeanRef;
use crate::container::engine::{Engine, LoadError};
use crate::container::pool::InstancePools;
use crate::container::prototype::Prototype;
use crate::container::registry::{Configurer, Definition, DefinitionRegistry, RegistryError};
use crate::module::Module;
use crate::value::{MemoryValueStore, ValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Configuring,
    Loaded,
    Failed,
}

/// A dependency-injection container.
///
/// Beans are registered ready-made or provided as [`Component`] types, then
/// [`Container::load`] builds and wires every provided type exactly once.
/// Registration and loading take `&mut self`; once loaded, the container only
/// serves lookups and can be shared between threads.
///
/// ```rust
/// # use std::sync::Arc;
/// # use beanbag::prelude::*;
/// #[derive(Bean)]
/// struct Db {
///     prefix: &'static str,
/// }
///
/// #[derive(Default, Component)]
/// struct UserDao {
///     #[inject("db")]
///     pub db: Inject<Db>,
/// }
///
/// let mut container = Container::new();
/// container
///     .register_named("db", Arc::new(Db { prefix: "t_" }))?
///     .provide::<UserDao>()?;
/// container.load()?;
///
/// let dao: Arc<UserDao> = container.get("userDao").unwrap();
/// assert_eq!(dao.db.prefix, "t_");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// [`Component`]: crate::component::Component
pub struct Container {
    registry: DefinitionRegistry,
    pools: InstancePools,
    stage: Stage,
    override_visibility: bool,
    values: Arc<dyn ValueStore>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            registry: DefinitionRegistry::new(),
            pools: InstancePools::new(),
            stage: Stage::Configuring,
            override_visibility: false,
            values: Arc::new(MemoryValueStore::new()),
        }
    }

    /// Allows injection into fields that are not `pub`. Disabled by default,
    /// in which case loading fails on the first such field.
    pub fn override_visibility(&mut self, open: bool) -> &mut Self {
        self.override_visibility = open;
        self
    }

    /// Lets `module` register its beans and definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Module`] wrapping whatever the module reports.
    pub fn install<M>(&mut self, module: M) -> Result<&mut Self, RegistryError>
    where
        M: Module,
    {
        let name = any::type_name::<M>();
        debug!(module = name, "installing module");
        match module.configure(self) {
            Ok(()) => Ok(self),
            Err(source) => Err(RegistryError::Module {
                module: name,
                source,
            }),
        }
    }

    /// Builds and wires every provided definition.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::AlreadyLoaded`] if called more than once, or the
    /// first failure met while loading. A failed load can't be retried and
    /// leaves no container-built bean behind.
    pub fn load(&mut self) -> Result<(), LoadError> {
        if self.stage != Stage::Configuring {
            return Err(LoadError::AlreadyLoaded);
        }

        let engine = Engine::new(&self.registry, &mut self.pools, self.override_visibility);
        match engine.run() {
            Ok(()) => {
                self.stage = Stage::Loaded;
                info!(definitions = self.registry.len(), "container loaded");
                Ok(())
            }
            Err(err) => {
                self.stage = Stage::Failed;
                self.pools.discard_built();
                warn!(error = %err, "container failed to load");
                Err(err)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.stage == Stage::Loaded
    }

    /// Looks up a registered or container-built bean by name. Nothing is
    /// constructed on demand.
    pub fn get_bean(&self, name: &str) -> Option<BeanRef> {
        if self.stage == Stage::Failed {
            return None;
        }
        self.pools.lookup(name).cloned()
    }

    /// Looks up a bean by name and views it as `T`, which is either its
    /// concrete type or one of its declared interfaces.
    pub fn get<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: ?Sized + 'static,
    {
        self.get_bean(name).and_then(|bean| bean.cast::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_bean(name).is_some()
    }

    /// Returns the names of all beans a lookup can currently find.
    pub fn bean_names(&self) -> Vec<&str> {
        if self.stage == Stage::Failed {
            return Vec::new();
        }
        let mut names: Vec<_> = self.pools.names().collect();
        names.sort_unstable();
        names
    }

    /// Returns the definition provided under `name`.
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.registry.get(name)
    }

    /// Replaces the property store.
    pub fn use_value_store(&mut self, store: Arc<dyn ValueStore>) -> &mut Self {
        self.values = store;
        self
    }

    /// Returns the property store.
    pub fn property(&self) -> Arc<dyn ValueStore> {
        Arc::clone(&self.values)
    }

    fn ensure_configuring(&self) -> Result<(), RegistryError> {
        if self.stage == Stage::Configuring {
            Ok(())
        } else {
            Err(RegistryError::AlreadyLoaded)
        }
    }

    fn ensure_name_is_free(&self, name: &str) -> Result<(), RegistryError> {
        if let Some(existing) = self.registry.get(name) {
            return Err(RegistryError::DuplicateDefinition {
                name: name.to_owned(),
                existing: existing.descriptor().type_name(),
            });
        }
        if let Some(existing) = self.pools.registered(name) {
            return Err(RegistryError::DuplicateInstance {
                name: name.to_owned(),
                existing: existing.type_name(),
            });
        }
        Ok(())
    }
}

impl Configurer for Container {
    fn dyn_register(&mut self, name: &str, bean: BeanRef) -> Result<(), RegistryError> {
        self.ensure_configuring()?;

        let name = if name.is_empty() {
            bean.descriptor().default_bean_name()
        } else {
            name.to_owned()
        };
        self.ensure_name_is_free(&name)?;

        debug!(bean = %name, type_name = bean.type_name(), "registered bean");
        if let Err(existing) = self.pools.register(name.clone(), bean) {
            return Err(RegistryError::DuplicateInstance {
                name,
                existing: existing.type_name(),
            });
        }
        Ok(())
    }

    fn dyn_provide(
        &mut self,
        name: &str,
        prototype: Box<dyn Prototype>,
    ) -> Result<(), RegistryError> {
        self.ensure_configuring()?;

        let name = if name.is_empty() {
            prototype.descriptor().default_bean_name()
        } else {
            name.to_owned()
        };
        self.ensure_name_is_free(&name)?;

        let definition = Definition::new(name, prototype)?;
        debug!(
            bean = definition.name(),
            type_name = definition.descriptor().type_name(),
            fields = definition.fields().len(),
            "provided definition"
        );
        self.registry.insert(definition)
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Container")
            .field("stage", &self.stage)
            .field("definitions", &self.registry.len())
            .field("override_visibility", &self.override_visibility)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::thread;

    use crate::bean::{Bean, Interface};
    use crate::component::{Component, Inject, InjectError, InjectionPoint, Visibility};
    use crate::container::registry::TypedConfigurer;
    use crate::lifecycle::{
        AfterPropertiesSet, BeanConstruct, Hook, HookResult, Initialized, PreInitialize,
    };
    use crate::value::{MockValueStore, Value};

    use super::*;

    thread_local! {
        static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn record(event: String) {
        EVENTS.with(|events| events.borrow_mut().push(event));
    }

    fn take_events() -> Vec<String> {
        EVENTS.with(|events| events.take())
    }

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Config {
        prefix: &'static str,
    }

    impl Bean for Config {}

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_owned()
        }
    }

    impl Bean for English {
        fn interfaces() -> Vec<Interface> {
            vec![Interface::new::<Self, dyn Greeter>(
                |bean: Arc<Self>| -> Arc<dyn Greeter> { bean },
            )]
        }
    }

    macro_rules! record_hooks {
        ($ty:ty, $label:literal) => {
            impl BeanConstruct for $ty {
                fn bean_construct(&self) -> HookResult {
                    record(format!("{}:construct", $label));
                    Ok(())
                }
            }

            impl PreInitialize for $ty {
                fn pre_initialize(&self) -> HookResult {
                    record(format!("{}:pre_initialize", $label));
                    Ok(())
                }
            }

            impl AfterPropertiesSet for $ty {
                fn after_properties_set(&self) -> HookResult {
                    record(format!("{}:after_properties_set", $label));
                    Ok(())
                }
            }

            impl Initialized for $ty {
                fn initialized(&self) -> HookResult {
                    record(format!("{}:initialized", $label));
                    Ok(())
                }
            }

            impl Bean for $ty {
                fn interfaces() -> Vec<Interface> {
                    vec![
                        Interface::new::<Self, dyn BeanConstruct>(
                            |bean: Arc<Self>| -> Arc<dyn BeanConstruct> { bean },
                        ),
                        Interface::new::<Self, dyn PreInitialize>(
                            |bean: Arc<Self>| -> Arc<dyn PreInitialize> { bean },
                        ),
                        Interface::new::<Self, dyn AfterPropertiesSet>(
                            |bean: Arc<Self>| -> Arc<dyn AfterPropertiesSet> { bean },
                        ),
                        Interface::new::<Self, dyn Initialized>(
                            |bean: Arc<Self>| -> Arc<dyn Initialized> { bean },
                        ),
                    ]
                }
            }
        };
    }

    #[derive(Default)]
    struct Repository {
        config: Inject<Config>,
    }

    record_hooks!(Repository, "repository");

    impl Component for Repository {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![InjectionPoint::concrete::<Config>(
                "config",
                None,
                Visibility::Public,
            )]
        }

        fn inject(&self, field: &str, dependency: &BeanRef) -> Result<(), InjectError> {
            match field {
                "config" => self.config.fill(dependency),
                _ => Err(InjectError::UnknownField {
                    field: field.to_owned(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct Service {
        repository: Inject<Repository>,
        greeter: Inject<dyn Greeter>,
    }

    record_hooks!(Service, "service");

    impl Component for Service {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![
                InjectionPoint::concrete::<Repository>("repository", None, Visibility::Public),
                InjectionPoint::interface::<dyn Greeter>(
                    "greeter",
                    Some("english"),
                    Visibility::Public,
                ),
            ]
        }

        fn inject(&self, field: &str, dependency: &BeanRef) -> Result<(), InjectError> {
            match field {
                "repository" => self.repository.fill(dependency),
                "greeter" => self.greeter.fill(dependency),
                _ => Err(InjectError::UnknownField {
                    field: field.to_owned(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct Hidden {
        config: Inject<Config>,
    }

    impl Bean for Hidden {}

    impl Component for Hidden {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![InjectionPoint::concrete::<Config>(
                "config",
                None,
                Visibility::Restricted,
            )]
        }

        fn inject(&self, field: &str, dependency: &BeanRef) -> Result<(), InjectError> {
            match field {
                "config" => self.config.fill(dependency),
                _ => Err(InjectError::UnknownField {
                    field: field.to_owned(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct Faulty;

    impl Bean for Faulty {
        fn interfaces() -> Vec<Interface> {
            vec![Interface::new::<Self, dyn AfterPropertiesSet>(
                |bean: Arc<Self>| -> Arc<dyn AfterPropertiesSet> { bean },
            )]
        }
    }

    impl AfterPropertiesSet for Faulty {
        fn after_properties_set(&self) -> HookResult {
            Err("faulty bean refuses to start".into())
        }
    }

    impl Component for Faulty {}

    #[derive(Default)]
    struct Leaf;

    impl Bean for Leaf {}

    impl Component for Leaf {}

    #[derive(Default)]
    struct Middle {
        leaf: Inject<Leaf>,
    }

    impl Bean for Middle {}

    impl Component for Middle {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![InjectionPoint::concrete::<Leaf>("leaf", None, Visibility::Public)]
        }

        fn inject(&self, field: &str, dependency: &BeanRef) -> Result<(), InjectError> {
            match field {
                "leaf" => self.leaf.fill(dependency),
                _ => Err(InjectError::UnknownField {
                    field: field.to_owned(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct Top {
        middle: Inject<Middle>,
    }

    impl Bean for Top {}

    impl Component for Top {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![InjectionPoint::concrete::<Middle>("middle", None, Visibility::Public)]
        }

        fn inject(&self, field: &str, dependency: &BeanRef) -> Result<(), InjectError> {
            match field {
                "middle" => self.middle.fill(dependency),
                _ => Err(InjectError::UnknownField {
                    field: field.to_owned(),
                }),
            }
        }
    }

    fn configured() -> Container {
        let mut container = Container::new();
        container
            .register(Arc::new(Config { prefix: "t_" }))
            .unwrap()
            .register_named("english", Arc::new(English))
            .unwrap();
        container
    }

    #[test]
    fn container_load_runs_hooks_in_phase_order() {
        take_events();
        let mut container = configured();
        container
            .provide::<Repository>()
            .unwrap()
            .provide::<Service>()
            .unwrap();
        container.load().unwrap();

        assert_eq!(
            take_events(),
            [
                "repository:construct",
                "service:construct",
                "repository:pre_initialize",
                "repository:after_properties_set",
                "service:pre_initialize",
                "service:after_properties_set",
                "repository:initialized",
                "service:initialized",
            ]
        );
    }

    #[test]
    fn container_load_wires_shared_instances_regardless_of_order() {
        let mut container = configured();
        container
            .provide::<Service>()
            .unwrap()
            .provide::<Repository>()
            .unwrap();
        container.load().unwrap();
        take_events();

        assert!(container.is_loaded());
        let service: Arc<Service> = container.get("service").unwrap();
        let repository: Arc<Repository> = container.get("repository").unwrap();
        let config: Arc<Config> = container.get("config").unwrap();

        assert!(Arc::ptr_eq(service.repository.get().unwrap(), &repository));
        assert!(Arc::ptr_eq(repository.config.get().unwrap(), &config));
        assert_eq!(repository.config.prefix, "t_");
        assert_eq!(service.greeter.greet(), "hello");
        assert_eq!(
            container.bean_names(),
            ["config", "english", "repository", "service"]
        );
    }

    #[test]
    fn container_load_wires_chain_of_provided_beans() {
        let mut container = Container::new();
        container
            .provide::<Top>()
            .unwrap()
            .provide::<Middle>()
            .unwrap()
            .provide::<Leaf>()
            .unwrap();
        container.load().unwrap();

        let top: Arc<Top> = container.get("top").unwrap();
        let middle: Arc<Middle> = container.get("middle").unwrap();
        let leaf: Arc<Leaf> = container.get("leaf").unwrap();

        assert!(Arc::ptr_eq(top.middle.get().unwrap(), &middle));
        assert!(Arc::ptr_eq(middle.leaf.get().unwrap(), &leaf));
    }

    #[test]
    fn container_lookup_views_bean_through_interface() {
        let mut container = configured();
        container.load().unwrap();

        let greeter = container.get::<dyn Greeter>("english").unwrap();
        assert_eq!(greeter.greet(), "hello");
        assert!(container.get::<Config>("english").is_none());
        assert!(container.get::<dyn Greeter>("missing").is_none());
    }

    #[test]
    fn container_registered_bean_is_visible_before_load() {
        let mut container = configured();
        container.provide::<Repository>().unwrap();

        assert!(container.contains("config"));
        assert!(!container.contains("repository"));
        assert!(container.definition("repository").is_some());
        assert!(!container.is_loaded());
    }

    #[test]
    fn container_registered_bean_is_never_wired_or_notified() {
        take_events();
        let mut container = Container::new();
        container
            .register(Arc::new(Repository::default()))
            .unwrap();
        container.load().unwrap();

        let repository: Arc<Repository> = container.get("repository").unwrap();
        assert!(!repository.config.is_injected());
        assert!(take_events().is_empty());
    }

    #[test]
    fn container_register_fails_when_name_is_taken() {
        let mut container = configured();
        container.provide::<Repository>().unwrap();

        let err = container
            .register_named("config", Arc::new(English))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateInstance { ref name, .. } if name == "config"));

        let err = container
            .register(Arc::new(Repository::default()))
            .unwrap_err();
        assert!(
            matches!(err, RegistryError::DuplicateDefinition { ref name, .. } if name == "repository")
        );
    }

    #[test]
    fn container_provide_fails_when_name_is_taken() {
        let mut container = configured();
        container.provide::<Repository>().unwrap();

        let err = container.provide::<Repository>().unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateDefinition { .. }));

        let err = container.provide_named::<Repository>("english").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateInstance { .. }));
        assert!(container.definition("english").is_none());
    }

    #[test]
    fn container_configuration_fails_after_load() {
        let mut container = configured();
        container.load().unwrap();

        assert!(matches!(
            container.register_named("late", Arc::new(English)),
            Err(RegistryError::AlreadyLoaded)
        ));
        assert!(matches!(
            container.provide::<Repository>(),
            Err(RegistryError::AlreadyLoaded)
        ));
        assert!(matches!(container.load(), Err(LoadError::AlreadyLoaded)));
        assert!(container.is_loaded());
    }

    #[test]
    fn container_load_fails_when_dependency_is_missing() {
        take_events();
        let mut container = Container::new();
        container.provide::<Repository>().unwrap();

        let err = container.load().unwrap_err();
        take_events();
        assert!(matches!(
            err,
            LoadError::DependencyNotFound { ref dependency, ref name, field: "config", .. }
                if dependency == "config" && name == "repository"
        ));

        assert!(!container.is_loaded());
        assert!(container.get_bean("repository").is_none());
        assert!(container.bean_names().is_empty());
        assert!(matches!(container.load(), Err(LoadError::AlreadyLoaded)));
        assert!(matches!(
            container.provide::<Service>(),
            Err(RegistryError::AlreadyLoaded)
        ));
    }

    #[test]
    fn container_load_fails_when_concrete_type_mismatches() {
        take_events();
        let mut container = Container::new();
        container
            .register_named("config", Arc::new(English))
            .unwrap()
            .provide::<Repository>()
            .unwrap();

        let err = container.load().unwrap_err();
        take_events();
        assert!(matches!(
            err,
            LoadError::TypeMismatch { kind: crate::component::DependencyKind::Concrete, field: "config", .. }
        ));
    }

    #[test]
    fn container_load_fails_when_interface_is_not_implemented() {
        take_events();
        let mut container = Container::new();
        container
            .register(Arc::new(Config { prefix: "" }))
            .unwrap()
            .register_named("english", Arc::new(Config { prefix: "" }))
            .unwrap()
            .provide::<Repository>()
            .unwrap()
            .provide::<Service>()
            .unwrap();

        let err = container.load().unwrap_err();
        take_events();
        assert!(matches!(
            err,
            LoadError::TypeMismatch { kind: crate::component::DependencyKind::Interface, field: "greeter", .. }
        ));
    }

    #[test]
    fn container_load_respects_field_visibility() {
        let mut container = configured();
        container.provide::<Hidden>().unwrap();
        let err = container.load().unwrap_err();
        assert!(matches!(err, LoadError::FieldNotSettable { field: "config", .. }));

        let mut container = configured();
        container
            .override_visibility(true)
            .provide::<Hidden>()
            .unwrap();
        container.load().unwrap();
        let hidden: Arc<Hidden> = container.get("hidden").unwrap();
        assert_eq!(hidden.config.prefix, "t_");
    }

    #[test]
    fn container_load_fails_when_hook_fails() {
        let mut container = Container::new();
        container.provide::<Faulty>().unwrap();

        let err = container.load().unwrap_err();
        assert!(matches!(
            err,
            LoadError::Lifecycle { hook: Hook::AfterPropertiesSet, ref name, .. } if name == "faulty"
        ));
        assert!(container.get_bean("faulty").is_none());
    }

    struct Settings {
        fail: bool,
    }

    impl Module for Settings {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail {
                return Err("settings are unavailable".into());
            }
            configurer.register(Arc::new(Config { prefix: "m_" }))?;
            Ok(())
        }
    }

    #[test]
    fn container_install_succeeds() {
        let mut container = Container::new();
        container.install(Settings { fail: false }).unwrap();
        container.load().unwrap();
        assert_eq!(container.get::<Config>("config").unwrap().prefix, "m_");
    }

    #[test]
    fn container_install_fails_when_module_fails() {
        let mut container = Container::new();
        let err = container.install(Settings { fail: true }).unwrap_err();
        assert!(matches!(err, RegistryError::Module { module, .. } if module.ends_with("Settings")));
    }

    #[test]
    fn container_property_returns_value_store() {
        let mut store = MockValueStore::new();
        store
            .expect_get()
            .withf(|key| key == "db.prefix")
            .times(1)
            .returning(|_| Some(Value::from("t_")));

        let mut container = Container::new();
        container.use_value_store(Arc::new(store));
        assert_eq!(
            container.property().get("db.prefix"),
            Some(Value::from("t_"))
        );
    }

    #[test]
    fn container_lookup_succeeds_across_threads() {
        let mut container = configured();
        container
            .provide::<Repository>()
            .unwrap()
            .provide::<Service>()
            .unwrap();
        container.load().unwrap();
        take_events();

        let expected: Arc<Service> = container.get("service").unwrap();
        let container = &container;
        thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || container.get::<Service>("service").unwrap()))
                .collect();
            for handle in handles {
                assert!(Arc::ptr_eq(&handle.join().unwrap(), &expected));
            }
        });
    }
}
