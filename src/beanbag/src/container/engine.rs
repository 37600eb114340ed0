use std::error::Error;

use snafu::prelude::*;
use tracing::{debug, trace};

use crate::bean::BeanRef;
use crate::component::{DependencyKind, FieldSpec, InjectError, Visibility};
use crate::container::pool::InstancePools;
use crate::container::registry::{Definition, DefinitionRegistry};
use crate::lifecycle::{
    AfterPropertiesSet, BeanConstruct, Hook, HookResult, Initialized, PreInitialize,
};

/// Runs the load protocol over a registry and the instance pools.
///
/// Loading happens in three phases, each visiting definitions in provision
/// order:
///
/// 1. every definition is allocated into the prototype pool, then each
///    prototype receives [`BeanConstruct`];
/// 2. one prototype after another receives [`PreInitialize`], gets its fields
///    injected, receives [`AfterPropertiesSet`] and is promoted to the bean
///    pool;
/// 3. every bean receives [`Initialized`].
///
/// The first error aborts the whole protocol.
pub(crate) struct Engine<'a> {
    registry: &'a DefinitionRegistry,
    pools: &'a mut InstancePools,
    override_visibility: bool,
}

impl<'a> Engine<'a> {
    pub fn new(
        registry: &'a DefinitionRegistry,
        pools: &'a mut InstancePools,
        override_visibility: bool,
    ) -> Self {
        Self {
            registry,
            pools,
            override_visibility,
        }
    }

    pub fn run(mut self) -> Result<(), LoadError> {
        self.construct()?;
        self.inject()?;
        self.notify()
    }

    fn construct(&mut self) -> Result<(), LoadError> {
        let registry = self.registry;

        for definition in registry.iter() {
            let bean = definition.prototype().dyn_construct();
            trace!(bean = definition.name(), "allocated prototype");
            self.pools
                .insert_prototype(definition.name().to_owned(), bean);
        }

        for definition in registry.iter() {
            let bean = self.prototype_of(definition);
            run_hook::<dyn BeanConstruct>(definition, &bean, Hook::BeanConstruct, |target| {
                target.bean_construct()
            })?;
        }
        Ok(())
    }

    fn inject(&mut self) -> Result<(), LoadError> {
        let registry = self.registry;

        for definition in registry.iter() {
            let bean = self.prototype_of(definition);
            run_hook::<dyn PreInitialize>(definition, &bean, Hook::PreInitialize, |target| {
                target.pre_initialize()
            })?;

            for field in definition.fields() {
                self.inject_field(definition, &bean, field)?;
            }

            run_hook::<dyn AfterPropertiesSet>(
                definition,
                &bean,
                Hook::AfterPropertiesSet,
                |target| target.after_properties_set(),
            )?;

            self.pools.promote(definition.name());
            debug!(bean = definition.name(), "promoted wired bean");
        }
        Ok(())
    }

    fn notify(&mut self) -> Result<(), LoadError> {
        for definition in self.registry.iter() {
            let Some(bean) = self.pools.lookup(definition.name()) else {
                unreachable!("every definition should be promoted before notification")
            };
            run_hook::<dyn Initialized>(definition, bean, Hook::Initialized, |target| {
                target.initialized()
            })?;
        }
        Ok(())
    }

    fn prototype_of(&self, definition: &Definition) -> BeanRef {
        match self.pools.prototype(definition.name()) {
            Some(bean) => bean.clone(),
            None => unreachable!("every definition should be allocated before wiring"),
        }
    }

    fn inject_field(
        &self,
        definition: &Definition,
        bean: &BeanRef,
        field: &FieldSpec,
    ) -> Result<(), LoadError> {
        let Some((dependency, source)) = self.pools.resolve(field.dependency()) else {
            return Err(LoadError::DependencyNotFound {
                dependency: field.dependency().to_owned(),
                name: definition.name().to_owned(),
                type_name: definition.descriptor().type_name(),
                field: field.field(),
            });
        };
        trace!(
            bean = definition.name(),
            field = field.field(),
            dependency = field.dependency(),
            %source,
            "resolved dependency"
        );

        check_type(definition, field, dependency)?;

        if field.visibility() == Visibility::Restricted && !self.override_visibility {
            return Err(LoadError::FieldNotSettable {
                name: definition.name().to_owned(),
                type_name: definition.descriptor().type_name(),
                field: field.field(),
            });
        }

        definition
            .prototype()
            .dyn_inject(bean, field.field(), dependency)
            .context(InjectionSnafu {
                name: definition.name(),
                type_name: definition.descriptor().type_name(),
                field: field.field(),
            })
    }
}

fn check_type(
    definition: &Definition,
    field: &FieldSpec,
    dependency: &BeanRef,
) -> Result<(), LoadError> {
    let declared = field.declared();
    let actual = dependency.descriptor();
    let compatible = match field.kind() {
        DependencyKind::Concrete => actual.is(declared.type_id()),
        DependencyKind::Interface => actual.implements(declared.type_id()),
    };

    ensure!(
        compatible,
        TypeMismatchSnafu {
            dependency: field.dependency(),
            actual: actual.type_name(),
            name: definition.name(),
            type_name: definition.descriptor().type_name(),
            field: field.field(),
            expected: declared.type_name(),
            kind: field.kind(),
        }
    );
    Ok(())
}

fn run_hook<H>(
    definition: &Definition,
    bean: &BeanRef,
    hook: Hook,
    call: impl FnOnce(&H) -> HookResult,
) -> Result<(), LoadError>
where
    H: ?Sized + 'static,
{
    if let Some(target) = bean.cast::<H>() {
        trace!(bean = definition.name(), %hook, "invoking lifecycle hook");
        call(&*target).context(LifecycleSnafu {
            name: definition.name(),
            type_name: definition.descriptor().type_name(),
            hook,
        })?;
    }
    Ok(())
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum LoadError {
    #[snafu(display("the container is already loaded"))]
    AlreadyLoaded,
    #[snafu(display(
        "could not find bean {dependency} for field {field} of bean {name} ({type_name})"
    ))]
    #[non_exhaustive]
    DependencyNotFound {
        dependency: String,
        name: String,
        type_name: &'static str,
        field: &'static str,
    },
    #[snafu(display(
        "bean {dependency} ({actual}) does not match the {kind} type {expected} of field {field} of bean {name} ({type_name})"
    ))]
    #[non_exhaustive]
    TypeMismatch {
        dependency: String,
        actual: &'static str,
        name: String,
        type_name: &'static str,
        field: &'static str,
        expected: &'static str,
        kind: DependencyKind,
    },
    #[snafu(display(
        "field {field} of bean {name} ({type_name}) is not public and visibility override is disabled"
    ))]
    #[non_exhaustive]
    FieldNotSettable {
        name: String,
        type_name: &'static str,
        field: &'static str,
    },
    #[snafu(display("could not inject field {field} of bean {name} ({type_name})"))]
    #[non_exhaustive]
    Injection {
        name: String,
        type_name: &'static str,
        field: &'static str,
        source: InjectError,
    },
    #[snafu(display("lifecycle hook {hook} of bean {name} ({type_name}) fails"))]
    #[non_exhaustive]
    Lifecycle {
        name: String,
        type_name: &'static str,
        hook: Hook,
        source: Box<dyn Error + Send + Sync>,
    },
}
