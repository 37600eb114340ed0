use std::marker::PhantomData;

use beanbag::prelude::*;

pub trait Codec: Send + Sync {}

#[derive(Bean)]
#[bean(implements(dyn Codec, dyn Initialized))]
pub struct Json<T: Send + Sync + 'static> {
    marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Codec for Json<T> {}

impl<T: Send + Sync + 'static> Initialized for Json<T> {
    fn initialized(&self) -> HookResult {
        Ok(())
    }
}

#[derive(Component)]
pub struct Endpoint<T>
where
    T: Send + Sync + 'static,
{
    #[inject("json")]
    pub codec: Inject<dyn Codec>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Default for Endpoint<T> {
    fn default() -> Self {
        Self {
            codec: Inject::new(),
            marker: PhantomData,
        }
    }
}

fn main() {
    let _ = <Endpoint<u8> as Component>::injection_points();
    let _ = <Json<u8> as Bean>::interfaces();
}
