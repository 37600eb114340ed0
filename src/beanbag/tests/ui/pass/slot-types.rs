use beanbag::prelude::*;

pub trait Store: Send + Sync {}

#[derive(Bean)]
#[bean(implements(dyn Store))]
pub struct Memory;

impl Store for Memory {}

pub type SharedStore = dyn Store;

#[derive(Default, Component)]
pub struct Test1 {
    #[inject]
    pub memory: Inject<Memory>,
    #[inject("memory")]
    pub store: Inject<dyn Store>,
    #[inject]
    pub r#ref: Inject<self::Memory>,
    #[inject("memory")]
    pub shared: Inject<SharedStore>,
    pub untouched: u32,
}

#[derive(Default, Component)]
pub struct Test2;

#[derive(Default, Component)]
pub struct Test3 {}

#[derive(Default, Component)]
pub struct Test4(u8);

#[derive(Default, Component)]
pub struct Test5 {
    #[inject]
    pub invalid: Option<Memory>,
}

fn main() {}
