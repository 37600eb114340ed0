use beanbag::prelude::*;

#[derive(Bean)]
pub struct Db;

#[derive(Default, Component)]
pub struct Test {
    #[inject]
    #[inject("db")]
    pub db: Inject<Db>,
}

fn main() {}
