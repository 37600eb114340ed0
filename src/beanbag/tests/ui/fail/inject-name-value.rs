use beanbag::prelude::*;

#[derive(Default, Component)]
pub struct Test {
    #[inject = "db"]
    pub db: Inject<Test>,
}

fn main() {}
