use beanbag::prelude::*;

#[derive(Bean)]
pub struct Db;

#[derive(Default, Component)]
pub struct Test(#[inject] pub Inject<Db>);

fn main() {}
