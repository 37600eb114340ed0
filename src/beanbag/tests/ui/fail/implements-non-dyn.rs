use beanbag::prelude::*;

pub trait Store: Send + Sync {}

#[derive(Bean)]
#[bean(implements(Store))]
pub struct Memory;

fn main() {}
