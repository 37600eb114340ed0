pub mod pool;
pub mod prototype;
pub mod registry;

mod engine;
mod handle;

pub use engine::LoadError;
pub use handle::Container;
