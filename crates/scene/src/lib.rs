pub mod camera;
pub mod components;
pub mod entity;
pub mod sink;
pub mod world;

pub use sink::*;
pub use world::*;
