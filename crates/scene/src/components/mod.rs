pub mod layer;
pub mod material;
pub mod primitive;

pub use layer::*;
pub use material::*;
pub use primitive::*;
