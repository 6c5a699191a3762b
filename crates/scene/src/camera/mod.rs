pub mod controls;
pub mod framing;

pub use controls::*;
pub use framing::*;
