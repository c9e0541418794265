pub mod primitives;
mod department;
mod employee;

pub use department::*;
pub use employee::*;
