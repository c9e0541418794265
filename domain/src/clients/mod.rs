mod employee;

pub use employee::*;
