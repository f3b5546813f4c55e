pub mod decoder;
pub mod error;
pub mod frames;
pub mod loader;

#[cfg(test)]
mod loader_test;

pub use decoder::*;
pub use error::*;
pub use frames::*;
pub use loader::*;
