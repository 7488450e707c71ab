pub mod config;
pub mod error;
pub mod media_ref;

#[cfg(test)]
mod config_test;

pub use config::*;
pub use error::*;
pub use media_ref::MediaRef;
