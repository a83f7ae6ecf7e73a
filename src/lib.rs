pub mod config;
pub mod error;
pub mod tags;

pub use error::{Error, Result};
