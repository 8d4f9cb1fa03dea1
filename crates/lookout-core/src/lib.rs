pub mod config;
pub mod error;
pub mod stream;
pub mod tools;
pub mod types;

pub use config::DetectionConfig;
pub use error::{LookoutError, Result};
pub use types::*;
