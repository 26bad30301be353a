pub mod config;
pub mod error;
pub mod gcp;
pub mod http;
pub mod pipeline;
pub mod types;

pub use error::{Error, Result};
