pub mod config;
pub mod error;
pub mod links;
pub mod postprocess;
pub mod templates;
pub mod text;

pub use config::Config;
pub use error::ConfigError;
