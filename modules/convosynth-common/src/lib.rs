pub mod types;
pub mod config;
pub mod error;

pub use types::*;
pub use config::GeneratorConfig;
pub use error::ConvoSynthError;
