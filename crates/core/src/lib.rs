//! Core domain types, outline parsing, prompt text and configuration
//! for generating a presentation from a model-written outline.

pub mod config;
pub mod error;
pub mod outline;
pub mod prompt;
pub mod types;

pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use outline::{parse_outline, ParseError, ParseErrorKind};
pub use types::{Outline, SlideSpec};
