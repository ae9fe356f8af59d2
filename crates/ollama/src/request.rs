//! Generate request payload.

use deck_core::prompt::{render_parameter, DEFAULT_INSTRUCTION};
use deck_core::GeneratorConfig;
use serde::{Deserialize, Serialize};

/// Body of a `POST /api/generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier.
    pub model: String,

    /// Sampling parameter line, e.g. `temperature 0.1`.
    pub parameter: String,

    /// Full instruction text.
    pub prompt: String,

    /// Ask the server to deliver the reply incrementally.
    pub stream: bool,
}

impl GenerateRequest {
    /// Create a streaming request for `model` with the given prompt.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parameter: render_parameter(deck_core::config::DEFAULT_TEMPERATURE),
            prompt: prompt.into(),
            stream: true,
        }
    }

    /// Build the request a run with `config` sends.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            model: config.model.clone(),
            parameter: config.parameter(),
            prompt: config.prompt.clone(),
            stream: true,
        }
    }
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self::new(deck_core::config::DEFAULT_MODEL, DEFAULT_INSTRUCTION)
    }
}
