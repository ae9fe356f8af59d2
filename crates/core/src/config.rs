//! Run configuration.
//!
//! Every field defaults to the value the tool has always used, so a default
//! config reproduces a plain run with no options.

use crate::prompt::{render_parameter, DEFAULT_INSTRUCTION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Local model server generate endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// Model identifier sent with the request.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Low temperature for near-deterministic output.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Template the slides are written into.
pub const DEFAULT_TEMPLATE: &str = "TemplatePro.pptx";

/// Output file, overwritten on every run.
pub const DEFAULT_OUTPUT: &str = "test.pptx";

/// Content slides written after the title slide.
pub const DEFAULT_MAX_CONTENT_SLIDES: usize = 20;

/// Placeholder `idx` of the body text frame on content slides.
pub const DEFAULT_BODY_PLACEHOLDER: u32 = 1;

/// Everything one generation run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model server generate endpoint.
    pub endpoint: String,

    /// Model identifier.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Instruction text sent as the prompt.
    pub prompt: String,

    /// Presentation template to copy from.
    pub template: PathBuf,

    /// Where the filled presentation is written.
    pub output: PathBuf,

    /// Maximum number of content slides after the title slide.
    pub max_content_slides: usize,

    /// Placeholder `idx` receiving bullets.
    pub body_placeholder: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            prompt: DEFAULT_INSTRUCTION.to_string(),
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            max_content_slides: DEFAULT_MAX_CONTENT_SLIDES,
            body_placeholder: DEFAULT_BODY_PLACEHOLDER,
        }
    }
}

impl GeneratorConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the content slide limit.
    pub fn with_max_content_slides(mut self, max: usize) -> Self {
        self.max_content_slides = max;
        self
    }

    pub fn with_body_placeholder(mut self, idx: u32) -> Self {
        self.body_placeholder = idx;
        self
    }

    /// The `parameter` field value for the generate request.
    pub fn parameter(&self) -> String {
        render_parameter(self.temperature)
    }
}
