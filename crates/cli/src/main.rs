//! CLI tool that asks a local model for a slide outline and writes it into
//! a PowerPoint template.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::config::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_CONTENT_SLIDES, DEFAULT_MODEL, DEFAULT_OUTPUT, DEFAULT_TEMPERATURE,
    DEFAULT_TEMPLATE,
};
use deck_core::{parse_outline, GeneratorConfig};
use deck_ollama::{GenerateRequest, OllamaClient};
use deck_pptx::{OutlineWriter, Presentation};
use std::io::Write;
use std::path::PathBuf;

/// Generate a presentation from a model-written outline.
#[derive(Parser, Debug)]
#[command(name = "deck-gen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model server generate endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Model identifier
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Read the instruction from a file instead of using the built-in one
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Presentation template (.pptx)
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Output file, overwritten if it exists
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Maximum number of content slides after the title slide
    #[arg(long, default_value_t = DEFAULT_MAX_CONTENT_SLIDES)]
    max_slides: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Build the run configuration these arguments describe.
    fn to_config(&self) -> Result<GeneratorConfig> {
        let mut config = GeneratorConfig::new()
            .with_endpoint(self.endpoint.as_str())
            .with_model(self.model.as_str())
            .with_temperature(self.temperature)
            .with_template(&self.template)
            .with_output(&self.output)
            .with_max_content_slides(self.max_slides);

        if let Some(path) = &self.prompt_file {
            let prompt = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
            config = config.with_prompt(prompt);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = args.to_config()?;
    let mut stdout = std::io::stdout();
    run(&config, &mut stdout)
}

/// Request an outline, write it into the template and save the result.
///
/// Model output is echoed to `console` as it streams in.
fn run<W: Write>(config: &GeneratorConfig, console: &mut W) -> Result<()> {
    let request = GenerateRequest::from_config(config);
    writeln!(console, "Generating PowerPoint blueprint w/ {}", config.model)?;

    let client = OllamaClient::new(config.endpoint.as_str())?;
    let reply = client
        .generate(&request, console)
        .with_context(|| format!("Generation request to {} failed", client.endpoint()))?;
    writeln!(console, "\n\nDone generating. Now compiling to Presentation")?;

    let outline = parse_outline(&reply).context("Model output is not a valid outline")?;
    log::debug!(
        "Outline \"{}\" with {} content entries",
        outline.title(),
        outline.content().len()
    );

    let mut presentation = Presentation::open(&config.template)
        .with_context(|| format!("Failed to open template {}", config.template.display()))?;
    let summary = OutlineWriter::from_config(config)
        .apply(&outline, &mut presentation)
        .with_context(|| {
            format!(
                "Template {} does not fit the outline",
                config.template.display()
            )
        })?;

    presentation
        .save(&config.output)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    writeln!(
        console,
        "Saved presentation to {} ({} content slides, {} bullets)",
        config.output.display(),
        summary.content_slides,
        summary.bullets
    )?;

    Ok(())
}
