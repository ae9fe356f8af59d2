//! Writes an outline into a template presentation.

use crate::package::Presentation;
use crate::placeholder::Paragraph;
use deck_core::config::{DEFAULT_BODY_PLACEHOLDER, DEFAULT_MAX_CONTENT_SLIDES};
use deck_core::{GeneratorConfig, Outline, Result};

/// Indentation level given to every bullet.
pub const BULLET_LEVEL: u8 = 1;

/// What [`OutlineWriter::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Content slides filled (the title slide is not counted).
    pub content_slides: usize,

    /// Bullet paragraphs added across all content slides.
    pub bullets: usize,

    /// Content entries dropped because they exceeded the slide limit.
    pub dropped: usize,
}

/// Fills slide 0 with the outline title and slides 1.. with content entries.
#[derive(Debug, Clone)]
pub struct OutlineWriter {
    max_content_slides: usize,
    body_placeholder: u32,
}

impl Default for OutlineWriter {
    fn default() -> Self {
        Self {
            max_content_slides: DEFAULT_MAX_CONTENT_SLIDES,
            body_placeholder: DEFAULT_BODY_PLACEHOLDER,
        }
    }
}

impl OutlineWriter {
    /// Create a writer with the default limit of 20 content slides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer using the limits from a run configuration.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            max_content_slides: config.max_content_slides,
            body_placeholder: config.body_placeholder,
        }
    }

    /// Set the maximum number of content slides written.
    pub fn with_max_content_slides(mut self, max: usize) -> Self {
        self.max_content_slides = max;
        self
    }

    /// Set the placeholder `idx` bullets are appended to.
    pub fn with_body_placeholder(mut self, idx: u32) -> Self {
        self.body_placeholder = idx;
        self
    }

    /// Write `outline` into `presentation`.
    ///
    /// Content entry `n` (1-based) goes to slide `n`. Entries beyond the
    /// limit are skipped without error. Any missing slide or placeholder
    /// aborts the write; the presentation may then be partially edited.
    pub fn apply(&self, outline: &Outline, presentation: &mut Presentation) -> Result<WriteSummary> {
        presentation.set_title(0, outline.title())?;
        log::debug!("Slide 0 title: {:?}", outline.title());

        let mut summary = WriteSummary {
            content_slides: 0,
            bullets: 0,
            dropped: 0,
        };

        for (offset, spec) in outline.content().iter().enumerate() {
            let index = offset + 1;
            if index > self.max_content_slides {
                summary.dropped = outline.content().len() - offset;
                log::info!(
                    "Outline has {} content entries; dropping the last {} (limit {})",
                    outline.content().len(),
                    summary.dropped,
                    self.max_content_slides
                );
                break;
            }

            presentation.set_title(index, &spec.title)?;
            for bullet in &spec.bullets {
                presentation.add_paragraph(
                    index,
                    self.body_placeholder,
                    &Paragraph::new(bullet.as_str(), BULLET_LEVEL),
                )?;
            }
            log::debug!(
                "Slide {} title: {:?} ({} bullets)",
                index,
                spec.title,
                spec.bullets.len()
            );

            summary.content_slides += 1;
            summary.bullets += spec.bullets.len();
        }

        Ok(summary)
    }
}
