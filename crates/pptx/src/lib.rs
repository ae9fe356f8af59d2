//! PPTX (Office Open XML) template filling.
//!
//! Opens a .pptx template (a ZIP archive of XML parts), writes outline text
//! into slide placeholders and saves the result as a new file.

pub mod package;
pub mod placeholder;
pub mod writer;

#[cfg(test)]
mod fixture;

pub use package::Presentation;
pub use placeholder::{Paragraph, TITLE_IDX};
pub use writer::{OutlineWriter, WriteSummary, BULLET_LEVEL};
