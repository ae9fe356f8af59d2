//! Domain types for representing a generated presentation outline.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// A presentation outline as produced by the model.
///
/// The first entry is the title spec; every following entry describes one
/// content slide. An outline always holds at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct Outline {
    entries: Vec<SlideSpec>,
}

impl Outline {
    /// Build an outline from already split entries. `None` when empty.
    pub(crate) fn from_specs(entries: Vec<SlideSpec>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// The presentation title (first string of the title spec).
    pub fn title(&self) -> &str {
        &self.entries[0].title
    }

    /// The title spec itself. Strings after its first are never written.
    pub fn title_spec(&self) -> &SlideSpec {
        &self.entries[0]
    }

    /// Content slide specs, in order, excluding the title spec.
    pub fn content(&self) -> &[SlideSpec] {
        &self.entries[1..]
    }

    /// All entries including the title spec.
    pub fn entries(&self) -> &[SlideSpec] {
        &self.entries
    }

    /// Number of entries including the title spec.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<Vec<String>>> for Outline {
    type Error = Error;

    fn try_from(raw: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        if raw.is_empty() {
            return Err(Error::InvalidOutline(
                "outline must contain a title entry".to_string(),
            ));
        }

        let entries = raw
            .into_iter()
            .enumerate()
            .map(|(idx, strings)| {
                SlideSpec::from_strings(strings).ok_or_else(|| {
                    Error::InvalidOutline(format!("entry {} has no strings", idx))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }
}

impl From<Outline> for Vec<Vec<String>> {
    fn from(outline: Outline) -> Self {
        outline
            .entries
            .into_iter()
            .map(SlideSpec::into_strings)
            .collect()
    }
}

/// One outline entry: a slide title followed by its bullet texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSpec {
    /// First string of the entry.
    pub title: String,

    /// Remaining strings, one bullet each. Nominally five, never clamped.
    pub bullets: Vec<String>,
}

impl SlideSpec {
    /// Create a slide spec from a title and bullets.
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
        }
    }

    /// Split a raw entry into title and bullets. `None` for an empty entry.
    pub fn from_strings(strings: Vec<String>) -> Option<Self> {
        let mut iter = strings.into_iter();
        let title = iter.next()?;
        Some(Self {
            title,
            bullets: iter.collect(),
        })
    }

    /// Flatten back into the raw entry form.
    pub fn into_strings(self) -> Vec<String> {
        let mut strings = Vec::with_capacity(self.bullets.len() + 1);
        strings.push(self.title);
        strings.extend(self.bullets);
        strings
    }
}
