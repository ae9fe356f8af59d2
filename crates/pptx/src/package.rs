//! PPTX package loading, slide access and saving.

use crate::placeholder::{self, Paragraph, TextEdit, TITLE_IDX};
use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// One file inside the package.
#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// A presentation loaded from a template, edited in memory and saved once.
///
/// Slides are addressed by position: index 0 is the first slide in the
/// presentation's slide list.
#[derive(Debug, Clone)]
pub struct Presentation {
    parts: Vec<Part>,
    slides: Vec<String>,
}

impl Presentation {
    /// Open a template file. The file itself is never written to.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening template {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", file.name(), e)))?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
            });
        }

        let mut presentation = Self {
            parts,
            slides: Vec::new(),
        };
        presentation.slides = presentation.resolve_slide_order()?;
        log::debug!("Template has {} slides", presentation.slides.len());

        Ok(presentation)
    }

    /// Number of slides in the presentation.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Part name of the slide at `index`, e.g. `ppt/slides/slide1.xml`.
    pub fn slide_part_name(&self, index: usize) -> Result<&str> {
        self.slides
            .get(index)
            .map(String::as_str)
            .ok_or(Error::SlideOutOfRange {
                index,
                count: self.slides.len(),
            })
    }

    /// Replace the text of the slide's title placeholder.
    pub fn set_title(&mut self, index: usize, text: &str) -> Result<()> {
        self.set_placeholder_text(index, TITLE_IDX, text)
    }

    /// Replace all text of the placeholder with `idx` on slide `index`.
    pub fn set_placeholder_text(&mut self, index: usize, idx: u32, text: &str) -> Result<()> {
        self.edit_slide(index, idx, TextEdit::Replace(text))
    }

    /// Append a paragraph to the placeholder with `idx` on slide `index`.
    pub fn add_paragraph(&mut self, index: usize, idx: u32, paragraph: &Paragraph) -> Result<()> {
        self.edit_slide(index, idx, TextEdit::Append(paragraph))
    }

    /// Text of the slide's title placeholder, `None` when it has none.
    pub fn slide_title(&self, index: usize) -> Result<Option<String>> {
        let xml = self.slide_xml(index)?;
        Ok(placeholder::read_placeholder(&xml, TITLE_IDX)?.map(|paragraphs| {
            paragraphs
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("\n")
        }))
    }

    /// Paragraphs of the placeholder with `idx` on slide `index`.
    pub fn placeholder_paragraphs(&self, index: usize, idx: u32) -> Result<Vec<Paragraph>> {
        let xml = self.slide_xml(index)?;
        placeholder::read_placeholder(&xml, idx)?.ok_or_else(|| Error::MissingPlaceholder {
            slide: index,
            placeholder: placeholder::describe(idx),
        })
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut file = self.write_to(file)?;
        file.flush()?;
        log::debug!("Saved {} parts to {}", self.parts.len(), path.display());
        Ok(())
    }

    /// Write the package as a ZIP archive into `writer`.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            if part.is_dir {
                zip.add_directory(part.name.as_str(), options)
                    .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", part.name, e)))?;
                continue;
            }
            zip.start_file(part.name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", part.name, e)))?;
            zip.write_all(&part.data)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))
    }

    fn edit_slide(&mut self, index: usize, idx: u32, edit: TextEdit<'_>) -> Result<()> {
        let part_name = self.slide_part_name(index)?.to_string();
        let xml = self.part_text(&part_name)?;

        let edited = placeholder::edit_placeholder(&xml, idx, edit)?.ok_or_else(|| {
            Error::MissingPlaceholder {
                slide: index,
                placeholder: placeholder::describe(idx),
            }
        })?;
        log::debug!("Edited placeholder {} on slide {} ({})", idx, index, part_name);

        self.set_part_data(&part_name, edited.into_bytes())
    }

    fn slide_xml(&self, index: usize) -> Result<String> {
        let part_name = self.slide_part_name(index)?;
        self.part_text(part_name)
    }

    fn part_text(&self, name: &str) -> Result<String> {
        let part = self
            .parts
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ZipError(format!("File not found in archive '{}'", name)))?;

        String::from_utf8(part.data.clone())
            .map_err(|e| Error::XmlError(format!("'{}' is not UTF-8: {}", name, e)))
    }

    fn set_part_data(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ZipError(format!("File not found in archive '{}'", name)))?;
        part.data = data;
        Ok(())
    }

    /// Slide part names in presentation order.
    ///
    /// The order comes from `<p:sldIdLst>` in `presentation.xml`, resolved
    /// through its relationships. Packages without a slide list fall back to
    /// the numeric order of the slide relationships.
    fn resolve_slide_order(&self) -> Result<Vec<String>> {
        let relationships = self.presentation_relationships()?;
        let slide_ids = self.slide_id_list()?;

        if slide_ids.is_empty() {
            let mut slides: Vec<(String, Option<usize>)> = relationships
                .values()
                .filter(|rel| is_slide_relationship(&rel.rel_type))
                .map(|rel| (rel.part_name.clone(), extract_slide_number(&rel.part_name)))
                .collect();

            slides.sort_by(|a, b| match (a.1, b.1) {
                (Some(na), Some(nb)) => na.cmp(&nb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            });
            return Ok(slides.into_iter().map(|(path, _)| path).collect());
        }

        slide_ids
            .iter()
            .map(|id| {
                relationships
                    .get(id)
                    .filter(|rel| is_slide_relationship(&rel.rel_type))
                    .map(|rel| rel.part_name.clone())
                    .ok_or_else(|| {
                        Error::XmlError(format!("Slide relationship '{}' not found", id))
                    })
            })
            .collect()
    }

    /// Relationship ids listed in `<p:sldIdLst>`, in order.
    fn slide_id_list(&self) -> Result<Vec<String>> {
        let content = self.part_text(PRESENTATION_PART)?;
        let mut reader = Reader::from_str(&content);
        let mut ids = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if placeholder::local_name(e.name().as_ref()) == b"sldId" =>
                {
                    // The relationship reference is the namespaced `r:id`,
                    // not the plain numeric `id`.
                    let rel_id = e.attributes().flatten().find_map(|attr| {
                        let key = attr.key.as_ref();
                        (key.contains(&b':') && placeholder::local_name(key) == b"id")
                            .then(|| String::from_utf8_lossy(&attr.value).to_string())
                    });
                    if let Some(rel_id) = rel_id {
                        ids.push(rel_id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing presentation: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(ids)
    }

    /// Relationships of `presentation.xml`, keyed by id.
    fn presentation_relationships(&self) -> Result<HashMap<String, Relationship>> {
        let content = self.part_text(PRESENTATION_RELS_PART)?;
        let mut relationships = HashMap::new();

        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Type" => {
                                rel_type = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            b"Target" => {
                                target = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            b"Id" => {
                                id = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            _ => {}
                        }
                    }

                    let part_name = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    relationships.insert(
                        id,
                        Relationship {
                            rel_type,
                            part_name,
                        },
                    );
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(relationships)
    }
}

#[derive(Debug)]
struct Relationship {
    rel_type: String,
    part_name: String,
}

fn is_slide_relationship(rel_type: &str) -> bool {
    rel_type.ends_with("/slide")
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
