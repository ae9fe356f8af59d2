//! Placeholder text editing on slide XML.
//!
//! Slides are edited as event streams: every event of the original part is
//! copied to the output unchanged except inside the one `<p:sp>` that carries
//! the targeted `<p:ph>`. Placeholders are addressed by their `idx`
//! attribute; a `<p:ph>` without `idx` has index 0, which is how title
//! placeholders are written. The title is also matched by its `type`, since
//! orphaned titles carry an explicit non-zero `idx`.
//!
//! Text is written the way PowerPoint expects it: vertical tabs become
//! `<a:br/>` and other control characters are escaped as `_xHHHH_`.

use deck_core::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::Cursor;

/// Placeholder index of the slide title.
pub const TITLE_IDX: u32 = 0;

/// A paragraph of placeholder text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph text; `\n` marks a line break inside the paragraph.
    pub text: String,

    /// Indentation level (`lvl`), 0 when unset.
    pub level: u8,
}

impl Paragraph {
    /// Create a paragraph at the given level.
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

/// How a placeholder's text body changes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TextEdit<'a> {
    /// Drop every paragraph and write one paragraph per line of the text.
    Replace(&'a str),
    /// Keep existing paragraphs and add one at the end.
    Append(&'a Paragraph),
}

/// Human-readable name of a placeholder index, for errors.
pub(crate) fn describe(idx: u32) -> String {
    if idx == TITLE_IDX {
        "title".to_string()
    } else {
        format!("body (idx {})", idx)
    }
}

/// Whether a `<p:ph>` element addresses placeholder `idx`.
fn is_target(e: &BytesStart<'_>, idx: u32) -> bool {
    if idx == TITLE_IDX
        && matches!(attr_value(e, b"type").as_deref(), Some("title" | "ctrTitle"))
    {
        return true;
    }
    ph_idx(e) == idx
}

/// Find the 1-based ordinal of the first `<p:sp>` whose placeholder has `idx`.
fn find_placeholder(xml: &str, idx: u32) -> Result<Option<usize>> {
    let mut reader = Reader::from_str(xml);
    let mut ordinal = 0;
    let mut current: Option<usize> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if local_name(e.name().as_ref()) == b"sp" {
                    ordinal += 1;
                    current = Some(ordinal);
                } else if local_name(e.name().as_ref()) == b"ph" {
                    if let Some(found) = current.filter(|_| is_target(e, idx)) {
                        return Ok(Some(found));
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"ph" {
                    if let Some(found) = current.filter(|_| is_target(e, idx)) {
                        return Ok(Some(found));
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()) == b"sp" {
                    current = None;
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }
}

/// Apply `edit` to the placeholder with `idx`.
///
/// Returns `None` when the slide has no such placeholder.
pub(crate) fn edit_placeholder(xml: &str, idx: u32, edit: TextEdit<'_>) -> Result<Option<String>> {
    let Some(target) = find_placeholder(xml, idx)? else {
        return Ok(None);
    };

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len() + 256)));

    let replace = matches!(edit, TextEdit::Replace(_));
    let mut depth = 0usize;
    let mut ordinal = 0usize;
    let mut sp_level: Option<usize> = None;
    let mut body_level: Option<usize> = None;
    let mut skip_level: Option<usize> = None;
    let mut saw_body = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::XmlError(format!(
                "Error parsing slide at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                let level = depth;
                depth += 1;
                if skip_level.is_some() {
                    continue;
                }

                let qname = e.name();
                let name = local_name(qname.as_ref());
                if name == b"sp" {
                    ordinal += 1;
                    if ordinal == target {
                        sp_level = Some(level);
                    }
                } else if sp_level.is_some() && name == b"txBody" && body_level.is_none() {
                    body_level = Some(level);
                } else if replace && name == b"p" && body_level.map(|b| b + 1) == Some(level) {
                    skip_level = Some(level);
                    continue;
                } else if name == b"extLst"
                    && sp_level.map(|s| s + 1) == Some(level)
                    && !saw_body
                {
                    // txBody precedes extLst in the shape's content model.
                    write_text_body(&mut writer, edit)?;
                    saw_body = true;
                }
                emit(&mut writer, Event::Start(e.clone()))?;
            }
            Event::Empty(ref e) => {
                if skip_level.is_some() {
                    continue;
                }
                let qname = e.name();
                let name = local_name(qname.as_ref());
                if replace && name == b"p" && body_level.map(|b| b + 1) == Some(depth) {
                    continue;
                }
                if name == b"extLst" && sp_level.map(|s| s + 1) == Some(depth) && !saw_body {
                    write_text_body(&mut writer, edit)?;
                    saw_body = true;
                }
                emit(&mut writer, Event::Empty(e.clone()))?;
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if let Some(level) = skip_level {
                    if level == depth {
                        skip_level = None;
                    }
                    continue;
                }

                let qname = e.name();
                let name = local_name(qname.as_ref());
                if name == b"txBody" && body_level == Some(depth) {
                    write_edit(&mut writer, edit)?;
                    body_level = None;
                    saw_body = true;
                } else if name == b"sp" && sp_level == Some(depth) {
                    if !saw_body {
                        write_text_body(&mut writer, edit)?;
                    }
                    sp_level = None;
                }
                emit(&mut writer, Event::End(e.clone()))?;
            }
            Event::Eof => break,
            other => {
                if skip_level.is_none() {
                    emit(&mut writer, other)?;
                }
            }
        }
    }

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| Error::XmlError(format!("Slide XML is not UTF-8 after edit: {}", e)))
}

/// Read the paragraphs of the placeholder with `idx`.
///
/// Returns `None` when the slide has no such placeholder, and an empty list
/// when the placeholder has no text body.
pub(crate) fn read_placeholder(xml: &str, idx: u32) -> Result<Option<Vec<Paragraph>>> {
    let Some(target) = find_placeholder(xml, idx)? else {
        return Ok(None);
    };

    let mut reader = Reader::from_str(xml);
    let mut ordinal = 0;
    let mut in_target = false;
    let mut in_text_body = false;
    let mut in_text = false;
    let mut paragraphs = Vec::new();
    let mut current: Option<Paragraph> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" => {
                        ordinal += 1;
                        in_target = ordinal == target;
                    }
                    b"txBody" if in_target => in_text_body = true,
                    b"p" if in_text_body => current = Some(Paragraph::new("", 0)),
                    b"pPr" => {
                        if let Some(ref mut paragraph) = current {
                            paragraph.level = paragraph_level(e);
                        }
                    }
                    b"t" if current.is_some() => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"p" if in_text_body => paragraphs.push(Paragraph::new("", 0)),
                    b"pPr" => {
                        if let Some(ref mut paragraph) = current {
                            paragraph.level = paragraph_level(e);
                        }
                    }
                    b"br" => {
                        if let Some(ref mut paragraph) = current {
                            paragraph.text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(ref mut paragraph) = current {
                        let text = e.unescape().unwrap_or_default();
                        paragraph.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" if in_target => return Ok(Some(paragraphs)),
                    b"txBody" => in_text_body = false,
                    b"p" => {
                        if let Some(paragraph) = current.take() {
                            paragraphs.push(paragraph);
                        }
                    }
                    b"t" => in_text = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => return Ok(Some(paragraphs)),
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }
}

/// Write the paragraphs an edit adds at the end of an existing text body.
fn write_edit<W: std::io::Write>(writer: &mut Writer<W>, edit: TextEdit<'_>) -> Result<()> {
    match edit {
        TextEdit::Replace(text) => {
            for line in text.split('\n') {
                write_paragraph(writer, &Paragraph::new(line, 0))?;
            }
            Ok(())
        }
        TextEdit::Append(paragraph) => write_paragraph(writer, paragraph),
    }
}

/// Write a complete `<p:txBody>` for a shape that has none.
///
/// A fresh text body starts with one empty paragraph, so an append lands
/// after it.
fn write_text_body<W: std::io::Write>(writer: &mut Writer<W>, edit: TextEdit<'_>) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new("p:txBody")))?;
    emit(writer, Event::Empty(BytesStart::new("a:bodyPr")))?;
    emit(writer, Event::Empty(BytesStart::new("a:lstStyle")))?;
    if matches!(edit, TextEdit::Append(_)) {
        emit(writer, Event::Empty(BytesStart::new("a:p")))?;
    }
    write_edit(writer, edit)?;
    emit(writer, Event::End(BytesEnd::new("p:txBody")))
}

fn write_paragraph<W: std::io::Write>(writer: &mut Writer<W>, paragraph: &Paragraph) -> Result<()> {
    if paragraph.text.is_empty() && paragraph.level == 0 {
        return emit(writer, Event::Empty(BytesStart::new("a:p")));
    }

    emit(writer, Event::Start(BytesStart::new("a:p")))?;
    if paragraph.level > 0 {
        let level = paragraph.level.to_string();
        emit(
            writer,
            Event::Empty(BytesStart::new("a:pPr").with_attributes([("lvl", level.as_str())])),
        )?;
    }

    for (i, line) in paragraph.text.split(|c: char| c == '\n' || c == '\u{b}').enumerate() {
        if i > 0 {
            emit(writer, Event::Empty(BytesStart::new("a:br")))?;
        }
        if line.is_empty() {
            continue;
        }
        emit(writer, Event::Start(BytesStart::new("a:r")))?;
        emit(
            writer,
            Event::Empty(
                BytesStart::new("a:rPr").with_attributes([("lang", "en-US"), ("dirty", "0")]),
            ),
        )?;
        emit(writer, Event::Start(BytesStart::new("a:t")))?;
        emit(writer, Event::Text(BytesText::new(&escape_control_chars(line))))?;
        emit(writer, Event::End(BytesEnd::new("a:t")))?;
        emit(writer, Event::End(BytesEnd::new("a:r")))?;
    }

    emit(writer, Event::End(BytesEnd::new("a:p")))
}

/// Replace characters XML 1.0 cannot carry with `_xHHHH_` escapes.
fn escape_control_chars(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_control) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if is_control(c) {
            escaped.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}

fn is_control(c: char) -> bool {
    (c < '\u{20}' && c != '\t') || c == '\u{FFFE}' || c == '\u{FFFF}'
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write slide XML: {}", e)))
}

/// The `idx` of a `<p:ph>` element, 0 when absent.
fn ph_idx(e: &BytesStart<'_>) -> u32 {
    attr_value(e, b"idx")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// The `lvl` of an `<a:pPr>` element, 0 when absent.
fn paragraph_level(e: &BytesStart<'_>) -> u8 {
    attr_value(e, b"lvl")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
