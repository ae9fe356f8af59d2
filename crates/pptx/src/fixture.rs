//! Synthetic PPTX packages for tests.

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const SLIDE_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

const SLIDE_CLOSE: &str =
    r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#;

const TITLE_TEXT_BODY: &str = r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>Click to edit title</a:t></a:r></a:p></p:txBody>"#;

const BODY_TEXT_BODY: &str = r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p></p:txBody>"#;

fn shape(id: u32, name: &str, ph: &str, text_body: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr/>{text_body}</p:sp>"#
    )
}

/// Title slide: a centered title placeholder only.
pub fn title_slide_xml() -> String {
    format!(
        "{}{}{}",
        SLIDE_OPEN,
        shape(2, "Title 1", r#"<p:ph type="ctrTitle"/>"#, TITLE_TEXT_BODY),
        SLIDE_CLOSE
    )
}

/// Content slide: title placeholder plus a body placeholder at idx 1.
pub fn content_slide_xml() -> String {
    format!(
        "{}{}{}{}",
        SLIDE_OPEN,
        shape(2, "Title 1", r#"<p:ph type="title"/>"#, TITLE_TEXT_BODY),
        shape(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, BODY_TEXT_BODY),
        SLIDE_CLOSE
    )
}

/// Content slide whose placeholders inherit everything and carry no text body.
pub fn slide_xml_without_text_bodies() -> String {
    format!(
        "{}{}{}{}",
        SLIDE_OPEN,
        shape(2, "Title 1", r#"<p:ph type="title"/>"#, ""),
        shape(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, ""),
        SLIDE_CLOSE
    )
}

/// Content slide whose title was orphaned from its layout and carries an
/// explicit `idx`, as PowerPoint writes it.
pub fn slide_xml_with_orphaned_title() -> String {
    format!(
        "{}{}{}{}",
        SLIDE_OPEN,
        shape(2, "Title 1", r#"<p:ph type="title" idx="4294967295"/>"#, TITLE_TEXT_BODY),
        shape(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, BODY_TEXT_BODY),
        SLIDE_CLOSE
    )
}

/// Content slide whose placeholders have no text body but end in `<p:extLst>`.
pub fn slide_xml_with_ext_lst() -> String {
    const EXT_LST: &str = r#"<p:extLst><p:ext uri="{C183D7F6-B498-43B3-948B-1728B52AA6E4}"><adec:decorative xmlns:adec="http://schemas.microsoft.com/office/drawing/2017/decorative" val="0"/></p:ext></p:extLst>"#;
    format!(
        "{}{}{}{}",
        SLIDE_OPEN,
        shape(2, "Title 1", r#"<p:ph type="title"/>"#, EXT_LST),
        shape(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, EXT_LST),
        SLIDE_CLOSE
    )
}

/// A template with one title slide followed by `slides - 1` content slides.
pub fn template_bytes(slides: usize) -> Vec<u8> {
    let parts: Vec<(String, String)> = (1..=slides)
        .map(|n| {
            let xml = if n == 1 {
                title_slide_xml()
            } else {
                content_slide_xml()
            };
            (format!("slides/slide{}.xml", n), xml)
        })
        .collect();
    let borrowed: Vec<(&str, String)> = parts
        .iter()
        .map(|(name, xml)| (name.as_str(), xml.clone()))
        .collect();
    package_bytes(&borrowed)
}

/// Build a package whose slide list holds `slides` in the given order.
///
/// Names are relative to `ppt/`. Relationships are written in reverse order
/// so the slide list, not the relationship order, decides slide positions.
pub fn package_bytes(slides: &[(&str, String)]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
    );
    let mut slide_list = String::new();
    let mut relationships = Vec::new();

    for (i, (name, _)) in slides.iter().enumerate() {
        let rel_id = format!("rId{}", i + 2);
        write!(
            content_types,
            r#"<Override PartName="/ppt/{}" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            name
        )
        .unwrap();
        write!(slide_list, r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rel_id).unwrap();
        relationships.push(format!(
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="{}"/>"#,
            rel_id, name
        ));
    }
    content_types.push_str("</Types>");
    relationships.push(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#
            .to_string(),
    );
    relationships.reverse();

    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        slide_list
    );
    let presentation_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        relationships.join("")
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(content_types.as_bytes()).unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#,
    )
    .unwrap();

    zip.start_file("ppt/presentation.xml", options).unwrap();
    zip.write_all(presentation.as_bytes()).unwrap();

    zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
    zip.write_all(presentation_rels.as_bytes()).unwrap();

    for (name, xml) in slides {
        zip.start_file(format!("ppt/{}", name), options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}
