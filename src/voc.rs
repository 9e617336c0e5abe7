//! Pascal VOC XML reader and writer.
//!
//! One XML document describes one image. The reader pulls fields out by name
//! and ignores the root tag entirely, so documents produced by different
//! exporters (which disagree on the root element) all parse the same way.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use roxmltree::Node;

use crate::error::ConvertError;
use crate::model::{AnnotationSet, BoundingBox, BoxId, BoxRecord};

/// Read a VOC XML annotation file into an [`AnnotationSet`].
pub fn parse_voc(path: &Path) -> Result<AnnotationSet, ConvertError> {
    let xml = fs::read_to_string(path).map_err(ConvertError::Io)?;
    parse_voc_str(&xml, path)
}

/// Parse VOC XML from a UTF-8 string.
///
/// `path` is only used for error reporting. This helper is also useful for
/// testing/fuzzing parse behavior in-memory.
pub fn parse_voc_str(xml: &str, path: &Path) -> Result<AnnotationSet, ConvertError> {
    let document = roxmltree::Document::parse(xml).map_err(|source| ConvertError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    // The root tag name is caller-chosen and irrelevant; children are read by name.
    let root = document.root_element();

    let folder = required_child_text(root, "folder", path, "the document root")?;
    let filename = required_child_text(root, "filename", path, "the document root")?;
    let image_path = required_child_text(root, "path", path, "the document root")?;

    let source = required_child_element(root, "source", path, "the document root")?;
    let source_database = required_child_text(source, "database", path, "<source>")?;

    let size = required_child_element(root, "size", path, "the document root")?;
    let width = parse_required_u32(size, "width", path, "<size>")?;
    let height = parse_required_u32(size, "height", path, "<size>")?;
    let depth = parse_required_u32(size, "depth", path, "<size>")?;

    let segmented = parse_required_i32(root, "segmented", path, "the document root")?;

    let mut boxes = Vec::new();
    let mut sequence: u32 = 0;

    for object in root
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        // An object without a bndbox (or with a bndbox lacking <xmax>) is
        // dropped silently and does not consume a sequence number.
        let Some(bndbox) = child_element(object, "bndbox") else {
            continue;
        };
        if child_element(bndbox, "xmax").is_none() {
            continue;
        }
        sequence += 1;

        let xmax = parse_required_i64(bndbox, "xmax", path, "<bndbox>")?;
        let ymax = parse_required_i64(bndbox, "ymax", path, "<bndbox>")?;
        let ymin = parse_required_i64(bndbox, "ymin", path, "<bndbox>")?;
        let xmin = parse_required_i64(bndbox, "xmin", path, "<bndbox>")?;

        let class_name = required_child_text(object, "name", path, "<object>")?;
        let pose = required_child_text(object, "pose", path, "<object>")?;
        let truncated = parse_required_i32(object, "truncated", path, "<object>")?;
        let difficult = parse_required_i32(object, "difficult", path, "<object>")?;

        // <conf> is optional and forgiving: an absent or unparsable value
        // falls back to 0.0 rather than failing the file.
        let confidence = child_text(object, "conf")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        boxes.push(BoxRecord {
            id: BoxId::Sequence(sequence),
            class_name,
            pose,
            truncated,
            difficult,
            confidence,
            bounds: BoundingBox::new(xmin, ymin, xmax, ymax),
        });
    }

    Ok(AnnotationSet {
        folder,
        filename,
        path: image_path,
        source_database,
        width,
        height,
        depth,
        segmented,
        boxes,
    })
}

/// Parse VOC XML from bytes.
///
/// The input must be valid UTF-8.
pub fn parse_voc_slice(bytes: &[u8], path: &Path) -> Result<AnnotationSet, ConvertError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| ConvertError::XmlParse {
        path: path.to_path_buf(),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_voc_str(xml, path)
}

/// Fuzz-only entrypoint for VOC XML parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_voc(bytes: &[u8]) -> Result<(), ConvertError> {
    let _ = parse_voc_slice(bytes, Path::new("<fuzz>"))?;
    Ok(())
}

/// Write an [`AnnotationSet`] as a VOC XML annotation file.
pub fn write_voc(path: &Path, set: &AnnotationSet) -> Result<(), ConvertError> {
    fs::write(path, to_voc_xml_string(set)).map_err(ConvertError::Io)
}

/// Serialize an [`AnnotationSet`] to a VOC XML string.
///
/// Output is deterministic, has no XML declaration and no namespace prefix.
/// The derived centers are emitted inside `<bndbox>` as `<centerX>` and
/// `<centerY>` so downstream consumers do not have to recompute them.
pub fn to_voc_xml_string(set: &AnnotationSet) -> String {
    let mut xml = String::new();

    writeln!(xml, "<annotation>").expect("write to string");
    writeln!(xml, "  <folder>{}</folder>", xml_escape(&set.folder)).expect("write to string");
    writeln!(xml, "  <filename>{}</filename>", xml_escape(&set.filename))
        .expect("write to string");
    writeln!(xml, "  <path>{}</path>", xml_escape(&set.path)).expect("write to string");
    writeln!(xml, "  <source>").expect("write to string");
    writeln!(
        xml,
        "    <database>{}</database>",
        xml_escape(&set.source_database)
    )
    .expect("write to string");
    writeln!(xml, "  </source>").expect("write to string");
    writeln!(xml, "  <size>").expect("write to string");
    writeln!(xml, "    <width>{}</width>", set.width).expect("write to string");
    writeln!(xml, "    <height>{}</height>", set.height).expect("write to string");
    writeln!(xml, "    <depth>{}</depth>", set.depth).expect("write to string");
    writeln!(xml, "  </size>").expect("write to string");
    writeln!(xml, "  <segmented>{}</segmented>", set.segmented).expect("write to string");

    for record in &set.boxes {
        writeln!(xml, "  <object>").expect("write to string");
        writeln!(xml, "    <id>{}</id>", record.id.value()).expect("write to string");
        writeln!(xml, "    <name>{}</name>", xml_escape(&record.class_name))
            .expect("write to string");
        writeln!(xml, "    <pose>{}</pose>", xml_escape(&record.pose)).expect("write to string");
        writeln!(xml, "    <truncated>{}</truncated>", record.truncated)
            .expect("write to string");
        writeln!(xml, "    <difficult>{}</difficult>", record.difficult)
            .expect("write to string");
        writeln!(xml, "    <conf>{}</conf>", record.confidence).expect("write to string");
        writeln!(xml, "    <bndbox>").expect("write to string");
        writeln!(xml, "      <xmin>{}</xmin>", record.bounds.xmin).expect("write to string");
        writeln!(xml, "      <ymin>{}</ymin>", record.bounds.ymin).expect("write to string");
        writeln!(xml, "      <xmax>{}</xmax>", record.bounds.xmax).expect("write to string");
        writeln!(xml, "      <ymax>{}</ymax>", record.bounds.ymax).expect("write to string");
        writeln!(xml, "      <centerX>{}</centerX>", record.bounds.center_x())
            .expect("write to string");
        writeln!(xml, "      <centerY>{}</centerY>", record.bounds.center_y())
            .expect("write to string");
        writeln!(xml, "    </bndbox>").expect("write to string");
        writeln!(xml, "  </object>").expect("write to string");
    }

    writeln!(xml, "</annotation>").expect("write to string");
    xml
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

// An empty element counts as present with empty text; only a missing element
// is a MissingField.
fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag).map(|child| child.text().unwrap_or("").trim().to_owned())
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, ConvertError> {
    child_element(node, tag).ok_or_else(|| missing_field(path, tag, context))
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, ConvertError> {
    child_text(node, tag).ok_or_else(|| missing_field(path, tag, context))
}

fn parse_required_u32(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<u32, ConvertError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<u32>().map_err(|_| ConvertError::XmlParse {
        path: path.to_path_buf(),
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected u32"),
    })
}

fn parse_required_i32(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<i32, ConvertError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<i32>().map_err(|_| ConvertError::XmlParse {
        path: path.to_path_buf(),
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected i32"),
    })
}

fn parse_required_i64(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<i64, ConvertError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<i64>().map_err(|_| ConvertError::XmlParse {
        path: path.to_path_buf(),
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected integer"),
    })
}

fn missing_field(path: &Path, field: &str, context: &str) -> ConvertError {
    ConvertError::MissingField {
        path: path.to_path_buf(),
        field: field.to_string(),
        context: context.to_string(),
    }
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
