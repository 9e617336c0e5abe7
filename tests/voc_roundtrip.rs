//! Integration tests for Pascal VOC format support.

use std::fs;
use std::path::Path;

use vocyolo::model::{BoundingBox, BoxId};
use vocyolo::voc::{parse_voc, write_voc};
use vocyolo::ConvertError;

const SAMPLE: &str = r#"<annotation>
  <folder>JPEGImages</folder>
  <filename>img1.jpg</filename>
  <path>/data/JPEGImages/img1.jpg</path>
  <source>
    <database>Unknown</database>
  </source>
  <size>
    <width>640</width>
    <height>480</height>
    <depth>3</depth>
  </size>
  <segmented>0</segmented>
  <object>
    <name>cat</name>
    <pose>Unspecified</pose>
    <truncated>1</truncated>
    <difficult>0</difficult>
    <conf>0.875</conf>
    <bndbox>
      <xmin>10</xmin>
      <ymin>20</ymin>
      <xmax>30</xmax>
      <ymax>40</ymax>
    </bndbox>
  </object>
  <object>
    <name>dog</name>
    <pose>Left</pose>
    <truncated>0</truncated>
    <difficult>1</difficult>
    <bndbox>
      <xmin>100</xmin>
      <ymin>120</ymin>
      <xmax>300</xmax>
      <ymax>400</ymax>
    </bndbox>
  </object>
</annotation>"#;

fn write_sample(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("img1.xml");
    fs::write(&path, SAMPLE).expect("write sample xml");
    path
}

#[test]
fn parse_voc_file_reads_all_boxes_in_document_order() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = write_sample(temp.path());

    let set = parse_voc(&input).expect("parse voc file");

    assert_eq!(set.filename, "img1.jpg");
    assert_eq!(set.boxes.len(), 2);
    assert_eq!(set.boxes[0].class_name, "cat");
    assert_eq!(set.boxes[0].id, BoxId::Sequence(1));
    assert_eq!(set.boxes[1].class_name, "dog");
    assert_eq!(set.boxes[1].id, BoxId::Sequence(2));
    assert_eq!(set.boxes[1].confidence, 0.0);
    assert_eq!(set.boxes[1].bounds, BoundingBox::new(100, 120, 300, 400));
}

#[test]
fn voc_write_then_read_roundtrip_is_exact() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = write_sample(temp.path());
    let output = temp.path().join("rewritten.xml");

    let set = parse_voc(&input).expect("parse voc file");
    write_voc(&output, &set).expect("write voc file");
    let restored = parse_voc(&output).expect("reparse voc file");

    assert_eq!(set, restored);
}

#[test]
fn voc_roundtrip_of_empty_object_list_succeeds() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("empty.xml");
    let stripped: String = SAMPLE
        .lines()
        .take_while(|line| !line.trim_start().starts_with("<object>"))
        .chain(std::iter::once("</annotation>"))
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&input, stripped).expect("write xml");

    let set = parse_voc(&input).expect("parse voc file");
    assert!(set.boxes.is_empty());

    let output = temp.path().join("empty_out.xml");
    write_voc(&output, &set).expect("write voc file");
    let restored = parse_voc(&output).expect("reparse voc file");
    assert_eq!(set, restored);
}

#[test]
fn missing_input_file_surfaces_io_error() {
    let err = parse_voc(Path::new("no_such_file.xml")).unwrap_err();
    assert!(matches!(err, ConvertError::Io(_)));
}

#[test]
fn missing_required_metadata_field_is_missing_field() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("broken.xml");
    fs::write(
        &input,
        SAMPLE.replace("  <path>/data/JPEGImages/img1.jpg</path>\n", ""),
    )
    .expect("write xml");

    let err = parse_voc(&input).unwrap_err();
    assert!(matches!(err, ConvertError::MissingField { field, .. } if field == "path"));
}

#[test]
fn centers_satisfy_derivation_identity_after_parse() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = write_sample(temp.path());

    let set = parse_voc(&input).expect("parse voc file");
    for record in &set.boxes {
        let bounds = &record.bounds;
        assert_eq!(
            bounds.center_x(),
            bounds.xmin + (bounds.xmax - bounds.xmin) / 2
        );
        assert_eq!(
            bounds.center_y(),
            bounds.ymin + (bounds.ymax - bounds.ymin) / 2
        );
    }
}
