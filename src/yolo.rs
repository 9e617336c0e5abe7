//! YOLO TXT label reader and writer.
//!
//! One TXT file describes one image: one line per box, class index first,
//! then normalized center/size coordinates and an optional confidence. The
//! file carries no absolute geometry, so callers must supply the image
//! dimensions when reading and a name-to-index vocabulary when writing.
//!
//! A malformed line fails the whole file with zero records. The older
//! alternative (keep whatever parsed before the bad line and stay silent)
//! hid truncated files from callers, so it is not offered.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::ConvertError;
use crate::model::{AnnotationSet, BoundingBox, BoxId, BoxRecord};

/// Options for [`write_yolo`] / [`to_yolo_string`].
#[derive(Clone, Copy, Debug, Default)]
pub struct YoloWriteOptions {
    /// Emit the center as the average of the integer-derived center and the
    /// minimum corner instead of the true box midpoint.
    ///
    /// Some existing exporters compute `cx = (center_x + xmin) / (2 * width)`,
    /// which shifts wide boxes toward their minimum corner by up to a quarter
    /// of their width on re-read. Enable this only when byte compatibility
    /// with such files matters more than geometric fidelity.
    pub compat_center: bool,
}

/// Read a YOLO TXT label file into an [`AnnotationSet`].
///
/// `labels` maps class index to class name; `width`/`height`/`depth` describe
/// the image the labels belong to and cannot be inferred from the file.
pub fn parse_yolo(
    path: &Path,
    labels: &[String],
    width: u32,
    height: u32,
    depth: u32,
) -> Result<AnnotationSet, ConvertError> {
    let content = fs::read_to_string(path).map_err(ConvertError::Io)?;
    parse_yolo_str(&content, path, labels, width, height, depth)
}

/// Parse YOLO TXT content from a UTF-8 string.
///
/// `path` seeds the folder/filename metadata of the resulting set and is used
/// for error reporting.
pub fn parse_yolo_str(
    content: &str,
    path: &Path,
    labels: &[String],
    width: u32,
    height: u32,
    depth: u32,
) -> Result<AnnotationSet, ConvertError> {
    let folder = path
        .parent()
        .map(|parent| parent.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut set = AnnotationSet::new(folder, filename, width, height, depth);

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let Some(row) = parse_label_line(line, path, line_num)? else {
            continue;
        };

        let class_name = labels.get(row.class_id as usize).cloned().ok_or_else(|| {
            ConvertError::UnknownClassId {
                path: path.to_path_buf(),
                line: line_num,
                class_id: row.class_id,
                class_count: labels.len(),
            }
        })?;

        let center_x = (row.cx * width as f64).round() as i64;
        let center_y = (row.cy * height as f64).round() as i64;
        // Rounded pixel extent, then truncating division; the reconstructed
        // corners are symmetric around the rounded center.
        let half_w = ((row.w * width as f64).round() as i64) / 2;
        let half_h = ((row.h * height as f64).round() as i64) / 2;

        let bounds = BoundingBox::new(
            center_x - half_w,
            center_y - half_h,
            center_x + half_w,
            center_y + half_h,
        );

        let mut record = BoxRecord::new(BoxId::Class(row.class_id), class_name, bounds);
        record.confidence = row.conf;
        set.boxes.push(record);
    }

    Ok(set)
}

/// Write an [`AnnotationSet`] as a YOLO TXT label file.
pub fn write_yolo(
    path: &Path,
    set: &AnnotationSet,
    labels: &BTreeMap<String, u32>,
    options: &YoloWriteOptions,
) -> Result<(), ConvertError> {
    fs::write(path, to_yolo_string(set, labels, options)?).map_err(ConvertError::Io)
}

/// Serialize an [`AnnotationSet`] to YOLO TXT content.
///
/// `labels` maps class name to class index (the inverse of the array the
/// reader takes); a name absent from the map is fatal. One line per box, in
/// box order: `classId cx cy w h conf`, each line newline-terminated.
pub fn to_yolo_string(
    set: &AnnotationSet,
    labels: &BTreeMap<String, u32>,
    options: &YoloWriteOptions,
) -> Result<String, ConvertError> {
    let image_width = set.width as f64;
    let image_height = set.height as f64;

    let mut out = String::new();
    for record in &set.boxes {
        let class_id =
            labels
                .get(&record.class_name)
                .copied()
                .ok_or_else(|| ConvertError::UnknownClassName {
                    name: record.class_name.clone(),
                })?;

        let bounds = &record.bounds;
        let (cx, cy) = if options.compat_center {
            (
                (bounds.center_x() + bounds.xmin) as f64 / (2.0 * image_width),
                (bounds.center_y() + bounds.ymin) as f64 / (2.0 * image_height),
            )
        } else {
            (
                (bounds.xmin + bounds.xmax) as f64 / (2.0 * image_width),
                (bounds.ymin + bounds.ymax) as f64 / (2.0 * image_height),
            )
        };
        let w = bounds.width() as f64 / image_width;
        let h = bounds.height() as f64 / image_height;

        writeln!(
            out,
            "{} {:.6} {:.6} {:.6} {:.6} {}",
            class_id, cx, cy, w, h, record.confidence
        )
        .expect("write to string");
    }

    Ok(out)
}

#[derive(Debug, PartialEq)]
struct YoloLabelRow {
    class_id: u32,
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
    conf: f64,
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<YoloLabelRow>, ConvertError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 7 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(7).collect();

    if tokens.len() < 5 {
        return Err(ConvertError::MalformedLine {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected 5 or 6 tokens, found {}", tokens.len()),
        });
    }

    if tokens.len() > 6 {
        return Err(ConvertError::MalformedLine {
            path: file_path.to_path_buf(),
            line: line_num,
            message: "segmentation/pose annotations not supported; only detection boxes are handled"
                .to_string(),
        });
    }

    let class_id = tokens[0]
        .parse::<u32>()
        .map_err(|_| ConvertError::MalformedLine {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class id '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    // Confidence is optional and forgiving: absent or unparsable means 0.0.
    let conf = tokens
        .get(5)
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(Some(YoloLabelRow {
        class_id,
        cx,
        cy,
        w,
        h,
        conf,
    }))
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), ConvertError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, ConvertError> {
    raw.parse::<f64>().map_err(|_| ConvertError::MalformedLine {
        path: file_path.to_path_buf(),
        line: line_num,
        message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
    })
}
