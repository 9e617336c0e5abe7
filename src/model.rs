//! Annotation model: the pivot representation both converters read and write.
//!
//! One [`AnnotationSet`] describes a single image: its metadata plus an
//! ordered list of labeled boxes. Readers fully populate a set, writers only
//! consume it; nothing mutates a set after the handoff.
//!
//! # Design principles
//!
//! 1. **Permissive geometry**: boxes are stored exactly as parsed. A box with
//!    `xmin > xmax` is representable; callers that care can check
//!    [`BoundingBox::is_ordered`].
//!
//! 2. **Derived centers**: the center is computed from the corners on demand,
//!    never stored, so the derivation identity always holds.
//!
//! 3. **Explicit id semantics**: the XML reader numbers boxes sequentially
//!    while the TXT reader reuses the class index. [`BoxId`] keeps the two
//!    apart instead of overloading one integer field.

use serde::{Deserialize, Serialize};

/// The annotation set for one image.
///
/// Box order mirrors document/line order in the source file and is preserved
/// by every writer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    /// Folder the image lives in (VOC `<folder>`).
    pub folder: String,

    /// Image file name (VOC `<filename>`).
    pub filename: String,

    /// Full image path (VOC `<path>`); empty when parsed from YOLO TXT.
    pub path: String,

    /// Originating database tag (VOC `<source><database>`).
    pub source_database: String,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Channel count (VOC `<depth>`).
    pub depth: u32,

    /// VOC `<segmented>` flag, carried verbatim.
    pub segmented: i32,

    /// Labeled boxes in source order.
    pub boxes: Vec<BoxRecord>,
}

impl AnnotationSet {
    /// Creates an empty set with the given image metadata.
    pub fn new(
        folder: impl Into<String>,
        filename: impl Into<String>,
        width: u32,
        height: u32,
        depth: u32,
    ) -> Self {
        Self {
            folder: folder.into(),
            filename: filename.into(),
            path: String::new(),
            source_database: String::new(),
            width,
            height,
            depth,
            segmented: 0,
            boxes: Vec::new(),
        }
    }
}

/// Identifier attached to a box record.
///
/// The two parse paths number boxes differently, and both conventions are
/// kept by the matching writer, so the variant records where the number came
/// from rather than collapsing both into one ambiguous integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxId {
    /// 1-based position among the kept `<object>` blocks of an XML document.
    Sequence(u32),

    /// Class index from a YOLO TXT line.
    Class(u32),
}

impl BoxId {
    /// The raw number, regardless of which convention produced it.
    #[inline]
    pub fn value(&self) -> u32 {
        match self {
            BoxId::Sequence(n) | BoxId::Class(n) => *n,
        }
    }
}

impl Default for BoxId {
    fn default() -> Self {
        BoxId::Sequence(0)
    }
}

/// One labeled box.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    /// See [`BoxId`] for the two numbering conventions.
    pub id: BoxId,

    /// Class label (VOC `<name>`).
    pub class_name: String,

    /// VOC `<pose>`; empty when the source format has no equivalent.
    pub pose: String,

    /// VOC `<truncated>` flag (0 when absent from the source).
    pub truncated: i32,

    /// VOC `<difficult>` flag (0 when absent from the source).
    pub difficult: i32,

    /// Detection confidence in `[0, 1]`; 0.0 when the source omits it or the
    /// value does not parse.
    pub confidence: f64,

    /// Box geometry in absolute pixels.
    pub bounds: BoundingBox,
}

impl BoxRecord {
    /// Creates a record with default pose/flags/confidence.
    pub fn new(id: BoxId, class_name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            pose: String::new(),
            truncated: 0,
            difficult: 0,
            confidence: 0.0,
            bounds,
        }
    }
}

/// An axis-aligned box in absolute pixel coordinates.
///
/// The constructor does NOT enforce `min <= max`; malformed boxes found in
/// input files pass through unchanged so that lenient pipelines keep working.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl BoundingBox {
    /// Creates a box from its corner coordinates.
    #[inline]
    pub fn new(xmin: i64, ymin: i64, xmax: i64, ymax: i64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Horizontal center, `xmin + (xmax - xmin) / 2` with integer division.
    #[inline]
    pub fn center_x(&self) -> i64 {
        self.xmin + (self.xmax - self.xmin) / 2
    }

    /// Vertical center, `ymin + (ymax - ymin) / 2` with integer division.
    #[inline]
    pub fn center_y(&self) -> i64 {
        self.ymin + (self.ymax - self.ymin) / 2
    }

    /// Box width; negative when the box is malformed (`xmax < xmin`).
    #[inline]
    pub fn width(&self) -> i64 {
        self.xmax - self.xmin
    }

    /// Box height; negative when the box is malformed (`ymax < ymin`).
    #[inline]
    pub fn height(&self) -> i64 {
        self.ymax - self.ymin
    }

    /// Returns true if the corners are properly ordered on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }
}
