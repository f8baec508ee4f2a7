//! Geometry model: canvas items, their invariants, and the normalization that
//! turns loosely-shaped persisted records into well-formed items.
//!
//! Every other module reads items through the types defined here, so a record
//! with a missing, non-numeric, or negative field never reaches the viewport
//! or the renderer as `NaN` or a sub-minimum size. The size floor is enforced
//! by [`CanvasItem`]'s mutators, not only at construction.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::consts::{DEFAULT_ITEM_SIZE, DEFAULT_Z_INDEX, MIN_ITEM_SIZE};

/// Unique identifier for a canvas item.
pub type ItemId = Uuid;

/// A point or a delta in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether `pt` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Minimal axis-aligned rectangle containing every item's frame, or `None`
/// for an empty set. Rotation is presentational and does not widen the box.
#[must_use]
pub fn bounding_box<'a, I>(items: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a CanvasItem>,
{
    items
        .into_iter()
        .map(CanvasItem::frame)
        .reduce(|acc, frame| acc.union(&frame))
}

// =============================================================
// Item kind
// =============================================================

/// The content type of an item.
///
/// The six known tags form a closed set that the renderer matches
/// exhaustively. Anything else a producer writes is carried through in
/// [`ItemKind::Unknown`] so it can be drawn as a placeholder and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Image,
    Video,
    Audio,
    Pdf,
    Text,
    Link,
    Unknown(String),
}

impl ItemKind {
    /// Parse a type tag. Matching ignores case and surrounding whitespace.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "pdf" => Self::Pdf,
            "text" => Self::Text,
            "link" => Self::Link,
            _ => Self::Unknown(tag.to_owned()),
        }
    }

    /// The canonical tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Link => "link",
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<String> for ItemKind {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        kind.as_str().to_owned()
    }
}

// =============================================================
// Text presentation
// =============================================================

/// Horizontal alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Presentation fields used by `text` items. Other kinds carry the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub color: String,
    pub font_family: String,
    /// Font size in canvas units.
    pub font_size: f64,
    pub font_weight: u16,
    pub text_align: TextAlign,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_owned(),
            font_family: "sans-serif".to_owned(),
            font_size: 16.0,
            font_weight: 400,
            text_align: TextAlign::Left,
            line_height: 1.5,
        }
    }
}

// =============================================================
// Geometry
// =============================================================

/// Position, size, and layering of an item in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees; presentational only.
    pub rotation: f64,
    pub z_index: i64,
    /// Canonical unit 0.0–1.0.
    pub opacity: f64,
}

/// Geometry given to an item that is missing any of these fields.
#[must_use]
pub fn default_geometry() -> Geometry {
    Geometry {
        x: 0.0,
        y: 0.0,
        width: DEFAULT_ITEM_SIZE,
        height: DEFAULT_ITEM_SIZE,
        rotation: 0.0,
        z_index: DEFAULT_Z_INDEX,
        opacity: 1.0,
    }
}

/// Enforce the minimum size on both dimensions. Non-finite values collapse to
/// the minimum.
#[must_use]
pub fn clamp_size(width: f64, height: f64) -> (f64, f64) {
    (floor_dimension(width), floor_dimension(height))
}

fn floor_dimension(v: f64) -> f64 {
    if v.is_finite() { v.max(MIN_ITEM_SIZE) } else { MIN_ITEM_SIZE }
}

/// Convert an opacity expressed as a 0–100 percentage to the canonical
/// 0.0–1.0 unit. Callers holding percentage values convert at the boundary.
#[must_use]
pub fn opacity_from_percent(percent: f64) -> f64 {
    clamp_opacity(percent / 100.0)
}

fn clamp_opacity(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 }
}

// =============================================================
// Canvas item
// =============================================================

/// One placed element on a board.
///
/// Geometry is private so that every write goes through a mutator that keeps
/// the size floor and the opacity range intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawItem")]
pub struct CanvasItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(flatten)]
    geometry: Geometry,
    pub background_color: String,
    pub border_radius: f64,
    /// URL for media, PDF, and link items; the raw body for text items.
    pub content: String,
    /// Display title passed to media delegates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Background layers are drawn like any other item but ignored by auto-fit.
    pub is_background: bool,
    #[serde(flatten)]
    pub text: TextStyle,
}

impl CanvasItem {
    /// Create an item with default geometry and presentation.
    #[must_use]
    pub fn new(id: ItemId, kind: ItemKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            geometry: default_geometry(),
            background_color: "transparent".to_owned(),
            border_radius: 0.0,
            content: content.into(),
            title: None,
            is_background: false,
            text: TextStyle::default(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.set_position(x, y);
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.set_size(width, height);
        self
    }

    #[must_use]
    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.geometry.z_index = z_index;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.set_opacity(opacity);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_text_style(mut self, text: TextStyle) -> Self {
        self.text = text;
        self
    }

    #[must_use]
    pub fn as_background(mut self) -> Self {
        self.is_background = true;
        self
    }

    // --- Reads ---

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.geometry.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.geometry.y
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.geometry.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.geometry.height
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.geometry.rotation
    }

    #[must_use]
    pub fn z_index(&self) -> i64 {
        self.geometry.z_index
    }

    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.geometry.opacity
    }

    /// The item's bounding rectangle in canvas space.
    #[must_use]
    pub fn frame(&self) -> Rect {
        Rect::new(self.geometry.x, self.geometry.y, self.geometry.width, self.geometry.height)
    }

    // --- Writes ---

    /// Move the top-left corner. Non-finite coordinates are ignored.
    pub fn set_position(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.geometry.x = x;
            self.geometry.y = y;
        }
    }

    /// Resize, clamping both dimensions to the minimum size.
    pub fn set_size(&mut self, width: f64, height: f64) {
        let (width, height) = clamp_size(width, height);
        self.geometry.width = width;
        self.geometry.height = height;
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        if degrees.is_finite() {
            self.geometry.rotation = degrees;
        }
    }

    pub fn set_z_index(&mut self, z_index: i64) {
        self.geometry.z_index = z_index;
    }

    /// Set opacity in the canonical 0.0–1.0 unit, clamped.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.geometry.opacity = clamp_opacity(opacity);
    }
}

// =============================================================
// Normalization
// =============================================================

/// The persisted shape of an item as different producers write it.
///
/// Every field except `id` is optional, numbers may arrive as numeric strings,
/// and a few producers use snake_case or short keys.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: ItemId,
    #[serde(default, rename = "type", alias = "kind")]
    kind: Option<String>,
    #[serde(default)]
    x: Value,
    #[serde(default)]
    y: Value,
    #[serde(default, alias = "w")]
    width: Value,
    #[serde(default, alias = "h")]
    height: Value,
    #[serde(default)]
    rotation: Value,
    #[serde(default, alias = "z_index")]
    z_index: Value,
    #[serde(default)]
    opacity: Value,
    #[serde(default, alias = "background_color")]
    background_color: Option<String>,
    #[serde(default, alias = "border_radius")]
    border_radius: Value,
    #[serde(default, alias = "url")]
    content: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "is_background")]
    is_background: Option<bool>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default, alias = "font_family")]
    font_family: Option<String>,
    #[serde(default, alias = "font_size")]
    font_size: Value,
    #[serde(default, alias = "font_weight")]
    font_weight: Value,
    #[serde(default, alias = "text_align")]
    text_align: Option<String>,
    #[serde(default, alias = "line_height")]
    line_height: Value,
}

impl From<RawItem> for CanvasItem {
    fn from(raw: RawItem) -> Self {
        let defaults = default_geometry();
        let mut repaired = false;

        let mut field = |value: &Value, default: f64, accept: fn(f64) -> bool| match finite_number(value) {
            Some(v) if accept(v) => v,
            found => {
                repaired |= found.is_some() || !value.is_null();
                default
            }
        };

        let x = field(&raw.x, defaults.x, |_| true);
        let y = field(&raw.y, defaults.y, |_| true);
        let width = field(&raw.width, defaults.width, |v| v > 0.0);
        let height = field(&raw.height, defaults.height, |v| v > 0.0);
        let rotation = field(&raw.rotation, defaults.rotation, |_| true);
        let opacity = field(&raw.opacity, defaults.opacity, |_| true);
        let border_radius = field(&raw.border_radius, 0.0, |v| v >= 0.0);

        let text_defaults = TextStyle::default();
        let font_size = field(&raw.font_size, text_defaults.font_size, |v| v > 0.0);
        let line_height = field(&raw.line_height, text_defaults.line_height, |v| v > 0.0);

        #[allow(clippy::cast_possible_truncation)]
        let z_index = match &raw.z_index {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            other => finite_number(other).map(|f| f.round() as i64),
        }
        .unwrap_or(defaults.z_index);

        if repaired {
            tracing::debug!(id = %raw.id, "normalized malformed item fields to defaults");
        }

        let kind = raw.kind.map_or_else(|| ItemKind::Unknown(String::new()), ItemKind::from);

        let mut item = CanvasItem::new(raw.id, kind, raw.content.unwrap_or_default());
        item.set_position(x, y);
        item.set_size(width, height);
        item.set_rotation(rotation);
        item.set_z_index(z_index);
        item.set_opacity(opacity);
        item.border_radius = border_radius;
        if let Some(bg) = raw.background_color.filter(|s| !s.trim().is_empty()) {
            item.background_color = bg;
        }
        item.title = raw.title;
        item.is_background = raw.is_background.unwrap_or(false);
        item.text = TextStyle {
            color: raw.color.unwrap_or(text_defaults.color),
            font_family: raw.font_family.unwrap_or(text_defaults.font_family),
            font_size,
            font_weight: parse_font_weight(&raw.font_weight).unwrap_or(text_defaults.font_weight),
            text_align: raw
                .text_align
                .as_deref()
                .and_then(TextAlign::parse)
                .unwrap_or(text_defaults.text_align),
            line_height,
        };
        item
    }
}

/// Read a finite number from a JSON number or numeric string.
fn finite_number(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => return None,
        },
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn parse_font_weight(value: &Value) -> Option<u16> {
    if let Value::String(s) = value {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => return Some(400),
            "bold" => return Some(700),
            _ => {}
        }
    }
    let weight = finite_number(value)?;
    if !(1.0..=1000.0).contains(&weight) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let weight = weight.round() as u16;
    Some(weight)
}
