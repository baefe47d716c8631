//! Progress indicator geometry.
//!
//! Maps the fraction of time remaining onto stroke-dash parameters for a
//! ring or a square outline. The stroke is fully drawn at fraction 1 and
//! fully hidden at fraction 0; renderers only apply the numbers.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Default ring radius inside a 100x100 view box.
pub const DEFAULT_RING_RADIUS: f64 = 45.0;
/// Default square outer size and stroke width inside a 100x100 view box.
pub const DEFAULT_SQUARE_SIZE: f64 = 100.0;
pub const DEFAULT_SQUARE_STROKE: f64 = 8.0;

/// Indicator shape as chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorShape {
    #[default]
    Ring,
    Square,
}

/// Shape together with its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ProgressShape {
    Ring { radius: f64 },
    Square { size: f64, stroke_width: f64 },
}

impl ProgressShape {
    /// Default dimensions for a shape.
    pub fn for_indicator(shape: IndicatorShape) -> Self {
        match shape {
            IndicatorShape::Ring => ProgressShape::Ring {
                radius: DEFAULT_RING_RADIUS,
            },
            IndicatorShape::Square => ProgressShape::Square {
                size: DEFAULT_SQUARE_SIZE,
                stroke_width: DEFAULT_SQUARE_STROKE,
            },
        }
    }

    /// Full stroke length: circumference or inset perimeter.
    pub fn length(&self) -> f64 {
        match *self {
            ProgressShape::Ring { radius } => 2.0 * PI * radius.max(0.0),
            ProgressShape::Square { size, stroke_width } => 4.0 * inset_side(size, stroke_width),
        }
    }
}

/// Everything a renderer needs to draw the stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeGeometry {
    /// Value for `stroke-dasharray`.
    pub length: f64,
    /// Value for `stroke-dashoffset`.
    pub dash_offset: f64,
    /// Rotation in degrees applied about the shape's center.
    pub rotation_deg: f64,
    /// SVG path for shapes drawn as paths; `None` for the ring.
    pub path: Option<String>,
}

/// Fraction of the session remaining, in [0, 1]. A zero-length session
/// counts as full.
pub fn fraction(original_secs: u64, remaining_secs: u64) -> f64 {
    if original_secs == 0 {
        return 1.0;
    }
    remaining_secs.min(original_secs) as f64 / original_secs as f64
}

/// Compute stroke parameters for `shape` at `fraction` remaining.
pub fn geometry(shape: ProgressShape, fraction: f64) -> StrokeGeometry {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let length = shape.length();
    let dash_offset = length * (1.0 - fraction);

    match shape {
        // Circles start at 3 o'clock; rotate so the stroke starts at 12.
        ProgressShape::Ring { .. } => StrokeGeometry {
            length,
            dash_offset,
            rotation_deg: -90.0,
            path: None,
        },
        ProgressShape::Square { size, stroke_width } => StrokeGeometry {
            length,
            dash_offset,
            rotation_deg: 0.0,
            path: Some(square_path(size, stroke_width)),
        },
    }
}

fn inset_side(size: f64, stroke_width: f64) -> f64 {
    (size - stroke_width).max(0.0)
}

/// Inset square traced clockwise from the top-left corner.
fn square_path(size: f64, stroke_width: f64) -> String {
    let near = stroke_width / 2.0;
    let far = near + inset_side(size, stroke_width);
    format!("M {near} {near} H {far} V {far} H {near} Z")
}
