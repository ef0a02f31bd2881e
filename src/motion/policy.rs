use std::path::Path;

use anyhow::Context as _;
use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{FoldercutError, FoldercutResult},
    media::classify::MediaCategory,
};

/// Canvas the sequence composites onto, in pixels.
pub const SEQUENCE_WIDTH: f64 = 1920.0;
pub const SEQUENCE_HEIGHT: f64 = 960.0;

/// Geometric center of the canvas.
pub const DEFAULT_CENTER: Point = Point { x: SEQUENCE_WIDTH / 2.0, y: SEQUENCE_HEIGHT / 2.0 };

/// Horizontal anchor left-aligned stills land on at the default scale of 100.
pub const IMAGE_LEFT_X: f64 = 480.0;

const HD_WIDTH: u32 = 1920;
const HD_HEIGHT: u32 = 1080;
const HD_WIDTH_FALLBACK_SCALE: f64 = 90.0;

/// Scale plus optional explicit center in source pixel space. A template with
/// no center defers to the per-category fallback.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionTemplate {
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Point>,
}

/// One exact-dimension entry of the lookup table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionRule {
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub template: MotionTemplate,
}

/// Scale forced for a recognized wide-format source width when the exact
/// dimensions are not in the table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidthOverride {
    pub width: u32,
    pub scale: f64,
}

/// The transform a clip ends up with, still in source pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedMotion {
    pub scale: f64,
    pub center_px: Point,
}

/// Ordered transform-selection policy: exact table lookup, then width-based
/// overrides gated on a lookup miss, then the per-category center fallback.
/// The table itself is opaque configuration and can be replaced wholesale from
/// a JSON document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionPolicy {
    pub rules: Vec<MotionRule>,
    pub width_overrides: Vec<WidthOverride>,
    pub default_template: MotionTemplate,
}

impl Default for MotionPolicy {
    fn default() -> Self {
        let rule = |width, height, scale, center: Option<(f64, f64)>| MotionRule {
            width,
            height,
            template: MotionTemplate {
                scale,
                center: center.map(|(x, y)| Point::new(x, y)),
            },
        };
        let centered = Some((DEFAULT_CENTER.x, DEFAULT_CENTER.y));

        Self {
            rules: vec![
                rule(1920, 1080, 100.0, centered),
                rule(1920, 960, 90.0, centered),
                rule(1920, 1920, 50.0, None),
                rule(960, 960, 100.0, Some((480.0, DEFAULT_CENTER.y))),
                rule(3840, 1920, 50.0, centered),
                rule(872, 480, 222.0, centered),
                rule(854, 480, 225.0, centered),
                rule(1024, 1024, 94.0, None),
                rule(1280, 720, 150.0, centered),
                rule(1080, 1080, 88.9, Some((480.0, 480.0))),
                rule(720, 1280, 75.0, centered),
                rule(1080, 1920, 50.0, centered),
                rule(1280, 700, 150.0, centered),
                rule(480, 854, 115.0, centered),
                rule(2160, 2160, 45.0, None),
                rule(4209, 1645, 41.1, centered),
                rule(3970, 1273, 43.5, centered),
                rule(3696, 790, 46.8, centered),
                rule(2452, 683, 70.4, centered),
                rule(4096, 1379, 42.2, centered),
                rule(2007, 562, 86.1, centered),
            ],
            width_overrides: vec![
                WidthOverride { width: 4096, scale: 42.2 },
                WidthOverride { width: 2452, scale: 70.4 },
            ],
            default_template: MotionTemplate { scale: 100.0, center: None },
        }
    }
}

impl MotionPolicy {
    pub fn from_json_file(path: &Path) -> FoldercutResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read motion policy '{}'", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|err| {
            FoldercutError::config(format!("motion policy '{}': {err}", path.display()))
        })
    }

    fn lookup(&self, dims: (u32, u32)) -> Option<&MotionTemplate> {
        self.rules
            .iter()
            .find(|r| (r.width, r.height) == dims)
            .map(|r| &r.template)
    }

    /// Select the transform for a clip. Stage order is load-bearing: overrides
    /// must never fire for a table hit, and the category fallback must never
    /// fire when the chosen template carries an explicit center.
    pub fn resolve(&self, dimensions: Option<(u32, u32)>, category: MediaCategory) -> ResolvedMotion {
        let table_hit = dimensions.and_then(|d| self.lookup(d));
        let template = table_hit.unwrap_or(&self.default_template);

        let mut scale = template.scale;
        if table_hit.is_none()
            && let Some((width, height)) = dimensions
        {
            if width == HD_WIDTH && height != HD_HEIGHT {
                scale = HD_WIDTH_FALLBACK_SCALE;
            } else if let Some(ov) = self.width_overrides.iter().find(|o| o.width == width) {
                scale = ov.scale;
            }
        }

        let center_px = match template.center {
            Some(center) => center,
            None if category == MediaCategory::Image => {
                Point::new(image_left_center_x(scale), DEFAULT_CENTER.y)
            }
            None => DEFAULT_CENTER,
        };

        ResolvedMotion { scale, center_px }
    }
}

/// Left-biased horizontal center for stills: keeps the on-screen anchor at
/// roughly [`IMAGE_LEFT_X`] regardless of source resolution.
pub fn image_left_center_x(scale: f64) -> f64 {
    -scale / 200.0 * (SEQUENCE_WIDTH / 2.0) + SEQUENCE_WIDTH / 2.0
}

/// Map a pixel-space center onto the dialect's normalized coordinate space:
/// `(value - half_extent) / half_extent` per axis against the fixed canvas.
pub fn encode_center(center_px: Point) -> Point {
    let half_w = SEQUENCE_WIDTH / 2.0;
    let half_h = SEQUENCE_HEIGHT / 2.0;
    Point::new((center_px.x - half_w) / half_w, (center_px.y - half_h) / half_h)
}
