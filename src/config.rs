use crate::animation::AnimationConfig;
use crate::font_fit::DEFAULT_SIZE_BOUNDS;
use crate::model::{DEFAULT_MAXIMUM, DEFAULT_MINIMUM};
use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// RGBA color; `a` is straight (not premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise interpolation, `t` in [0, 1].
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// Fixed palette and pen of the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RingStyle {
    pub background: Color,
    pub pen: Color,
    pub pen_width: f64,
    pub track: Color,
    pub progress: Color,
    pub text: Color,
    /// Gradient stops of the sweep overlay as (offset, color).
    pub overlay_stops: [(f64, Color); 2],
    pub font_size_bounds: (u32, u32),
}

impl Default for RingStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            pen: Color::BLACK,
            pen_width: 2.0,
            track: Color::new(230, 230, 230),
            progress: Color::new(0x00, 0x80, 0x00),
            text: Color::BLACK,
            overlay_stops: [
                (0.25, Color::rgba(136, 203, 8, 70)),
                (0.70, Color::rgba(0, 255, 46, 70)),
            ],
            font_size_bounds: DEFAULT_SIZE_BOUNDS,
        }
    }
}

// ============================================================================
// WIDGET CONFIGURATION
// ============================================================================

/// Width and height in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

pub const PREFERRED_SIZE: Size = Size::new(250, 250);
pub const MINIMUM_SIZE: Size = Size::new(30, 30);

#[derive(Debug, Clone, Builder)]
pub struct ProgressConfig {
    #[builder(default = "Progress".to_string())]
    pub title: String,
    #[builder(default = (DEFAULT_MINIMUM, DEFAULT_MAXIMUM))]
    pub range: (i32, i32),
    #[builder(default = DEFAULT_MINIMUM)]
    pub initial_value: i32,
    #[builder(default = true)]
    pub show_label: bool,

    // Window configuration
    #[builder(default = PREFERRED_SIZE)]
    pub preferred_size: Size,
    #[builder(default = MINIMUM_SIZE)]
    pub minimum_size: Size,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Label font
    pub font_path: Option<PathBuf>,
    #[builder(default = DEFAULT_SIZE_BOUNDS)]
    pub font_size_bounds: (u32, u32),

    // Sweep animation
    #[builder(default = Duration::from_millis(1000))]
    pub idle_period: Duration,
    #[builder(default = Duration::from_millis(5))]
    pub frame_interval: Duration,
    #[builder(default = 2.0)]
    pub sweep_step_degrees: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProgressConfig {
    pub fn animation(&self) -> AnimationConfig {
        AnimationConfig {
            idle_period: self.idle_period,
            frame_interval: self.frame_interval,
            step_degrees: self.sweep_step_degrees,
        }
    }

    pub fn style(&self) -> RingStyle {
        RingStyle {
            font_size_bounds: self.font_size_bounds,
            ..RingStyle::default()
        }
    }
}
