//! Label font sizing and font loading.

use crate::error::{Error, Result};
use crate::geometry::Rect;
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::path::{Path, PathBuf};

/// Default search interval for label sizes, in pixels.
pub const DEFAULT_SIZE_BOUNDS: (u32, u32) = (1, 500);

/// System locations probed when no font path is configured.
pub const FALLBACK_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Source of rendered text extents.
pub trait TextMeasure {
    /// Width and height of the ink bounding box of `text` at `size` pixels.
    fn text_extent(&self, text: &str, size: f32) -> (u32, u32);
}

impl TextMeasure for Font<'_> {
    fn text_extent(&self, text: &str, size: f32) -> (u32, u32) {
        let scale = Scale::uniform(size);
        let v_metrics = self.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = self
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
            (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
            |(min_x, max_x, min_y, max_y), bb| {
                (
                    min_x.min(bb.min.x),
                    max_x.max(bb.max.x),
                    min_y.min(bb.min.y),
                    max_y.max(bb.max.y),
                )
            },
        );
        let width = if min_x < max_x { max_x - min_x } else { 0 };
        let height = if min_y < max_y { max_y - min_y } else { 0 };
        (width as u32, height as u32)
    }
}

/// Largest size in `bounds` whose extent of `text` fits inside `target`.
///
/// Binary search: a fitting midpoint raises the lower bound, anything else
/// lowers the upper bound, until the interval is one wide. The lower bound is
/// returned, so a rect too small for any size yields `bounds.0`.
pub fn fit_font<M>(text: &str, measure: &M, target: Rect, bounds: (u32, u32)) -> u32
where
    M: TextMeasure + ?Sized,
{
    let (mut low, mut high) = bounds;
    while high.saturating_sub(low) > 1 {
        let mid = low + (high - low) / 2;
        let (width, height) = measure.text_extent(text, mid as f32);
        if f64::from(width) <= target.width && f64::from(height) <= target.height {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Load the label font from `configured`, or the first readable entry of
/// [`FALLBACK_FONT_PATHS`].
pub fn load_font(configured: Option<&Path>) -> Result<Font<'static>> {
    load_font_from(configured, FALLBACK_FONT_PATHS)
}

/// Like [`load_font`] with an explicit fallback list.
pub fn load_font_from(configured: Option<&Path>, fallbacks: &[&str]) -> Result<Font<'static>> {
    let mut tried = Vec::new();
    if let Some(path) = configured {
        match std::fs::read(path) {
            Ok(bytes) => {
                return Font::try_from_vec(bytes).ok_or_else(|| Error::FontParse {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "configured font unreadable, probing system fonts");
                tried.push(path.to_path_buf());
            }
        }
    }

    for candidate in fallbacks.iter().map(PathBuf::from) {
        let Ok(bytes) = std::fs::read(&candidate) else {
            tried.push(candidate);
            continue;
        };
        if let Some(font) = Font::try_from_vec(bytes) {
            tracing::debug!(path = %candidate.display(), "loaded label font");
            return Ok(font);
        }
        tracing::warn!(path = %candidate.display(), "skipping unparsable system font");
        tried.push(candidate);
    }

    Err(Error::FontUnavailable { tried })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TextMeasure;
    use std::cell::Cell;

    /// Monospace metrics: each glyph is 0.6 em wide and 1 em tall.
    #[derive(Default)]
    pub(crate) struct Monospace {
        pub(crate) calls: Cell<u32>,
    }

    impl TextMeasure for Monospace {
        fn text_extent(&self, text: &str, size: f32) -> (u32, u32) {
            self.calls.set(self.calls.get() + 1);
            let width = (0.6 * size * text.chars().count() as f32).ceil();
            (width as u32, size.ceil() as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Monospace;
    use super::*;

    #[test]
    fn fitted_size_never_overflows() {
        let measure = Monospace::default();
        for text in ["0%", "50%", "100%"] {
            for side in (10..=500).step_by(10) {
                let target = Rect::new(0.0, 0.0, side as f64, side as f64);
                let size = fit_font(text, &measure, target, DEFAULT_SIZE_BOUNDS);
                let (w, h) = measure.text_extent(text, size as f32);
                assert!(f64::from(w) <= target.width, "{text} at {side}: width {w}");
                assert!(f64::from(h) <= target.height, "{text} at {side}: height {h}");
            }
        }
    }

    #[test]
    fn fitted_size_is_the_largest_that_fits() {
        let measure = Monospace::default();
        let target = Rect::new(0.0, 0.0, 130.0, 130.0);
        let size = fit_font("100%", &measure, target, DEFAULT_SIZE_BOUNDS);
        // 4 glyphs * 0.6 * 54 = 129.6, one size up overflows
        assert_eq!(size, 54);
    }

    #[test]
    fn search_is_logarithmic() {
        let measure = Monospace::default();
        fit_font("50%", &measure, Rect::new(0.0, 0.0, 200.0, 80.0), DEFAULT_SIZE_BOUNDS);
        assert!(measure.calls.get() <= 9, "{} measurements", measure.calls.get());
    }

    #[test]
    fn degenerate_rect_yields_minimum() {
        let measure = Monospace::default();
        assert_eq!(fit_font("100%", &measure, Rect::default(), DEFAULT_SIZE_BOUNDS), 1);
    }

    #[test]
    fn offset_target_is_measured_by_size_only() {
        let measure = Monospace::default();
        let at_origin = fit_font("25%", &measure, Rect::new(0.0, 0.0, 90.0, 90.0), DEFAULT_SIZE_BOUNDS);
        let shifted = fit_font("25%", &measure, Rect::new(75.0, 30.0, 90.0, 90.0), DEFAULT_SIZE_BOUNDS);
        assert_eq!(at_origin, shifted);
    }

    #[test]
    fn missing_fonts_are_all_reported() {
        let missing = Path::new("/nonexistent/ringprogress-test.ttf");
        let fallback = "/nonexistent/ringprogress-fallback.ttf";
        match load_font_from(Some(missing), &[fallback]) {
            Err(Error::FontUnavailable { tried }) => {
                assert_eq!(tried, vec![missing.to_path_buf(), PathBuf::from(fallback)]);
            }
            other => panic!("expected FontUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unparsable_configured_font_is_an_error() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        match load_font_from(Some(&manifest), &[]) {
            Err(Error::FontParse { path }) => assert_eq!(path, manifest),
            other => panic!("expected FontParse, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn system_font_fits_without_overflow() {
        let Ok(font) = load_font(None) else {
            eprintln!("no system font found, skipping");
            return;
        };
        for text in ["0%", "50%", "100%"] {
            for side in (10..=500).step_by(10) {
                let target = Rect::new(0.0, 0.0, side as f64, side as f64);
                let size = fit_font(text, &font, target, DEFAULT_SIZE_BOUNDS);
                if size == DEFAULT_SIZE_BOUNDS.0 {
                    continue;
                }
                let (w, h) = font.text_extent(text, size as f32);
                assert!(w > 0 && h > 0, "{text} at {size}px has no ink");
                assert!(f64::from(w) <= target.width, "{text} at {side}: width {w}");
                assert!(f64::from(h) <= target.height, "{text} at {side}: height {h}");
            }
        }
    }

    #[test]
    fn system_font_blank_text_has_no_extent() {
        let Ok(font) = load_font(None) else {
            eprintln!("no system font found, skipping");
            return;
        };
        assert_eq!(font.text_extent("", 40.0), (0, 0));
        assert_eq!(font.text_extent("   ", 40.0), (0, 0));
    }
}

