//! Frame composition and software rasterisation.
//!
//! A frame is first composed into a retained [`Scene`] of draw commands and
//! then rasterised into an RGBA8 [`Canvas`].

use crate::animation::{AnimationController, FrameTick, Scheduler};
use crate::config::{Color, RingStyle};
use crate::font_fit::{fit_font, TextMeasure};
use crate::geometry::{
    annular_sector_path, external_rect, internal_rect, label_rect, rotate_point, Path, Point, Rect,
};
use crate::model::ProgressModel;
use rusttype::{point, Font, PositionedGlyph, Scale};

/// Vertical samples per pixel row when filling paths.
const SUBSAMPLES: usize = 4;

// ============================================================================
// BRUSHES
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    /// (offset, color) pairs sorted by offset.
    pub stops: Vec<(f64, Color)>,
}

impl LinearGradient {
    /// Color at `p`, projected onto the gradient axis. Offsets outside the
    /// stops take the nearest stop; a zero-length axis takes the first stop.
    pub fn color_at(&self, p: Point) -> Color {
        let Some(&(first_offset, first)) = self.stops.first() else {
            return Color::rgba(0, 0, 0, 0);
        };
        let (dx, dy) = (self.end.x - self.start.x, self.end.y - self.start.y);
        let len_sq = dx * dx + dy * dy;
        if len_sq < 1e-12 {
            return first;
        }
        let t = (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq).clamp(0.0, 1.0);
        if t <= first_offset {
            return first;
        }
        for pair in self.stops.windows(2) {
            let ((lo, lo_color), (hi, hi_color)) = (pair[0], pair[1]);
            if t <= hi {
                let span = hi - lo;
                let local = if span > 0.0 { (t - lo) / span } else { 1.0 };
                return lo_color.lerp(hi_color, local);
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    Solid(Color),
    Linear(LinearGradient),
}

impl Brush {
    fn color_at(&self, p: Point) -> Color {
        match self {
            Brush::Solid(color) => *color,
            Brush::Linear(gradient) => gradient.color_at(p),
        }
    }
}

/// Gradient of the sweep overlay: from the top of the external circle to that
/// point rotated by the overlay angle.
pub fn overlay_gradient(external: Rect, angle_deg: f64, style: &RingStyle) -> LinearGradient {
    let start = external.top_center();
    LinearGradient {
        start,
        end: rotate_point(external, start, angle_deg),
        stops: style.overlay_stops.to_vec(),
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug)]
pub enum DrawCommand {
    Clear(Color),
    StrokeEllipse {
        rect: Rect,
        width: f64,
        color: Color,
    },
    FillEllipse {
        rect: Rect,
        color: Color,
    },
    FillPath {
        path: Path,
        brush: Brush,
    },
    Text {
        rect: Rect,
        text: String,
        font_size: f32,
        color: Color,
    },
}

#[derive(Debug, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Rasterise every command in order. Text is skipped without a font.
    pub fn render(&self, canvas: &mut Canvas, font: Option<&Font>) {
        if canvas.is_empty() {
            return;
        }
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::StrokeEllipse { rect, width, color } => {
                    stroke_ellipse(canvas, *rect, *width, *color);
                }
                DrawCommand::FillEllipse { rect, color } => fill_ellipse(canvas, *rect, *color),
                DrawCommand::FillPath { path, brush } => fill_path(canvas, path, brush),
                DrawCommand::Text {
                    rect,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = font {
                        draw_text(canvas, rect.center(), text, font, Scale::uniform(*font_size), *color);
                    }
                }
            }
        }
    }
}

// ============================================================================
// FRAME COMPOSITION
// ============================================================================

/// Compose one frame of the indicator.
///
/// `overlay` is the sweep angle to highlight, `label` the text measure used to
/// size the percentage label (no label when `None`).
pub fn compose_scene(
    bounds: Rect,
    model: &ProgressModel,
    overlay: Option<f64>,
    label: Option<&dyn TextMeasure>,
    style: &RingStyle,
) -> Scene {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(style.background));

    let external = external_rect(bounds);
    let internal = internal_rect(external);
    let text_area = label_rect(internal);

    // Track
    scene.add_command(DrawCommand::StrokeEllipse {
        rect: external,
        width: style.pen_width,
        color: style.pen,
    });
    scene.add_command(DrawCommand::FillEllipse {
        rect: internal,
        color: style.track,
    });
    scene.add_command(DrawCommand::StrokeEllipse {
        rect: internal,
        width: style.pen_width,
        color: style.pen,
    });

    let progress_angle = model.sweep_angle();
    if progress_angle > 0.0 {
        scene.add_command(DrawCommand::FillPath {
            path: annular_sector_path(external, internal, 0.0, progress_angle),
            brush: Brush::Solid(style.progress),
        });
    }

    if let Some(measure) = label {
        let text = format!("{}%", model.percent());
        let size = fit_font(&text, measure, text_area, style.font_size_bounds);
        scene.add_command(DrawCommand::Text {
            rect: text_area,
            text,
            font_size: size as f32,
            color: style.text,
        });
    }

    if let Some(angle) = overlay.filter(|angle| *angle > 0.0) {
        scene.add_command(DrawCommand::FillPath {
            path: annular_sector_path(external, internal, 0.0, angle),
            brush: Brush::Linear(overlay_gradient(external, angle, style)),
        });
    }

    scene
}

/// Composes frames with a fixed style and optional label font.
pub struct Renderer {
    style: RingStyle,
    font: Option<Font<'static>>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("style", &self.style)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Renderer {
    pub fn new(style: RingStyle, font: Option<Font<'static>>) -> Self {
        Self { style, font }
    }

    pub fn style(&self) -> &RingStyle {
        &self.style
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Compose the frame for `bounds`. A `tick` advances the sweep overlay,
    /// which re-arms the next frame or idle timer on `scheduler`.
    pub fn render_frame(
        &self,
        bounds: Rect,
        model: &ProgressModel,
        show_label: bool,
        animation: &mut AnimationController,
        tick: Option<FrameTick>,
        scheduler: &mut dyn Scheduler,
    ) -> Scene {
        let overlay = tick.and_then(|tick| animation.advance(tick, model.sweep_angle(), scheduler));
        let label = match (&self.font, show_label) {
            (Some(font), true) => Some(font as &dyn TextMeasure),
            _ => None,
        };
        compose_scene(bounds, model, overlay, label, &self.style)
    }

    pub fn rasterize(&self, scene: &Scene, canvas: &mut Canvas) {
        scene.render(canvas, self.font.as_ref());
    }
}

// ============================================================================
// CORE DATA TYPES
// ============================================================================

/// RGBA8 framebuffer view.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    /// Wrap `frame`; the visible height is limited to what the buffer holds.
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        let height = if width == 0 {
            0
        } else {
            height.min(frame.len() / (width * 4))
        };
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some([self.frame[idx], self.frame[idx + 1], self.frame[idx + 2], self.frame[idx + 3]])
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Source-over blend `color` at `coverage` onto pixel (x, y).
    fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let a = (coverage * f32::from(color.a) / 255.0).clamp(0.0, 1.0);
        let src = [f32::from(color.r), f32::from(color.g), f32::from(color.b)];
        for (channel, value) in src.iter().enumerate() {
            let dst = f32::from(self.frame[idx + channel]);
            self.frame[idx + channel] = (value * a + dst * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

/// Even-odd fill with vertical supersampling and exact horizontal coverage.
fn fill_path(canvas: &mut Canvas, path: &Path, brush: &Brush) {
    if path.is_empty() {
        return;
    }
    let Some(bounds) = path.bounds() else {
        return;
    };
    let y0 = bounds.y.floor().max(0.0) as usize;
    let y1 = bounds.bottom().ceil().clamp(0.0, canvas.height as f64) as usize;
    let x0 = bounds.x.floor().max(0.0) as usize;
    let x1 = bounds.right().ceil().clamp(0.0, canvas.width as f64) as usize;
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let edges: Vec<(Point, Point)> = path.edges().filter(|(a, b)| a.y != b.y).collect();
    let mut row = vec![0.0_f32; x1 - x0];
    let mut crossings: Vec<f64> = Vec::with_capacity(edges.len());
    let weight = 1.0 / SUBSAMPLES as f32;

    for y in y0..y1 {
        row.fill(0.0);
        for sample in 0..SUBSAMPLES {
            let sy = y as f64 + (sample as f64 + 0.5) / SUBSAMPLES as f64;
            crossings.clear();
            crossings.extend(
                edges
                    .iter()
                    .filter(|(a, b)| (a.y <= sy) != (b.y <= sy))
                    .map(|(a, b)| a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y)),
            );
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                accumulate_span(&mut row, x0, span[0], span[1], weight);
            }
        }
        for (offset, coverage) in row.iter().enumerate() {
            if *coverage > 0.001 {
                let x = x0 + offset;
                let color = brush.color_at(Point::new(x as f64 + 0.5, y as f64 + 0.5));
                canvas.blend(x as i32, y as i32, color, coverage.min(1.0));
            }
        }
    }
}

fn accumulate_span(row: &mut [f32], origin: usize, left: f64, right: f64, weight: f32) {
    let start = left.max(origin as f64);
    let end = right.min((origin + row.len()) as f64);
    if end <= start {
        return;
    }
    let first = start.floor() as usize;
    let last = (end.ceil() as usize).min(origin + row.len());
    for px in first..last {
        let overlap = end.min(px as f64 + 1.0) - start.max(px as f64);
        if overlap > 0.0 {
            row[px - origin] += overlap as f32 * weight;
        }
    }
}

/// Pixels of the circle inscribed in `rect` with a coverage function of the
/// distance from the centre.
fn shade_circle(canvas: &mut Canvas, rect: Rect, reach: f64, color: Color, coverage: impl Fn(f64) -> f64) {
    if rect.is_empty() {
        return;
    }
    let center = rect.center();
    let r = rect.side() / 2.0 + reach;
    let min_x = (center.x - r).floor().max(0.0) as i32;
    let max_x = (center.x + r).ceil().min(canvas.width as f64) as i32;
    let min_y = (center.y - r).floor().max(0.0) as i32;
    let max_y = (center.y + r).ceil().min(canvas.height as f64) as i32;
    for y in min_y..max_y {
        for x in min_x..max_x {
            let dist = Point::new(x as f64 + 0.5, y as f64 + 0.5).distance(center);
            let aa = coverage(dist).clamp(0.0, 1.0);
            if aa > 0.0 {
                canvas.blend(x, y, color, aa as f32);
            }
        }
    }
}

fn fill_ellipse(canvas: &mut Canvas, rect: Rect, color: Color) {
    let radius = rect.side() / 2.0;
    shade_circle(canvas, rect, 1.0, color, |dist| radius - dist + 0.5);
}

fn stroke_ellipse(canvas: &mut Canvas, rect: Rect, width: f64, color: Color) {
    let radius = rect.side() / 2.0;
    let half = width / 2.0;
    shade_circle(canvas, rect, half + 1.0, color, |dist| half - (dist - radius).abs() + 0.5);
}

/// Draw `text` with its ink bounding box centred on `center`.
fn draw_text(canvas: &mut Canvas, center: Point, text: &str, font: &Font, scale: Scale, color: Color) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
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
    if min_x >= max_x || min_y >= max_y {
        return;
    }
    let offset_x = center.x.round() as i32 - (max_x - min_x) / 2;
    let offset_y = center.y.round() as i32 - (max_y - min_y) / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.blend(px, py, color, v);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationConfig, TimerQueue};
    use crate::font_fit::test_support::Monospace;
    use std::time::{Duration, Instant};

    fn fill_paths(scene: &Scene) -> Vec<(&Path, &Brush)> {
        scene
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillPath { path, brush } => Some((path, brush)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn quarter_progress_scene() {
        let mut model = ProgressModel::with_range(0, 200).unwrap();
        model.set_value(50);
        let bounds = Rect::from_size(300, 200);
        let scene = compose_scene(bounds, &model, None, Some(&Monospace::default() as &dyn TextMeasure), &RingStyle::default());

        let fills = fill_paths(&scene);
        assert_eq!(fills.len(), 1);
        let (path, brush) = fills[0];
        assert_eq!(*brush, Brush::Solid(RingStyle::default().progress));
        let expected = std::f64::consts::PI * (100.0_f64.powi(2) - 60.0_f64.powi(2)) / 4.0;
        assert!((path.area() - expected).abs() / expected < 0.005);

        let label = scene.commands().iter().find_map(|command| match command {
            DrawCommand::Text { rect, text, .. } => Some((rect, text)),
            _ => None,
        });
        let (rect, text) = label.unwrap();
        assert_eq!(text, "25%");
        assert!((rect.width - 0.6 * 0.707_106_78 * 200.0).abs() < 1e-4);
        assert!(rect.center().distance(bounds.center()) < 1e-9);
    }

    #[test]
    fn empty_progress_draws_no_sector_or_label_when_hidden() {
        let model = ProgressModel::default();
        let scene = compose_scene(Rect::from_size(100, 100), &model, Some(0.0), None, &RingStyle::default());
        assert!(fill_paths(&scene).is_empty());
        assert!(!scene
            .commands()
            .iter()
            .any(|command| matches!(command, DrawCommand::Text { .. })));
    }

    #[test]
    fn overlay_is_drawn_last_with_gradient() {
        let mut model = ProgressModel::default();
        model.set_value(50);
        let scene = compose_scene(Rect::from_size(100, 100), &model, Some(40.0), None, &RingStyle::default());
        match scene.commands().last() {
            Some(DrawCommand::FillPath {
                brush: Brush::Linear(gradient),
                ..
            }) => {
                assert_eq!(gradient.start, Point::new(50.0, 0.0));
                assert!(gradient.end.x > gradient.start.x);
            }
            other => panic!("unexpected last command {other:?}"),
        }
    }

    #[test]
    fn gradient_clamps_to_outer_stops() {
        let style = RingStyle::default();
        let gradient = LinearGradient {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
            stops: style.overlay_stops.to_vec(),
        };
        assert_eq!(gradient.color_at(Point::new(-5.0, 0.0)), style.overlay_stops[0].1);
        assert_eq!(gradient.color_at(Point::new(10.0, 30.0)), style.overlay_stops[0].1);
        assert_eq!(gradient.color_at(Point::new(90.0, 0.0)), style.overlay_stops[1].1);
        let mid = gradient.color_at(Point::new(47.5, 0.0));
        assert_eq!(mid, style.overlay_stops[0].1.lerp(style.overlay_stops[1].1, 0.5));
    }

    #[test]
    fn degenerate_gradient_uses_first_stop() {
        let style = RingStyle::default();
        let gradient = overlay_gradient(Rect::from_size(80, 80), 0.0, &style);
        assert_eq!(gradient.color_at(Point::new(3.0, 70.0)), style.overlay_stops[0].1);
    }

    #[test]
    fn fill_path_covers_square_exactly() {
        let mut frame = vec![0u8; 10 * 10 * 4];
        let mut canvas = Canvas::new(&mut frame, 10, 10);
        canvas.clear(Color::BLACK);
        let mut path = Path::new();
        path.move_to(Point::new(2.0, 2.0));
        path.line_to(Point::new(6.0, 2.0));
        path.line_to(Point::new(6.0, 6.0));
        path.line_to(Point::new(2.0, 6.0));
        fill_path(&mut canvas, &path, &Brush::Solid(Color::WHITE));

        assert_eq!(canvas.pixel(3, 3), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(1, 3), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(6, 3), Some([0, 0, 0, 255]));
    }

    #[test]
    fn progress_fill_lands_in_the_ring() {
        let mut model = ProgressModel::default();
        model.set_value(25);
        let style = RingStyle::default();
        let scene = compose_scene(Rect::from_size(100, 100), &model, None, None, &style);
        let mut frame = vec![0u8; 100 * 100 * 4];
        let mut canvas = Canvas::new(&mut frame, 100, 100);
        scene.render(&mut canvas, None);

        let progress = [style.progress.r, style.progress.g, style.progress.b, 255];
        // Inside the ring at 45 degrees, 40 px from the centre.
        assert_eq!(canvas.pixel(78, 21), Some(progress));
        // Same radius on the empty side.
        assert_ne!(canvas.pixel(21, 78), Some(progress));
        // Centre keeps the track tone.
        assert_eq!(canvas.pixel(50, 50), Some([230, 230, 230, 255]));
    }

    #[test]
    fn zero_sized_canvas_is_a_no_op() {
        let model = ProgressModel::default();
        let monospace = Monospace::default();
        let measure: &dyn TextMeasure = &monospace;
        let scene = compose_scene(Rect::from_size(0, 0), &model, Some(10.0), Some(measure), &RingStyle::default());
        let mut frame = Vec::new();
        let mut canvas = Canvas::new(&mut frame, 0, 0);
        scene.render(&mut canvas, None);
        assert!(canvas.is_empty());
    }

    #[test]
    fn render_without_tick_leaves_animation_alone() {
        let mut queue = TimerQueue::new(Instant::now());
        let mut animation = AnimationController::new(AnimationConfig::default());
        animation.start(&mut queue);
        let renderer = Renderer::new(RingStyle::default(), None);
        let model = ProgressModel::default();

        renderer.render_frame(Rect::from_size(50, 50), &model, true, &mut animation, None, &mut queue);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(queue.now() + Duration::from_millis(1000)));
    }
}
