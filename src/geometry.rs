//! Ring geometry: the rects that frame the indicator and the annular sector
//! paths filled by the renderer.
//!
//! Everything here is a pure function of its inputs. Screen coordinates are
//! used throughout, so the y axis points down. Sector angles are measured
//! clockwise from 12 o'clock; arc angles follow the painter convention of
//! 0° at 3 o'clock growing counter-clockwise.

/// Side ratio of the internal ring relative to the external ring.
pub const INTERNAL_RING_RATIO: f64 = 0.6;

/// Side ratio of the largest square inscribed in a circle.
pub const INSCRIBED_SQUARE_RATIO: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Maximum angle covered by one flattened arc segment, in degrees.
const ARC_SEGMENT_DEGREES: f64 = 2.0;

// ============================================================================
// VALUE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect covering a `width` x `height` surface from the origin.
    pub fn from_size(width: usize, height: usize) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Length of the shorter side.
    pub fn side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Square centred in this rect whose side is `factor` times the shorter side.
    pub fn centered_square(&self, factor: f64) -> Rect {
        let side = (factor * self.side()).max(0.0);
        Rect::new(
            self.x + (self.width - side) / 2.0,
            self.y + (self.height - side) / 2.0,
            side,
            side,
        )
    }

    /// Point on the ellipse inscribed in this rect at a painter angle.
    fn ellipse_point(&self, angle_deg: f64) -> Point {
        let center = self.center();
        let radians = angle_deg.to_radians();
        Point::new(
            center.x + self.width / 2.0 * radians.cos(),
            center.y - self.height / 2.0 * radians.sin(),
        )
    }
}

// ============================================================================
// RING RECTS
// ============================================================================

/// Largest square centred in `bounds`.
pub fn external_rect(bounds: Rect) -> Rect {
    bounds.centered_square(1.0)
}

/// Inner edge of the ring; the ring is 40% of the external radius thick.
pub fn internal_rect(external: Rect) -> Rect {
    external.centered_square(INTERNAL_RING_RATIO)
}

/// Largest square inscribed in the internal circle. The label must fit here.
pub fn label_rect(internal: Rect) -> Rect {
    internal.centered_square(INSCRIBED_SQUARE_RATIO)
}

/// Rotate `point` about the centre of `rect`, clockwise-positive on screen.
pub fn rotate_point(rect: Rect, point: Point, angle_deg: f64) -> Point {
    let center = rect.center();
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

// ============================================================================
// PATHS
// ============================================================================

/// Closed polygon with arcs flattened into line segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: Point) {
        self.points.clear();
        self.points.push(point);
    }

    pub fn line_to(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Append an arc of the ellipse inscribed in `rect`, starting at
    /// `start_deg` and sweeping `sweep_deg` (positive is counter-clockwise).
    /// A line joins the current point to the arc start.
    pub fn arc_to(&mut self, rect: Rect, start_deg: f64, sweep_deg: f64) {
        let segments = (sweep_deg.abs() / ARC_SEGMENT_DEGREES).ceil().max(1.0) as usize;
        for i in 0..=segments {
            let t = i as f64 / segments as f64;
            self.points.push(rect.ellipse_point(start_deg + sweep_deg * t));
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }

    /// Edges of the closed polygon, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Enclosed area (shoelace formula, orientation ignored).
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let twice: f64 = self
            .edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum();
        twice.abs() / 2.0
    }

    /// Bounding box of all vertices, `None` for an empty path.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (min_x, max_x, min_y, max_y) = self.points.iter().fold(
            (first.x, first.x, first.y, first.y),
            |(min_x, max_x, min_y, max_y), p| {
                (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
            },
        );
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// Region between the external and internal circles spanning `span_deg`
/// clockwise from `start_deg` (0° at 12 o'clock).
///
/// The span is not clamped; callers keep it within [0, 360].
pub fn annular_sector_path(external: Rect, internal: Rect, start_deg: f64, span_deg: f64) -> Path {
    let external_lead = rotate_point(external, external.top_center(), start_deg);
    let internal_lead = rotate_point(internal, internal.top_center(), start_deg);
    let external_trail = rotate_point(external, external_lead, span_deg);

    let mut path = Path::new();
    path.move_to(external_lead);
    path.line_to(internal_lead);
    path.arc_to(internal, 90.0 - start_deg, -span_deg);
    path.line_to(external_trail);
    path.arc_to(external, 90.0 - start_deg - span_deg, span_deg);
    path
}
