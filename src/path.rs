//! Paths made of line and cubic Bézier segments.
//!
//! A [`PathVector`] is a list of [`SubPath`]s, each one a start point followed by
//! connected [`Segment`]s.  Paths are constructed with a [`PathBuilder`], either by
//! pushing commands or by parsing SVG path data.
//!
//! Path effects attach per-node data to paths; the nodes of a sub-path are the start
//! points of its segments plus, when the sub-path does not end where it started, the
//! start of the closing line back to the first node.  [`SubPath::size_closed`] counts
//! them.

use float_cmp::approx_eq;

use crate::path_parser::{ParseError, PathParser};
use crate::util::clamp;

pub type Point = (f64, f64);

// Distance under which two points are considered the same node.
const NODE_EPSILON: f64 = 1e-6;

// Maximum difference between a cubic's control polygon and its chord for the
// cubic to be measured as flat.
const FLATNESS: f64 = 1e-4;

const MAX_SUBDIVISION_DEPTH: u32 = 16;

fn points_are_near(a: Point, b: Point) -> bool {
    approx_eq!(f64, a.0, b.0, epsilon = NODE_EPSILON) && approx_eq!(f64, a.1, b.1, epsilon = NODE_EPSILON)
}

fn distance(a: Point, b: Point) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// One piece of a sub-path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Segment {
    Line {
        from: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
}

impl Segment {
    pub fn start(&self) -> Point {
        match *self {
            Segment::Line { from, .. } | Segment::Cubic { from, .. } => from,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { to, .. } | Segment::Cubic { to, .. } => to,
        }
    }

    /// Whether the segment has no extent at all.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Segment::Line { from, to } => points_are_near(from, to),
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                points_are_near(from, ctrl1)
                    && points_are_near(from, ctrl2)
                    && points_are_near(from, to)
            }
        }
    }

    /// Evaluates the segment at curve time `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        match *self {
            Segment::Line { from, to } => lerp(from, to, t),

            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let mt = 1.0 - t;
                let a = mt * mt * mt;
                let b = 3.0 * mt * mt * t;
                let c = 3.0 * mt * t * t;
                let d = t * t * t;

                (
                    a * from.0 + b * ctrl1.0 + c * ctrl2.0 + d * to.0,
                    a * from.1 + b * ctrl1.1 + c * ctrl2.1 + d * to.1,
                )
            }
        }
    }

    /// Unit direction of travel at curve time `t`, or `(0.0, 0.0)` for a point.
    ///
    /// Where a cubic's derivative vanishes, as at a control point that coincides with
    /// its end point, the direction is taken from the chord of a short piece around `t`.
    pub fn unit_tangent_at(&self, t: f64) -> Point {
        let d = match *self {
            Segment::Line { from, to } => (to.0 - from.0, to.1 - from.1),

            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let mt = 1.0 - t;
                let a = 3.0 * mt * mt;
                let b = 6.0 * mt * t;
                let c = 3.0 * t * t;

                (
                    a * (ctrl1.0 - from.0) + b * (ctrl2.0 - ctrl1.0) + c * (to.0 - ctrl2.0),
                    a * (ctrl1.1 - from.1) + b * (ctrl2.1 - ctrl1.1) + c * (to.1 - ctrl2.1),
                )
            }
        };

        let d = if d.0.hypot(d.1) > NODE_EPSILON {
            d
        } else {
            let p = self.point_at(clamp(t - 1e-3, 0.0, 1.0));
            let q = self.point_at(clamp(t + 1e-3, 0.0, 1.0));
            (q.0 - p.0, q.1 - p.1)
        };

        let len = d.0.hypot(d.1);
        if len > 0.0 {
            (d.0 / len, d.1 / len)
        } else {
            (0.0, 0.0)
        }
    }

    /// Splits the segment at curve time `t`.
    pub fn split(&self, t: f64) -> (Segment, Segment) {
        match *self {
            Segment::Line { from, to } => {
                let mid = lerp(from, to, t);
                (
                    Segment::Line { from, to: mid },
                    Segment::Line { from: mid, to },
                )
            }

            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                // de Casteljau
                let p01 = lerp(from, ctrl1, t);
                let p12 = lerp(ctrl1, ctrl2, t);
                let p23 = lerp(ctrl2, to, t);
                let p012 = lerp(p01, p12, t);
                let p123 = lerp(p12, p23, t);
                let mid = lerp(p012, p123, t);

                (
                    Segment::Cubic {
                        from,
                        ctrl1: p01,
                        ctrl2: p012,
                        to: mid,
                    },
                    Segment::Cubic {
                        from: mid,
                        ctrl1: p123,
                        ctrl2: p23,
                        to,
                    },
                )
            }
        }
    }

    /// Arc length of the segment.
    pub fn length(&self) -> f64 {
        match *self {
            Segment::Line { from, to } => distance(from, to),
            Segment::Cubic { .. } => self.flattened_length(0),
        }
    }

    fn flattened_length(&self, depth: u32) -> f64 {
        let Segment::Cubic {
            from,
            ctrl1,
            ctrl2,
            to,
        } = *self
        else {
            return self.length();
        };

        let chord = distance(from, to);
        let polygon = distance(from, ctrl1) + distance(ctrl1, ctrl2) + distance(ctrl2, to);

        if polygon - chord <= FLATNESS || depth >= MAX_SUBDIVISION_DEPTH {
            // For a flat cubic the arc length lies between the chord and the
            // control polygon.
            (polygon + chord) / 2.0
        } else {
            let (a, b) = self.split(0.5);
            a.flattened_length(depth + 1) + b.flattened_length(depth + 1)
        }
    }

    /// Arc length from the start of the segment to curve time `t`.
    pub fn length_at_time(&self, t: f64) -> f64 {
        let t = clamp(t, 0.0, 1.0);

        if t == 0.0 {
            0.0
        } else if t == 1.0 {
            self.length()
        } else {
            match *self {
                Segment::Line { .. } => t * self.length(),
                Segment::Cubic { .. } => self.split(t).0.length(),
            }
        }
    }

    /// Curve time at which the arc length from the start reaches `len`.
    ///
    /// Lengths past the end of the segment give `1.0`; zero or negative lengths give
    /// `0.0`.
    pub fn time_at_length(&self, len: f64) -> f64 {
        if len <= 0.0 {
            return 0.0;
        }

        let total = self.length();
        if total == 0.0 || len >= total {
            return 1.0;
        }

        match *self {
            Segment::Line { .. } => len / total,

            Segment::Cubic { .. } => {
                let (mut lo, mut hi) = (0.0, 1.0);

                for _ in 0..48 {
                    let mid = (lo + hi) / 2.0;
                    if self.length_at_time(mid) < len {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }

                (lo + hi) / 2.0
            }
        }
    }

    /// Curve time of the point on the segment closest to `p`.
    pub fn nearest_time(&self, p: Point) -> f64 {
        match *self {
            Segment::Line { from, to } => {
                let (dx, dy) = (to.0 - from.0, to.1 - from.1);
                let len2 = dx * dx + dy * dy;

                if len2 == 0.0 {
                    0.0
                } else {
                    clamp(((p.0 - from.0) * dx + (p.1 - from.1) * dy) / len2, 0.0, 1.0)
                }
            }

            Segment::Cubic { .. } => {
                const SAMPLES: u32 = 32;

                let dist2 = |t: f64| {
                    let q = self.point_at(t);
                    (q.0 - p.0).powi(2) + (q.1 - p.1).powi(2)
                };

                let best = (0..=SAMPLES)
                    .map(|i| f64::from(i) / f64::from(SAMPLES))
                    .fold((0.0, f64::INFINITY), |(bt, bd), t| {
                        let d = dist2(t);
                        if d < bd {
                            (t, d)
                        } else {
                            (bt, bd)
                        }
                    })
                    .0;

                // Ternary search in the neighborhood of the best sample.
                let step = 1.0 / f64::from(SAMPLES);
                let (mut lo, mut hi) = ((best - step).max(0.0), (best + step).min(1.0));

                for _ in 0..40 {
                    let m1 = lo + (hi - lo) / 3.0;
                    let m2 = hi - (hi - lo) / 3.0;
                    if dist2(m1) < dist2(m2) {
                        hi = m2;
                    } else {
                        lo = m1;
                    }
                }

                (lo + hi) / 2.0
            }
        }
    }
}

/// A start point and the segments that follow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubPath {
    start: Point,
    segments: Vec<Segment>,
    closed: bool,
}

impl SubPath {
    /// Creates a sub-path from connected segments.
    ///
    /// `start` is only used when `segments` is empty; otherwise the sub-path starts
    /// where its first segment starts.
    pub fn new(start: Point, segments: Vec<Segment>, closed: bool) -> SubPath {
        let start = segments.first().map_or(start, Segment::start);

        SubPath {
            start,
            segments,
            closed,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.segments.last().map_or(self.start, Segment::end)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of stored segments, not counting the closing line.
    pub fn size_open(&self) -> usize {
        self.segments.len()
    }

    /// The line from the end point back to the start point, if it has any length.
    pub fn closing_segment(&self) -> Option<Segment> {
        let (from, to) = (self.end(), self.start);

        if points_are_near(from, to) {
            None
        } else {
            Some(Segment::Line { from, to })
        }
    }

    /// Number of nodes: the stored segments plus a non-degenerate closing line.
    ///
    /// For an open sub-path whose ends differ, the extra entry stands for its end node.
    pub fn size_closed(&self) -> usize {
        self.size_open() + usize::from(self.closing_segment().is_some())
    }

    /// The stored segments followed by the closing line, if it is not degenerate.
    pub fn closed_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.segments
            .iter()
            .copied()
            .chain(self.closing_segment())
    }

    /// The segment starting at node `index`, counting the closing line.
    pub fn segment(&self, index: usize) -> Option<Segment> {
        match self.segments.get(index) {
            Some(seg) => Some(*seg),
            None if index == self.size_open() => self.closing_segment(),
            None => None,
        }
    }
}

/// An ordered list of sub-paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathVector {
    sub_paths: Vec<SubPath>,
}

impl PathVector {
    pub fn new(sub_paths: Vec<SubPath>) -> PathVector {
        PathVector { sub_paths }
    }

    /// Parses SVG path data with `M L H V C Z` commands, absolute or relative.
    pub fn from_path_data(s: &str) -> Result<PathVector, ParseError> {
        let mut builder = PathBuilder::default();
        builder.parse(s)?;
        Ok(builder.into_path_vector())
    }

    pub fn sub_paths(&self) -> &[SubPath] {
        &self.sub_paths
    }

    pub fn len(&self) -> usize {
        self.sub_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_paths.is_empty()
    }

    /// The closed segment list of each sub-path.
    pub fn segments(&self) -> Vec<Vec<Segment>> {
        self.sub_paths
            .iter()
            .map(|p| p.closed_segments().collect())
            .collect()
    }

    /// Segment `index` of sub-path `sub_path`, counting closing lines.
    pub fn segment(&self, sub_path: usize, index: usize) -> Option<Segment> {
        self.sub_paths.get(sub_path)?.segment(index)
    }

    /// Sum of [`SubPath::size_closed`] over all sub-paths.
    pub fn size_closed(&self) -> usize {
        self.sub_paths.iter().map(SubPath::size_closed).sum()
    }
}

/// "c" command for paths; describes a cubic Bézier segment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CubicBezierCurve {
    /// The (x, y) coordinates of the first control point.
    pub pt1: Point,
    /// The (x, y) coordinates of the second control point.
    pub pt2: Point,
    /// The (x, y) coordinates of the end point of this path segment.
    pub to: Point,
}

/// One of the basic commands that a [`PathBuilder`] accumulates.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(CubicBezierCurve),
    ClosePath,
}

/// Constructs a [`PathVector`] from commands.
#[derive(Default)]
pub struct PathBuilder {
    path_commands: Vec<PathCommand>,
}

#[derive(Default)]
struct OpenSubPath {
    start: Point,
    segments: Vec<Segment>,
}

impl PathBuilder {
    pub fn parse(&mut self, path_str: &str) -> Result<(), ParseError> {
        let mut parser = PathParser::new(self, path_str);
        parser.parse()
    }

    /// Consumes the builder and splits the commands into sub-paths.
    ///
    /// A drawing command right after a close path starts a new sub-path at the start
    /// point of the closed one.
    pub fn into_path_vector(self) -> PathVector {
        let mut sub_paths = Vec::new();
        let mut open: Option<OpenSubPath> = None;
        let mut current = (0.0, 0.0);
        let mut subpath_start = (0.0, 0.0);

        for cmd in self.path_commands {
            match cmd {
                PathCommand::MoveTo(x, y) => {
                    if let Some(p) = open.take() {
                        sub_paths.push(SubPath::new(p.start, p.segments, false));
                    }

                    current = (x, y);
                    subpath_start = current;
                    open = Some(OpenSubPath {
                        start: current,
                        segments: Vec::new(),
                    });
                }

                PathCommand::LineTo(x, y) => {
                    let p = open.get_or_insert_with(|| OpenSubPath {
                        start: current,
                        segments: Vec::new(),
                    });

                    p.segments.push(Segment::Line {
                        from: current,
                        to: (x, y),
                    });
                    current = (x, y);
                }

                PathCommand::CurveTo(curve) => {
                    let p = open.get_or_insert_with(|| OpenSubPath {
                        start: current,
                        segments: Vec::new(),
                    });

                    p.segments.push(Segment::Cubic {
                        from: current,
                        ctrl1: curve.pt1,
                        ctrl2: curve.pt2,
                        to: curve.to,
                    });
                    current = curve.to;
                }

                PathCommand::ClosePath => {
                    let p = open.take().unwrap_or(OpenSubPath {
                        start: current,
                        segments: Vec::new(),
                    });

                    sub_paths.push(SubPath::new(p.start, p.segments, true));
                    current = subpath_start;
                }
            }
        }

        if let Some(p) = open {
            sub_paths.push(SubPath::new(p.start, p.segments, false));
        }

        PathVector::new(sub_paths)
    }

    /// Adds a MoveTo command to the path.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.path_commands.push(PathCommand::MoveTo(x, y));
    }

    /// Adds a LineTo command to the path.
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.path_commands.push(PathCommand::LineTo(x, y));
    }

    /// Adds a CurveTo command to the path.
    pub fn curve_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        let curve = CubicBezierCurve {
            pt1: (x2, y2),
            pt2: (x3, y3),
            to: (x4, y4),
        };
        self.path_commands.push(PathCommand::CurveTo(curve));
    }

    /// Adds a ClosePath command to the path.
    pub fn close_path(&mut self) {
        self.path_commands.push(PathCommand::ClosePath);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PathVector {
        PathVector::from_path_data(s).unwrap()
    }

    fn quarter_circle() -> Segment {
        // Cubic approximation of a quarter of the unit circle.
        const K: f64 = 0.552_284_749_8;
        Segment::Cubic {
            from: (1.0, 0.0),
            ctrl1: (1.0, K),
            ctrl2: (K, 1.0),
            to: (0.0, 1.0),
        }
    }

    #[test]
    fn open_subpath_counts_its_end_node() {
        let pv = path("M 0 0 L 10 0 L 10 10");
        let sub = &pv.sub_paths()[0];

        assert_eq!(sub.size_open(), 2);
        assert_eq!(sub.size_closed(), 3);
        assert_eq!(
            sub.segment(2),
            Some(Segment::Line {
                from: (10.0, 10.0),
                to: (0.0, 0.0)
            })
        );
        assert_eq!(sub.segment(3), None);
    }

    #[test]
    fn closed_subpath_adds_closing_line() {
        let pv = path("M 0 0 L 10 0 L 10 10 Z");
        assert_eq!(pv.sub_paths()[0].size_closed(), 3);
        assert_eq!(pv.segments()[0].len(), 3);
    }

    #[test]
    fn degenerate_closing_line_is_not_counted() {
        let pv = path("M 0 0 L 10 0 L 10 10 L 0 0 Z");
        let sub = &pv.sub_paths()[0];

        assert_eq!(sub.size_open(), 3);
        assert_eq!(sub.size_closed(), 3);
        assert!(sub.closing_segment().is_none());

        let open_loop = path("M 0 0 L 10 0 L 0 0");
        assert_eq!(open_loop.sub_paths()[0].size_closed(), 2);
    }

    #[test]
    fn moveto_only_subpath_is_empty() {
        let pv = path("M 5 5 M 0 0 L 1 1");

        assert_eq!(pv.len(), 2);
        assert_eq!(pv.sub_paths()[0].start(), (5.0, 5.0));
        assert_eq!(pv.sub_paths()[0].size_closed(), 0);
        assert_eq!(pv.size_closed(), 2);
    }

    #[test]
    fn builder_starts_implicit_subpath_after_close() {
        let mut builder = PathBuilder::default();
        builder.move_to(1.0, 1.0);
        builder.line_to(4.0, 1.0);
        builder.close_path();
        builder.line_to(1.0, 5.0);

        let pv = builder.into_path_vector();
        assert_eq!(pv.len(), 2);
        assert_eq!(pv.sub_paths()[1].start(), (1.0, 1.0));
        assert!(!pv.sub_paths()[1].is_closed());
    }

    #[test]
    fn line_lengths_and_times() {
        let seg = Segment::Line {
            from: (0.0, 0.0),
            to: (3.0, 4.0),
        };

        assert_eq!(seg.length(), 5.0);
        assert_eq!(seg.time_at_length(2.5), 0.5);
        assert_eq!(seg.time_at_length(10.0), 1.0);
        assert_eq!(seg.time_at_length(-1.0), 0.0);
        assert_eq!(seg.length_at_time(0.2), 1.0);
        assert_eq!(seg.nearest_time((3.0, 0.0)), 9.0 / 25.0);
        assert_eq!(seg.nearest_time((-5.0, -5.0)), 0.0);
    }

    #[test]
    fn cubic_length_is_close_to_arc() {
        let seg = quarter_circle();
        let expected = std::f64::consts::FRAC_PI_2;

        assert!((seg.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn cubic_time_and_length_are_inverse() {
        let seg = quarter_circle();
        let len = seg.length_at_time(0.3);
        let t = seg.time_at_length(len);

        assert!((t - 0.3).abs() < 1e-3, "t = {t}");
    }

    #[test]
    fn cubic_nearest_time_finds_point_on_curve() {
        let seg = quarter_circle();
        let target = seg.point_at(0.7);
        let t = seg.nearest_time((target.0 * 1.5, target.1 * 1.5));

        assert!((t - 0.7).abs() < 5e-3, "t = {t}");
    }

    #[test]
    fn split_preserves_endpoints() {
        let seg = quarter_circle();
        let (a, b) = seg.split(0.25);

        assert_eq!(a.start(), seg.start());
        assert_eq!(b.end(), seg.end());
        assert_eq!(a.end(), b.start());

        let p = seg.point_at(0.25);
        assert!(points_are_near(a.end(), p));
    }
}
