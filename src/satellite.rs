//! Per-node data for the fillet and chamfer path effects.
//!
//! A [`Satellite`] sits on a path node and describes how the corner at that node is
//! rounded or cut.  Its `amount` is either a distance along the segment that starts at
//! the node, or a curve time on that segment, depending on `is_time`.
//!
//! Satellites are stored as text in the effect's parameters.  One satellite is written
//! as eight comma-separated fields:
//!
//! ```text
//! type,is_time,selected,has_mirror,hidden,amount,angle,steps
//! ```
//!
//! The satellites of a sub-path are joined with `" @ "`, and sub-paths with `" | "`:
//!
//! ```
//! # use vectorfx::satellite::{satellites_from_str, Satellite, SatelliteType};
//! let satellites = satellites_from_str("F,0,0,1,0,2.5,0,0 @ C,1,0,0,0,0.5,0,3 | KO,0,0,0,1,0,0,0").unwrap();
//! assert_eq!(satellites.len(), 2);
//! assert_eq!(satellites[0][1].satellite_type, SatelliteType::Chamfer);
//! assert_eq!(satellites[0][1].steps, 3);
//! ```

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::ValueErrorKind;
use crate::path::{Point, Segment};

/// How the corner at a node is modified.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SatelliteType {
    #[default]
    Fillet,
    InverseFillet,
    Chamfer,
    InverseChamfer,
    Ko,
}

impl SatelliteType {
    fn as_str(self) -> &'static str {
        match self {
            SatelliteType::Fillet => "F",
            SatelliteType::InverseFillet => "IF",
            SatelliteType::Chamfer => "C",
            SatelliteType::InverseChamfer => "IC",
            SatelliteType::Ko => "KO",
        }
    }
}

impl fmt::Display for SatelliteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SatelliteType {
    type Err = ValueErrorKind;

    fn from_str(s: &str) -> Result<SatelliteType, ValueErrorKind> {
        match s {
            "F" => Ok(SatelliteType::Fillet),
            "IF" => Ok(SatelliteType::InverseFillet),
            "C" => Ok(SatelliteType::Chamfer),
            "IC" => Ok(SatelliteType::InverseChamfer),
            "KO" => Ok(SatelliteType::Ko),
            _ => Err(ValueErrorKind::Parse(format!("unknown satellite type \"{s}\""))),
        }
    }
}

/// The fillet/chamfer data attached to one path node.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Satellite {
    pub satellite_type: SatelliteType,
    /// `amount` is a curve time in `[0, 1]` instead of a length.
    pub is_time: bool,
    pub selected: bool,
    pub has_mirror: bool,
    pub hidden: bool,
    pub amount: f64,
    pub angle: f64,
    pub steps: u32,
}

impl Satellite {
    pub fn new(satellite_type: SatelliteType) -> Satellite {
        Satellite {
            satellite_type,
            ..Default::default()
        }
    }

    /// The amount as a curve time on `segment`, at most `1.0`.
    pub fn time(&self, segment: &Segment) -> f64 {
        let t = if self.is_time {
            self.amount
        } else {
            segment.time_at_length(self.amount)
        };

        t.min(1.0)
    }

    /// The amount as a length along `segment`.
    pub fn size(&self, segment: &Segment) -> f64 {
        if self.is_time {
            segment.length_at_time(self.amount)
        } else {
            self.amount
        }
    }

    /// Where the satellite's knot sits on `segment`.
    pub fn position(&self, segment: &Segment) -> Point {
        segment.point_at(self.time(segment))
    }

    /// Moves the satellite to the point on `segment` nearest to `p`.
    pub fn set_position(&mut self, p: Point, segment: &Segment) {
        let t = segment.nearest_time(p);

        self.amount = if self.is_time {
            t
        } else {
            segment.length_at_time(t)
        };
    }

    /// Scales a length amount; time amounts and zero amounts are left alone.
    pub fn scale_amount(&mut self, factor: f64) {
        if !self.is_time && self.amount > 0.0 {
            self.amount *= factor;
        }
    }

    /// Distance along `curr` from the corner to where a fillet of `radius` touches it.
    ///
    /// The corner is the point where `prev` ends and `curr` starts.  Between two lines
    /// this is `radius / tan(θ / 2)` for the corner angle `θ`.  Otherwise the fillet's
    /// center is found where the curves, offset by `radius`, cross; if they do not
    /// cross on one side, the other side is tried.  Returns `0.0` when there is no
    /// such fillet.
    pub fn rad_to_len(radius: f64, prev: &Segment, curr: &Segment) -> f64 {
        if radius == 0.0 || prev.is_degenerate() || curr.is_degenerate() {
            return 0.0;
        }

        if let (Segment::Line { .. }, Segment::Line { .. }) = (prev, curr) {
            let corner = corner_angle(prev.unit_tangent_at(1.0), curr.unit_tangent_at(0.0));
            let len = radius.abs() / (corner / 2.0).tan();

            return if len.is_finite() { len.max(0.0) } else { 0.0 };
        }

        offset_crossing(prev, curr, radius)
            .or_else(|| offset_crossing(prev, curr, -radius))
            .map_or(0.0, |center| curr.length_at_time(curr.nearest_time(center)))
    }

    /// Radius of the fillet that touches `curr` at distance `len` from the corner, and
    /// `prev` at the same distance from its end.
    pub fn len_to_rad(len: f64, prev: &Segment, curr: &Segment) -> f64 {
        if len <= 0.0 || prev.is_degenerate() || curr.is_degenerate() {
            return 0.0;
        }

        let time_in = prev.time_at_length(prev.length() - len);
        let time_out = curr.time_at_length(len);

        let start = prev.point_at(time_in);
        let end = curr.point_at(time_out);

        let corner = corner_angle(prev.unit_tangent_at(time_in), curr.unit_tangent_at(time_out));
        let turn = std::f64::consts::PI - corner;
        let divisor = (turn / 2.0).sin();

        if divisor > 0.0 {
            (end.0 - start.0).hypot(end.1 - start.1) / 2.0 / divisor
        } else {
            0.0
        }
    }
}

// Angle between the incoming and the outgoing direction at a corner, in [0, π]; a
// straight continuation gives π.
fn corner_angle(incoming: Point, outgoing: Point) -> f64 {
    let (bx, by) = (-incoming.0, -incoming.1);
    let cross = bx * outgoing.1 - by * outgoing.0;
    let dot = bx * outgoing.0 + by * outgoing.1;

    cross.abs().atan2(dot)
}

const OFFSET_SAMPLES: u32 = 64;

fn offset_polyline(segment: &Segment, distance: f64) -> Vec<Point> {
    (0..=OFFSET_SAMPLES)
        .map(|i| {
            let t = f64::from(i) / f64::from(OFFSET_SAMPLES);
            let p = segment.point_at(t);
            let (tx, ty) = segment.unit_tangent_at(t);

            (p.0 - ty * distance, p.1 + tx * distance)
        })
        .collect()
}

fn polyline_crossing(a: &[Point], b: &[Point]) -> Option<Point> {
    a.windows(2)
        .cartesian_product(b.windows(2))
        .find_map(|(p, q)| line_crossing(p[0], p[1], q[0], q[1]))
}

fn line_crossing(p0: Point, p1: Point, q0: Point, q1: Point) -> Option<Point> {
    let r = (p1.0 - p0.0, p1.1 - p0.1);
    let s = (q1.0 - q0.0, q1.1 - q0.1);
    let denom = r.0 * s.1 - r.1 * s.0;

    if denom.abs() < f64::EPSILON {
        return None;
    }

    let w = (q0.0 - p0.0, q0.1 - p0.1);
    let t = (w.0 * s.1 - w.1 * s.0) / denom;
    let u = (w.0 * r.1 - w.1 * r.0) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((p0.0 + r.0 * t, p0.1 + r.1 * t))
    } else {
        None
    }
}

// Center of a fillet of `radius`, on the side of the corner given by its sign.
fn offset_crossing(prev: &Segment, curr: &Segment, radius: f64) -> Option<Point> {
    polyline_crossing(
        &offset_polyline(prev, radius),
        &offset_polyline(curr, radius),
    )
}

fn parse_flag(s: &str) -> Result<bool, ValueErrorKind> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ValueErrorKind::Parse(format!("expected 0 or 1, found \"{s}\""))),
    }
}

fn parse_number<T: FromStr>(s: &str) -> Result<T, ValueErrorKind> {
    s.parse()
        .map_err(|_| ValueErrorKind::Parse(format!("invalid number \"{s}\"")))
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.satellite_type,
            u8::from(self.is_time),
            u8::from(self.selected),
            u8::from(self.has_mirror),
            u8::from(self.hidden),
            self.amount,
            self.angle,
            self.steps
        )
    }
}

impl FromStr for Satellite {
    type Err = ValueErrorKind;

    fn from_str(s: &str) -> Result<Satellite, ValueErrorKind> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();

        let [satellite_type, is_time, selected, has_mirror, hidden, amount, angle, steps] =
            fields[..]
        else {
            return Err(ValueErrorKind::Parse(format!(
                "expected 8 satellite fields, found {}",
                fields.len()
            )));
        };

        Ok(Satellite {
            satellite_type: satellite_type.parse()?,
            is_time: parse_flag(is_time)?,
            selected: parse_flag(selected)?,
            has_mirror: parse_flag(has_mirror)?,
            hidden: parse_flag(hidden)?,
            amount: parse_number(amount)?,
            angle: parse_number(angle)?,
            steps: parse_number(steps)?,
        })
    }
}

/// Serializes satellites grouped by sub-path.
pub fn satellites_to_string(satellites: &[Vec<Satellite>]) -> String {
    satellites
        .iter()
        .map(|sub_path| sub_path.iter().join(" @ "))
        .join(" | ")
}

/// Parses the output of [`satellites_to_string`].
///
/// An empty or blank string has no sub-paths; an empty group between two `|` is a
/// sub-path without satellites.
pub fn satellites_from_str(s: &str) -> Result<Vec<Vec<Satellite>>, ValueErrorKind> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }

    s.split('|')
        .map(|group| {
            let group = group.trim();

            if group.is_empty() {
                Ok(Vec::new())
            } else {
                group.split('@').map(|sat| sat.trim().parse()).collect()
            }
        })
        .collect()
}
