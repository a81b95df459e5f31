//! A path together with per-node satellites.
//!
//! [`PathVectorSatellites`] owns a [`PathVector`] and, for each of its sub-paths, a
//! vector of satellites with one entry per node ([`SubPath::size_closed`]).  The
//! satellite type is generic; path effects use [`Satellite`].
//!
//! [`PathVectorSatellites::recalculate_for_new_path_vector`] and
//! [`PathVectorSatellites::sync_to_path_vector`] replace the path and keep the
//! satellites aligned with it.  The raw setters replace one side only.
//!
//! [`SubPath::size_closed`]: crate::path::SubPath::size_closed

use std::collections::HashSet;

use crate::error::ValueErrorKind;
use crate::path::{PathVector, Segment};
use crate::pathinfo::Pathinfo;
use crate::satellite::{satellites_from_str, satellites_to_string, Satellite, SatelliteType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathVectorSatellites<S> {
    path_vector: PathVector,
    satellites: Vec<Vec<S>>,
}

impl<S: Clone> PathVectorSatellites<S> {
    /// Creates a tracker for `path_vector` with every satellite set to `default`.
    pub fn new(path_vector: PathVector, default: S) -> Self {
        let mut pvs = PathVectorSatellites {
            path_vector: PathVector::default(),
            satellites: Vec::new(),
        };
        pvs.recalculate_for_new_path_vector(path_vector, default);
        pvs
    }

    /// Creates a tracker from a path and satellites that already match.
    ///
    /// The caller ensures that the satellites match the path's nodes.
    pub fn from_parts(path_vector: PathVector, satellites: Vec<Vec<S>>) -> Self {
        PathVectorSatellites {
            path_vector,
            satellites,
        }
    }

    pub fn path_vector(&self) -> &PathVector {
        &self.path_vector
    }

    /// Replaces the path without touching the satellites.
    ///
    /// The caller ensures that the satellites still match the path's nodes, or
    /// calls [`set_satellites`](Self::set_satellites) afterwards.
    pub fn set_path_vector(&mut self, path_vector: PathVector) {
        self.path_vector = path_vector;
    }

    pub fn satellites(&self) -> &[Vec<S>] {
        &self.satellites
    }

    /// Replaces the satellites without touching the path.
    ///
    /// The caller ensures that the satellites match the path's nodes.
    pub fn set_satellites(&mut self, satellites: Vec<Vec<S>>) {
        self.satellites = satellites;
    }

    /// Number of satellites over all sub-paths.
    pub fn total_satellites(&self) -> usize {
        self.satellites.iter().map(Vec::len).sum()
    }

    /// Whether every sub-path has exactly one satellite per node.
    pub fn is_consistent(&self) -> bool {
        self.satellites.len() == self.path_vector.len()
            && self
                .satellites
                .iter()
                .zip(self.path_vector.sub_paths())
                .all(|(sats, sub_path)| sats.len() == sub_path.size_closed())
    }

    /// Replaces the path and resets every satellite to `default`.
    ///
    /// Existing satellites are not carried over, even for sub-paths that did not change.
    pub fn recalculate_for_new_path_vector(&mut self, path_vector: PathVector, default: S) {
        let satellites = path_vector
            .sub_paths()
            .iter()
            .map(|sub_path| vec![default.clone(); sub_path.size_closed()])
            .collect();

        self.path_vector = path_vector;
        self.satellites = satellites;

        debug_assert!(self.is_consistent());
    }

    /// Replaces the path, resetting the satellites only if the number of nodes of any
    /// sub-path changed.
    ///
    /// Returns whether the satellites were reset.
    pub fn sync_to_path_vector(&mut self, path_vector: PathVector, default: S) -> bool {
        let same_shape = path_vector.len() == self.satellites.len()
            && path_vector
                .sub_paths()
                .iter()
                .zip(&self.satellites)
                .all(|(sub_path, sats)| sub_path.size_closed() == sats.len());

        if same_shape {
            self.path_vector = path_vector;
            false
        } else {
            self.recalculate_for_new_path_vector(path_vector, default);
            true
        }
    }

    /// Node lookups for this tracker's path.
    pub fn pathinfo(&self) -> Pathinfo {
        Pathinfo::new(&self.path_vector)
    }

    fn for_each_satellite_mut(&mut self, mut f: impl FnMut(&PathVector, usize, usize, &mut S)) {
        let path_vector = &self.path_vector;

        for (i, sats) in self.satellites.iter_mut().enumerate() {
            for (j, sat) in sats.iter_mut().enumerate() {
                f(path_vector, i, j, sat);
            }
        }
    }
}

/// Which satellites a bulk update applies to.
fn should_update(
    sat: &Satellite,
    apply_no_radius: bool,
    apply_with_radius: bool,
    only_selected: bool,
) -> bool {
    let has_radius = sat.amount != 0.0;

    if (!apply_no_radius && !has_radius) || (!apply_with_radius && has_radius) {
        return false;
    }

    !only_selected || sat.selected
}

fn is_open_start(path_vector: &PathVector, sub_path: usize, index: usize) -> bool {
    index == 0
        && path_vector
            .sub_paths()
            .get(sub_path)
            .map_or(false, |p| !p.is_closed())
}

fn is_open_end(path_vector: &PathVector, sub_path: usize, index: usize) -> bool {
    path_vector
        .sub_paths()
        .get(sub_path)
        .map_or(false, |p| !p.is_closed() && index == p.size_open())
}

/// How [`PathVectorSatellites::update_amount`] turns a radius into satellite amounts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AmountMode {
    /// The radius of the fillet; the amount is where it touches the outgoing segment.
    #[default]
    Radius,
    /// The radius is used as the length along the outgoing segment.
    KnotDistance,
    /// The radius is a percentage of the outgoing segment, stored as a curve time.
    Flexible,
}

// The segments that meet at node `index`: the one ending there and the one starting
// there.  The first node of a closed sub-path takes the closing segment as incoming.
fn corner_segments(
    path_vector: &PathVector,
    sub_path: usize,
    index: usize,
) -> Option<(Segment, Segment)> {
    let path = path_vector.sub_paths().get(sub_path)?;
    let curr = path.segment(index)?;

    let prev = if index == 0 {
        if !path.is_closed() {
            return None;
        }
        path.segment(path.size_closed().checked_sub(1)?)?
    } else {
        path.segment(index - 1)?
    };

    Some((prev, curr))
}

impl PathVectorSatellites<Satellite> {
    /// Marks the satellites at the given global node indices as selected, and all
    /// others as not selected.
    pub fn set_selected(&mut self, selected: &[usize]) {
        let selected: HashSet<usize> = selected.iter().copied().collect();
        let mut index = 0;

        self.for_each_satellite_mut(|_, _, _, sat| {
            sat.selected = selected.contains(&index);
            index += 1;
        });
    }

    /// Sets the amount of the matching satellites from `radius`, as chosen by `mode`.
    ///
    /// The first node of an open sub-path has no corner, so its amount is always reset
    /// to zero; the end node of an open sub-path is left alone.
    pub fn update_amount(
        &mut self,
        radius: f64,
        mode: AmountMode,
        apply_no_radius: bool,
        apply_with_radius: bool,
        only_selected: bool,
    ) {
        self.for_each_satellite_mut(|pv, i, j, sat| {
            if is_open_start(pv, i, j) {
                sat.amount = 0.0;
                return;
            }

            if is_open_end(pv, i, j)
                || !should_update(sat, apply_no_radius, apply_with_radius, only_selected)
            {
                return;
            }

            match mode {
                AmountMode::Radius => {
                    sat.is_time = false;
                    sat.amount = corner_segments(pv, i, j)
                        .map_or(0.0, |(prev, curr)| Satellite::rad_to_len(radius, &prev, &curr));
                }

                AmountMode::KnotDistance => {
                    sat.is_time = false;
                    sat.amount = radius;
                }

                AmountMode::Flexible => {
                    sat.is_time = true;
                    sat.amount = (radius / 100.0).clamp(0.0, 1.0);
                }
            }
        });
    }

    /// Sets the chamfer steps of the matching satellites.
    pub fn update_steps(
        &mut self,
        steps: u32,
        apply_no_radius: bool,
        apply_with_radius: bool,
        only_selected: bool,
    ) {
        self.for_each_satellite_mut(|_, _, _, sat| {
            if should_update(sat, apply_no_radius, apply_with_radius, only_selected) {
                sat.steps = steps;
            }
        });
    }

    /// Sets the type of the matching satellites.
    ///
    /// The end node of an open sub-path is not selectable, so it only changes when
    /// `only_selected` is false.
    pub fn update_satellite_type(
        &mut self,
        satellite_type: SatelliteType,
        apply_no_radius: bool,
        apply_with_radius: bool,
        only_selected: bool,
    ) {
        self.for_each_satellite_mut(|pv, i, j, sat| {
            if !should_update(sat, apply_no_radius, apply_with_radius, false) {
                return;
            }

            if is_open_end(pv, i, j) {
                if !only_selected {
                    sat.satellite_type = satellite_type;
                }
            } else if !only_selected || sat.selected {
                sat.satellite_type = satellite_type;
            }
        });
    }

    /// Scales length amounts, for when the path is transformed by a uniform-ish scale.
    pub fn scale_amounts(&mut self, factor: f64) {
        self.for_each_satellite_mut(|_, _, _, sat| sat.scale_amount(factor));
    }

    pub fn to_param_string(&self) -> String {
        satellites_to_string(&self.satellites)
    }

    /// Parses satellites written by [`to_param_string`](Self::to_param_string).
    pub fn satellites_from_param_str(s: &str) -> Result<Vec<Vec<Satellite>>, ValueErrorKind> {
        satellites_from_str(s)
    }
}
