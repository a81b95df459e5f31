//! Lookups from a global node index to its sub-path.
//!
//! Satellites are addressed either per sub-path or with a single index running over
//! all the nodes of a [`PathVector`] in order.  [`Pathinfo`] maps the latter to the
//! former.

use std::ops::Range;

use crate::path::PathVector;

/// Node ranges of each sub-path, in global indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pathinfo {
    sub_paths: Vec<(Range<usize>, bool)>,
}

impl Pathinfo {
    pub fn new(path_vector: &PathVector) -> Pathinfo {
        let mut start = 0;

        let sub_paths = path_vector
            .sub_paths()
            .iter()
            .map(|p| {
                let range = start..start + p.size_closed();
                start = range.end;
                (range, p.is_closed())
            })
            .collect();

        Pathinfo { sub_paths }
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.sub_paths.last().map_or(0, |(r, _)| r.end)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, index: usize) -> Option<(usize, &Range<usize>, bool)> {
        self.sub_paths
            .iter()
            .enumerate()
            .find(|(_, (r, _))| r.contains(&index))
            .map(|(i, (r, closed))| (i, r, *closed))
    }

    /// Index of the sub-path that contains node `index`.
    pub fn sub_path_index(&self, index: usize) -> Option<usize> {
        self.find(index).map(|(i, _, _)| i)
    }

    /// First node of the sub-path that contains `index`.
    pub fn first(&self, index: usize) -> Option<usize> {
        self.find(index).map(|(_, r, _)| r.start)
    }

    /// Last node of the sub-path that contains `index`.
    pub fn last(&self, index: usize) -> Option<usize> {
        self.find(index).map(|(_, r, _)| r.end - 1)
    }

    pub fn is_closed(&self, index: usize) -> Option<bool> {
        self.find(index).map(|(_, _, closed)| closed)
    }

    /// The node after `index`, wrapping around closed sub-paths.
    ///
    /// Returns `None` past the end of an open sub-path.
    pub fn next(&self, index: usize) -> Option<usize> {
        let (_, r, closed) = self.find(index)?;

        if index + 1 < r.end {
            Some(index + 1)
        } else if closed {
            Some(r.start)
        } else {
            None
        }
    }

    /// The node before `index`, wrapping around closed sub-paths.
    ///
    /// Returns `None` before the start of an open sub-path.
    pub fn previous(&self, index: usize) -> Option<usize> {
        let (_, r, closed) = self.find(index)?;

        if index > r.start {
            Some(index - 1)
        } else if closed {
            Some(r.end - 1)
        } else {
            None
        }
    }

    /// Splits a global index into a sub-path index and a node index within it.
    pub fn local_index(&self, index: usize) -> Option<(usize, usize)> {
        self.find(index).map(|(i, r, _)| (i, index - r.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(data: &str) -> Pathinfo {
        Pathinfo::new(&PathVector::from_path_data(data).unwrap())
    }

    #[test]
    fn maps_indices_to_subpaths() {
        // 3 nodes closed, then 3 nodes open
        let pi = info("M 0 0 L 1 0 L 1 1 Z M 5 5 L 6 5 L 6 6");

        assert_eq!(pi.len(), 6);
        assert_eq!(pi.sub_path_index(2), Some(0));
        assert_eq!(pi.sub_path_index(3), Some(1));
        assert_eq!(pi.first(5), Some(3));
        assert_eq!(pi.last(0), Some(2));
        assert_eq!(pi.last(4), Some(5));
        assert_eq!(pi.is_closed(1), Some(true));
        assert_eq!(pi.is_closed(6), None);
        assert_eq!(pi.local_index(4), Some((1, 1)));
    }

    #[test]
    fn wraps_only_closed_subpaths() {
        let pi = info("M 0 0 L 1 0 L 1 1 Z M 5 5 L 6 5");

        assert_eq!(pi.next(2), Some(0));
        assert_eq!(pi.previous(0), Some(2));
        assert_eq!(pi.next(0), Some(1));

        assert_eq!(pi.previous(3), None);
        assert_eq!(pi.next(3), Some(4));
        assert_eq!(pi.next(4), None);
    }

    #[test]
    fn out_of_range_is_none() {
        let pi = info("M 0 0 L 1 0");

        assert_eq!(pi.sub_path_index(2), None);
        assert_eq!(pi.first(100), None);
        assert_eq!(pi.last(2), None);
        assert_eq!(pi.next(2), None);
        assert_eq!(pi.previous(2), None);

        assert!(Pathinfo::new(&PathVector::default()).is_empty());
    }

    #[test]
    fn empty_subpaths_take_no_indices() {
        let pi = info("M 9 9 M 0 0 L 1 0");

        assert_eq!(pi.len(), 2);
        assert_eq!(pi.sub_path_index(0), Some(1));
    }
}
