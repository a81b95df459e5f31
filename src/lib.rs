//! Path-effect satellites and SVG filter primitives.
//!
//! This crate has two independent parts.
//!
//! # Satellites
//!
//! Path effects like fillet/chamfer keep data for every node of the path they modify.
//! [`PathVectorSatellites`] owns a [`PathVector`] together with one [`Satellite`] per
//! node, and keeps them aligned when the path is replaced.
//!
//! ```
//! use vectorfx::{AmountMode, PathVector, PathVectorSatellites, Satellite, SatelliteType};
//!
//! let path = PathVector::from_path_data("M 0 0 L 10 0 L 10 10 Z M 20 20 h 5 v 5 h -5 Z").unwrap();
//! let mut pvs = PathVectorSatellites::new(path, Satellite::new(SatelliteType::Fillet));
//! assert_eq!(pvs.total_satellites(), 7);
//!
//! // a fillet of radius 2 on a square corner touches 2 units from the node
//! pvs.update_amount(2.0, AmountMode::Radius, true, true, false);
//! assert!((pvs.satellites()[1][0].amount - 2.0).abs() < 1e-9);
//! ```
//!
//! # Filters
//!
//! A [`FilterDocument`] loads `<filter>` elements from XML.  Each [`Filter`] is turned
//! into a [`FilterSpec`] for a given viewport, and a [`FilterRenderer`] runs it over a
//! Cairo image surface.
//!
//! ```
//! use vectorfx::{FilterDocument, FilterRenderer, Session};
//! use vectorfx::length::NormalizeParams;
//! use vectorfx::rect::Rect;
//! use vectorfx::transform::Transform;
//!
//! let session = Session::new();
//! let doc = FilterDocument::load_from_str(
//!     r#"<filter id="shadow">
//!          <feOffset in="SourceAlpha" dx="2" dy="2" result="offset"/>
//!          <feMerge>
//!            <feMergeNode in="offset"/>
//!            <feMergeNode in="SourceGraphic"/>
//!          </feMerge>
//!        </filter>"#,
//!     &session,
//! )
//! .unwrap();
//!
//! let spec = doc
//!     .lookup("shadow")
//!     .unwrap()
//!     .to_filter_spec(&NormalizeParams::new(64.0, 64.0));
//!
//! let source = cairo::ImageSurface::create(cairo::Format::ARgb32, 64, 64).unwrap();
//! let output = FilterRenderer::new(&session)
//!     .render(&spec, &source, Transform::identity(), Some(Rect::new(8.0, 8.0, 56.0, 56.0)))
//!     .unwrap();
//! assert_eq!(output.width(), 64);
//! ```
//!
//! Set the `VECTORFX_LOG` environment variable to get log messages about loading and
//! rendering on stdout.

#![warn(nonstandard_style, rust_2018_idioms, unused)]
#![allow(clippy::too_many_arguments)]

pub use crate::document::FilterDocument;
pub use crate::error::{LoadingError, RenderingError};
pub use crate::filter::Filter;
pub use crate::filters::{FilterRenderer, FilterSpec};
pub use crate::path::{PathBuilder, PathVector, Segment, SubPath};
pub use crate::path_vector_satellites::{AmountMode, PathVectorSatellites};
pub use crate::pathinfo::Pathinfo;
pub use crate::satellite::{Satellite, SatelliteType};
pub use crate::session::Session;

pub mod color;
pub mod coord_units;
pub mod document;
mod element;
pub mod error;
pub mod filter;
pub mod filters;
pub mod length;
pub mod log;
pub mod path;
pub mod path_parser;
pub mod path_vector_satellites;
pub mod parsers;
pub mod pathinfo;
pub mod rect;
pub mod satellite;
pub mod session;
pub mod surface_utils;
pub mod transform;
mod util;
pub mod xml;
