use std::collections::HashMap;

use crate::coord_units::CoordUnits;
use crate::filter::UserSpaceFilter;
use crate::parsers::CustomIdent;
use crate::rect::{IRect, Rect};
use crate::session::Session;
use crate::surface_utils::shared_surface::{SharedImageSurface, SurfaceType};
use crate::transform::Transform;

use super::error::FilterError;
use super::{ColorInterpolationFilters, SlotRef, StandardInput};

/// A filter primitive output.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// The surface after the filter primitive was applied.
    pub surface: SharedImageSurface,

    /// The filter primitive subregion.
    pub bounds: IRect,
}

/// An input to a filter primitive.
#[derive(Debug, Clone)]
pub enum FilterInput {
    /// One of the standard inputs.
    StandardInput(SharedImageSurface),
    /// Output of another filter primitive.
    PrimitiveOutput(FilterOutput),
}

/// Surfaces available to the `SourceGraphic`, `BackgroundImage`, `FillPaint` and
/// `StrokePaint` inputs.  The optional ones read as transparent black when unset.
#[derive(Clone)]
pub struct StandardInputs {
    pub source_graphic: SharedImageSurface,
    pub background_image: Option<SharedImageSurface>,
    pub fill_paint: Option<SharedImageSurface>,
    pub stroke_paint: Option<SharedImageSurface>,
}

/// The slot table for one filter invocation.
///
/// Slot `i` holds the output of primitive `i`, or nothing if that primitive failed.
/// Named results point at the latest slot stored under that name.
pub struct FilterSlots {
    inputs: StandardInputs,

    /// Read for empty slots, missing names and unset standard inputs.
    transparent: SharedImageSurface,

    /// Area in which standard inputs are considered valid, in device pixels.
    region: IRect,

    outputs: Vec<Option<FilterOutput>>,
    names: HashMap<String, usize>,
}

impl FilterSlots {
    pub fn new(inputs: StandardInputs, region: IRect) -> Result<FilterSlots, cairo::Error> {
        let transparent = SharedImageSurface::empty(
            inputs.source_graphic.width(),
            inputs.source_graphic.height(),
            SurfaceType::AlphaOnly,
        )?;

        Ok(FilterSlots {
            inputs,
            transparent,
            region,
            outputs: Vec::new(),
            names: HashMap::new(),
        })
    }

    fn transparent_input(&self) -> FilterInput {
        FilterInput::StandardInput(self.transparent.clone())
    }

    fn standard_or_transparent(&self, surface: &Option<SharedImageSurface>) -> FilterInput {
        match *surface {
            Some(ref s) => FilterInput::StandardInput(s.clone()),
            None => self.transparent_input(),
        }
    }

    fn alpha_of(&self, surface: &Option<SharedImageSurface>) -> Result<FilterInput, FilterError> {
        match *surface {
            Some(ref s) => Ok(FilterInput::StandardInput(s.extract_alpha(self.region)?)),
            None => Ok(self.transparent_input()),
        }
    }

    /// Reads the surface a slot reference points at.
    pub fn get(&self, slot: &SlotRef) -> Result<FilterInput, FilterError> {
        match *slot {
            SlotRef::Standard(StandardInput::SourceGraphic) => Ok(FilterInput::StandardInput(
                self.inputs.source_graphic.clone(),
            )),

            SlotRef::Standard(StandardInput::SourceAlpha) => Ok(FilterInput::StandardInput(
                self.inputs.source_graphic.extract_alpha(self.region)?,
            )),

            SlotRef::Standard(StandardInput::BackgroundImage) => {
                Ok(self.standard_or_transparent(&self.inputs.background_image))
            }

            SlotRef::Standard(StandardInput::BackgroundAlpha) => {
                self.alpha_of(&self.inputs.background_image)
            }

            SlotRef::Standard(StandardInput::FillPaint) => {
                Ok(self.standard_or_transparent(&self.inputs.fill_paint))
            }

            SlotRef::Standard(StandardInput::StrokePaint) => {
                Ok(self.standard_or_transparent(&self.inputs.stroke_paint))
            }

            SlotRef::Primitive(index) => match self.outputs.get(index) {
                Some(Some(output)) => Ok(FilterInput::PrimitiveOutput(output.clone())),
                _ => Ok(self.transparent_input()),
            },

            SlotRef::Missing(_) => Ok(self.transparent_input()),
        }
    }

    /// Stores the output of primitive `index`, also under `name` if it has one.
    pub fn set(&mut self, index: usize, name: Option<&str>, output: FilterOutput) {
        if self.outputs.len() <= index {
            self.outputs.resize(index + 1, None);
        }

        self.outputs[index] = Some(output);

        if let Some(name) = name {
            self.names.insert(name.to_string(), index);
        }
    }

    /// The latest output stored under `name`.
    pub fn get_named(&self, name: &str) -> Option<&FilterOutput> {
        self.names
            .get(name)
            .and_then(|&i| self.outputs.get(i))
            .and_then(Option::as_ref)
    }

    /// The output stored in slot `index`.
    pub fn output(&self, index: usize) -> Option<&FilterOutput> {
        self.outputs.get(index).and_then(Option::as_ref)
    }

    pub fn source_graphic(&self) -> &SharedImageSurface {
        &self.inputs.source_graphic
    }
}

/// Context for rendering a single [`super::FilterSpec`].
pub struct FilterContext {
    session: Session,

    slots: FilterSlots,

    /// The filter region in device pixels, not clipped to the surface.
    filter_region: Rect,

    /// The filter region clipped to the surface.
    effects_region: Rect,

    /// The primitive subregion transform.
    ///
    /// With `primitiveUnits="userSpaceOnUse"` this is the user-to-device transform; with
    /// `objectBoundingBox` it first maps the unit square onto the object's bounding box.
    paffine: Transform,
}

impl FilterContext {
    /// Creates a new `FilterContext`.
    pub fn new(
        filter: &UserSpaceFilter,
        session: &Session,
        inputs: StandardInputs,
        transform: Transform,
        node_bbox: Option<Rect>,
    ) -> Result<Self, FilterError> {
        // The rect can be empty (for example, if the filter is applied to an empty
        // shape).  With userSpaceOnUse it's still possible to create images.
        let bbox_rect = node_bbox.unwrap_or_default();

        let units_transform = |units| match units {
            CoordUnits::UserSpaceOnUse => transform,
            CoordUnits::ObjectBoundingBox => {
                Transform::from_rect(&bbox_rect).post_transform(&transform)
            }
        };

        let affine = units_transform(filter.filter_units);
        let paffine = units_transform(filter.primitive_units);

        if !(affine.is_invertible() && paffine.is_invertible()) {
            return Err(FilterError::InvalidParameter(
                "transform is not invertible".to_string(),
            ));
        }

        let filter_region = affine.transform_rect(&filter.rect);

        let surface = &inputs.source_graphic;
        let surface_rect = Rect::from_size(f64::from(surface.width()), f64::from(surface.height()));
        let effects_region = filter_region
            .intersection(&surface_rect)
            .unwrap_or_default();

        let slots = FilterSlots::new(inputs, IRect::from(effects_region))?;

        Ok(Self {
            session: session.clone(),
            slots,
            filter_region,
            effects_region,
            paffine,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the surface corresponding to the source graphic.
    #[inline]
    pub fn source_graphic(&self) -> &SharedImageSurface {
        self.slots.source_graphic()
    }

    pub fn slots(&self) -> &FilterSlots {
        &self.slots
    }

    /// Converts this `FilterContext` into the surface holding the output of primitive
    /// `last`, or a transparent surface if there is none.
    ///
    /// The returned surface is in the sRGB color space.
    pub fn into_output(self, last: Option<usize>) -> Result<SharedImageSurface, cairo::Error> {
        match last.and_then(|i| self.slots.output(i)) {
            Some(FilterOutput { surface, bounds }) => surface.to_srgb(*bounds),
            None => SharedImageSurface::empty(
                self.source_graphic().width(),
                self.source_graphic().height(),
                SurfaceType::AlphaOnly,
            ),
        }
    }

    /// Stores a filter primitive result into the context.
    #[inline]
    pub fn store_result(&mut self, index: usize, name: Option<&CustomIdent>, output: FilterOutput) {
        self.slots.set(index, name.map(|n| n.0.as_str()), output);
    }

    /// Returns the paffine matrix.
    #[inline]
    pub fn paffine(&self) -> Transform {
        self.paffine
    }

    /// Returns the filter region in device pixels, unclipped.
    #[inline]
    pub fn filter_region(&self) -> Rect {
        self.filter_region
    }

    /// Returns the filter effects region.
    #[inline]
    pub fn effects_region(&self) -> Rect {
        self.effects_region
    }

    /// Retrieves an input surface, converted to the color space in which the primitive
    /// works.
    pub fn get_input(
        &self,
        slot: &SlotRef,
        color_interpolation_filters: ColorInterpolationFilters,
    ) -> Result<FilterInput, FilterError> {
        let raw = self.slots.get(slot)?;

        let (surface, bounds) = match raw {
            FilterInput::StandardInput(ref surface) => (surface, self.effects_region().into()),
            FilterInput::PrimitiveOutput(FilterOutput {
                ref surface,
                ref bounds,
            }) => (surface, *bounds),
        };

        let surface = match color_interpolation_filters {
            ColorInterpolationFilters::Auto => Ok(surface.clone()),
            ColorInterpolationFilters::LinearRgb => surface.to_linear_rgb(bounds),
            ColorInterpolationFilters::Srgb => surface.to_srgb(bounds),
        };

        surface
            .map_err(FilterError::CairoError)
            .map(|surface| match raw {
                FilterInput::StandardInput(_) => FilterInput::StandardInput(surface),
                FilterInput::PrimitiveOutput(ref output) => {
                    FilterInput::PrimitiveOutput(FilterOutput { surface, ..*output })
                }
            })
    }
}

impl FilterInput {
    /// Retrieves the surface from `FilterInput`.
    #[inline]
    pub fn surface(&self) -> &SharedImageSurface {
        match *self {
            FilterInput::StandardInput(ref surface) => surface,
            FilterInput::PrimitiveOutput(FilterOutput { ref surface, .. }) => surface,
        }
    }
}
