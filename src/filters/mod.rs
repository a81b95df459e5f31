//! Entry point for the filter primitive engine.
//!
//! A `<filter>` element is loaded into a list of [`ResolvedPrimitive`], whose inputs are
//! resolved once into [`SlotRef`] values by [`resolve_inputs`].  [`FilterSpec`] is that list
//! converted to user-space units, and [`FilterRenderer`] runs it over a source surface.

use cssparser::{BasicParseError, Parser};
use markup5ever::{expanded_name, local_name, namespace_url, ns};
use std::collections::HashMap;
use std::time::Instant;

use crate::color::RGBA;
use crate::element::{set_attribute, ElementTrait};
use crate::error::{ParseError, RenderingError};
use crate::filter::UserSpaceFilter;
use crate::length::*;
use crate::log::seconds;
use crate::parse_identifiers;
use crate::parsers::{CustomIdent, Parse, ParseValue};
use crate::rect::{IRect, Rect};
use crate::session::Session;
use crate::surface_utils::shared_surface::{SharedImageSurface, SurfaceType};
use crate::transform::Transform;
use crate::vfx_log;
use crate::xml::{Attributes, XmlElement};

mod bounds;
use self::bounds::BoundsBuilder;

pub mod context;
use self::context::{FilterContext, FilterOutput, StandardInputs};

mod error;
pub use self::error::{FilterError, FilterResolveError};

pub mod flood;
pub mod lighting;
pub mod merge;
pub mod offset;
pub mod tile;

#[cfg(test)]
pub(crate) mod test_utils;

/// Resolved parameters for each filter primitive.
///
/// These gather all the data that a primitive needs during rendering: the `feFoo`
/// element's attributes, plus parameters extracted from the element's children (the
/// light source of a lighting primitive, or the `feMergeNode` list of `feMerge`).
#[derive(Clone)]
pub enum PrimitiveParams {
    DiffuseLighting(lighting::DiffuseLighting),
    Flood(flood::Flood),
    Merge(merge::Merge),
    Offset(offset::Offset),
    SpecularLighting(lighting::SpecularLighting),
    Tile(tile::Tile),
    /// Holds the place of an element that could not be loaded, named here.  It keeps
    /// the indices of the later primitives, and its output slot stays empty.
    Unloaded(String),
}

impl PrimitiveParams {
    /// Returns a human-readable name for a primitive.
    #[rustfmt::skip]
    pub fn name(&self) -> &str {
        use PrimitiveParams::*;
        match self {
            DiffuseLighting(..)  => "feDiffuseLighting",
            Flood(..)            => "feFlood",
            Merge(..)            => "feMerge",
            Offset(..)           => "feOffset",
            SpecularLighting(..) => "feSpecularLighting",
            Tile(..)             => "feTile",
            Unloaded(name)       => name.as_str(),
        }
    }

    /// The symbolic inputs of the primitive, in the order its slots are read.
    pub fn inputs(&self) -> Vec<&Input> {
        use PrimitiveParams::*;
        match self {
            DiffuseLighting(p) => vec![p.input()],
            Flood(_) => Vec::new(),
            Merge(p) => p.merge_nodes.iter().map(|n| &n.in1).collect(),
            Offset(p) => vec![&p.in1],
            SpecularLighting(p) => vec![p.input()],
            Tile(p) => vec![&p.in1],
            Unloaded(_) => Vec::new(),
        }
    }

    /// Relative rendering cost; `1.0` is the cost of a plain copy.
    #[rustfmt::skip]
    pub fn complexity(&self, _transform: &Transform) -> f64 {
        use PrimitiveParams::*;
        match self {
            DiffuseLighting(..)  => lighting::COMPLEXITY,
            Flood(..)            => 1.0,
            Merge(..)            => 1.02,
            Offset(..)           => 1.02,
            SpecularLighting(..) => lighting::COMPLEXITY,
            Tile(..)             => 1.0,
            Unloaded(..)         => 1.0,
        }
    }

    /// Grows `area` (in device pixels) to cover every input pixel that can affect the
    /// pixels of the original `area` in the output.
    pub fn area_enlarge(&self, area: &mut IRect, transform: &Transform) {
        use PrimitiveParams::*;
        match self {
            DiffuseLighting(..) | SpecularLighting(..) => *area = area.outset(1),
            Offset(p) => p.area_enlarge(area, transform),
            Tile(..) => *area = tile::ENLARGED_AREA,
            Flood(..) | Merge(..) | Unloaded(..) => (),
        }
    }
}

/// The base filter primitive node containing common properties.
#[derive(Debug, Default, Clone)]
pub struct Primitive {
    pub x: Option<Length<Horizontal>>,
    pub y: Option<Length<Vertical>>,
    pub width: Option<ULength<Horizontal>>,
    pub height: Option<ULength<Vertical>>,
    pub result: Option<CustomIdent>,
}

/// A primitive as loaded from its element, with symbolic inputs.
#[derive(Clone)]
pub struct ResolvedPrimitive {
    pub primitive: Primitive,
    pub params: PrimitiveParams,
}

/// A filter primitive element that can be turned into a [`ResolvedPrimitive`].
///
/// The element's own attributes are read with [`ElementTrait::set_attributes`] first;
/// `resolve` then looks at the element's children, if the primitive has any.
pub trait FilterEffect: ElementTrait {
    fn resolve(
        &self,
        element: &XmlElement,
        session: &Session,
    ) -> Result<ResolvedPrimitive, FilterResolveError>;
}

fn resolve_effect<T: FilterEffect + Default>(
    element: &XmlElement,
    session: &Session,
) -> Result<ResolvedPrimitive, FilterResolveError> {
    let mut effect = T::default();
    effect.set_attributes(&element.attributes, session);
    effect.resolve(element, session)
}

/// Loads one filter primitive element.
pub fn load_primitive(
    element: &XmlElement,
    session: &Session,
) -> Result<ResolvedPrimitive, FilterResolveError> {
    match element.local_name() {
        "feDiffuseLighting" => resolve_effect::<lighting::FeDiffuseLighting>(element, session),
        "feFlood" => resolve_effect::<flood::FeFlood>(element, session),
        "feMerge" => resolve_effect::<merge::FeMerge>(element, session),
        "feOffset" => resolve_effect::<offset::FeOffset>(element, session),
        "feSpecularLighting" => resolve_effect::<lighting::FeSpecularLighting>(element, session),
        "feTile" => resolve_effect::<tile::FeTile>(element, session),
        _ => Err(FilterResolveError::UnknownPrimitive),
    }
}

/// A fully resolved filter primitive in user-space coordinates.
pub struct UserSpacePrimitive {
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    result: Option<CustomIdent>,

    params: PrimitiveParams,

    /// One entry per symbolic input, in the order of [`PrimitiveParams::inputs`].
    inputs: Vec<SlotRef>,
}

/// An enumeration of possible inputs for a filter primitive, as written in `in`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub enum Input {
    #[default]
    Unspecified,
    SourceGraphic,
    SourceAlpha,
    BackgroundImage,
    BackgroundAlpha,
    FillPaint,
    StrokePaint,
    FilterOutput(CustomIdent),
}

impl Parse for Input {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        parser
            .try_parse(|p| {
                parse_identifiers!(
                    p,
                    "SourceGraphic" => Input::SourceGraphic,
                    "SourceAlpha" => Input::SourceAlpha,
                    "BackgroundImage" => Input::BackgroundImage,
                    "BackgroundAlpha" => Input::BackgroundAlpha,
                    "FillPaint" => Input::FillPaint,
                    "StrokePaint" => Input::StrokePaint,
                )
            })
            .or_else(|_: BasicParseError<'_>| {
                let ident = CustomIdent::parse(parser)?;
                Ok(Input::FilterOutput(ident))
            })
    }
}

/// The images a filter can read without any primitive producing them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StandardInput {
    SourceGraphic,
    SourceAlpha,
    BackgroundImage,
    BackgroundAlpha,
    FillPaint,
    StrokePaint,
}

/// Where a primitive reads one of its inputs from, after input resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotRef {
    /// One of the standard inputs.
    Standard(StandardInput),

    /// The output of the primitive at this index in the filter.
    Primitive(usize),

    /// A named result that no earlier primitive produces; reads as transparent black.
    Missing(CustomIdent),
}

/// Resolves the symbolic inputs of every primitive in a filter.
///
/// An unspecified input is the previous primitive's output, or `SourceGraphic` for the
/// first primitive.  A named input refers to the closest earlier primitive with that
/// `result`; a primitive never sees its own result or later ones.
pub fn resolve_inputs(primitives: &[ResolvedPrimitive]) -> Vec<Vec<SlotRef>> {
    let mut named: HashMap<&CustomIdent, usize> = HashMap::new();
    let mut resolved = Vec::with_capacity(primitives.len());

    for (index, p) in primitives.iter().enumerate() {
        let slots = p
            .params
            .inputs()
            .into_iter()
            .map(|input| match *input {
                Input::Unspecified if index == 0 => SlotRef::Standard(StandardInput::SourceGraphic),
                Input::Unspecified => SlotRef::Primitive(index - 1),
                Input::SourceGraphic => SlotRef::Standard(StandardInput::SourceGraphic),
                Input::SourceAlpha => SlotRef::Standard(StandardInput::SourceAlpha),
                Input::BackgroundImage => SlotRef::Standard(StandardInput::BackgroundImage),
                Input::BackgroundAlpha => SlotRef::Standard(StandardInput::BackgroundAlpha),
                Input::FillPaint => SlotRef::Standard(StandardInput::FillPaint),
                Input::StrokePaint => SlotRef::Standard(StandardInput::StrokePaint),
                Input::FilterOutput(ref name) => match named.get(name) {
                    Some(&i) => SlotRef::Primitive(i),
                    None => SlotRef::Missing(name.clone()),
                },
            })
            .collect();

        resolved.push(slots);

        if let Some(ref name) = p.primitive.result {
            named.insert(name, index);
        }
    }

    resolved
}

impl ResolvedPrimitive {
    /// A placeholder for a primitive element that failed to load.
    ///
    /// Only the subregion and `result` attributes are kept, so that later references to
    /// its result, or to its index, find an empty output.
    pub fn unloaded(element: &XmlElement, session: &Session) -> ResolvedPrimitive {
        let mut primitive = Primitive::default();
        primitive.parse_no_inputs(&element.attributes, session);

        ResolvedPrimitive {
            primitive,
            params: PrimitiveParams::Unloaded(element.local_name().to_string()),
        }
    }

    /// Resolves the primitive's subregion lengths with `params`.
    pub fn to_user_space(&self, params: &NormalizeParams, inputs: Vec<SlotRef>) -> UserSpacePrimitive {
        let x = self.primitive.x.map(|l| l.to_user(params));
        let y = self.primitive.y.map(|l| l.to_user(params));
        let width = self.primitive.width.map(|l| l.to_user(params));
        let height = self.primitive.height.map(|l| l.to_user(params));

        UserSpacePrimitive {
            x,
            y,
            width,
            height,
            result: self.primitive.result.clone(),
            params: self.params.clone(),
            inputs,
        }
    }
}

impl UserSpacePrimitive {
    #[inline]
    fn get_bounds(&self, ctx: &FilterContext) -> BoundsBuilder {
        BoundsBuilder::new(self.x, self.y, self.width, self.height, ctx.paffine())
    }

    /// The primitive's parameters.
    pub fn params(&self) -> &PrimitiveParams {
        &self.params
    }

    /// The resolved inputs, in the order of [`PrimitiveParams::inputs`].
    pub fn slot_refs(&self) -> &[SlotRef] {
        &self.inputs
    }

    /// The value of the `result` attribute.
    pub fn result(&self) -> Option<&CustomIdent> {
        self.result.as_ref()
    }

    /// The reference for input number `i`.
    fn input(&self, i: usize) -> Result<&SlotRef, FilterError> {
        self.inputs.get(i).ok_or(FilterError::InvalidInput)
    }
}

impl Primitive {
    fn parse_standard_attributes(&mut self, attrs: &Attributes, session: &Session) -> Input {
        let mut input_1 = Input::Unspecified;

        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "x") => set_attribute(&mut self.x, attr.parse(value), session),
                expanded_name!("", "y") => set_attribute(&mut self.y, attr.parse(value), session),
                expanded_name!("", "width") => {
                    set_attribute(&mut self.width, attr.parse(value), session)
                }
                expanded_name!("", "height") => {
                    set_attribute(&mut self.height, attr.parse(value), session)
                }
                expanded_name!("", "result") => {
                    set_attribute(&mut self.result, attr.parse(value), session)
                }
                expanded_name!("", "in") => set_attribute(&mut input_1, attr.parse(value), session),
                _ => (),
            }
        }

        input_1
    }

    pub fn parse_no_inputs(&mut self, attrs: &Attributes, session: &Session) {
        let _ = self.parse_standard_attributes(attrs, session);
    }

    pub fn parse_one_input(&mut self, attrs: &Attributes, session: &Session) -> Input {
        self.parse_standard_attributes(attrs, session)
    }
}

/// Color space in which a primitive does its arithmetic.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ColorInterpolationFilters {
    Auto,
    #[default]
    LinearRgb,
    Srgb,
}

impl Parse for ColorInterpolationFilters {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "auto" => ColorInterpolationFilters::Auto,
            "linearRGB" => ColorInterpolationFilters::LinearRgb,
            "sRGB" => ColorInterpolationFilters::Srgb,
        )?)
    }
}

/// Color-related presentation attributes of a primitive element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorProperties {
    /// The value of `color`, which `currentColor` refers to.
    pub color: RGBA,

    pub color_interpolation_filters: ColorInterpolationFilters,
}

impl Default for ColorProperties {
    fn default() -> Self {
        ColorProperties {
            color: RGBA::new(0, 0, 0, 255),
            color_interpolation_filters: Default::default(),
        }
    }
}

impl ColorProperties {
    pub fn from_attributes(attrs: &Attributes, session: &Session) -> Self {
        let mut props = ColorProperties::default();

        for (attr, value) in attrs.iter() {
            match &*attr.local {
                "color" => set_attribute(&mut props.color, attr.parse(value), session),
                "color-interpolation-filters" => set_attribute(
                    &mut props.color_interpolation_filters,
                    attr.parse(value),
                    session,
                ),
                _ => (),
            }
        }

        props
    }
}

impl From<ColorInterpolationFilters> for SurfaceType {
    fn from(c: ColorInterpolationFilters) -> Self {
        match c {
            ColorInterpolationFilters::LinearRgb => SurfaceType::LinearRgb,
            _ => SurfaceType::SRgb,
        }
    }
}

/// Parameters to apply a list of filter primitives onto a surface.
pub struct FilterSpec {
    /// Human-readable identifier for the filter, for logging/debugging purposes.
    pub name: String,

    /// Coordinates and bounds.
    pub user_space_filter: UserSpaceFilter,

    /// List of filter primitives to apply to the surface, in order.
    pub primitives: Vec<UserSpacePrimitive>,
}

impl FilterSpec {
    /// Indices of the primitives whose outputs primitive `index` reads.
    ///
    /// Standard inputs and missing names are not primitives, so they are not listed.
    pub fn dependencies(&self, index: usize) -> Vec<usize> {
        self.primitives
            .get(index)
            .map(|p| {
                p.inputs
                    .iter()
                    .filter_map(|s| match *s {
                        SlotRef::Primitive(i) => Some(i),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Estimated cost of the whole chain.
    ///
    /// Each primitive contributes its cost above that of a plain copy, so an empty
    /// filter costs `1.0`.
    pub fn complexity(&self, transform: &Transform) -> f64 {
        self.primitives
            .iter()
            .fold(1.0, |acc, p| acc + p.params.complexity(transform) - 1.0)
    }

    /// Grows `area` through every primitive, in order.
    pub fn area_enlarge(&self, area: &mut IRect, transform: &Transform) {
        for p in &self.primitives {
            p.params.area_enlarge(area, transform);
        }
    }
}

/// Runs [`FilterSpec`]s over source surfaces.
///
/// ```no_run
/// # use vectorfx::filters::FilterRenderer;
/// # use vectorfx::session::Session;
/// let renderer = FilterRenderer::new(&Session::new()).with_complexity_limit(50.0);
/// ```
#[derive(Clone)]
pub struct FilterRenderer {
    session: Session,
    complexity_limit: Option<f64>,
    background_image: Option<SharedImageSurface>,
    fill_paint: Option<SharedImageSurface>,
    stroke_paint: Option<SharedImageSurface>,
}

impl FilterRenderer {
    pub fn new(session: &Session) -> FilterRenderer {
        FilterRenderer {
            session: session.clone(),
            complexity_limit: None,
            background_image: None,
            fill_paint: None,
            stroke_paint: None,
        }
    }

    /// Rejects filters whose [`FilterSpec::complexity`] is above `limit`.
    pub fn with_complexity_limit(mut self, limit: f64) -> FilterRenderer {
        self.complexity_limit = Some(limit);
        self
    }

    /// Surface for `BackgroundImage` and `BackgroundAlpha`.
    pub fn with_background_image(mut self, surface: SharedImageSurface) -> FilterRenderer {
        self.background_image = Some(surface);
        self
    }

    /// Surface for `FillPaint`.
    pub fn with_fill_paint(mut self, surface: SharedImageSurface) -> FilterRenderer {
        self.fill_paint = Some(surface);
        self
    }

    /// Surface for `StrokePaint`.
    pub fn with_stroke_paint(mut self, surface: SharedImageSurface) -> FilterRenderer {
        self.stroke_paint = Some(surface);
        self
    }

    /// Applies a filter and returns the resulting surface, in sRGB.
    ///
    /// `transform` maps user space to the pixels of `source`, and `node_bbox` is the
    /// user-space bounding box of the filtered object, used by `objectBoundingBox` units.
    pub fn render(
        &self,
        filter: &FilterSpec,
        source: &cairo::ImageSurface,
        transform: Transform,
        node_bbox: Option<Rect>,
    ) -> Result<cairo::ImageSurface, RenderingError> {
        if source.width() == 0 || source.height() == 0 {
            return Ok(cairo::ImageSurface::create(
                cairo::Format::ARgb32,
                source.width(),
                source.height(),
            )?);
        }

        let source_surface = SharedImageSurface::copy_from_surface(source, SurfaceType::SRgb)?;

        self.render_shared(filter, source_surface, transform, node_bbox)?
            .into_image_surface()
            .map_err(RenderingError::from)
    }

    /// Like [`FilterRenderer::render`], for a surface that is already shared.
    pub fn render_shared(
        &self,
        filter: &FilterSpec,
        source_surface: SharedImageSurface,
        transform: Transform,
        node_bbox: Option<Rect>,
    ) -> Result<SharedImageSurface, RenderingError> {
        let session = &self.session;

        if let Some(limit) = self.complexity_limit {
            let complexity = filter.complexity(&transform);
            if complexity > limit {
                vfx_log!(
                    session,
                    "(filter \"{}\" has complexity {} above the limit {})",
                    filter.name,
                    complexity,
                    limit
                );
                return Err(RenderingError::TooComplex { complexity, limit });
            }
        }

        let inputs = StandardInputs {
            source_graphic: source_surface,
            background_image: self.background_image.clone(),
            fill_paint: self.fill_paint.clone(),
            stroke_paint: self.stroke_paint.clone(),
        };

        let mut filter_ctx = match FilterContext::new(
            &filter.user_space_filter,
            session,
            inputs,
            transform,
            node_bbox,
        ) {
            Ok(ctx) => ctx,
            Err(FilterError::CairoError(e)) => return Err(e.into()),
            Err(e) => {
                vfx_log!(session, "(filter \"{}\" not rendered: {})", filter.name, e);
                return Err(RenderingError::InvalidTransform);
            }
        };

        // the message has an unclosed parenthesis; we'll close it below.
        vfx_log!(
            session,
            "(filter \"{}\" with effects_region={:?}",
            filter.name,
            filter_ctx.effects_region()
        );

        for (index, user_space_primitive) in filter.primitives.iter().enumerate() {
            let start = Instant::now();

            match render_primitive(user_space_primitive, &filter_ctx) {
                Ok(output) => {
                    vfx_log!(
                        session,
                        "(rendered filter primitive {} with bounds={:?} in {} seconds)",
                        user_space_primitive.params.name(),
                        output.bounds,
                        seconds(start.elapsed())
                    );

                    filter_ctx.store_result(index, user_space_primitive.result.as_ref(), output);
                }

                Err(err) => {
                    vfx_log!(
                        session,
                        "(filter primitive {} returned an error: {})",
                        user_space_primitive.params.name(),
                        err
                    );

                    // Exit early on Cairo errors. Continue rendering otherwise.
                    if let FilterError::CairoError(status) = err {
                        vfx_log!(session, ")");
                        return Err(status.into());
                    }
                }
            }
        }

        // close the opening parenthesis from the message at the start of this function
        vfx_log!(session, ")");

        Ok(filter_ctx.into_output(filter.primitives.len().checked_sub(1))?)
    }
}

#[rustfmt::skip]
fn render_primitive(
    primitive: &UserSpacePrimitive,
    ctx: &FilterContext,
) -> Result<FilterOutput, FilterError> {
    use PrimitiveParams::*;

    let bounds_builder = primitive.get_bounds(ctx);

    match primitive.params {
        DiffuseLighting(ref p)  => p.render(bounds_builder, ctx, primitive.input(0)?),
        Flood(ref p)            => p.render(bounds_builder, ctx),
        Merge(ref p)            => p.render(bounds_builder, ctx, &primitive.inputs),
        Offset(ref p)           => p.render(bounds_builder, ctx, primitive.input(0)?),
        SpecularLighting(ref p) => p.render(bounds_builder, ctx, primitive.input(0)?),
        Tile(ref p)             => p.render(bounds_builder, ctx, primitive.input(0)?),
        Unloaded(_)             => Err(FilterError::NotLoaded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::FilterDocument;

    fn spec_for(xml: &str) -> FilterSpec {
        let document = FilterDocument::load_from_str(xml, &Session::new_for_test_suite()).unwrap();
        document
            .lookup("f")
            .unwrap()
            .to_filter_spec(&NormalizeParams::new(100.0, 100.0))
    }

    #[test]
    fn parses_inputs() {
        assert_eq!(Input::parse_str("SourceAlpha").unwrap(), Input::SourceAlpha);
        assert_eq!(
            Input::parse_str("blur").unwrap(),
            Input::FilterOutput(CustomIdent("blur".to_string()))
        );
        assert!(Input::parse_str("inherit").is_err());
    }

    #[test]
    fn parses_color_interpolation_filters() {
        assert_eq!(
            ColorInterpolationFilters::parse_str("sRGB").unwrap(),
            ColorInterpolationFilters::Srgb
        );
        assert_eq!(
            ColorInterpolationFilters::default(),
            ColorInterpolationFilters::LinearRgb
        );
    }

    #[test]
    fn resolves_unspecified_inputs_to_previous_primitive() {
        let spec = spec_for(
            r#"<filter id="f">
                 <feOffset dx="1"/>
                 <feOffset dx="2"/>
                 <feTile/>
               </filter>"#,
        );

        assert_eq!(
            spec.primitives[0].slot_refs(),
            &[SlotRef::Standard(StandardInput::SourceGraphic)]
        );
        assert_eq!(spec.primitives[1].slot_refs(), &[SlotRef::Primitive(0)]);
        assert_eq!(spec.dependencies(2), vec![1]);
        assert!(spec.dependencies(0).is_empty());
        assert!(spec.dependencies(7).is_empty());
    }

    #[test]
    fn resolves_named_inputs_to_latest_earlier_result() {
        let spec = spec_for(
            r#"<filter id="f">
                 <feFlood result="a"/>
                 <feFlood result="a"/>
                 <feOffset in="a" result="b"/>
                 <feMerge>
                   <feMergeNode in="a"/>
                   <feMergeNode in="nowhere"/>
                   <feMergeNode in="SourceAlpha"/>
                   <feMergeNode/>
                 </feMerge>
                 <feOffset in="later"/>
                 <feFlood result="later"/>
               </filter>"#,
        );

        assert_eq!(spec.primitives[2].slot_refs(), &[SlotRef::Primitive(1)]);
        assert_eq!(
            spec.primitives[3].slot_refs(),
            &[
                SlotRef::Primitive(1),
                SlotRef::Missing(CustomIdent("nowhere".to_string())),
                SlotRef::Standard(StandardInput::SourceAlpha),
                SlotRef::Primitive(2),
            ]
        );
        assert_eq!(spec.dependencies(3), vec![1, 2]);
        assert_eq!(
            spec.primitives[4].slot_refs(),
            &[SlotRef::Missing(CustomIdent("later".to_string()))]
        );
    }

    #[test]
    fn unloaded_primitive_keeps_its_index_and_result() {
        let spec = spec_for(
            r#"<filter id="f">
                 <feFlood/>
                 <feDiffuseLighting result="lit"/>
                 <feOffset/>
                 <feOffset in="lit"/>
               </filter>"#,
        );

        assert_eq!(spec.primitives.len(), 4);
        assert!(matches!(
            spec.primitives[1].params(),
            PrimitiveParams::Unloaded(name) if name == "feDiffuseLighting"
        ));
        assert!(spec.primitives[1].slot_refs().is_empty());
        assert_eq!(spec.dependencies(2), vec![1]);
        assert_eq!(spec.dependencies(3), vec![1]);
    }

    #[test]
    fn aggregates_complexity() {
        let spec = spec_for(
            r#"<filter id="f">
                 <feDiffuseLighting><feDistantLight/></feDiffuseLighting>
                 <feOffset/>
                 <feTile/>
               </filter>"#,
        );

        let c = spec.complexity(&Transform::identity());
        assert!((c - (1.0 + 8.0 + 0.02 + 0.0)).abs() < 1e-9);

        let empty = spec_for(r#"<filter id="f"/>"#);
        assert_eq!(empty.complexity(&Transform::identity()), 1.0);
    }

    #[test]
    fn area_enlarge_runs_through_every_primitive() {
        let spec = spec_for(
            r#"<filter id="f">
                 <feOffset dx="3" dy="-2.5"/>
                 <feDiffuseLighting><fePointLight/></feDiffuseLighting>
               </filter>"#,
        );

        let mut area = IRect::new(10, 10, 20, 20);
        spec.area_enlarge(&mut area, &Transform::identity());
        assert_eq!(area, IRect::new(6, 9, 21, 24));
    }
}
