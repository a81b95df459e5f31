use markup5ever::{expanded_name, local_name, namespace_url, ns};

use crate::element::{set_attribute, ElementTrait};
use crate::parsers::ParseValue;
use crate::rect::IRect;
use crate::session::Session;
use crate::surface_utils::shared_surface::{SharedImageSurface, SurfaceType};
use crate::xml::{Attributes, XmlElement};

use super::bounds::BoundsBuilder;
use super::context::{FilterContext, FilterOutput};
use super::{
    ColorInterpolationFilters, ColorProperties, FilterEffect, FilterError, FilterResolveError,
    Input, Primitive, PrimitiveParams, ResolvedPrimitive, SlotRef,
};

/// The `feMerge` filter primitive.
#[derive(Default)]
pub struct FeMerge {
    base: Primitive,
}

/// The `<feMergeNode>` element.
#[derive(Clone, Default)]
pub struct FeMergeNode {
    in1: Input,
    color_interpolation_filters: Option<ColorInterpolationFilters>,
}

/// Resolved `feMerge` primitive for rendering.
#[derive(Debug, Clone, Default)]
pub struct Merge {
    pub merge_nodes: Vec<MergeNode>,
}

/// Resolved `feMergeNode` for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeNode {
    pub in1: Input,
    pub color_interpolation_filters: ColorInterpolationFilters,
}

impl ElementTrait for FeMerge {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.base.parse_no_inputs(attrs, session);
    }
}

impl ElementTrait for FeMergeNode {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        for (attr, value) in attrs.iter() {
            if let expanded_name!("", "in") = attr.expanded() {
                set_attribute(&mut self.in1, attr.parse(value), session);
            } else if &*attr.local == "color-interpolation-filters" {
                set_attribute(
                    &mut self.color_interpolation_filters,
                    attr.parse(value),
                    session,
                );
            }
        }
    }
}

impl MergeNode {
    fn render(
        &self,
        ctx: &FilterContext,
        in1: &SlotRef,
        bounds: IRect,
        output_surface: &SharedImageSurface,
    ) -> Result<SharedImageSurface, FilterError> {
        let input = ctx.get_input(in1, self.color_interpolation_filters)?;

        input
            .surface()
            .compose(output_surface, bounds, cairo::Operator::Over)
            .map_err(FilterError::CairoError)
    }
}

impl Merge {
    /// Composites the inputs in child order, each one over the previous ones.
    ///
    /// `inputs` holds one resolved slot per merge node.
    pub fn render(
        &self,
        bounds_builder: BoundsBuilder,
        ctx: &FilterContext,
        inputs: &[SlotRef],
    ) -> Result<FilterOutput, FilterError> {
        if inputs.len() != self.merge_nodes.len() {
            return Err(FilterError::InvalidInput);
        }

        let bounds: IRect = bounds_builder.compute(ctx).clipped.into();

        let mut output_surface = SharedImageSurface::empty(
            ctx.source_graphic().width(),
            ctx.source_graphic().height(),
            SurfaceType::AlphaOnly,
        )?;

        for (merge_node, in1) in self.merge_nodes.iter().zip(inputs) {
            output_surface = merge_node.render(ctx, in1, bounds, &output_surface)?;
        }

        Ok(FilterOutput {
            surface: output_surface,
            bounds,
        })
    }
}

/// Takes a feMerge and walks its children to produce a list of feMergeNode arguments.
fn resolve_merge_nodes(element: &XmlElement, session: &Session) -> Vec<MergeNode> {
    let parent = ColorProperties::from_attributes(&element.attributes, session);

    element
        .children
        .iter()
        .filter(|c| c.local_name() == "feMergeNode")
        .map(|c| {
            let mut node = FeMergeNode::default();
            node.set_attributes(&c.attributes, session);

            MergeNode {
                in1: node.in1,
                color_interpolation_filters: node
                    .color_interpolation_filters
                    .unwrap_or(parent.color_interpolation_filters),
            }
        })
        .collect()
}

impl FilterEffect for FeMerge {
    fn resolve(
        &self,
        element: &XmlElement,
        session: &Session,
    ) -> Result<ResolvedPrimitive, FilterResolveError> {
        Ok(ResolvedPrimitive {
            primitive: self.base.clone(),
            params: PrimitiveParams::Merge(Merge {
                merge_nodes: resolve_merge_nodes(element, session),
            }),
        })
    }
}
