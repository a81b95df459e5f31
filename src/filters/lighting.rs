//! Lighting filters and light sources.

use float_cmp::approx_eq;
use markup5ever::{expanded_name, local_name, namespace_url, ns};
use nalgebra::{Vector2, Vector3};
use num_traits::identities::Zero;
use rayon::prelude::*;
use std::cmp::max;

use crate::color::{resolve_color, Color, RGBA};
use crate::element::{set_attribute, ElementTrait};
use crate::error::{ElementError, ValueErrorKind};
use crate::filters::{
    bounds::BoundsBuilder,
    context::{FilterContext, FilterOutput},
    ColorInterpolationFilters, ColorProperties, FilterEffect, FilterError, FilterResolveError,
    Input, Primitive, PrimitiveParams, ResolvedPrimitive, SlotRef,
};
use crate::parsers::{NonNegative, ParseValue};
use crate::rect::IRect;
use crate::session::Session;
use crate::surface_utils::{
    shared_surface::{ExclusiveImageSurface, SharedImageSurface, SurfaceType},
    srgb, ImageSurfaceDataExt, Pixel,
};
use crate::transform::Transform;
use crate::util::round_channel;
use crate::vfx_log;
use crate::xml::{Attributes, XmlElement};

/// Cost of a lighting primitive relative to a plain copy.
pub const COMPLEXITY: f64 = 9.0;

/// The `feDiffuseLighting` filter primitive.
#[derive(Default)]
pub struct FeDiffuseLighting {
    base: Primitive,
    params: DiffuseLightingParams,
    lighting_color: LightingColor,
}

#[derive(Clone)]
pub struct DiffuseLightingParams {
    in1: Input,
    surface_scale: f64,
    diffuse_constant: NonNegative,
}

impl Default for DiffuseLightingParams {
    fn default() -> Self {
        Self {
            in1: Default::default(),
            surface_scale: 1.0,
            diffuse_constant: NonNegative(1.0),
        }
    }
}

/// The `feSpecularLighting` filter primitive.
#[derive(Default)]
pub struct FeSpecularLighting {
    base: Primitive,
    params: SpecularLightingParams,
    lighting_color: LightingColor,
}

#[derive(Clone)]
pub struct SpecularLightingParams {
    in1: Input,
    surface_scale: f64,
    specular_constant: NonNegative,
    specular_exponent: f64,
}

impl Default for SpecularLightingParams {
    fn default() -> Self {
        Self {
            in1: Default::default(),
            surface_scale: 1.0,
            specular_constant: NonNegative(1.0),
            specular_exponent: 1.0,
        }
    }
}

/// Resolved `feDiffuseLighting` primitive for rendering.
#[derive(Clone)]
pub struct DiffuseLighting {
    params: DiffuseLightingParams,
    light: Light,
}

/// Resolved `feSpecularLighting` primitive for rendering.
#[derive(Clone)]
pub struct SpecularLighting {
    params: SpecularLightingParams,
    light: Light,
}

/// A light source before applying the primitive transform, as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum LightSource {
    Distant(DistantLight),
    Point(PointLight),
    Spot(SpotLight),
}

/// A light source in device pixels.
enum TransformedLight {
    Distant {
        azimuth: f64,
        elevation: f64,
    },
    Point {
        origin: Vector3<f64>,
    },
    Spot {
        origin: Vector3<f64>,
        direction: Vector3<f64>,
        specular_exponent: f64,
        limiting_cone_angle: Option<f64>,
    },
}

impl LightSource {
    fn transform(&self, paffine: Transform) -> TransformedLight {
        match *self {
            LightSource::Distant(ref l) => l.transform(),
            LightSource::Point(ref l) => l.transform(paffine),
            LightSource::Spot(ref l) => l.transform(paffine),
        }
    }

    fn from_element(element: &XmlElement, session: &Session) -> Option<LightSource> {
        match element.local_name() {
            "feDistantLight" => {
                let mut l = DistantLight::default();
                l.set_attributes(&element.attributes, session);
                Some(LightSource::Distant(l))
            }
            "fePointLight" => {
                let mut l = PointLight::default();
                l.set_attributes(&element.attributes, session);
                Some(LightSource::Point(l))
            }
            "feSpotLight" => {
                let mut l = SpotLight::default();
                l.set_attributes(&element.attributes, session);
                Some(LightSource::Spot(l))
            }
            _ => None,
        }
    }

    /// Finds the single light source among a lighting element's children.
    fn from_children(
        element: &XmlElement,
        session: &Session,
    ) -> Result<LightSource, FilterResolveError> {
        let mut sources = element
            .children
            .iter()
            .filter_map(|c| LightSource::from_element(c, session));

        match (sources.next(), sources.next()) {
            (Some(source), None) => Ok(source),
            _ => Err(FilterResolveError::InvalidLightSourceCount),
        }
    }
}

/// The `lighting-color` property; `currentColor` is resolved when the primitive is.
#[derive(Debug, Copy, Clone)]
struct LightingColor(Color);

impl Default for LightingColor {
    fn default() -> Self {
        LightingColor(Color::RGBA(RGBA::new(255, 255, 255, 255)))
    }
}

impl LightingColor {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        for (attr, value) in attrs.iter() {
            if &*attr.local == "lighting-color" {
                set_attribute(&mut self.0, attr.parse(value), session);
            }
        }
    }
}

/// Everything about the light that a lighting primitive needs to render.
#[derive(Clone)]
pub struct Light {
    source: LightSource,
    lighting_color: RGBA,
    color_interpolation_filters: ColorInterpolationFilters,
}

impl Light {
    pub fn source(&self) -> &LightSource {
        &self.source
    }

    /// The lighting color in the color space the primitive works in.
    fn color(&self) -> RGBA {
        match self.color_interpolation_filters {
            ColorInterpolationFilters::LinearRgb => {
                let c = self.lighting_color;
                RGBA::new(
                    srgb::linearize(c.red),
                    srgb::linearize(c.green),
                    srgb::linearize(c.blue),
                    c.alpha,
                )
            }
            _ => self.lighting_color,
        }
    }
}

/// Returns the color and unit (or null) vector from the image sample to the light.
#[inline]
fn color_and_vector(
    lighting_color: &RGBA,
    source: &TransformedLight,
    x: f64,
    y: f64,
    z: f64,
) -> (RGBA, Vector3<f64>) {
    let vector = match *source {
        TransformedLight::Distant { azimuth, elevation } => {
            let azimuth = azimuth.to_radians();
            let elevation = elevation.to_radians();
            Vector3::new(
                azimuth.cos() * elevation.cos(),
                azimuth.sin() * elevation.cos(),
                elevation.sin(),
            )
        }
        TransformedLight::Point { origin } | TransformedLight::Spot { origin, .. } => {
            let mut v = origin - Vector3::new(x, y, z);
            let _ = v.try_normalize_mut(0.0);
            v
        }
    };

    let color = match *source {
        TransformedLight::Spot {
            direction,
            specular_exponent,
            limiting_cone_angle,
            ..
        } => {
            let transparent_color = RGBA::new(0, 0, 0, 0);
            let minus_l_dot_s = -vector.dot(&direction);
            match limiting_cone_angle {
                _ if minus_l_dot_s <= 0.0 => transparent_color,
                Some(a) if minus_l_dot_s < a.to_radians().cos() => transparent_color,
                _ => {
                    let factor = minus_l_dot_s.powf(specular_exponent);
                    let compute = |x| round_channel(f64::from(x) * factor);

                    RGBA {
                        red: compute(lighting_color.red),
                        green: compute(lighting_color.green),
                        blue: compute(lighting_color.blue),
                        alpha: 255,
                    }
                }
            }
        }
        _ => *lighting_color,
    };

    (color, vector)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistantLight {
    pub azimuth: f64,
    pub elevation: f64,
}

impl DistantLight {
    fn transform(&self) -> TransformedLight {
        TransformedLight::Distant {
            azimuth: self.azimuth,
            elevation: self.elevation,
        }
    }
}

impl ElementTrait for DistantLight {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "azimuth") => {
                    set_attribute(&mut self.azimuth, attr.parse(value), session)
                }
                expanded_name!("", "elevation") => {
                    set_attribute(&mut self.elevation, attr.parse(value), session)
                }
                _ => (),
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PointLight {
    fn transform(&self, paffine: Transform) -> TransformedLight {
        let (x, y) = paffine.transform_point(self.x, self.y);
        let z = transform_dist(paffine, self.z);

        TransformedLight::Point {
            origin: Vector3::new(x, y, z),
        }
    }
}

impl ElementTrait for PointLight {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "x") => set_attribute(&mut self.x, attr.parse(value), session),
                expanded_name!("", "y") => set_attribute(&mut self.y, attr.parse(value), session),
                expanded_name!("", "z") => set_attribute(&mut self.z, attr.parse(value), session),
                _ => (),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub points_at_x: f64,
    pub points_at_y: f64,
    pub points_at_z: f64,
    pub specular_exponent: f64,
    pub limiting_cone_angle: Option<f64>,
}

// All the initial values are 0.0 except for specular_exponent, which is 1.
impl Default for SpotLight {
    fn default() -> SpotLight {
        SpotLight {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            points_at_x: 0.0,
            points_at_y: 0.0,
            points_at_z: 0.0,
            specular_exponent: 1.0,
            limiting_cone_angle: None,
        }
    }
}

impl SpotLight {
    fn transform(&self, paffine: Transform) -> TransformedLight {
        let (x, y) = paffine.transform_point(self.x, self.y);
        let z = transform_dist(paffine, self.z);
        let (points_at_x, points_at_y) =
            paffine.transform_point(self.points_at_x, self.points_at_y);
        let points_at_z = transform_dist(paffine, self.points_at_z);

        let origin = Vector3::new(x, y, z);
        let mut direction = Vector3::new(points_at_x, points_at_y, points_at_z) - origin;
        let _ = direction.try_normalize_mut(0.0);

        TransformedLight::Spot {
            origin,
            direction,
            specular_exponent: self.specular_exponent,
            limiting_cone_angle: self.limiting_cone_angle,
        }
    }
}

impl ElementTrait for SpotLight {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "x") => set_attribute(&mut self.x, attr.parse(value), session),
                expanded_name!("", "y") => set_attribute(&mut self.y, attr.parse(value), session),
                expanded_name!("", "z") => set_attribute(&mut self.z, attr.parse(value), session),
                expanded_name!("", "pointsAtX") => {
                    set_attribute(&mut self.points_at_x, attr.parse(value), session)
                }
                expanded_name!("", "pointsAtY") => {
                    set_attribute(&mut self.points_at_y, attr.parse(value), session)
                }
                expanded_name!("", "pointsAtZ") => {
                    set_attribute(&mut self.points_at_z, attr.parse(value), session)
                }

                expanded_name!("", "specularExponent") => {
                    set_attribute(&mut self.specular_exponent, attr.parse(value), session);
                }

                expanded_name!("", "limitingConeAngle") => {
                    set_attribute(&mut self.limiting_cone_angle, attr.parse(value), session);
                }

                _ => (),
            }
        }
    }
}

/// Applies the `primitiveUnits` coordinate transformation to a non-x or y distance.
#[inline]
fn transform_dist(t: Transform, d: f64) -> f64 {
    d * (t.xx.powi(2) + t.yy.powi(2)).sqrt() / std::f64::consts::SQRT_2
}

impl ElementTrait for FeDiffuseLighting {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.params.in1 = self.base.parse_one_input(attrs, session);
        self.lighting_color.set_attributes(attrs, session);

        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "surfaceScale") => {
                    set_attribute(&mut self.params.surface_scale, attr.parse(value), session);
                }
                expanded_name!("", "kernelUnitLength") => {
                    vfx_log!(session, "(kernelUnitLength is not supported; ignoring it)");
                }
                expanded_name!("", "diffuseConstant") => {
                    set_attribute(
                        &mut self.params.diffuse_constant,
                        attr.parse(value),
                        session,
                    );
                }
                _ => (),
            }
        }
    }
}

impl DiffuseLighting {
    #[inline]
    fn compute_factor(&self, normal: Normal, light_vector: Vector3<f64>) -> f64 {
        let k = if normal.normal.is_zero() {
            // Common case of (0, 0, 1) normal.
            light_vector.z
        } else {
            let mut n = normal
                .normal
                .map(|x| f64::from(x) * self.params.surface_scale / 255.);
            n.component_mul_assign(&normal.factor);
            let normal = Vector3::new(n.x, n.y, 1.0);

            normal.dot(&light_vector) / normal.norm()
        };

        self.params.diffuse_constant.0 * k
    }

    pub fn input(&self) -> &Input {
        &self.params.in1
    }

    pub fn light(&self) -> &Light {
        &self.light
    }
}

fn parse_specular_exponent(attr: &markup5ever::QualName, value: &str) -> Result<f64, ElementError> {
    let e: f64 = attr.parse(value)?;

    if (1.0..=128.0).contains(&e) {
        Ok(e)
    } else {
        Err(ElementError {
            attr: attr.clone(),
            err: ValueErrorKind::value_error("specularExponent should be between 1.0 and 128.0"),
        })
    }
}

impl ElementTrait for FeSpecularLighting {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.params.in1 = self.base.parse_one_input(attrs, session);
        self.lighting_color.set_attributes(attrs, session);

        for (attr, value) in attrs.iter() {
            match attr.expanded() {
                expanded_name!("", "surfaceScale") => {
                    set_attribute(&mut self.params.surface_scale, attr.parse(value), session);
                }
                expanded_name!("", "kernelUnitLength") => {
                    vfx_log!(session, "(kernelUnitLength is not supported; ignoring it)");
                }
                expanded_name!("", "specularConstant") => {
                    set_attribute(
                        &mut self.params.specular_constant,
                        attr.parse(value),
                        session,
                    );
                }
                expanded_name!("", "specularExponent") => {
                    set_attribute(
                        &mut self.params.specular_exponent,
                        parse_specular_exponent(&attr, value),
                        session,
                    );
                }
                _ => (),
            }
        }
    }
}

impl SpecularLighting {
    #[inline]
    fn compute_factor(&self, normal: Normal, light_vector: Vector3<f64>) -> f64 {
        let h = light_vector + Vector3::new(0.0, 0.0, 1.0);
        let h_norm = h.norm();

        if h_norm == 0.0 {
            return 0.0;
        }

        let n_dot_h = if normal.normal.is_zero() {
            // Common case of (0, 0, 1) normal.
            h.z / h_norm
        } else {
            let mut n = normal
                .normal
                .map(|x| f64::from(x) * self.params.surface_scale / 255.);
            n.component_mul_assign(&normal.factor);
            let normal = Vector3::new(n.x, n.y, 1.0);
            normal.dot(&h) / normal.norm() / h_norm
        };

        if approx_eq!(f64, self.params.specular_exponent, 1.0) {
            self.params.specular_constant.0 * n_dot_h
        } else {
            self.params.specular_constant.0 * n_dot_h.powf(self.params.specular_exponent)
        }
    }

    pub fn input(&self) -> &Input {
        &self.params.in1
    }

    pub fn light(&self) -> &Light {
        &self.light
    }
}

macro_rules! impl_lighting_filter {
    ($lighting_type:ty, $params_name:ident, $alpha_func:ident) => {
        impl $params_name {
            pub fn render(
                &self,
                bounds_builder: BoundsBuilder,
                ctx: &FilterContext,
                in1: &SlotRef,
            ) -> Result<FilterOutput, FilterError> {
                let input_1 = ctx.get_input(in1, self.light.color_interpolation_filters)?;
                let bounds: IRect = bounds_builder.compute(ctx).clipped.into();

                let (bounds_w, bounds_h) = bounds.size();

                // Check if the surface is too small for normal computation. This case is
                // unspecified; WebKit doesn't render anything in this case.
                if bounds_w < 2 || bounds_h < 2 {
                    return Err(FilterError::LightingInputTooSmall);
                }

                let input_surface = input_1.surface();

                let source = self.light.source.transform(ctx.paffine());

                let mut surface = ExclusiveImageSurface::new(
                    input_surface.width(),
                    input_surface.height(),
                    SurfaceType::from(self.light.color_interpolation_filters),
                )?;

                let lighting_color = self.light.color();

                {
                    let output_stride = surface.stride() as usize;
                    let mut output_data = surface.data();
                    let output_slice = &mut *output_data;

                    let compute_output_pixel = |output_slice: &mut [u8], x, y| {
                        let normal = Normal::at(input_surface, bounds, x, y);
                        let pixel = input_surface.get_pixel(x, y);

                        let z = f64::from(pixel.a) / 255.0 * self.params.surface_scale;

                        let (color, vector) =
                            color_and_vector(&lighting_color, &source, f64::from(x), f64::from(y), z);

                        // compute the factor just once for the three colors
                        let factor = self.compute_factor(normal, vector);
                        let compute = |x| round_channel(factor * f64::from(x));

                        let r = compute(color.red);
                        let g = compute(color.green);
                        let b = compute(color.blue);
                        let a = $alpha_func(r, g, b);

                        let output_pixel = Pixel { r, g, b, a };

                        output_slice.set_pixel(output_stride, output_pixel, x, 0);
                    };

                    let first_row = bounds.y0 as u32;
                    let one_past_last_row = bounds.y1 as u32;
                    let first_pixel = (first_row as usize) * output_stride;
                    let one_past_last_pixel = (one_past_last_row as usize) * output_stride;

                    // Rows are independent of each other.
                    output_slice[first_pixel..one_past_last_pixel]
                        .par_chunks_mut(output_stride)
                        .zip(first_row..one_past_last_row)
                        .for_each(|(slice, y)| {
                            for x in bounds.x0 as u32..bounds.x1 as u32 {
                                compute_output_pixel(slice, x, y);
                            }
                        });
                }

                let surface = surface.share()?;

                Ok(FilterOutput { surface, bounds })
            }
        }

        impl FilterEffect for $lighting_type {
            fn resolve(
                &self,
                element: &XmlElement,
                session: &Session,
            ) -> Result<ResolvedPrimitive, FilterResolveError> {
                let source = LightSource::from_children(element, session)?;
                let props = ColorProperties::from_attributes(&element.attributes, session);

                Ok(ResolvedPrimitive {
                    primitive: self.base.clone(),
                    params: PrimitiveParams::$params_name($params_name {
                        params: self.params.clone(),
                        light: Light {
                            source,
                            lighting_color: resolve_color(&self.lighting_color.0, props.color),
                            color_interpolation_filters: props.color_interpolation_filters,
                        },
                    }),
                })
            }
        }
    };
}

const fn diffuse_alpha(_r: u8, _g: u8, _b: u8) -> u8 {
    255
}

fn specular_alpha(r: u8, g: u8, b: u8) -> u8 {
    max(max(r, g), b)
}

impl_lighting_filter!(FeDiffuseLighting, DiffuseLighting, diffuse_alpha);

impl_lighting_filter!(FeSpecularLighting, SpecularLighting, specular_alpha);

/// 2D normal and factor stored separately.
///
/// The normal needs to be multiplied by `surface_scale * factor / 255` and
/// normalized with 1 as the z component.
/// pub for the purpose of accessing this from benchmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    pub factor: Vector2<f64>,
    pub normal: Vector2<i16>,
}

impl Normal {
    #[inline]
    fn new(factor_x: f64, nx: i16, factor_y: f64, ny: i16) -> Normal {
        // Negative nx and ny to account for the different coordinate system.
        Normal {
            factor: Vector2::new(factor_x, factor_y),
            normal: Vector2::new(-nx, -ny),
        }
    }

    /// Computes the surface normal at a pixel with the Sobel operator.
    ///
    /// At the edges of `bounds` the kernels are truncated: a missing neighbor column
    /// or row is replaced by the center one for the derivative across it, and dropped
    /// for the derivative along it.  The factor compensates for the smaller kernel.
    ///
    /// `bounds` must be at least 2×2 and contain `(x, y)`.
    #[inline]
    pub fn at(surface: &SharedImageSurface, bounds: IRect, x: u32, y: u32) -> Normal {
        debug_assert!(bounds.width() >= 2 && bounds.height() >= 2);
        debug_assert!(bounds.contains(x as i32, y as i32));

        let get = |x: i32, y: i32| i16::from(surface.get_pixel(x as u32, y as u32).a);
        let (x, y) = (x as i32, y as i32);

        let left = if x > bounds.x0 { x - 1 } else { x };
        let right = if x + 1 < bounds.x1 { x + 1 } else { x };
        let top = if y > bounds.y0 { y - 1 } else { y };
        let bottom = if y + 1 < bounds.y1 { y + 1 } else { y };

        let weights = |c: i32, lo: i32, hi: i32| {
            [(c - 1, 1), (c, 2), (c + 1, 1)]
                .into_iter()
                .filter(move |&(i, _)| i >= lo && i < hi)
        };

        let (mut nx, mut weight_x) = (0, 0);
        for (row, w) in weights(y, bounds.y0, bounds.y1) {
            nx += w * (get(right, row) - get(left, row));
            weight_x += w;
        }

        let (mut ny, mut weight_y) = (0, 0);
        for (col, w) in weights(x, bounds.x0, bounds.x1) {
            ny += w * (get(col, bottom) - get(col, top));
            weight_y += w;
        }

        let factor_x = 2.0 / (f64::from(weight_x) * f64::from(right - left));
        let factor_y = 2.0 / (f64::from(weight_y) * f64::from(bottom - top));

        Self::new(factor_x, nx, factor_y, ny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::FilterDocument;
    use crate::surface_utils::PixelOps;

    fn params_of<'a>(doc: &'a FilterDocument, index: usize) -> &'a PrimitiveParams {
        &doc.lookup("filter").unwrap().primitives()[index].params
    }

    #[test]
    fn extracts_light_source() {
        let document = FilterDocument::load_from_str(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg">
  <filter id="filter">
    <feDiffuseLighting id="diffuse_distant">
      <feDistantLight azimuth="0.0" elevation="45.0"/>
    </feDiffuseLighting>

    <feSpecularLighting id="specular_point">
      <fePointLight x="1.0" y="2.0" z="3.0"/>
    </feSpecularLighting>

    <feDiffuseLighting id="diffuse_spot">
      <feSpotLight x="1.0" y="2.0" z="3.0"
                   pointsAtX="4.0" pointsAtY="5.0" pointsAtZ="6.0"
                   specularExponent="7.0" limitingConeAngle="8.0"/>
    </feDiffuseLighting>
  </filter>
</svg>
"#,
            &Session::new_for_test_suite(),
        )
        .unwrap();

        let diffuse_lighting = match params_of(&document, 0) {
            PrimitiveParams::DiffuseLighting(l) => l,
            _ => unreachable!(),
        };
        assert_eq!(
            diffuse_lighting.light.source,
            LightSource::Distant(DistantLight {
                azimuth: 0.0,
                elevation: 45.0,
            })
        );

        let specular_lighting = match params_of(&document, 1) {
            PrimitiveParams::SpecularLighting(l) => l,
            _ => unreachable!(),
        };
        assert_eq!(
            specular_lighting.light.source,
            LightSource::Point(PointLight {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            })
        );

        let diffuse_lighting = match params_of(&document, 2) {
            PrimitiveParams::DiffuseLighting(l) => l,
            _ => unreachable!(),
        };
        assert_eq!(
            diffuse_lighting.light.source,
            LightSource::Spot(SpotLight {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                points_at_x: 4.0,
                points_at_y: 5.0,
                points_at_z: 6.0,
                specular_exponent: 7.0,
                limiting_cone_angle: Some(8.0),
            })
        );
    }

    #[test]
    fn primitives_without_exactly_one_light_are_not_loaded() {
        let document = FilterDocument::load_from_str(
            r#"<filter id="filter">
                 <feDiffuseLighting/>
                 <feSpecularLighting>
                   <feDistantLight/>
                   <fePointLight/>
                 </feSpecularLighting>
                 <feOffset/>
               </filter>"#,
            &Session::new_for_test_suite(),
        )
        .unwrap();

        let primitives = document.lookup("filter").unwrap().primitives();
        let names: Vec<&str> = primitives.iter().map(|p| p.params.name()).collect();
        assert_eq!(names, vec!["feDiffuseLighting", "feSpecularLighting", "feOffset"]);
        assert!(matches!(primitives[0].params, PrimitiveParams::Unloaded(_)));
        assert!(matches!(primitives[1].params, PrimitiveParams::Unloaded(_)));
    }

    #[test]
    fn resolves_current_color_and_linearizes() {
        let document = FilterDocument::load_from_str(
            r##"<filter id="filter">
                 <feDiffuseLighting lighting-color="currentColor" color="#808080">
                   <feDistantLight/>
                 </feDiffuseLighting>
                 <feDiffuseLighting lighting-color="#808080" color-interpolation-filters="sRGB">
                   <feDistantLight/>
                 </feDiffuseLighting>
               </filter>"##,
            &Session::new_for_test_suite(),
        )
        .unwrap();

        let linear = match params_of(&document, 0) {
            PrimitiveParams::DiffuseLighting(l) => l.light.color(),
            _ => unreachable!(),
        };
        let linear_128 = srgb::linearize(128);
        assert_eq!(linear, RGBA::new(linear_128, linear_128, linear_128, 255));

        let plain = match params_of(&document, 1) {
            PrimitiveParams::DiffuseLighting(l) => l.light.color(),
            _ => unreachable!(),
        };
        assert_eq!(plain, RGBA::new(128, 128, 128, 255));
    }

    #[test]
    fn specular_exponent_out_of_range_keeps_default() {
        let document = FilterDocument::load_from_str(
            r#"<filter id="filter">
                 <feSpecularLighting specularExponent="200"><feDistantLight/></feSpecularLighting>
               </filter>"#,
            &Session::new_for_test_suite(),
        )
        .unwrap();

        match params_of(&document, 0) {
            PrimitiveParams::SpecularLighting(l) => assert_eq!(l.params.specular_exponent, 1.0),
            _ => unreachable!(),
        }
    }

    fn alpha_surface(alphas: &[[u8; 3]; 3]) -> SharedImageSurface {
        let mut surface = ExclusiveImageSurface::new(3, 3, SurfaceType::SRgb).unwrap();
        surface.modify(&mut |data, stride| {
            for (y, row) in alphas.iter().enumerate() {
                for (x, &a) in row.iter().enumerate() {
                    let pixel = Pixel::new(0, 0, 0, a).premultiply();
                    data.set_pixel(stride, pixel, x as u32, y as u32);
                }
            }
        });
        surface.share().unwrap()
    }

    #[test]
    fn flat_surface_has_zero_normal() {
        let surface = alpha_surface(&[[100; 3]; 3]);
        let bounds = IRect::from_size(3, 3);

        for y in 0..3 {
            for x in 0..3 {
                assert!(Normal::at(&surface, bounds, x, y).normal.is_zero());
            }
        }
    }

    #[test]
    fn interior_normal_uses_full_sobel_kernel() {
        let surface = alpha_surface(&[[0, 10, 20], [0, 10, 20], [0, 10, 20]]);
        let n = Normal::at(&surface, IRect::from_size(3, 3), 1, 1);

        // (20 - 0) * (1 + 2 + 1), negated.
        assert_eq!(n.normal, Vector2::new(-80, 0));
        assert_eq!(n.factor, Vector2::new(1. / 4., 1. / 4.));
    }

    #[test]
    fn edge_and_corner_normals_use_truncated_kernels() {
        let surface = alpha_surface(&[[0, 10, 20], [0, 10, 20], [0, 10, 20]]);
        let bounds = IRect::from_size(3, 3);

        // Top left: -2 * center + 2 * right - bottom + bottom_right.
        let n = Normal::at(&surface, bounds, 0, 0);
        assert_eq!(n.normal, Vector2::new(-30, 0));
        assert_eq!(n.factor, Vector2::new(2. / 3., 2. / 3.));

        // Top row.
        let n = Normal::at(&surface, bounds, 1, 0);
        assert_eq!(n.normal, Vector2::new(-60, 0));
        assert_eq!(n.factor, Vector2::new(1. / 3., 1. / 2.));

        // Left column.
        let n = Normal::at(&surface, bounds, 0, 1);
        assert_eq!(n.normal, Vector2::new(-40, 0));
        assert_eq!(n.factor, Vector2::new(1. / 2., 1. / 3.));
    }

    #[test]
    fn specular_alpha_is_max_channel() {
        assert_eq!(specular_alpha(10, 200, 30), 200);
        assert_eq!(diffuse_alpha(0, 0, 0), 255);
    }
}
