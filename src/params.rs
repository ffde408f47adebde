//! Codec parameter values and their shape hierarchy.
//!
//! Every format owns a concrete parameters type. Callers may hand a codec
//! any value whose type is that format's own type or one of its ancestors;
//! the adapter resolves it through [`ParamsShape`] tags rather than by
//! comparing Rust types directly.
//!
//! The shipped hierarchy:
//!
//! ```text
//! ImagingParams
//! ├── XmpParams
//! │   └── PngParams
//! └── PnmParams
//! ```

use core::any::Any;
use core::fmt;

use crate::Limits;

/// Static descriptor naming one parameters type and its parent.
///
/// Shapes are compared structurally (name and full ancestor chain), so two
/// `const` copies of the same descriptor are equal.
#[derive(Debug, PartialEq, Eq)]
pub struct ParamsShape {
    name: &'static str,
    parent: Option<&'static ParamsShape>,
}

/// How a supplied shape relates to the shape a codec is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeRelation {
    /// Same shape.
    Exact,
    /// Strictly more general than the bound shape.
    Ancestor,
    /// Unrelated, or more specific than the bound shape.
    Incompatible,
}

impl ParamsShape {
    /// A shape with no parent.
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A shape extending `parent`.
    pub const fn derived(name: &'static str, parent: &'static ParamsShape) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static ParamsShape> {
        self.parent
    }

    /// Iterate over the strict ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'static ParamsShape> {
        core::iter::successors(self.parent, |shape| shape.parent)
    }

    /// Classify `self` (the supplied shape) against `bound`.
    pub fn relation_to(&self, bound: &ParamsShape) -> ShapeRelation {
        if self == bound {
            ShapeRelation::Exact
        } else if bound.ancestors().any(|ancestor| ancestor == self) {
            ShapeRelation::Ancestor
        } else {
            ShapeRelation::Incompatible
        }
    }
}

impl fmt::Display for ParamsShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type-erased parameters value, as passed by callers.
pub trait CodecParams: Any + fmt::Debug + Send + Sync {
    /// The runtime shape tag of this value.
    fn shape(&self) -> &'static ParamsShape;

    /// Fields shared by every shape.
    fn common(&self) -> &ImagingParams;

    /// XMP payload, for shapes that carry one.
    fn xmp_xml(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// A concrete parameters type a codec can be bound to.
pub trait ParamsType: CodecParams + Clone + Default {
    const SHAPE: &'static ParamsShape;

    /// Build a value of this type from a possibly more general one.
    ///
    /// Copies every field the source defines; fields only this type defines
    /// keep their defaults.
    fn copy_from(other: &dyn CodecParams) -> Self;
}

/// Unit of a [`PixelDensity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DensityUnit {
    /// Only the aspect ratio is meaningful.
    #[default]
    Unitless,
    PerMeter,
    PerInch,
}

/// Physical pixel density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelDensity {
    pub horizontal: f64,
    pub vertical: f64,
    pub unit: DensityUnit,
}

const METERS_PER_INCH: f64 = 0.0254;

impl PixelDensity {
    /// Density in dots per inch, the same on both axes.
    pub fn dpi(dpi: f64) -> Self {
        Self {
            horizontal: dpi,
            vertical: dpi,
            unit: DensityUnit::PerInch,
        }
    }

    /// Horizontal and vertical pixels per meter, if the unit is physical.
    pub fn per_meter(&self) -> Option<(f64, f64)> {
        match self.unit {
            DensityUnit::Unitless => None,
            DensityUnit::PerMeter => Some((self.horizontal, self.vertical)),
            DensityUnit::PerInch => Some((
                self.horizontal / METERS_PER_INCH,
                self.vertical / METERS_PER_INCH,
            )),
        }
    }

    /// Horizontal and vertical pixels per inch, if the unit is physical.
    pub fn per_inch(&self) -> Option<(f64, f64)> {
        self.per_meter()
            .map(|(h, v)| (h * METERS_PER_INCH, v * METERS_PER_INCH))
    }
}

/// Shape tag of [`ImagingParams`].
pub const IMAGING_PARAMS: ParamsShape = ParamsShape::root("ImagingParams");
/// Shape tag of [`XmpParams`].
pub const XMP_PARAMS: ParamsShape = ParamsShape::derived("XmpParams", &IMAGING_PARAMS);

/// Parameters common to every format. The root of the shape hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImagingParams {
    /// Reject input a lenient reader would tolerate.
    pub strict: bool,
    /// Name of the file being read or written, used in diagnostics.
    pub file_name: Option<String>,
    /// Physical density to write, where the format can store it.
    pub pixel_density: Option<PixelDensity>,
    pub limits: Limits,
}

impl ImagingParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_pixel_density(mut self, density: PixelDensity) -> Self {
        self.pixel_density = Some(density);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

impl CodecParams for ImagingParams {
    fn shape(&self) -> &'static ParamsShape {
        Self::SHAPE
    }

    fn common(&self) -> &ImagingParams {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParamsType for ImagingParams {
    const SHAPE: &'static ParamsShape = &IMAGING_PARAMS;

    fn copy_from(other: &dyn CodecParams) -> Self {
        other.common().clone()
    }
}

/// Parameters for formats that can embed an XMP packet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmpParams {
    pub common: ImagingParams,
    /// Serialized XMP packet to embed on write.
    pub xmp_xml: Option<String>,
}

impl XmpParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_xmp_xml(mut self, xmp_xml: impl Into<String>) -> Self {
        self.xmp_xml = Some(xmp_xml.into());
        self
    }
}

impl CodecParams for XmpParams {
    fn shape(&self) -> &'static ParamsShape {
        Self::SHAPE
    }

    fn common(&self) -> &ImagingParams {
        &self.common
    }

    fn xmp_xml(&self) -> Option<&str> {
        self.xmp_xml.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParamsType for XmpParams {
    const SHAPE: &'static ParamsShape = &XMP_PARAMS;

    fn copy_from(other: &dyn CodecParams) -> Self {
        Self {
            common: other.common().clone(),
            xmp_xml: other.xmp_xml().map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNRELATED: ParamsShape = ParamsShape::root("Unrelated");
    const GRANDCHILD: ParamsShape = ParamsShape::derived("Grandchild", &XMP_PARAMS);

    #[test]
    fn relation_exact() {
        assert_eq!(XMP_PARAMS.relation_to(&XMP_PARAMS), ShapeRelation::Exact);
    }

    #[test]
    fn relation_ancestor_is_transitive() {
        assert_eq!(IMAGING_PARAMS.relation_to(&XMP_PARAMS), ShapeRelation::Ancestor);
        assert_eq!(IMAGING_PARAMS.relation_to(&GRANDCHILD), ShapeRelation::Ancestor);
        assert_eq!(XMP_PARAMS.relation_to(&GRANDCHILD), ShapeRelation::Ancestor);
    }

    #[test]
    fn relation_descendant_and_unrelated_are_incompatible() {
        assert_eq!(GRANDCHILD.relation_to(&XMP_PARAMS), ShapeRelation::Incompatible);
        assert_eq!(UNRELATED.relation_to(&XMP_PARAMS), ShapeRelation::Incompatible);
        assert_eq!(XMP_PARAMS.relation_to(&UNRELATED), ShapeRelation::Incompatible);
    }

    #[test]
    fn same_name_different_parent_is_not_exact() {
        const IMPOSTOR: ParamsShape = ParamsShape::derived("XmpParams", &UNRELATED);
        assert_eq!(IMPOSTOR.relation_to(&XMP_PARAMS), ShapeRelation::Incompatible);
    }

    #[test]
    fn ancestors_nearest_first() {
        let names: Vec<_> = GRANDCHILD.ancestors().map(ParamsShape::name).collect();
        assert_eq!(names, ["XmpParams", "ImagingParams"]);
    }

    #[test]
    fn defaults_are_empty() {
        let params = XmpParams::default();
        assert!(!params.common.strict);
        assert_eq!(params.common.file_name, None);
        assert_eq!(params.xmp_xml, None);
    }

    #[test]
    fn xmp_copy_from_base_leaves_payload_absent() {
        let base = ImagingParams::new().with_strict(true).with_file_name("a.png");
        let copied = XmpParams::copy_from(&base);
        assert_eq!(copied.common, base);
        assert_eq!(copied.xmp_xml, None);
    }

    #[test]
    fn xmp_copy_from_xmp_keeps_payload() {
        let source = XmpParams::new().with_xmp_xml("<x:xmpmeta/>");
        let copied = XmpParams::copy_from(&source);
        assert_eq!(copied, source);
    }

    #[test]
    fn base_copy_drops_extension_fields() {
        let source = XmpParams {
            common: ImagingParams::new().with_strict(true),
            xmp_xml: Some("<x/>".into()),
        };
        let copied = ImagingParams::copy_from(&source);
        assert!(copied.strict);
    }

    #[test]
    fn density_conversions() {
        let density = PixelDensity::dpi(254.0);
        let (h, v) = density.per_meter().unwrap();
        assert!((h - 10_000.0).abs() < 1e-6);
        assert!((v - 10_000.0).abs() < 1e-6);
        let (h, _) = density.per_inch().unwrap();
        assert!((h - 254.0).abs() < 1e-9);

        let aspect = PixelDensity {
            horizontal: 1.0,
            vertical: 2.0,
            unit: DensityUnit::Unitless,
        };
        assert_eq!(aspect.per_meter(), None);
    }
}
