//! Questions a loader may need answered before an image can be built.
//!
//! Loaders never talk to a UI directly. They receive an [`Interactive`]
//! implementation from the caller, so the same adapter works with a dialog
//! front end, the terminal, or canned answers in tests. Every question can
//! be cancelled, which loaders propagate as `Ok(None)`.

use crate::data::error::LoaderError;
use crate::data::hyperspectral::HsImage;
use crate::data::labels::LabelType;
use crate::data::normalisation::NormalisationMethod;
use crate::data::sample::RawArray;

/// Capability to ask the user simple questions.
pub trait Interactive {
    /// Pick one of `options`; returns its index or `None` on cancel.
    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<usize>;

    /// Enter an integer within `min..=max`; `None` on cancel.
    fn enter_integer(&mut self, prompt: &str, min: i64, max: i64) -> Option<i64>;
}

/// Physical axis order of a 3-D array whose layout is not in the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    HeightWidthBands,
    WidthHeightBands,
    BandsHeightWidth,
    BandsWidthHeight,
}

impl AxisOrder {
    pub fn all() -> &'static [AxisOrder] {
        &[
            AxisOrder::HeightWidthBands,
            AxisOrder::WidthHeightBands,
            AxisOrder::BandsHeightWidth,
            AxisOrder::BandsWidthHeight,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AxisOrder::HeightWidthBands => "[height, width, bands]",
            AxisOrder::WidthHeightBands => "[width, height, bands]",
            AxisOrder::BandsHeightWidth => "[bands, height, width]",
            AxisOrder::BandsWidthHeight => "[bands, width, height]",
        }
    }

    /// Axis permutation producing `[height, width, bands]`.
    pub fn permutation(&self) -> [usize; 3] {
        match self {
            AxisOrder::HeightWidthBands => [0, 1, 2],
            AxisOrder::WidthHeightBands => [1, 0, 2],
            AxisOrder::BandsHeightWidth => [1, 2, 0],
            AxisOrder::BandsWidthHeight => [2, 1, 0],
        }
    }
}

/// Ask for the normalisation method of floating-point data.
pub fn ask_normalisation(ui: &mut dyn Interactive) -> Option<NormalisationMethod> {
    let methods = NormalisationMethod::all();
    let options: Vec<String> = methods.iter().map(|m| m.name().to_string()).collect();
    let idx = ui.choose("Normalisation method:", &options)?;
    methods.get(idx).copied()
}

/// Ask for the bit depth of integer data.
///
/// The lower bound is the smallest depth holding the observed maximum,
/// the upper bound the element width.
pub fn ask_bpp(ui: &mut dyn Interactive, raw: &RawArray) -> Option<u32> {
    let min = i64::from(raw.min_bpp());
    let max = i64::from(raw.sample_type.bits());
    let bpp = ui.enter_integer("Bits per pixel:", min, max)?;
    // answers outside the offered range are treated as a cancel
    if (min..=max).contains(&bpp) {
        u32::try_from(bpp).ok()
    } else {
        log::warn!("bit depth {} outside {}..={}, ignoring", bpp, min, max);
        None
    }
}

/// Ask how the axes of a 3-D array are ordered and reorder it.
pub fn ask_axis_order(ui: &mut dyn Interactive, raw: RawArray) -> Option<RawArray> {
    let shape = raw
        .shape()
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let orders = AxisOrder::all();
    let options: Vec<String> = orders.iter().map(|o| o.name().to_string()).collect();
    let idx = ui.choose(&format!("Array order [{}]:", shape), &options)?;
    let order = orders.get(idx)?;
    log::debug!("axis order {} selected", order.name());
    Some(raw.permuted(order.permutation()))
}

/// A 3-D variable found in a container file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub shape: Vec<usize>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, shape: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// `"name (d0, d1, d2)"`
    pub fn description(&self) -> String {
        let dims = self
            .shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({})", self.name, dims)
    }
}

/// Pick the variable holding the image.
///
/// No candidate is an error, a single one is used directly, several are
/// offered to the user.
pub fn select_variable(
    ui: &mut dyn Interactive,
    candidates: &[Candidate],
) -> Result<Option<String>, LoaderError> {
    match candidates {
        [] => Err(LoaderError::NoCube),
        [only] => Ok(Some(only.name.clone())),
        many => {
            let options: Vec<String> = many.iter().map(Candidate::description).collect();
            Ok(ui
                .choose("Variable containing image:", &options)
                .and_then(|idx| many.get(idx))
                .map(|c| c.name.clone()))
        }
    }
}

/// Ask for bit depth or normalisation and build the image.
pub fn finish_image(
    ui: &mut dyn Interactive,
    raw: RawArray,
    labels: Option<(Vec<String>, LabelType)>,
) -> Result<Option<HsImage>, LoaderError> {
    if raw.ndim() != 3 {
        return Err(LoaderError::WrongRank { ndim: raw.ndim() });
    }

    let mut builder = if raw.sample_type.is_float() {
        let Some(method) = ask_normalisation(ui) else {
            return Ok(None);
        };
        HsImage::builder_raw(raw).normalisation(method)
    } else {
        let Some(bpp) = ask_bpp(ui, &raw) else {
            return Ok(None);
        };
        HsImage::builder_raw(raw).bpp(bpp)
    };

    if let Some((labels, labels_type)) = labels {
        builder = builder.labels_with_type(labels, labels_type);
    }

    Ok(Some(builder.build()?))
}
