//! Hyperspectral image data model.
//!
//! An [`HsImage`] owns a `[row, column, band]` cube and everything derived
//! from it at construction time: bit depth or normalisation range, band
//! labels and the mask of valid (non-negative) samples. It is never
//! mutated afterwards.

use ndarray::{
    Array, Array2, Array3, ArrayD, ArrayView1, ArrayView2, ArrayView3, Axis, Dimension, Ix2, Ix3,
    Slice,
};

use crate::constants::{RGB_MAX_DISTANCE_NM, RGB_WAVELENGTHS_NM};
use crate::data::display::{Channel, Preview, as_8bpp};
use crate::data::error::ModelError;
use crate::data::labels::{LabelType, auto_labels, parse_numeric};
use crate::data::normalisation::{NormRange, NormalisationMethod, positive_mask};
use crate::data::sample::{RawArray, Sample, SampleType};
use crate::data::similarity::{integer_threshold, similarity_mask, unit_threshold};

/// A `(row, column)` position inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub row: usize,
    pub col: usize,
}

impl Coordinates {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Coordinates {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Sample-type dependent parameters, validated at construction.
#[derive(Debug, Clone, PartialEq)]
enum Encoding {
    Integer { bpp: u32 },
    Float { range: NormRange },
}

/// Hyperspectral image data.
#[derive(Debug, Clone)]
pub struct HsImage {
    data: Array3<f64>,
    sample_type: SampleType,
    encoding: Encoding,
    labels: Vec<String>,
    labels_type: LabelType,
    pos_mask: Array3<bool>,
}

/// Builder collecting the optional parameters of an [`HsImage`].
#[derive(Debug, Clone)]
pub struct HsImageBuilder {
    data: ArrayD<f64>,
    sample_type: SampleType,
    bpp: Option<u32>,
    normalisation: Option<NormalisationMethod>,
    labels: Option<Vec<String>>,
    labels_type: Option<LabelType>,
}

impl HsImageBuilder {
    /// Bit depth of integer data.
    pub fn bpp(mut self, bpp: u32) -> Self {
        self.bpp = Some(bpp);
        self
    }

    /// Normalisation method of floating-point data.
    pub fn normalisation(mut self, method: NormalisationMethod) -> Self {
        self.normalisation = Some(method);
        self
    }

    /// Band labels; without a type they are treated as custom strings.
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Band labels together with their type.
    pub fn labels_with_type(mut self, labels: Vec<String>, labels_type: LabelType) -> Self {
        self.labels = Some(labels);
        self.labels_type = Some(labels_type);
        self
    }

    /// Validate the parameters and derive the normalisation data.
    pub fn build(self) -> Result<HsImage, ModelError> {
        let ndim = self.data.ndim();
        let data = self
            .data
            .into_dimensionality::<Ix3>()
            .map_err(|_| ModelError::NotThreeDimensional { ndim })?;

        let (height, width, bands) = data.dim();
        if bands == 0 {
            return Err(ModelError::NoBands);
        }
        if height == 0 || width == 0 {
            return Err(ModelError::NoPixels { height, width });
        }

        let (labels, labels_type) = match self.labels {
            None => (auto_labels(bands), LabelType::Auto),
            Some(labels) => {
                if labels.len() != bands {
                    return Err(ModelError::LabelCountMismatch {
                        labels: labels.len(),
                        bands,
                    });
                }
                (labels, self.labels_type.unwrap_or(LabelType::CustomStr))
            }
        };

        let pos_mask = positive_mask(data.view());

        let encoding = if self.sample_type.is_float() {
            let method = self.normalisation.ok_or(ModelError::MissingNormalisation)?;
            Encoding::Float {
                range: NormRange::compute(data.view(), &pos_mask, method)?,
            }
        } else {
            let bpp = self.bpp.ok_or(ModelError::MissingBitDepth)?;
            let max = self.sample_type.bits();
            if bpp == 0 || bpp > max {
                return Err(ModelError::BitDepthOutOfRange { bpp, max });
            }
            Encoding::Integer { bpp }
        };

        log::debug!(
            "HsImage: {:?} {} cube, {:?}, labels {:?}",
            data.dim(),
            self.sample_type,
            encoding,
            labels_type
        );

        Ok(HsImage {
            data,
            sample_type: self.sample_type,
            encoding,
            labels,
            labels_type,
            pos_mask,
        })
    }
}

impl HsImage {
    /// Start building an image from an array of any supported element type.
    ///
    /// The rank is only checked by [`HsImageBuilder::build`].
    pub fn builder<T: Sample, D: Dimension>(data: Array<T, D>) -> HsImageBuilder {
        Self::builder_raw(RawArray::new(data))
    }

    /// Start building an image from an already widened array.
    pub fn builder_raw(raw: RawArray) -> HsImageBuilder {
        HsImageBuilder {
            data: raw.data,
            sample_type: raw.sample_type,
            bpp: None,
            normalisation: None,
            labels: None,
            labels_type: None,
        }
    }

    /// Image height (number of rows).
    pub fn height(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Image width (number of columns).
    pub fn width(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Number of spectral bands.
    pub fn bands(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// `(height, width, bands)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// The raw sample cube.
    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Bit depth, present for integer data only.
    pub fn bpp(&self) -> Option<u32> {
        match self.encoding {
            Encoding::Integer { bpp } => Some(bpp),
            Encoding::Float { .. } => None,
        }
    }

    /// Normalisation method, present for floating data only.
    pub fn normalisation(&self) -> Option<NormalisationMethod> {
        self.norm_range().map(NormRange::method)
    }

    /// `norm_min`/`norm_span`, present for floating data only.
    pub fn norm_range(&self) -> Option<&NormRange> {
        match &self.encoding {
            Encoding::Float { range } => Some(range),
            Encoding::Integer { .. } => None,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn labels_type(&self) -> LabelType {
        self.labels_type
    }

    /// True where the sample is non-negative.
    pub fn pos_mask(&self) -> &Array3<bool> {
        &self.pos_mask
    }

    /// Clamp a possibly out-of-range position into the image.
    pub fn clamp(&self, row: i64, col: i64) -> Coordinates {
        let clamp_axis = |v: i64, len: usize| -> usize {
            let max = len.saturating_sub(1) as i64;
            v.clamp(0, max) as usize
        };
        Coordinates::new(clamp_axis(row, self.height()), clamp_axis(col, self.width()))
    }

    /// Band vector of a single pixel.
    pub fn get_pixel(&self, row: usize, col: usize) -> ArrayView1<'_, f64> {
        self.data.index_axis(Axis(0), row).index_axis_move(Axis(0), col)
    }

    /// Inclusive rectangle between two corners, in any corner order.
    pub fn get_area(&self, p1: Coordinates, p2: Coordinates) -> ArrayView3<'_, f64> {
        let (r0, r1) = (p1.row.min(p2.row), p1.row.max(p2.row));
        let (c0, c1) = (p1.col.min(p2.col), p1.col.max(p2.col));
        // upper bounds are inclusive
        self.data
            .slice_axis(Axis(0), Slice::from(r0..r1 + 1))
            .slice_axis_move(Axis(1), Slice::from(c0..c1 + 1))
    }

    /// A single band plane.
    pub fn get_band(&self, idx: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), idx)
    }

    /// Three bands stacked as `[h, w, 3]`. Indices may repeat.
    pub fn get_rgb_bands(&self, r: usize, g: usize, b: usize) -> Array3<f64> {
        assert!(self.bands() >= 3, "RGB view needs at least 3 bands");
        self.data.select(Axis(2), &[r, g, b])
    }

    /// Band indices whose wavelengths are closest to red, green and blue.
    ///
    /// `None` unless labels are numeric wavelengths and every channel has a
    /// band within the allowed distance.
    pub fn closest_rgb_idx(&self) -> Option<(usize, usize, usize)> {
        if self.labels_type != LabelType::Wavelength {
            return None;
        }

        let wavelengths: Vec<f64> = self
            .labels
            .iter()
            .map(|l| parse_numeric(l))
            .collect::<Option<_>>()?;

        let mut best = [(0usize, f64::INFINITY); 3];
        for (i, &wl) in wavelengths.iter().enumerate() {
            for (slot, target) in best.iter_mut().zip(RGB_WAVELENGTHS_NM) {
                let diff = (target - wl).abs();
                if diff < slot.1 {
                    *slot = (i, diff);
                }
            }
        }

        let worst = best.iter().map(|b| b.1).fold(0.0, f64::max);
        if worst < RGB_MAX_DISTANCE_NM {
            Some((best[0].0, best[1].0, best[2].0))
        } else {
            None
        }
    }

    /// Floating data mapped onto `[0, 1]`; integer data unchanged.
    pub fn normalised(&self) -> Array3<f64> {
        match &self.encoding {
            Encoding::Float { range } => range.apply(self.data.view()),
            Encoding::Integer { .. } => self.data.clone(),
        }
    }

    /// A single band with the matching normalisation applied.
    pub fn get_band_normalised(&self, idx: usize) -> Array2<f64> {
        let band = self.get_band(idx).to_owned();
        match &self.encoding {
            Encoding::Float { range } => range.apply_band(idx, band),
            Encoding::Integer { .. } => band,
        }
    }

    /// Three bands with the matching per-band normalisation applied.
    pub fn get_rgb_bands_normalised(&self, r: usize, g: usize, b: usize) -> Array3<f64> {
        let mut rgb = self.get_rgb_bands(r, g, b);
        if let Encoding::Float { range } = &self.encoding {
            for (mut plane, idx) in rgb.axis_iter_mut(Axis(2)).zip([r, g, b]) {
                let (min, span) = range.for_band(idx);
                plane.mapv_inplace(|v| (v - min) / span);
            }
        }
        rgb
    }

    /// Mask of pixels similar to the one at `base`.
    ///
    /// `threshold_percent` is a percentage of the maximum possible MSE:
    /// `(2^bpp - 1)^2` for integer data, 1 for normalised floating data.
    pub fn get_similar(&self, base: Coordinates, threshold_percent: f64) -> Array2<bool> {
        match &self.encoding {
            Encoding::Integer { bpp } => {
                let threshold = integer_threshold(*bpp, threshold_percent);
                let base = self.get_pixel(base.row, base.col);
                similarity_mask(self.data.view(), base, threshold)
            }
            Encoding::Float { range } => {
                let normalised = range.apply(self.data.view());
                let base = normalised
                    .index_axis(Axis(0), base.row)
                    .index_axis_move(Axis(0), base.col);
                similarity_mask(normalised.view(), base, unit_threshold(threshold_percent))
            }
        }
    }

    /// Reduce integer data to 8 bits. `None` for floating data.
    pub fn as_8bpp<D: Dimension>(&self, data: &Array<f64, D>) -> Option<Array<u8, D>> {
        self.bpp().map(|bpp| as_8bpp(data, bpp))
    }

    /// Grayscale preview of one band.
    pub fn mono_preview(&self, band: usize) -> Preview {
        Preview::Mono(self.band_channel(band))
    }

    /// False-colour preview of three bands.
    pub fn rgb_preview(&self, r: usize, g: usize, b: usize) -> Preview {
        let channel = match self.bpp() {
            Some(bpp) => Channel::Bytes(as_8bpp(&self.get_rgb_bands(r, g, b), bpp)),
            None => Channel::Unit(self.get_rgb_bands_normalised(r, g, b).mapv(unit_clamp)),
        };
        Preview::Rgb(channel)
    }

    /// One band with a similarity mask on top.
    pub fn similar_preview(&self, band: usize, mask: Array2<bool>) -> Preview {
        Preview::Similar {
            band: self.band_channel(band),
            mask,
        }
    }

    fn band_channel(&self, band: usize) -> Channel<Ix2> {
        match self.bpp() {
            Some(bpp) => Channel::Bytes(as_8bpp(&self.get_band(band).to_owned(), bpp)),
            None => Channel::Unit(self.get_band_normalised(band).mapv(unit_clamp)),
        }
    }
}

fn unit_clamp(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array3, array};

    fn int_cube() -> HsImage {
        let data = Array::from_shape_fn((4, 5, 3), |(r, c, b)| (r * 100 + c * 10 + b) as u16);
        HsImage::builder(data).bpp(12).build().unwrap()
    }

    fn wavelength_image(labels: &[&str]) -> HsImage {
        let data = Array3::<u8>::zeros((2, 2, labels.len()));
        HsImage::builder(data)
            .bpp(8)
            .labels_with_type(
                labels.iter().map(|s| s.to_string()).collect(),
                LabelType::Wavelength,
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_creation_defaults() {
        let img = int_cube();
        assert_eq!(img.shape(), (4, 5, 3));
        assert_eq!(img.bpp(), Some(12));
        assert_eq!(img.normalisation(), None);
        assert_eq!(img.labels(), &["0", "1", "2"]);
        assert_eq!(img.labels_type(), LabelType::Auto);
        assert_eq!(img.sample_type(), SampleType::U16);
    }

    #[test]
    fn test_rejects_wrong_rank() {
        let err = HsImage::builder(Array2::<u8>::zeros((3, 3)))
            .bpp(8)
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::NotThreeDimensional { ndim: 2 });
    }

    #[test]
    fn test_rejects_empty_axes() {
        let err = HsImage::builder(Array3::<u8>::zeros((0, 4, 3)))
            .bpp(8)
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::NoPixels { height: 0, width: 4 });

        let err = HsImage::builder(Array3::<f32>::zeros((2, 0, 3)))
            .normalisation(NormalisationMethod::Band)
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::NoPixels { height: 2, width: 0 });

        let err = HsImage::builder(Array3::<u8>::zeros((2, 2, 0)))
            .bpp(8)
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::NoBands);
    }

    #[test]
    fn test_rejects_label_mismatch() {
        let err = HsImage::builder(Array3::<u8>::zeros((2, 2, 3)))
            .bpp(8)
            .labels(vec!["a".into(), "b".into()])
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::LabelCountMismatch { labels: 2, bands: 3 });
    }

    #[test]
    fn test_labels_default_to_custom() {
        let img = HsImage::builder(Array3::<u8>::zeros((1, 1, 2)))
            .bpp(8)
            .labels(vec!["x".into(), "x".into()])
            .build()
            .unwrap();
        assert_eq!(img.labels_type(), LabelType::CustomStr);
    }

    #[test]
    fn test_missing_parameters() {
        let err = HsImage::builder(Array3::<u16>::zeros((1, 1, 1))).build().unwrap_err();
        assert_eq!(err, ModelError::MissingBitDepth);

        let err = HsImage::builder(Array3::<f32>::zeros((1, 1, 1))).build().unwrap_err();
        assert_eq!(err, ModelError::MissingNormalisation);

        let err = HsImage::builder(Array3::<u8>::zeros((1, 1, 1))).bpp(9).build().unwrap_err();
        assert_eq!(err, ModelError::BitDepthOutOfRange { bpp: 9, max: 8 });
    }

    #[test]
    fn test_all_negative_float_fails() {
        let data = Array3::from_elem((3, 3, 2), -1.5f32);
        let err = HsImage::builder(data)
            .normalisation(NormalisationMethod::Global)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::NoValidRange { .. }));
    }

    #[test]
    fn test_get_pixel() {
        let img = int_cube();
        assert_eq!(img.get_pixel(2, 3), array![230.0, 231.0, 232.0]);
    }

    #[test]
    fn test_get_area_inclusive_and_order_independent() {
        let img = int_cube();
        let a = img.get_area(Coordinates::new(1, 1), Coordinates::new(3, 2));
        assert_eq!(a.dim(), (3, 2, 3));
        assert_eq!(a[[0, 0, 0]], 110.0);
        assert_eq!(a[[2, 1, 2]], 322.0);

        for (p1, p2) in [((0, 4), (3, 0)), ((2, 2), (2, 2)), ((3, 1), (0, 3))] {
            let p1 = Coordinates::from(p1);
            let p2 = Coordinates::from(p2);
            assert_eq!(img.get_area(p1, p2), img.get_area(p2, p1));
        }

        let single = img.get_area(Coordinates::new(2, 2), Coordinates::new(2, 2));
        assert_eq!(single.dim(), (1, 1, 3));
    }

    #[test]
    fn test_bands() {
        let img = int_cube();
        assert_eq!(img.get_band(1)[[3, 4]], 341.0);
        let rgb = img.get_rgb_bands(2, 2, 0);
        assert_eq!(rgb.dim(), (4, 5, 3));
        assert_eq!(rgb[[0, 0, 0]], 2.0);
        assert_eq!(rgb[[0, 0, 1]], 2.0);
        assert_eq!(rgb[[0, 0, 2]], 0.0);
    }

    #[test]
    fn test_clamp() {
        let img = int_cube();
        assert_eq!(img.clamp(-4, 2), Coordinates::new(0, 2));
        assert_eq!(img.clamp(10, 99), Coordinates::new(3, 4));
    }

    #[test]
    fn test_closest_rgb_idx() {
        let img = wavelength_image(&["450", "470", "530", "600", "640"]);
        assert_eq!(img.closest_rgb_idx(), Some((4, 2, 1)));
    }

    #[test]
    fn test_closest_rgb_ties_keep_first() {
        let img = wavelength_image(&["630", "630", "532", "465"]);
        assert_eq!(img.closest_rgb_idx(), Some((0, 2, 3)));
    }

    #[test]
    fn test_closest_rgb_too_far() {
        // blue target is 465, nearest band 500 is 35 nm away
        let img = wavelength_image(&["500", "532", "630"]);
        assert_eq!(img.closest_rgb_idx(), None);
    }

    #[test]
    fn test_closest_rgb_requires_numeric_wavelengths() {
        let img = wavelength_image(&["465", "blue-ish", "630"]);
        assert_eq!(img.closest_rgb_idx(), None);

        let auto = int_cube();
        assert_eq!(auto.closest_rgb_idx(), None);

        let custom = HsImage::builder(Array3::<u8>::zeros((1, 1, 3)))
            .bpp(8)
            .labels_with_type(
                vec!["465".into(), "532".into(), "630".into()],
                LabelType::CustomStr,
            )
            .build()
            .unwrap();
        assert_eq!(custom.closest_rgb_idx(), None);
    }

    #[test]
    fn test_normalised_float_in_unit_range() {
        let data = array![[[0.5f32, 2.0], [1.5, -1.0]], [[3.0, 4.0], [2.5, 0.0]]];
        for method in NormalisationMethod::all() {
            let img = HsImage::builder(data.clone()).normalisation(*method).build().unwrap();
            let norm = img.normalised();
            for ((v, n), valid) in img.data().iter().zip(norm.iter()).zip(img.pos_mask().iter()) {
                if *valid && v.is_finite() {
                    assert!((0.0..=1.0).contains(n), "{:?}: {} -> {}", method, v, n);
                }
            }
        }
    }

    #[test]
    fn test_normalised_integer_unchanged() {
        let img = int_cube();
        assert_eq!(img.normalised(), img.data().to_owned());
        assert_eq!(img.get_band_normalised(0), img.get_band(0).to_owned());
    }

    #[test]
    fn test_band_normalised_uses_band_range() {
        let data = array![[[0.0f64, 10.0], [2.0, 30.0]]];
        let img = HsImage::builder(data)
            .normalisation(NormalisationMethod::Band)
            .build()
            .unwrap();
        assert_eq!(img.get_band_normalised(1), array![[0.0, 1.0]]);
        let rgb = img.get_rgb_bands_normalised(1, 0, 1);
        assert_eq!(rgb[[0, 1, 0]], 1.0);
        assert_eq!(rgb[[0, 1, 1]], 1.0);
        assert_eq!(rgb[[0, 0, 2]], 0.0);
    }

    #[test]
    fn test_similar_includes_base() {
        let img = int_cube();
        for (r, c) in [(0, 0), (3, 4), (1, 2)] {
            let base = Coordinates::new(r, c);
            assert!(img.get_similar(base, 100.0)[[r, c]]);
            let exact = img.get_similar(base, 0.0);
            assert!(exact[[r, c]]);
            assert_eq!(exact.iter().filter(|&&m| m).count(), 1);
        }
    }

    #[test]
    fn test_similar_scenario_8bpp() {
        let mut data = Array3::from_elem((4, 4, 3), 200u8);
        data.index_axis_mut(Axis(0), 0).index_axis_move(Axis(0), 0).fill(10);
        let img = HsImage::builder(data).bpp(8).build().unwrap();
        let mask = img.get_similar(Coordinates::new(0, 0), 50.0);

        let mut expected = Array2::from_elem((4, 4), false);
        expected[[0, 0]] = true;
        assert_eq!(mask, expected);
    }

    #[test]
    fn test_similar_float_uses_normalised_scale() {
        // values 0..100, normalised to 0..1; neighbour differs by 0.1 in every band
        let data = array![[[0.0f64, 0.0], [10.0, 10.0], [100.0, 100.0]]];
        let img = HsImage::builder(data)
            .normalisation(NormalisationMethod::Global)
            .build()
            .unwrap();
        let mask = img.get_similar(Coordinates::new(0, 0), 2.0);
        assert_eq!(mask, array![[true, true, false]]);
        let mask = img.get_similar(Coordinates::new(0, 0), 0.5);
        assert_eq!(mask, array![[true, false, false]]);
    }

    #[test]
    fn test_previews() {
        let img = int_cube();
        match img.mono_preview(0) {
            Preview::Mono(Channel::Bytes(band)) => assert_eq!(band.dim(), (4, 5)),
            other => panic!("unexpected preview {:?}", other),
        }
        assert_eq!(img.rgb_preview(0, 1, 2).dimensions(), (4, 5));

        let float = HsImage::builder(array![[[0.0f32], [2.0]]])
            .normalisation(NormalisationMethod::Global)
            .build()
            .unwrap();
        match float.mono_preview(0) {
            Preview::Mono(Channel::Unit(band)) => assert_eq!(band, array![[0.0, 1.0]]),
            other => panic!("unexpected preview {:?}", other),
        }
        assert!(float.as_8bpp(&float.data().to_owned()).is_none());
    }
}
