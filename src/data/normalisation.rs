//! Normalisation of floating-point cubes onto `[0, 1]`.
//!
//! Only non-negative finite samples take part in the extrema; negative
//! values are treated as fill/invalid markers.

use std::fmt;

use ndarray::{Array1, Array2, Array3, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::data::error::ModelError;

/// How the normalisation range is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalisationMethod {
    /// One min/span for the whole cube
    Global,
    /// One min/span per band
    Band,
}

impl NormalisationMethod {
    /// Display name used in prompts.
    pub fn name(&self) -> &'static str {
        match self {
            NormalisationMethod::Global => "Global",
            NormalisationMethod::Band => "Per band",
        }
    }

    /// All methods in prompt order.
    pub fn all() -> &'static [NormalisationMethod] {
        &[NormalisationMethod::Global, NormalisationMethod::Band]
    }
}

/// Part of the cube a range was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormScope {
    Global,
    Band(usize),
}

impl fmt::Display for NormScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormScope::Global => write!(f, "the whole image"),
            NormScope::Band(idx) => write!(f, "band {}", idx),
        }
    }
}

/// Derived `norm_min`/`norm_span`, scalar or per band.
#[derive(Debug, Clone, PartialEq)]
pub enum NormRange {
    Global { min: f64, span: f64 },
    Band { min: Array1<f64>, span: Array1<f64> },
}

impl NormRange {
    /// Compute the range for `data` using the given method.
    pub fn compute(
        data: ArrayView3<'_, f64>,
        pos_mask: &Array3<bool>,
        method: NormalisationMethod,
    ) -> Result<Self, ModelError> {
        match method {
            NormalisationMethod::Global => {
                let (min, max) = valid_extrema(data.iter().zip(pos_mask.iter()))
                    .ok_or(ModelError::NoValidRange {
                        scope: NormScope::Global,
                    })?;
                Ok(NormRange::Global {
                    min,
                    span: span_of(min, max),
                })
            }
            NormalisationMethod::Band => {
                let bands = data.len_of(Axis(2));
                let mut mins = Array1::zeros(bands);
                let mut spans = Array1::zeros(bands);
                for (b, (band, mask)) in data
                    .axis_iter(Axis(2))
                    .zip(pos_mask.axis_iter(Axis(2)))
                    .enumerate()
                {
                    let (min, max) = valid_extrema(band.iter().zip(mask.iter())).ok_or(
                        ModelError::NoValidRange {
                            scope: NormScope::Band(b),
                        },
                    )?;
                    mins[b] = min;
                    spans[b] = span_of(min, max);
                }
                Ok(NormRange::Band {
                    min: mins,
                    span: spans,
                })
            }
        }
    }

    /// Method this range was computed with.
    pub fn method(&self) -> NormalisationMethod {
        match self {
            NormRange::Global { .. } => NormalisationMethod::Global,
            NormRange::Band { .. } => NormalisationMethod::Band,
        }
    }

    /// `(min, span)` applying to one band.
    pub fn for_band(&self, band: usize) -> (f64, f64) {
        match self {
            NormRange::Global { min, span } => (*min, *span),
            NormRange::Band { min, span } => (min[band], span[band]),
        }
    }

    /// Normalise a whole cube, broadcasting per band where needed.
    pub fn apply(&self, data: ArrayView3<'_, f64>) -> Array3<f64> {
        match self {
            NormRange::Global { min, span } => data.mapv(|v| (v - min) / span),
            NormRange::Band { min, span } => {
                let mut out = data.to_owned();
                for (b, mut band) in out.axis_iter_mut(Axis(2)).enumerate() {
                    let (m, s) = (min[b], span[b]);
                    band.mapv_inplace(|v| (v - m) / s);
                }
                out
            }
        }
    }

    /// Normalise one band plane.
    pub fn apply_band(&self, band: usize, plane: Array2<f64>) -> Array2<f64> {
        let (min, span) = self.for_band(band);
        plane.mapv_into(|v| (v - min) / span)
    }
}

/// Mask of samples that take part in normalisation extrema.
pub fn positive_mask(data: ArrayView3<'_, f64>) -> Array3<bool> {
    data.mapv(|v| v >= 0.0)
}

fn valid_extrema<'a>(samples: impl Iterator<Item = (&'a f64, &'a bool)>) -> Option<(f64, f64)> {
    samples
        .filter(|&(v, &valid)| valid && v.is_finite())
        .fold(None, |acc, (&v, _)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn span_of(min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 { span } else { 1.0 }
}
