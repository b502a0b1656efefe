//! Plain-text [`Presenter`] used by the command line front end.

use std::io::Write;

use ndarray::ArrayView1;

use crate::data::{AreaStats, Coordinates, LabelType, LoadFailure, Preview};
use crate::state::Presenter;

/// Widest mask printed as characters.
const MAX_MASK_WIDTH: usize = 80;

/// Writes query results as tab separated text.
pub struct TextPresenter<W: Write> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(text).and_then(|_| self.out.write_all(b"\n")) {
            log::warn!("report: write failed: {}", e);
        }
    }
}

fn label_header(labels_type: LabelType) -> &'static str {
    match labels_type {
        LabelType::Wavelength => "wavelength",
        LabelType::Auto => "band",
        LabelType::CustomStr => "label",
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn render(&mut self, preview: Preview) {
        let (h, w) = preview.dimensions();
        match preview {
            Preview::Mono(_) => log::debug!("preview: mono {}x{}", h, w),
            Preview::Rgb(_) => log::debug!("preview: rgb {}x{}", h, w),
            Preview::Similar { mask, .. } => {
                let hits = mask.iter().filter(|&&m| m).count();
                self.emit(format_args!("similar\t{}\tof\t{}", hits, mask.len()));
                if w <= MAX_MASK_WIDTH {
                    for row in mask.rows() {
                        let line: String = row.iter().map(|&m| if m { '#' } else { '.' }).collect();
                        self.emit(format_args!("{}", line));
                    }
                }
            }
        }
    }

    fn show_pixel(&mut self, spectrum: ArrayView1<'_, f64>, labels: &[String], labels_type: LabelType) {
        self.emit(format_args!("{}\tvalue", label_header(labels_type)));
        for (label, value) in labels.iter().zip(spectrum.iter()) {
            self.emit(format_args!("{}\t{}", label, value));
        }
    }

    fn show_area(&mut self, stats: &AreaStats, labels: &[String], labels_type: LabelType) {
        self.emit(format_args!(
            "{}\tmin\tq25\tmean\tq75\tmax",
            label_header(labels_type)
        ));
        for (b, label) in labels.iter().enumerate().take(stats.bands()) {
            self.emit(format_args!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                label,
                stats.min[b],
                stats.quartile_low[b],
                stats.mean[b],
                stats.quartile_high[b],
                stats.max[b]
            ));
        }
    }

    fn start_rubber_band(&mut self, anchor: Coordinates) {
        log::debug!("area anchored at ({}, {})", anchor.row, anchor.col);
    }

    fn report_error(&mut self, failure: &LoadFailure) {
        log::debug!("{}", failure.detail);
    }
}
