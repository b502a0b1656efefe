//! Tests for the ENVI loader.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::data::error::LoaderError;
use crate::data::labels::LabelType;
use crate::data::loader::FileLoader;
use crate::data::loaders::{EnviHeader, EnviLoader, Interleave, find_data_file};
use crate::data::normalisation::NormalisationMethod;
use crate::data::test_support::ScriptedUi;

const LINES: usize = 2;
const SAMPLES: usize = 3;
const BANDS: usize = 2;

/// Test cube value at `[line, sample, band]`.
fn value(line: usize, sample: usize, band: usize) -> u16 {
    (100 * band + 10 * line + sample) as u16
}

/// Cube values in on-disk order for an interleave.
fn ordered_values(interleave: Interleave) -> Vec<u16> {
    let mut values = Vec::new();
    match interleave {
        Interleave::Bsq => {
            for b in 0..BANDS {
                for l in 0..LINES {
                    for s in 0..SAMPLES {
                        values.push(value(l, s, b));
                    }
                }
            }
        }
        Interleave::Bil => {
            for l in 0..LINES {
                for b in 0..BANDS {
                    for s in 0..SAMPLES {
                        values.push(value(l, s, b));
                    }
                }
            }
        }
        Interleave::Bip => {
            for l in 0..LINES {
                for s in 0..SAMPLES {
                    for b in 0..BANDS {
                        values.push(value(l, s, b));
                    }
                }
            }
        }
    }
    values
}

fn header_text(data_type: u32, interleave: &str, extra: &str) -> String {
    format!(
        "ENVI\ndescription = {{test cube}}\nsamples = {}\nlines   = {}\nbands   = {}\n\
         header offset = 0\nfile type = ENVI Standard\ndata type = {}\n\
         interleave = {}\nbyte order = 0\n{}",
        SAMPLES, LINES, BANDS, data_type, interleave, extra
    )
}

/// Write `cube.hdr` and its data file, returning the header path.
fn write_fixture(dir: &TempDir, header: &str, data_name: &str, bytes: &[u8]) -> PathBuf {
    let hdr = dir.path().join("cube.hdr");
    fs::write(&hdr, header).unwrap();
    fs::write(dir.path().join(data_name), bytes).unwrap();
    hdr
}

fn u16_le(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn load(path: &Path, ui: &mut ScriptedUi) -> Result<Option<crate::data::HsImage>, LoaderError> {
    EnviLoader.load_file(path, ui)
}

#[test]
fn test_envi_loader_metadata() {
    assert_eq!(EnviLoader.id(), "envi");
    assert_eq!(EnviLoader.filter_name(), "ENVI .hdr labelled raster");
    assert_eq!(EnviLoader.extensions(), &["hdr"]);
}

#[test]
fn test_parse_header_lists_span_lines() {
    let text = "ENVI\nsamples = 4\nlines = 5\nbands = 3\ndata type = 12\n\
                wavelength = {\n 450.0, 550.0,\n 650.0 }\nBand Names = {a, b, c}\n";
    let header = EnviHeader::parse(text).unwrap();

    assert_eq!((header.lines, header.samples, header.bands), (5, 4, 3));
    assert_eq!(header.interleave, Interleave::Bsq);
    assert!(!header.big_endian);
    assert_eq!(header.header_offset, 0);
    assert_eq!(
        header.list("wavelength").unwrap(),
        vec!["450.0", "550.0", "650.0"]
    );
    assert_eq!(header.list("band names").unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_parse_header_errors() {
    assert!(matches!(
        EnviHeader::parse("samples = 1\n"),
        Err(LoaderError::Parse { .. })
    ));
    assert!(matches!(
        EnviHeader::parse("ENVI\nsamples = 1\nlines = 1\ndata type = 1\n"),
        Err(LoaderError::Parse { .. })
    ));
    assert!(matches!(
        EnviHeader::parse("ENVI\nsamples = 1\nlines = 1\nbands = 1\ndata type = 1\nwavelength = {1,\n"),
        Err(LoaderError::Parse { .. })
    ));
}

#[test]
fn test_complex_data_rejected() {
    let err = EnviHeader::parse(&header_text(6, "bsq", "")).unwrap_err();
    assert!(matches!(err, LoaderError::UnsupportedElementType { .. }));
    assert!(err.to_string().contains("complex64"));
}

#[test]
fn test_interleaves_give_same_cube() {
    for (interleave, name) in [
        (Interleave::Bsq, "bsq"),
        (Interleave::Bil, "bil"),
        (Interleave::Bip, "bip"),
    ] {
        let header = EnviHeader::parse(&header_text(12, name, "")).unwrap();
        let raw = header.decode(&u16_le(&ordered_values(interleave))).unwrap();
        assert_eq!(raw.shape(), &[LINES, SAMPLES, BANDS], "{}", name);
        for l in 0..LINES {
            for s in 0..SAMPLES {
                for b in 0..BANDS {
                    assert_eq!(raw.data[[l, s, b]], f64::from(value(l, s, b)), "{}", name);
                }
            }
        }
    }
}

#[test]
fn test_big_endian_and_offset() {
    let text = header_text(2, "bip", "")
        .replace("byte order = 0", "byte order = 1")
        .replace("header offset = 0", "header offset = 4");
    let header = EnviHeader::parse(&text).unwrap();

    let mut bytes = vec![0xAA; 4];
    for v in ordered_values(Interleave::Bip) {
        bytes.extend_from_slice(&(-(v as i16)).to_be_bytes());
    }
    let raw = header.decode(&bytes).unwrap();
    assert_eq!(raw.data[[1, 2, 1]], -112.0);
}

#[test]
fn test_short_data_file() {
    let header = EnviHeader::parse(&header_text(12, "bsq", "")).unwrap();
    let err = header.decode(&[0u8; 5]).unwrap_err();
    assert!(err.to_string().contains("header describes 24"));
}

#[test]
fn test_oversized_dimensions() {
    let text = "ENVI\nsamples = 4294967296\nlines = 4294967296\nbands = 4\ndata type = 2\n";
    let header = EnviHeader::parse(text).unwrap();
    let err = header.decode(&[0u8; 16]).unwrap_err();
    assert!(matches!(err, LoaderError::Parse { .. }));
    assert!(err.to_string().contains("dimensions overflow"));
}

#[test]
fn test_load_with_wavelengths() {
    let dir = TempDir::new().unwrap();
    let hdr = write_fixture(
        &dir,
        &header_text(12, "bsq", "wavelength = {532.0, 630.0}\n"),
        "cube.img",
        &u16_le(&ordered_values(Interleave::Bsq)),
    );

    let mut ui = ScriptedUi::new().integer(12);
    let image = load(&hdr, &mut ui).unwrap().unwrap();

    assert_eq!(image.shape(), (LINES, SAMPLES, BANDS));
    assert_eq!(image.bpp(), Some(12));
    assert_eq!(image.labels(), &["532.0", "630.0"]);
    assert_eq!(image.labels_type(), LabelType::Wavelength);
    assert_eq!(image.get_pixel(1, 2).to_vec(), vec![12.0, 112.0]);
    // max value 112 needs 7 bits
    assert_eq!(ui.integer_bounds(), vec![(7, 16)]);
}

#[test]
fn test_load_band_names_and_bare_data_file() {
    let dir = TempDir::new().unwrap();
    let hdr = write_fixture(
        &dir,
        &header_text(12, "bsq", "band names = {red edge, nir}\n"),
        "cube",
        &u16_le(&ordered_values(Interleave::Bsq)),
    );
    assert_eq!(find_data_file(&hdr).unwrap(), dir.path().join("cube"));

    let mut ui = ScriptedUi::new().integer(16);
    let image = load(&hdr, &mut ui).unwrap().unwrap();
    assert_eq!(image.labels(), &["red edge", "nir"]);
    assert_eq!(image.labels_type(), LabelType::CustomStr);
}

#[test]
fn test_load_float_asks_normalisation() {
    let dir = TempDir::new().unwrap();
    let bytes: Vec<u8> = ordered_values(Interleave::Bsq)
        .iter()
        .flat_map(|&v| (f32::from(v) / 100.0).to_le_bytes())
        .collect();
    let hdr = write_fixture(&dir, &header_text(4, "bsq", ""), "cube.dat", &bytes);

    let mut ui = ScriptedUi::new().choose(1);
    let image = load(&hdr, &mut ui).unwrap().unwrap();
    assert_eq!(image.normalisation(), Some(NormalisationMethod::Band));
    assert_eq!(image.labels_type(), LabelType::Auto);
    assert_eq!(ui.prompts()[0].0, "Normalisation method:");
}

#[test]
fn test_load_cancelled() {
    let dir = TempDir::new().unwrap();
    let hdr = write_fixture(
        &dir,
        &header_text(12, "bsq", ""),
        "cube.raw",
        &u16_le(&ordered_values(Interleave::Bsq)),
    );
    let mut ui = ScriptedUi::cancelling();
    assert!(load(&hdr, &mut ui).unwrap().is_none());
}

#[test]
fn test_missing_data_file() {
    let dir = TempDir::new().unwrap();
    let hdr = dir.path().join("cube.hdr");
    fs::write(&hdr, header_text(12, "bsq", "")).unwrap();

    let mut ui = ScriptedUi::cancelling();
    assert!(matches!(load(&hdr, &mut ui), Err(LoaderError::Io(_))));
}

#[test]
fn test_label_count_mismatch() {
    let dir = TempDir::new().unwrap();
    let hdr = write_fixture(
        &dir,
        &header_text(12, "bsq", "wavelength = {500}\n"),
        "cube.img",
        &u16_le(&ordered_values(Interleave::Bsq)),
    );
    let mut ui = ScriptedUi::new().integer(16);
    let err = load(&hdr, &mut ui).unwrap_err();
    assert!(matches!(err, LoaderError::Model(_)));
}
