//! Loader for ENVI labelled rasters.
//!
//! An ENVI image is a plain-text `.hdr` header describing a headerless
//! binary file stored next to it. The header starts with the `ENVI` magic
//! line followed by `key = value` pairs; list values are wrapped in braces
//! and may span several lines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::HsImage;
use crate::data::error::LoaderError;
use crate::data::interactive::{Interactive, finish_image};
use crate::data::labels::{LabelType, classify_wavelengths};
use crate::data::loader::FileLoader;
use crate::data::sample::RawArray;

/// Extensions tried, in order, when looking for the binary next to a header.
/// The empty string stands for "same stem, no extension".
const DATA_EXTENSIONS: &[&str] = &["", "img", "dat", "raw", "bsq", "bil", "bip"];

/// Layout of band, line and sample axes in the binary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleave {
    /// Band sequential: `[bands, lines, samples]`
    Bsq,
    /// Band interleaved by line: `[lines, bands, samples]`
    Bil,
    /// Band interleaved by pixel: `[lines, samples, bands]`
    Bip,
}

impl Interleave {
    fn parse(value: &str) -> Result<Self, LoaderError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bsq" => Ok(Interleave::Bsq),
            "bil" => Ok(Interleave::Bil),
            "bip" => Ok(Interleave::Bip),
            other => Err(LoaderError::parse(format!("unknown interleave '{}'", other))),
        }
    }

    /// Shape of the array as stored on disk.
    fn file_shape(self, lines: usize, samples: usize, bands: usize) -> [usize; 3] {
        match self {
            Interleave::Bsq => [bands, lines, samples],
            Interleave::Bil => [lines, bands, samples],
            Interleave::Bip => [lines, samples, bands],
        }
    }

    /// Axis permutation producing `[lines, samples, bands]`.
    fn permutation(self) -> [usize; 3] {
        match self {
            Interleave::Bsq => [1, 2, 0],
            Interleave::Bil => [0, 2, 1],
            Interleave::Bip => [0, 1, 2],
        }
    }
}

/// Element kinds by ENVI `data type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnviType {
    U8,
    I16,
    I32,
    F32,
    F64,
    U16,
    U32,
    I64,
    U64,
}

impl EnviType {
    fn from_code(code: u32) -> Result<Self, LoaderError> {
        match code {
            1 => Ok(EnviType::U8),
            2 => Ok(EnviType::I16),
            3 => Ok(EnviType::I32),
            4 => Ok(EnviType::F32),
            5 => Ok(EnviType::F64),
            12 => Ok(EnviType::U16),
            13 => Ok(EnviType::U32),
            14 => Ok(EnviType::I64),
            15 => Ok(EnviType::U64),
            6 => Err(LoaderError::unsupported_element("complex64")),
            9 => Err(LoaderError::unsupported_element("complex128")),
            other => Err(LoaderError::parse(format!("unknown data type {}", other))),
        }
    }

    fn size(self) -> usize {
        match self {
            EnviType::U8 => 1,
            EnviType::I16 | EnviType::U16 => 2,
            EnviType::I32 | EnviType::U32 | EnviType::F32 => 4,
            EnviType::F64 | EnviType::I64 | EnviType::U64 => 8,
        }
    }
}

/// Parsed ENVI header.
#[derive(Debug, Clone)]
pub struct EnviHeader {
    pub samples: usize,
    pub lines: usize,
    pub bands: usize,
    data_type: EnviType,
    pub interleave: Interleave,
    pub big_endian: bool,
    pub header_offset: usize,
    /// Every field, keys lowercased, list braces stripped.
    pub fields: HashMap<String, String>,
}

impl EnviHeader {
    /// Parse header text.
    pub fn parse(text: &str) -> Result<Self, LoaderError> {
        let mut lines = text.lines();
        match lines.next() {
            Some(first) if first.trim_start_matches('\u{feff}').trim() == "ENVI" => {}
            _ => return Err(LoaderError::parse("missing ENVI magic line")),
        }

        let mut fields = HashMap::new();
        while let Some(line) = lines.next() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::debug!("ENVI header: skipping line without '=': {}", line);
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let mut value = value.trim().to_string();

            if value.starts_with('{') {
                while !value.contains('}') {
                    let Some(next) = lines.next() else {
                        return Err(LoaderError::parse(format!(
                            "unterminated list for '{}'",
                            key
                        )));
                    };
                    value.push(' ');
                    value.push_str(next.trim());
                }
                value = value
                    .trim_start_matches('{')
                    .trim_end_matches('}')
                    .trim()
                    .to_string();
            }
            fields.insert(key, value);
        }

        let samples = required_usize(&fields, "samples")?;
        let lines = required_usize(&fields, "lines")?;
        let bands = required_usize(&fields, "bands")?;
        let code = fields
            .get("data type")
            .ok_or_else(|| LoaderError::parse("missing 'data type'"))?
            .parse::<u32>()
            .map_err(|e| LoaderError::parse(format!("invalid 'data type': {}", e)))?;
        let data_type = EnviType::from_code(code)?;
        let interleave = match fields.get("interleave") {
            Some(v) => Interleave::parse(v)?,
            None => Interleave::Bsq,
        };
        let big_endian = match fields.get("byte order").map(|v| v.trim()) {
            None | Some("0") => false,
            Some("1") => true,
            Some(other) => {
                return Err(LoaderError::parse(format!("invalid 'byte order': {}", other)));
            }
        };
        let header_offset = optional_usize(&fields, "header offset")?.unwrap_or(0);

        Ok(Self {
            samples,
            lines,
            bands,
            data_type,
            interleave,
            big_endian,
            header_offset,
            fields,
        })
    }

    /// Split a list field into trimmed entries.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.fields.get(key).map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    /// Band labels: `wavelength` first, then `band names`.
    pub fn labels(&self) -> Option<(Vec<String>, LabelType)> {
        if let Some(wavelengths) = self.list("wavelength") {
            let labels_type = classify_wavelengths(&wavelengths);
            return Some((wavelengths, labels_type));
        }
        self.list("band names")
            .map(|names| (names, LabelType::CustomStr))
    }

    fn byte_len(&self) -> Result<usize, LoaderError> {
        [self.lines, self.bands, self.data_type.size()]
            .into_iter()
            .try_fold(self.samples, usize::checked_mul)
            .ok_or_else(|| LoaderError::parse("dimensions overflow"))
    }

    /// Decode the binary payload into a `[lines, samples, bands]` array.
    pub fn decode(&self, bytes: &[u8]) -> Result<RawArray, LoaderError> {
        let payload = bytes.get(self.header_offset..).unwrap_or_default();
        let expected = self.byte_len()?;
        if payload.len() < expected {
            return Err(LoaderError::parse(format!(
                "data file holds {} bytes after offset {}, header describes {}",
                payload.len(),
                self.header_offset,
                expected
            )));
        }
        let payload = &payload[..expected];
        let shape = self
            .interleave
            .file_shape(self.lines, self.samples, self.bands);

        macro_rules! decode_as {
            ($ty:ty) => {{
                let values: Vec<$ty> = payload
                    .chunks_exact(std::mem::size_of::<$ty>())
                    .map(|c| {
                        let mut buf = [0u8; std::mem::size_of::<$ty>()];
                        buf.copy_from_slice(c);
                        if self.big_endian {
                            <$ty>::from_be_bytes(buf)
                        } else {
                            <$ty>::from_le_bytes(buf)
                        }
                    })
                    .collect();
                RawArray::from_row_major(&shape, values)
            }};
        }

        let raw = match self.data_type {
            EnviType::U8 => RawArray::from_row_major(&shape, payload.to_vec()),
            EnviType::I16 => decode_as!(i16),
            EnviType::I32 => decode_as!(i32),
            EnviType::F32 => decode_as!(f32),
            EnviType::F64 => decode_as!(f64),
            EnviType::U16 => decode_as!(u16),
            EnviType::U32 => decode_as!(u32),
            EnviType::I64 => decode_as!(i64),
            EnviType::U64 => decode_as!(u64),
        }
        .ok_or_else(|| LoaderError::parse("payload does not match header dimensions"))?;

        Ok(raw.permuted(self.interleave.permutation()))
    }
}

fn optional_usize(fields: &HashMap<String, String>, key: &str) -> Result<Option<usize>, LoaderError> {
    fields
        .get(key)
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| LoaderError::parse(format!("invalid '{}': {}", key, e)))
        })
        .transpose()
}

fn required_usize(fields: &HashMap<String, String>, key: &str) -> Result<usize, LoaderError> {
    optional_usize(fields, key)?.ok_or_else(|| LoaderError::parse(format!("missing '{}'", key)))
}

/// Find the binary file belonging to a header.
pub fn find_data_file(header: &Path) -> Result<PathBuf, LoaderError> {
    DATA_EXTENSIONS
        .iter()
        .map(|ext| header.with_extension(ext))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            LoaderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no data file found next to {}", header.display()),
            ))
        })
}

/// Loader for ENVI `.hdr` labelled rasters.
pub struct EnviLoader;

impl FileLoader for EnviLoader {
    fn id(&self) -> &'static str {
        "envi"
    }

    fn filter_name(&self) -> &'static str {
        "ENVI .hdr labelled raster"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["hdr"]
    }

    fn load_file(
        &self,
        path: &Path,
        ui: &mut dyn Interactive,
    ) -> Result<Option<HsImage>, LoaderError> {
        let header = EnviHeader::parse(&fs::read_to_string(path)?)?;
        let data_path = find_data_file(path)?;
        log::debug!(
            "EnviLoader: {}x{}x{} {:?} from {}",
            header.lines,
            header.samples,
            header.bands,
            header.interleave,
            data_path.display()
        );

        let raw = header.decode(&fs::read(&data_path)?)?;
        finish_image(ui, raw, header.labels())
    }
}
