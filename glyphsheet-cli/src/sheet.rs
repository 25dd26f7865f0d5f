//! Reading traced sheets and writing results.

use std::{fmt, fs, io, path::Path, path::PathBuf};

use glyphsheet::{BoundingBox, GlyphStore, NormalizedSheet, PathGeometry, ReferenceLines};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Tracer output for one sheet.
#[derive(Clone, Debug, Deserialize)]
pub struct TracedSheet {
    /// Bounding boxes as `[xmin, xmax, ymin, ymax]`; measured from the paths
    /// when absent.
    #[serde(default)]
    pub bboxes: Option<Vec<BoundingBox>>,
    pub paths: Vec<PathGeometry>,
}

impl TryFrom<TracedSheet> for GlyphStore {
    type Error = glyphsheet::Error;

    fn try_from(value: TracedSheet) -> Result<Self, Self::Error> {
        match value.bboxes {
            Some(bboxes) => GlyphStore::from_traced(bboxes, value.paths),
            None => Ok(GlyphStore::from_paths(value.paths)),
        }
    }
}

/// The result of a pass, as written to the job directory.
#[derive(Clone, Debug, Serialize)]
pub struct NormalizedOutput {
    pub bboxes: Vec<BoundingBox>,
    pub paths: Vec<PathGeometry>,
    pub reference_lines: ReferenceLines,
    pub scale: f64,
}

impl From<NormalizedSheet> for NormalizedOutput {
    fn from(value: NormalizedSheet) -> Self {
        let (bboxes, paths, reference_lines, scale) = value.into_parts();
        Self {
            bboxes,
            paths,
            reference_lines,
            scale,
        }
    }
}

/// Errors reported by the command line driver.
#[derive(Debug)]
pub enum CliError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Encode(serde_json::Error),
    Job(glyphsheet::Error),
}

impl From<glyphsheet::Error> for CliError {
    fn from(value: glyphsheet::Error) -> Self {
        Self::Job(value)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "unable to read {path:?}: {source}"),
            Self::Write { path, source } => write!(f, "unable to write {path:?}: {source}"),
            Self::Parse { path, source } => write!(f, "unable to parse {path:?}: {source}"),
            Self::Encode(e) => write!(f, "unable to encode output: {e}"),
            Self::Job(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Encode(e) => Some(e),
            Self::Job(e) => Some(e),
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_json(path, &text)
}

fn parse_json<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T, CliError> {
    serde_json::from_str(text).map_err(|source| CliError::Parse {
        path: path.to_owned(),
        source,
    })
}

pub fn read_sheet(path: &Path) -> Result<GlyphStore, CliError> {
    let sheet: TracedSheet = read_json(path)?;
    Ok(sheet.try_into()?)
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(CliError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_sheet(text: &str) -> Result<GlyphStore, CliError> {
        let sheet: TracedSheet = parse_json(Path::new("sheet.json"), text)?;
        Ok(sheet.try_into()?)
    }

    #[test]
    fn fixture_sheet_parses() {
        let store = parse_sheet(glyphsheet_test_data::SHEET).unwrap();
        assert_eq!(store.len(), glyphsheet_test_data::SHEET_SHAPES);
        assert_eq!(
            store.glyphs()[1].bbox,
            BoundingBox::new(60.0, 100.0, 115.0, 200.0)
        );
    }

    #[test]
    fn bboxes_are_optional() {
        let store = parse_sheet(r#"{ "paths": ["M0,0 L4,0 L4,9 Z"] }"#).unwrap();
        assert_eq!(store.glyphs()[0].bbox, BoundingBox::new(0.0, 4.0, 0.0, 9.0));
    }

    #[test]
    fn mismatched_sheet_is_rejected() {
        let err = parse_sheet(r#"{ "bboxes": [[0, 1, 0, 1]], "paths": [] }"#).unwrap_err();
        assert!(matches!(
            err,
            CliError::Job(glyphsheet::Error::MismatchedInput { .. })
        ));
        let err = parse_sheet(r#"{ "bboxes": [] }"#).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
    }

    #[test]
    fn output_uses_tracer_layout() {
        let output = NormalizedOutput {
            bboxes: vec![BoundingBox::new(0.0, 1.5, 2.0, 3.0)],
            paths: vec!["M0.00,2.00 Z".into()],
            reference_lines: ReferenceLines::default(),
            scale: 1.0,
        };
        let value: serde_json::Value = serde_json::from_str(&to_json(&output).unwrap()).unwrap();
        assert_eq!(value["bboxes"], serde_json::json!([[0.0, 1.5, 2.0, 3.0]]));
        assert_eq!(value["paths"][0], "M0.00,2.00 Z");
        assert_eq!(value["reference_lines"]["base_line"], 0.0);
        assert_eq!(value["reference_lines"]["punctuation_height"], 0.0);
    }
}
