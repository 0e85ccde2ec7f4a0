use std::io;
use thiserror::Error;

/// Errors that can occur while constructing a [Matcher](crate::Matcher).
///
/// Evaluation failures during a match call never surface here: they degrade
/// to an empty match result, with detail available through the `log` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration document could not be retrieved
    #[error("Config document {path} could not be loaded")]
    ConfigLoad {
        path: String,
        source: io::Error,
    },
    /// Error decoding the configuration document
    #[error("Config document could not be parsed")]
    ConfigParse(#[from] serde_json::Error),
}

/// Failure reported by an [OcrEngine](crate::OcrEngine) implementation.
#[derive(Debug, Error)]
#[error("OCR failed: {0}")]
pub struct OcrError(pub String);

/// A failure while evaluating a single reference against a source.
///
/// These never cross the public API: the matcher logs them and either skips
/// the reference or returns an empty result, depending on the variant.
#[derive(Debug, Error)]
pub(crate) enum EvalError {
    #[error("reference image {path} could not be loaded")]
    RefLoad {
        path: String,
        source: io::Error,
    },
    #[error("reference image {path} could not be decoded")]
    RefDecode {
        path: String,
        source: image::error::ImageError,
    },
    #[error("invalid color {spec}, expected HTML color")]
    InvalidColor { spec: String },
    #[error("illegal OCR width argument {arg}")]
    InvalidOcrWidth { arg: String },
    #[error(transparent)]
    Ocr(#[from] OcrError),
}
