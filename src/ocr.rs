use crate::error::{EvalError, OcrError};
use image::RgbaImage;

/// An external text recognition capability.
///
/// The engine is supplied to [Matcher](crate::Matcher) at construction and
/// is treated as opaque and best-effort: a failure is logged and handled as
/// "no text recognized". Implementations that need an exclusive engine
/// handle should acquire and release it within `recognize`, never across
/// calls.
pub trait OcrEngine {
    /// Recognize text in `img` and return it raw, without normalization.
    fn recognize(&self, img: &RgbaImage) -> Result<String, OcrError>;
}

/// Post-processing mode for recognized text, selected by the mode flag in
/// an `ocr:` reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OcrMode {
    /// The text is expected to be letters; digits that OCR tends to produce
    /// for stylized letters are substituted back (`y` flag).
    Alphabetic,
    /// The text is expected to be digits; letters that OCR tends to produce
    /// for digits are substituted back (`n` flag).
    Numeric,
}

/// Arguments of an `ocr:` reference, parsed from its comma separated
/// payload: an optional target width, and an optional mode flag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct OcrArgs {
    pub width: Option<i64>,
    pub mode: Option<OcrMode>,
}

impl OcrArgs {
    /// Parse the payload of an `ocr:` reference. Empty fields are allowed
    /// and mean "unset"; a non-integer width is an error, while a zero or
    /// negative width merely disables resizing. Unknown mode letters and
    /// extra fields are ignored.
    pub(crate) fn parse(payload: &str) -> Result<OcrArgs, EvalError> {
        let mut args = OcrArgs::default();
        for (i, field) in payload.split(',').enumerate() {
            match i {
                0 => {
                    if field.is_empty() {
                        continue;
                    }
                    let width = field.parse::<i64>().map_err(|_| EvalError::InvalidOcrWidth {
                        arg: field.to_string(),
                    })?;
                    args.width = Some(width);
                }
                1 => {
                    if field.eq_ignore_ascii_case("y") {
                        args.mode = Some(OcrMode::Alphabetic);
                    } else if field.eq_ignore_ascii_case("n") {
                        args.mode = Some(OcrMode::Numeric);
                    }
                }
                _ => {}
            }
        }
        Ok(args)
    }
}

/// Normalize raw OCR output: strip spaces and newlines, and if a mode is
/// given, lowercase the text and substitute characters the OCR engine
/// commonly confuses between digits and letters.
pub fn normalize(raw: &str, mode: Option<OcrMode>) -> String {
    let stripped: String = raw.chars().filter(|&c| c != ' ' && c != '\n').collect();
    match mode {
        None => stripped,
        Some(OcrMode::Alphabetic) => substitute(&stripped.to_lowercase(), |c| match c {
            '1' => 'l',
            '2' => 'r',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '6' => 'g',
            '7' => 't',
            '8' => 'b',
            '9' => 'g',
            c => c,
        }),
        Some(OcrMode::Numeric) => substitute(&stripped.to_lowercase(), |c| match c {
            'l' | 'i' => '1',
            'r' => '2',
            'a' => '4',
            's' => '5',
            't' => '7',
            'b' => '8',
            'g' => '9',
            c => c,
        }),
    }
}

fn substitute(text: &str, table: impl Fn(char) -> char) -> String {
    text.chars().map(table).collect()
}

/// An [OcrEngine] that never recognizes anything. Suitable for
/// configurations without `ocr:` references.
#[derive(Debug, Default)]
pub struct NoopOcr;

impl OcrEngine for NoopOcr {
    fn recognize(&self, _img: &RgbaImage) -> Result<String, OcrError> {
        Ok(String::new())
    }
}

/// OCR engine backed by the `tesseract` command line program.
///
/// Writes the image to a temporary PNG and reads the recognized text from
/// tesseract's stdout. Requires the `tesseract` binary on the PATH.
#[cfg(feature = "tesseract")]
#[derive(Debug, Default)]
pub struct TesseractOcr {
    /// Language passed with `-l`. Empty means tesseract's default.
    pub language: String,
}

#[cfg(feature = "tesseract")]
impl OcrEngine for TesseractOcr {
    fn recognize(&self, img: &RgbaImage) -> Result<String, OcrError> {
        let input = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError(e.to_string()))?;
        img.save(input.path())
            .map_err(|e| OcrError(e.to_string()))?;

        let mut cmd = std::process::Command::new("tesseract");
        cmd.arg(input.path()).arg("stdout");
        if !self.language.is_empty() {
            cmd.arg("-l").arg(&self.language);
        }
        let output = cmd.output().map_err(|e| OcrError(e.to_string()))?;
        if !output.status.success() {
            return Err(OcrError(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
