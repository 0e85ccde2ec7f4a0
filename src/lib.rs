//! A library that extracts structured information from a screen capture by
//! matching declared screen locations against expected colors, images and
//! OCR text.
//!
//! A JSON document declares *sources* (a pixel or a rectangle on the
//! screen) and *references* (an expected color, an expected bitmap, or an
//! OCR rule). A [Matcher] built from that document answers the question
//! "which reference does this source currently show?" for any captured
//! screen image.
//!
//! # Basic usage
//! ```no_run
//! use screenmatch::{DiskLoader, Matcher, NoopOcr};
//!
//! let matcher = Matcher::from_file(
//!     "refs.json",
//!     Box::new(DiskLoader),
//!     Box::new(NoopOcr),
//! )?;
//! let screen = image::open("screenshot.png")?.into_rgba8();
//! let matched = matcher.match_source("srcColor1", &screen);
//! println!("matched: {}", matched);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! `match_source` returns the name of the matching reference, the
//! recognized text for an `ocr:` reference, or an empty string when
//! nothing matches. Evaluation failures never panic or surface as errors;
//! they degrade to an empty result with diagnostics on the [log] crate.
//!
//! The file loader and OCR engine are supplied at construction, so both
//! can be replaced by in-memory fakes in tests, or by a real engine such
//! as `TesseractOcr` (cargo feature `tesseract`).

mod compare;
mod config;
mod error;
mod loader;
mod matcher;
mod ocr;

pub use compare::{compare_images, compare_monochrome, match_color};
pub use config::{Geometry, MatchConfig, Reference, Source};
pub use error::{Error, OcrError};
pub use loader::{DiskLoader, FileLoader};
pub use matcher::Matcher;
#[cfg(feature = "tesseract")]
pub use ocr::TesseractOcr;
pub use ocr::{normalize, NoopOcr, OcrEngine, OcrMode};
