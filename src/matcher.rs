use crate::compare::{compare_images, compare_monochrome, decode_color, match_color};
use crate::config::{Geometry, MatchConfig, RefSpec, Reference, Source};
use crate::error::{Error, EvalError};
use crate::loader::FileLoader;
use crate::ocr::{normalize, OcrArgs, OcrEngine};
use image::imageops::{resize, FilterType};
use image::{load_from_memory, GenericImageView, Rgba, RgbaImage};
use log::{error, warn};
use std::convert::TryFrom;

/// Matches named screen sources against their references.
///
/// A `Matcher` holds the declarative configuration plus the two injected
/// collaborators: a [FileLoader] for reference bitmaps and an [OcrEngine]
/// for `ocr:` references. It is immutable after construction and can be
/// shared between callers if the collaborators allow it.
pub struct Matcher {
    config: MatchConfig,
    loader: Box<dyn FileLoader>,
    ocr: Box<dyn OcrEngine>,
}

/// What was sampled from the screen for a source: a single pixel for point
/// geometry, an owned sub-image for rectangle geometry.
enum Sample {
    Pixel(Rgba<u8>),
    Region(RgbaImage),
}

/// The result of evaluating one reference against a sample.
enum RefOutcome {
    /// The value to return from the match call.
    Matched(String),
    /// Keep scanning the remaining references.
    NoMatch,
    /// Misconfiguration (kind mismatch or unknown reference kind): the whole
    /// match call returns empty.
    Abort,
}

impl Matcher {
    /// Create a matcher from an already decoded configuration.
    pub fn new(
        config: MatchConfig,
        loader: Box<dyn FileLoader>,
        ocr: Box<dyn OcrEngine>,
    ) -> Matcher {
        Matcher {
            config,
            loader,
            ocr,
        }
    }

    /// Create a matcher from a JSON configuration document retrieved
    /// through `loader`.
    ///
    /// # Errors
    /// If the document cannot be loaded or decoded. Semantic problems in
    /// the document (duplicate names, malformed reference strings) are not
    /// detected here; they surface when a match call reaches them.
    pub fn from_file(
        path: &str,
        loader: Box<dyn FileLoader>,
        ocr: Box<dyn OcrEngine>,
    ) -> Result<Matcher, Error> {
        let bytes = loader.load(path).map_err(|source| Error::ConfigLoad {
            path: path.to_string(),
            source,
        })?;
        Matcher::from_json(&bytes, loader, ocr)
    }

    /// Create a matcher from JSON configuration bytes.
    pub fn from_json(
        json: &[u8],
        loader: Box<dyn FileLoader>,
        ocr: Box<dyn OcrEngine>,
    ) -> Result<Matcher, Error> {
        let config = serde_json::from_slice(json)?;
        Ok(Matcher::new(config, loader, ocr))
    }

    /// Match the named source against its applicable references on `img`.
    ///
    /// The references are scanned in the order they are declared in the
    /// document, restricted to the source's `Refs` list, and the first
    /// match wins. For color and image references the matched reference's
    /// name is returned; for an `ocr:` reference the recognized, normalized
    /// text itself is the returned value.
    ///
    /// Returns the empty string when nothing matches. Evaluation problems
    /// (unknown source, kind mismatch, unreadable reference bitmap) also
    /// degrade to an empty result, with detail on the log.
    pub fn match_source(&self, src_name: &str, img: &RgbaImage) -> String {
        let src = match self.find_source(src_name) {
            Some(src) => src,
            None => {
                warn!("source does not exist srcName={}", src_name);
                return String::new();
            }
        };

        let sample = Sample::take(img, src.geometry);

        for reference in &self.config.refs {
            if !src.refs.iter().any(|name| name == &reference.name) {
                continue;
            }
            match self.eval_reference(src, reference, &sample) {
                RefOutcome::Matched(value) => return value,
                RefOutcome::NoMatch => {}
                RefOutcome::Abort => return String::new(),
            }
        }

        String::new()
    }

    /// Return a copy of `img` with a red marker drawn for each named
    /// source: a single pixel for point sources, a dashed outline (every
    /// 5th pixel along each edge) for rectangle sources. Unknown source
    /// names are skipped with a warning. Marker positions outside the
    /// image are dropped.
    pub fn visualize(&self, img: &RgbaImage, src_names: &[&str]) -> RgbaImage {
        const MARKER: Rgba<u8> = Rgba([255, 0, 0, 255]);
        let mut out = img.clone();
        for name in src_names {
            let src = match self.find_source(name) {
                Some(src) => src,
                None => {
                    warn!("source does not exist srcName={}", name);
                    continue;
                }
            };
            match src.geometry {
                Geometry::Point { x, y } => put_marker(&mut out, x, y, MARKER),
                Geometry::Rect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let mut dx = 0;
                    while dx < width {
                        put_marker(&mut out, x + dx, y, MARKER);
                        put_marker(&mut out, x + dx, y + height, MARKER);
                        dx += 5;
                    }
                    let mut dy = 0;
                    while dy < height {
                        put_marker(&mut out, x, y + dy, MARKER);
                        put_marker(&mut out, x + width, y + dy, MARKER);
                        dy += 5;
                    }
                }
            }
        }
        out
    }

    /// Find a source by name. The first declaration wins if the document
    /// contains duplicates.
    fn find_source(&self, name: &str) -> Option<&Source> {
        self.config.srcs.iter().find(|s| s.name == name)
    }

    fn eval_reference(&self, src: &Source, reference: &Reference, sample: &Sample) -> RefOutcome {
        let spec = match RefSpec::parse(&reference.spec) {
            Some(spec) => spec,
            None => {
                error!(
                    "invalid reference type refName={} ref={}",
                    reference.name, reference.spec
                );
                return RefOutcome::Abort;
            }
        };

        match (spec, sample) {
            (RefSpec::Color(payload), Sample::Pixel(pixel)) => {
                match eval_color(payload, *pixel, &reference.spec) {
                    Ok(true) => RefOutcome::Matched(reference.name.clone()),
                    Ok(false) => RefOutcome::NoMatch,
                    Err(err) => {
                        error!("{} refName={}", err, reference.name);
                        RefOutcome::NoMatch
                    }
                }
            }
            (RefSpec::Color(_), Sample::Region(_)) => {
                error!(
                    "cannot compare image against color srcName={} refName={}",
                    src.name, reference.name
                );
                RefOutcome::Abort
            }
            (RefSpec::Ocr(payload), Sample::Region(region)) => {
                match self.eval_ocr(payload, region) {
                    Ok(text) if !text.is_empty() => RefOutcome::Matched(text),
                    Ok(_) => RefOutcome::NoMatch,
                    Err(err) => {
                        error!("{} refName={}", err, reference.name);
                        RefOutcome::NoMatch
                    }
                }
            }
            (RefSpec::Ocr(_), Sample::Pixel(_)) => {
                error!(
                    "cannot do OCR on pixel srcName={} refName={}",
                    src.name, reference.name
                );
                RefOutcome::Abort
            }
            (RefSpec::Image(path), Sample::Region(region)) => {
                self.eval_image(reference, path, region, false)
            }
            (RefSpec::MonochromeImage(path), Sample::Region(region)) => {
                self.eval_image(reference, path, region, true)
            }
            (RefSpec::Image(_), Sample::Pixel(_))
            | (RefSpec::MonochromeImage(_), Sample::Pixel(_)) => {
                error!(
                    "cannot compare pixel against image srcName={} refName={}",
                    src.name, reference.name
                );
                RefOutcome::Abort
            }
        }
    }

    fn eval_image(
        &self,
        reference: &Reference,
        path: &str,
        region: &RgbaImage,
        monochrome: bool,
    ) -> RefOutcome {
        let ref_img = match self.load_reference_image(path) {
            Ok(img) => img,
            Err(err) => {
                error!("{} refName='{}'", err, reference.name);
                return RefOutcome::NoMatch;
            }
        };
        let equal = if monochrome {
            compare_monochrome(&ref_img, region)
        } else {
            compare_images(&ref_img, region)
        };
        if equal {
            RefOutcome::Matched(reference.name.clone())
        } else {
            RefOutcome::NoMatch
        }
    }

    /// Run OCR over the sampled region, optionally resizing it first, and
    /// normalize the output. Returns the normalized text, which may be
    /// empty when nothing was recognized.
    fn eval_ocr(&self, payload: &str, region: &RgbaImage) -> Result<String, EvalError> {
        let args = OcrArgs::parse(payload)?;
        let scaled;
        let input = match args.width.map(u32::try_from) {
            Some(Ok(width)) if width > 0 && region.width() > 0 => {
                // Resize to the target width, keeping the aspect ratio.
                let height = (width as f64 * region.height() as f64 / region.width() as f64)
                    .round() as u32;
                scaled = resize(region, width, height.max(1), FilterType::Lanczos3);
                &scaled
            }
            // widths that are zero, negative or beyond u32 disable resizing
            _ => region,
        };
        let raw = self.ocr.recognize(input)?;
        Ok(normalize(&raw, args.mode))
    }

    /// Load a reference bitmap through the injected loader. Bitmaps are
    /// loaded on every comparison; there is no cache.
    fn load_reference_image(&self, path: &str) -> Result<RgbaImage, EvalError> {
        let bytes = self.loader.load(path).map_err(|source| EvalError::RefLoad {
            path: path.to_string(),
            source,
        })?;
        let img = load_from_memory(&bytes).map_err(|source| EvalError::RefDecode {
            path: path.to_string(),
            source,
        })?;
        Ok(img.into_rgba8())
    }
}

impl Sample {
    fn take(img: &RgbaImage, geometry: Geometry) -> Sample {
        match geometry {
            Geometry::Point { x, y } => Sample::Pixel(sample_pixel(img, x, y)),
            Geometry::Rect {
                x,
                y,
                width,
                height,
            } => Sample::Region(sample_region(img, x, y, width, height)),
        }
    }
}

fn eval_color(payload: &str, pixel: Rgba<u8>, spec: &str) -> Result<bool, EvalError> {
    let rgb = decode_color(payload).ok_or_else(|| EvalError::InvalidColor {
        spec: spec.to_string(),
    })?;
    Ok(match_color(rgb, pixel))
}

/// Set a marker pixel, dropping writes outside the image bounds.
fn put_marker(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(img.width()) && y < i64::from(img.height()) {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Sample a single pixel. Out of bounds coordinates yield transparent
/// black instead of failing.
fn sample_pixel(img: &RgbaImage, x: i64, y: i64) -> Rgba<u8> {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return Rgba([0, 0, 0, 0]);
    }
    *img.get_pixel(x as u32, y as u32)
}

/// Extract a rectangle as an owned sub-image, clipped to the image bounds.
/// A rectangle entirely outside the image yields an empty sub-image.
fn sample_region(img: &RgbaImage, x: i64, y: i64, width: i64, height: i64) -> RgbaImage {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let x0 = x.max(0).min(w);
    let y0 = y.max(0).min(h);
    let x1 = (x + width.max(0)).max(x0).min(w);
    let y1 = (y + height.max(0)).max(y0).min(h);
    img.view(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
        .to_image()
}
