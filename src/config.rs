use serde::Deserialize;
use std::fmt;

/// The declarative matching configuration: the sources that can be sampled
/// from a screen capture, and the references they are compared against.
///
/// Decoded from a JSON document:
/// ```json
/// {
///   "Srcs": [{ "Name": "srcColor1", "Src": [10, 20], "Refs": ["refColor2"] }],
///   "Refs": [{ "Name": "refColor2", "Ref": "color:#FFFFFF" }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    #[serde(rename = "Srcs")]
    pub srcs: Vec<Source>,
    #[serde(rename = "Refs")]
    pub refs: Vec<Reference>,
}

/// A point or rectangle on the screen that can be sampled, together with the
/// names of the references it may be compared against. The order of `refs`
/// is the priority order when scanning for a match.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Src")]
    pub geometry: Geometry,
    #[serde(rename = "Refs")]
    pub refs: Vec<String>,
}

/// Source geometry, decoded from a JSON integer array: two elements describe
/// a pixel, four describe a rectangle. Any other length is rejected when the
/// document is parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Point { x: i64, y: i64 },
    Rect { x: i64, y: i64, width: i64, height: i64 },
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = Vec::<i64>::deserialize(deserializer)?;
        match v[..] {
            [x, y] => Ok(Geometry::Point { x, y }),
            [x, y, width, height] => Ok(Geometry::Rect {
                x,
                y,
                width,
                height,
            }),
            _ => Err(serde::de::Error::invalid_length(
                v.len(),
                &"2 (pixel) or 4 (rectangle) coordinates",
            )),
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Geometry::Point { x, y } => write!(f, "({}, {})", x, y),
            Geometry::Rect {
                x,
                y,
                width,
                height,
            } => write!(f, "({}, {}, {}x{})", x, y, width, height),
        }
    }
}

/// A named reference: an expected color, image or OCR rule, in its string
/// form (`color:#RRGGBB`, `ocr:<width>,<mode>`, `image:<path>`,
/// `imageM:<path>`).
///
/// The string is split into a [RefSpec] only when a comparison reaches it,
/// so a malformed reference in the document surfaces during `match_source`
/// rather than at construction.
#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Ref")]
    pub spec: String,
}

/// A reference specification split into its kind tag and payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RefSpec<'a> {
    /// Expected pixel color, payload is the `#RRGGBB` part
    Color(&'a str),
    /// OCR text extraction, payload is the raw argument string
    Ocr(&'a str),
    /// Expected bitmap, compared pixel by pixel
    Image(&'a str),
    /// Expected bitmap, compared after white/non-white classification
    MonochromeImage(&'a str),
}

impl<'a> RefSpec<'a> {
    /// Split a reference string into kind and payload.
    /// Returns `None` for an unrecognized kind tag.
    pub(crate) fn parse(spec: &'a str) -> Option<RefSpec<'a>> {
        // "imageM:" must be tried before "image:"
        if let Some(payload) = spec.strip_prefix("color:") {
            Some(RefSpec::Color(payload))
        } else if let Some(payload) = spec.strip_prefix("ocr:") {
            Some(RefSpec::Ocr(payload))
        } else if let Some(payload) = spec.strip_prefix("imageM:") {
            Some(RefSpec::MonochromeImage(payload))
        } else if let Some(payload) = spec.strip_prefix("image:") {
            Some(RefSpec::Image(payload))
        } else {
            None
        }
    }
}
