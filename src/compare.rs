use image::{Rgba, RgbaImage};
use log::warn;

/// True if the pixel's red, green and blue channels equal `rgb` exactly.
/// The alpha channel is ignored.
pub fn match_color(rgb: [u8; 3], pixel: Rgba<u8>) -> bool {
    pixel[0] == rgb[0] && pixel[1] == rgb[1] && pixel[2] == rgb[2]
}

/// Decode a `#RRGGBB` payload into its channel triple.
///
/// Returns `None` unless the payload is exactly `#` followed by six hex
/// digits (the HTML color format).
pub(crate) fn decode_color(payload: &str) -> Option<[u8; 3]> {
    if payload.len() != 7 || !payload.starts_with('#') {
        return None;
    }
    let channels = hex::decode(&payload[1..]).ok()?;
    Some([channels[0], channels[1], channels[2]])
}

/// Compare two images pixel by pixel. The images are equal if they have the
/// same dimensions and identical red, green and blue values at every pixel.
/// Alpha is ignored. Stops at the first differing pixel.
pub fn compare_images(a: &RgbaImage, b: &RgbaImage) -> bool {
    if a.dimensions() != b.dimensions() {
        return false;
    }
    a.pixels()
        .zip(b.pixels())
        .all(|(p, q)| p[0] == q[0] && p[1] == q[1] && p[2] == q[2])
}

/// Compare two images pixel by pixel after classifying each pixel as white
/// or non-white. A pixel is white iff all three color channels are at the
/// maximum value. The images are equal if they have the same dimensions and
/// the classification agrees at every pixel.
pub fn compare_monochrome(a: &RgbaImage, b: &RgbaImage) -> bool {
    if a.dimensions() != b.dimensions() {
        warn!(
            "images are not of the same size a='{},{}' b='{},{}'",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        );
        return false;
    }
    a.pixels()
        .zip(b.pixels())
        .all(|(p, q)| is_white(p) == is_white(q))
}

fn is_white(p: &Rgba<u8>) -> bool {
    p[0] == 255 && p[1] == 255 && p[2] == 255
}
