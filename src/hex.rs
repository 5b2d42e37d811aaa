//! `#rrggbb` color keys and the coarse similarity metric used to deduplicate them.

use palette::Srgb;

/// Two colors whose channel-wise absolute difference sums below this are "similar".
pub const SIMILARITY_THRESHOLD: u32 = 100;

/// Format a color as `#rrggbb` with two lowercase hex digits per channel.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Format an [`Srgb`] color as a color key.
pub fn srgb_to_hex(color: Srgb<u8>) -> String {
    rgb_to_hex(color.red, color.green, color.blue)
}

/// Parse a 6-digit hex color, with or without a leading `#`.
///
/// Hex digits are case-insensitive. Anything else (shorthand `#abc`, stray
/// characters, a doubled `#`) yields `None`.
pub fn hex_to_rgb(hex: &str) -> Option<Srgb<u8>> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
    Some(Srgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Sum of absolute per-channel differences (0..=765).
pub fn color_distance(a: Srgb<u8>, b: Srgb<u8>) -> u32 {
    u32::from(a.red.abs_diff(b.red))
        + u32::from(a.green.abs_diff(b.green))
        + u32::from(a.blue.abs_diff(b.blue))
}

/// Whether two color keys are closer than [`SIMILARITY_THRESHOLD`].
///
/// Malformed keys are never similar to anything.
pub fn is_similar(hex1: &str, hex2: &str) -> bool {
    match (hex_to_rgb(hex1), hex_to_rgb(hex2)) {
        (Some(a), Some(b)) => color_distance(a, b) < SIMILARITY_THRESHOLD,
        _ => false,
    }
}
