//! CSS-style colour strings → RGBA.
//!
//! Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
//! `rgba(r, g, b, a)` with `a` in `0..=1`, and the basic named colours.

use image::Rgba;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid colour: {0:?}")]
pub struct ColorError(pub String);

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const NAMED: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("silver", [192, 192, 192, 255]),
    ("navy", [0, 0, 128, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("transparent", [0, 0, 0, 0]),
];

pub fn parse_color(input: &str) -> Result<Rgba<u8>, ColorError> {
    let s = input.trim().to_ascii_lowercase();
    let err = || ColorError(input.to_string());

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(err);
    }
    if let Some(args) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
        return parse_functional(args, true).ok_or_else(err);
    }
    if let Some(args) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        return parse_functional(args, false).ok_or_else(err);
    }
    NAMED
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, rgba)| Rgba(*rgba))
        .ok_or_else(err)
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn parse_functional(args: &str, with_alpha: bool) -> Option<Rgba<u8>> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let channel = |s: &str| s.parse::<u8>().ok();
    let alpha = if with_alpha {
        let a: f32 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        (a * 255.0).round() as u8
    } else {
        255
    };
    Some(Rgba([
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ]))
}
