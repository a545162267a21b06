//! Background/accent palettes for entries.
//!
//! The deterministic generator hashes a text key (the film title) into a
//! hue and a saturation/lightness inside a fixed band, so every entry gets
//! a stable, readable color without looking at its poster. Sampling the
//! poster itself is an optional strategy layered in front of it.

mod resolver;
mod sample;

pub use resolver::{PaletteResolver, PaletteStrategy};
pub use sample::{palette_from_image_bytes, PosterSampler};

use shelf_models::{Palette, Rgb};

const SATURATION_BASE: f64 = 0.4;
const LIGHTNESS_BASE: f64 = 0.25;
const ACCENT_SATURATION_LIFT: f64 = 0.1;
const ACCENT_LIGHTNESS_LIFT: f64 = 0.15;

/// 31-multiplier string hash over UTF-16 code units, 32-bit signed
/// arithmetic, absolute value. A hash of `i32::MIN` comes out as 2^31.
pub fn hash_key(key: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in key.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}

/// HSL (each in [0, 1]) to 8-bit RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = channel(l);
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb::new(
        channel(hue_to_channel(p, q, h + 1.0 / 3.0)),
        channel(hue_to_channel(p, q, h)),
        channel(hue_to_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// RGB to (h, s, l), each in [0, 1].
pub fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

/// Background at (h, s, l), accent a little more saturated and lighter.
pub fn palette_from_hsl(h: f64, s: f64, l: f64) -> Palette {
    Palette {
        background: hsl_to_rgb(h, s, l),
        accent: hsl_to_rgb(h, s + ACCENT_SATURATION_LIFT, l + ACCENT_LIGHTNESS_LIFT),
    }
}

/// Deterministic palette for a text key.
pub fn palette_for(key: &str) -> Palette {
    let hash = hash_key(key);

    // Shifts act on the value as a signed 32-bit int, as the browser does;
    // only a hash of 2^31 goes negative here.
    let signed = hash as i32;

    let hue = f64::from(hash % 360) / 360.0;
    let saturation = SATURATION_BASE + f64::from((signed >> 8) % 30) / 100.0; // 0.40-0.69
    let lightness = LIGHTNESS_BASE + f64::from((signed >> 16) % 15) / 100.0; // 0.25-0.39

    palette_from_hsl(hue, saturation, lightness)
}

/// Palette for an entry; untitled entries are keyed by position.
pub fn palette_for_entry(title: &str, index: usize) -> Palette {
    if title.is_empty() {
        palette_for(&format!("movie-{}", index))
    } else {
        palette_for(title)
    }
}
