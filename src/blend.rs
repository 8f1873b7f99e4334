//! PDF blend-mode equations
//!
//! Separable modes operate on one channel at a time through
//! [`blend_channel`]; the four non-separable modes (hue, saturation,
//! color, luminosity) operate on whole RGB triples through
//! [`rgb_blend`]. All math is integer with truncating division, so
//! results are reproducible bit-for-bit.

use crate::format::BlendMode;

/// `COLOR_SQRT[i] = floor(sqrt(255 * i))`, used by soft-light for the
/// `D(back)` darkening curve on the bright half.
const COLOR_SQRT: [u8; 256] = build_color_sqrt();

const fn build_color_sqrt() -> [u8; 256] {
  let mut table = [0u8; 256];
  let mut i = 0usize;
  while i < 256 {
    let v = 255 * i as u32;
    let mut r = 0u32;
    while (r + 1) * (r + 1) <= v {
      r += 1;
    }
    table[i] = r as u8;
    i += 1;
  }
  table
}

/// An RGB triple in blend-intermediate space; channels may leave the
/// 0..=255 range until clipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
  pub red: i32,
  pub green: i32,
  pub blue: i32,
}

/// Applies a separable blend mode to one channel pair.
///
/// Inputs are 0..=255; the result is 0..=255 for all modes.
pub fn blend_channel(blend_mode: BlendMode, back_color: i32, src_color: i32) -> i32 {
  match blend_mode {
    BlendMode::Normal => src_color,
    BlendMode::Multiply => src_color * back_color / 255,
    BlendMode::Screen => src_color + back_color - src_color * back_color / 255,
    BlendMode::Overlay => blend_channel(BlendMode::HardLight, src_color, back_color),
    BlendMode::Darken => src_color.min(back_color),
    BlendMode::Lighten => src_color.max(back_color),
    BlendMode::ColorDodge => {
      if src_color == 255 {
        src_color
      } else {
        (back_color * 255 / (255 - src_color)).min(255)
      }
    }
    BlendMode::ColorBurn => {
      if src_color == 0 {
        src_color
      } else {
        255 - ((255 - back_color) * 255 / src_color).min(255)
      }
    }
    BlendMode::HardLight => {
      if src_color < 128 {
        src_color * back_color * 2 / 255
      } else {
        blend_channel(BlendMode::Screen, back_color, 2 * src_color - 255)
      }
    }
    BlendMode::SoftLight => {
      if src_color < 128 {
        back_color - (255 - 2 * src_color) * back_color * (255 - back_color) / 255 / 255
      } else {
        back_color + (2 * src_color - 255) * (COLOR_SQRT[back_color as usize] as i32 - back_color) / 255
      }
    }
    BlendMode::Difference => (back_color - src_color).abs(),
    BlendMode::Exclusion => back_color + src_color - 2 * back_color * src_color / 255,
    // Non-separable modes never reach the per-channel path.
    _ => src_color,
  }
}

fn lum(color: Rgb) -> i32 {
  (color.red * 30 + color.green * 59 + color.blue * 11) / 100
}

fn clip_color(mut color: Rgb) -> Rgb {
  let l = lum(color);
  let n = color.red.min(color.green).min(color.blue);
  let x = color.red.max(color.green).max(color.blue);
  if n < 0 {
    color.red = l + (color.red - l) * l / (l - n);
    color.green = l + (color.green - l) * l / (l - n);
    color.blue = l + (color.blue - l) * l / (l - n);
  }
  if x > 255 {
    color.red = l + (color.red - l) * (255 - l) / (x - l);
    color.green = l + (color.green - l) * (255 - l) / (x - l);
    color.blue = l + (color.blue - l) * (255 - l) / (x - l);
  }
  color
}

fn set_lum(mut color: Rgb, l: i32) -> Rgb {
  let d = l - lum(color);
  color.red += d;
  color.green += d;
  color.blue += d;
  clip_color(color)
}

fn sat(color: Rgb) -> i32 {
  let n = color.red.min(color.green).min(color.blue);
  let x = color.red.max(color.green).max(color.blue);
  x - n
}

fn set_sat(mut color: Rgb, s: i32) -> Rgb {
  let n = color.red.min(color.green).min(color.blue);
  let x = color.red.max(color.green).max(color.blue);
  if x == n {
    return Rgb::default();
  }
  color.red = (color.red - n) * s / (x - n);
  color.green = (color.green - n) * s / (x - n);
  color.blue = (color.blue - n) * s / (x - n);
  color
}

/// Applies a non-separable blend mode to an RGB pair.
pub fn rgb_blend(blend_mode: BlendMode, src: Rgb, back: Rgb) -> Rgb {
  match blend_mode {
    BlendMode::Hue => set_lum(set_sat(src, sat(back)), lum(back)),
    BlendMode::Saturation => set_lum(set_sat(back, sat(src)), lum(back)),
    BlendMode::Color => set_lum(src, lum(back)),
    BlendMode::Luminosity => set_lum(back, lum(src)),
    _ => Rgb::default(),
  }
}
