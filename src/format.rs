//! Pixel format vocabulary and channel math
//!
//! Formats are encoded so cheap bit tests answer the common questions:
//! bits-per-pixel lives in the low byte, bit 8 marks mask (coverage-only)
//! buffers, bit 9 marks an alpha channel, bit 10 marks premultiplied
//! alpha. All channel arithmetic is integer math with truncating
//! division; compositing results are bit-exact.

use crate::error::BitmapError;

/// Storage layout of a pixel buffer.
///
/// The discriminant packs the layout properties: `bpp` in bits 0..=7,
/// mask flag in bit 8, alpha flag in bit 9, premultiplied flag in
/// bit 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PixelFormat {
  /// No layout; never composited.
  Invalid = 0,
  /// 1 bpp coverage-only buffer.
  OneBppMask = 0x101,
  /// 1 bpp paletted color.
  OneBppRgb = 0x001,
  /// 8 bpp coverage-only buffer.
  EightBppMask = 0x108,
  /// 8 bpp gray or paletted color.
  EightBppRgb = 0x008,
  /// 24-bit B,G,R.
  Bgr = 0x018,
  /// 32-bit B,G,R,pad; the pad byte carries no meaning.
  Bgrx = 0x020,
  /// 32-bit B,G,R,A with straight (unpremultiplied) alpha.
  Bgra = 0x220,
  /// 32-bit B,G,R,A with premultiplied alpha. Part of the vocabulary
  /// but outside the straight-alpha compositing paths.
  BgraPremul = 0x620,
}

impl PixelFormat {
  /// Bits per pixel, 0 for `Invalid`.
  pub fn bits_per_pixel(self) -> u32 {
    self as u32 & 0xff
  }

  /// Bytes per pixel for byte-aligned formats, 0 for sub-byte formats.
  pub fn bytes_per_pixel(self) -> u32 {
    self.bits_per_pixel() / 8
  }

  /// True for coverage-only (mask) buffers.
  pub fn is_mask(self) -> bool {
    self as u32 & 0x100 != 0
  }

  /// True when the format carries an alpha channel.
  pub fn has_alpha(self) -> bool {
    self as u32 & 0x200 != 0
  }

  /// True for premultiplied-alpha layouts.
  pub fn is_premultiplied(self) -> bool {
    self as u32 & 0x400 != 0
  }

  /// True for paletted (sub-byte or indexed 8 bpp) color formats.
  pub fn is_paletted(self) -> bool {
    matches!(self, PixelFormat::OneBppRgb | PixelFormat::EightBppRgb)
  }
}

/// PDF blend modes, in the table order of the imaging model.
///
/// `Hue` and later are the non-separable modes operating on all three
/// channels at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlendMode {
  Normal = 0,
  Multiply,
  Screen,
  Overlay,
  Darken,
  Lighten,
  ColorDodge,
  ColorBurn,
  HardLight,
  SoftLight,
  Difference,
  Exclusion,
  Hue,
  Saturation,
  Color,
  Luminosity,
}

impl BlendMode {
  /// Non-separable modes blend R, G and B jointly.
  pub fn is_nonseparable(self) -> bool {
    self as u8 >= BlendMode::Hue as u8
  }
}

// ===== ARGB packing =====

/// Packs channels as `0xAARRGGBB`.
#[inline]
pub fn argb_encode(a: u32, r: u32, g: u32, b: u32) -> u32 {
  (a << 24) | (r << 16) | (g << 8) | b
}

#[inline]
pub fn argb_a(argb: u32) -> u8 {
  (argb >> 24) as u8
}

#[inline]
pub fn argb_r(argb: u32) -> u8 {
  (argb >> 16) as u8
}

#[inline]
pub fn argb_g(argb: u32) -> u8 {
  (argb >> 8) as u8
}

#[inline]
pub fn argb_b(argb: u32) -> u8 {
  argb as u8
}

/// Packs an alpha-less color as `0x00BBGGRR` (COLORREF order).
#[inline]
pub fn rgb_encode(r: u32, g: u32, b: u32) -> u32 {
  (b << 16) | (g << 8) | r
}

#[inline]
pub fn rgb_r(colorref: u32) -> u8 {
  colorref as u8
}

#[inline]
pub fn rgb_g(colorref: u32) -> u8 {
  (colorref >> 8) as u8
}

#[inline]
pub fn rgb_b(colorref: u32) -> u8 {
  (colorref >> 16) as u8
}

/// Packs CMYK channels as `0xCCMMYYKK`.
#[inline]
pub fn cmyk_encode(c: u32, m: u32, y: u32, k: u32) -> u32 {
  (c << 24) | (m << 16) | (y << 8) | k
}

#[inline]
pub fn cmyk_c(cmyk: u32) -> u8 {
  (cmyk >> 24) as u8
}

#[inline]
pub fn cmyk_m(cmyk: u32) -> u8 {
  (cmyk >> 16) as u8
}

#[inline]
pub fn cmyk_y(cmyk: u32) -> u8 {
  (cmyk >> 8) as u8
}

#[inline]
pub fn cmyk_k(cmyk: u32) -> u8 {
  cmyk as u8
}

// ===== Channel math =====

/// Linear interpolation between a background and source channel by an
/// 8-bit alpha: `(back*(255-alpha) + src*alpha) / 255`, truncating.
#[inline]
pub fn alpha_merge(back: i32, src: i32, alpha: i32) -> u8 {
  ((back * (255 - alpha) + src * alpha) / 255) as u8
}

/// Porter-Duff union of two straight alpha values:
/// `back + src - back*src/255`, truncating.
#[inline]
pub fn alpha_union(back: i32, src: i32) -> u8 {
  (back + src - back * src / 255) as u8
}

/// NTSC-weight gray conversion: `(b*11 + g*59 + r*30) / 100`, truncating.
#[inline]
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
  ((b as i32 * 11 + g as i32 * 59 + r as i32 * 30) / 100) as u8
}

// ===== Buffer layout =====

/// Row pitch and total buffer size of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchAndSize {
  pub pitch: u32,
  pub size: u32,
}

/// Computes the row pitch and total byte size for a bitmap.
///
/// A `pitch` of zero selects the default 32-bit-aligned pitch
/// `(width*bpp + 31) / 32 * 4`. Fails on non-positive dimensions, a
/// format without a layout, or arithmetic overflow.
pub fn calculate_pitch_and_size(
  width: i32,
  height: i32,
  format: PixelFormat,
  pitch: u32,
) -> Result<PitchAndSize, BitmapError> {
  if width <= 0 || height <= 0 {
    return Err(BitmapError::InvalidDimensions { width, height });
  }
  let bpp = format.bits_per_pixel();
  if bpp == 0 {
    return Err(BitmapError::InvalidFormat);
  }
  let overflow = BitmapError::SizeOverflow { width, height };
  let actual_pitch = if pitch == 0 {
    (width as u32)
      .checked_mul(bpp)
      .and_then(|bits| bits.checked_add(31))
      .map(|bits| bits / 32 * 4)
      .ok_or(overflow.clone())?
  } else {
    pitch
  };
  let size = actual_pitch
    .checked_mul(height as u32)
    .ok_or(overflow)?;
  Ok(PitchAndSize {
    pitch: actual_pitch,
    size,
  })
}
