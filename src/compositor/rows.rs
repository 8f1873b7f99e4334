//! Per-scanline compositing loops
//!
//! Each function composites one row for a fixed source class and
//! destination layout. Destination byte order is a value parameter
//! (`swap` selects RGB order instead of BGR); the 3- vs 4-byte opaque
//! layouts share code through `dest_bpp`. The fast paths
//! (`back_alpha == 0`, `src_alpha == 0`, clip 0/255) are exact
//! shortcuts: they produce the same bytes the general path would.
//!
//! Channel order convention: color index 0 is blue, 1 green, 2 red,
//! matching the BGR-ordered sources. `ch()` maps a color index to its
//! byte offset in the destination pixel.

use crate::blend::{blend_channel, rgb_blend, Rgb};
use crate::format::{alpha_merge, alpha_union, rgb_to_gray, BlendMode};

use super::MaskColor;

#[inline]
fn ch(swap: bool, color: usize) -> usize {
  if swap {
    2 - color
  } else {
    color
  }
}

#[inline]
fn merge(back: u8, src: i32, alpha: i32) -> u8 {
  alpha_merge(back as i32, src, alpha)
}

#[inline]
fn union(back: u8, src: i32) -> u8 {
  alpha_union(back as i32, src)
}

#[inline]
fn bit_set(src: &[u8], pos: usize) -> bool {
  src[pos / 8] & (1 << (7 - pos % 8)) != 0
}

/// Coverage for a plain mask pixel: mask alpha scaled by the clip value.
#[inline]
fn get_alpha(mask_alpha: u8, clip: Option<&[u8]>, col: usize) -> i32 {
  match clip {
    Some(c) => c[col] as i32 * mask_alpha as i32 / 255,
    None => mask_alpha as i32,
  }
}

/// Coverage for a byte-mask pixel: mask alpha scaled by the per-pixel
/// mask value and the clip value.
#[inline]
fn get_alpha_with_src(mask_alpha: u8, clip: Option<&[u8]>, src: &[u8], col: usize) -> i32 {
  let mut result = mask_alpha as i32 * src[col] as i32;
  if let Some(c) = clip {
    result = result * c[col] as i32 / 255;
  }
  result / 255
}

/// Blends two BGR-ordered byte triples with a non-separable mode,
/// returning BGR-ordered channels.
#[inline]
fn blend_bgr(mode: BlendMode, src_bgr: [u8; 3], back_bgr: [u8; 3]) -> [i32; 3] {
  let out = rgb_blend(
    mode,
    Rgb {
      red: src_bgr[2] as i32,
      green: src_bgr[1] as i32,
      blue: src_bgr[0] as i32,
    },
    Rgb {
      red: back_bgr[2] as i32,
      green: back_bgr[1] as i32,
      blue: back_bgr[0] as i32,
    },
  );
  [out.blue, out.green, out.red]
}

#[inline]
fn gather_bgr(dest: &[u8], base: usize, swap: bool) -> [u8; 3] {
  [
    dest[base + ch(swap, 0)],
    dest[base + ch(swap, 1)],
    dest[base + ch(swap, 2)],
  ]
}

/// Gray value of a source pixel after the row's blend mode is applied
/// against the gray destination. Non-separable modes degenerate on a
/// single channel: luminosity takes the source gray, the rest keep the
/// destination.
#[inline]
fn gray_with_blend(src_bgr: [u8; 3], output: u8, mode: BlendMode) -> u8 {
  let gray = rgb_to_gray(src_bgr[2], src_bgr[1], src_bgr[0]);
  if mode.is_nonseparable() {
    return if mode == BlendMode::Luminosity {
      gray
    } else {
      output
    };
  }
  if mode != BlendMode::Normal {
    return blend_channel(mode, output as i32, gray as i32) as u8;
  }
  gray
}

// ===== Opaque BGR/BGRX sources =====

pub(super) fn rgb_to_gray_row(
  dest: &mut [u8],
  src: &[u8],
  src_bpp: usize,
  width: usize,
  mode: BlendMode,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let s = col * src_bpp;
    let gray = gray_with_blend([src[s], src[s + 1], src[s + 2]], dest[col], mode);
    match clip {
      Some(c) if c[col] < 255 => dest[col] = merge(dest[col], gray as i32, c[col] as i32),
      _ => dest[col] = gray,
    }
  }
}

pub(super) fn rgb_to_mask_row(dest: &mut [u8], width: usize, clip: Option<&[u8]>) {
  match clip {
    None => dest[..width].fill(0xff),
    Some(c) => {
      for col in 0..width {
        dest[col] = union(dest[col], c[col] as i32);
      }
    }
  }
}

pub(super) fn rgb_to_rgb_blend_noclip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  mode: BlendMode,
  dest_bpp: usize,
  src_bpp: usize,
  swap: bool,
) {
  let nonseparable = mode.is_nonseparable();
  for col in 0..width {
    let d = col * dest_bpp;
    let s = col * src_bpp;
    let blended_bgr = if nonseparable {
      blend_bgr(mode, [src[s], src[s + 1], src[s + 2]], gather_bgr(dest, d, swap))
    } else {
      [0; 3]
    };
    for color in 0..3 {
      let di = d + ch(swap, color);
      let src_color = src[s + color] as i32;
      let blended = if nonseparable {
        blended_bgr[color]
      } else {
        blend_channel(mode, dest[di] as i32, src_color)
      };
      dest[di] = blended as u8;
    }
  }
}

pub(super) fn rgb_to_rgb_blend_clip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  mode: BlendMode,
  dest_bpp: usize,
  src_bpp: usize,
  swap: bool,
  clip: &[u8],
) {
  let nonseparable = mode.is_nonseparable();
  for col in 0..width {
    let src_alpha = clip[col] as i32;
    if src_alpha == 0 {
      continue;
    }
    let d = col * dest_bpp;
    let s = col * src_bpp;
    let blended_bgr = if nonseparable {
      blend_bgr(mode, [src[s], src[s + 1], src[s + 2]], gather_bgr(dest, d, swap))
    } else {
      [0; 3]
    };
    for color in 0..3 {
      let di = d + ch(swap, color);
      let src_color = src[s + color] as i32;
      let back_color = dest[di];
      let blended = if nonseparable {
        blended_bgr[color]
      } else {
        blend_channel(mode, back_color as i32, src_color)
      };
      dest[di] = merge(back_color, blended, src_alpha);
    }
  }
}

pub(super) fn rgb_to_rgb_noblend_noclip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  dest_bpp: usize,
  src_bpp: usize,
  swap: bool,
) {
  if !swap && dest_bpp == src_bpp {
    dest[..width * dest_bpp].copy_from_slice(&src[..width * src_bpp]);
    return;
  }
  for col in 0..width {
    let d = col * dest_bpp;
    let s = col * src_bpp;
    for color in 0..3 {
      dest[d + ch(swap, color)] = src[s + color];
    }
  }
}

pub(super) fn rgb_to_rgb_noblend_clip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  dest_bpp: usize,
  src_bpp: usize,
  swap: bool,
  clip: &[u8],
) {
  for col in 0..width {
    let src_alpha = clip[col] as i32;
    if src_alpha == 0 {
      continue;
    }
    let d = col * dest_bpp;
    let s = col * src_bpp;
    if src_alpha == 255 {
      for color in 0..3 {
        dest[d + ch(swap, color)] = src[s + color];
      }
    } else {
      for color in 0..3 {
        let di = d + ch(swap, color);
        dest[di] = merge(dest[di], src[s + color] as i32, src_alpha);
      }
    }
  }
}

pub(super) fn rgb_to_rgba_blend_noclip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  mode: BlendMode,
  src_bpp: usize,
  swap: bool,
) {
  let nonseparable = mode.is_nonseparable();
  for col in 0..width {
    let d = col * 4;
    let s = col * src_bpp;
    let back_alpha = dest[d + 3];
    if back_alpha == 0 {
      for color in 0..3 {
        dest[d + ch(swap, color)] = src[s + color];
      }
      dest[d + 3] = 0xff;
      continue;
    }
    dest[d + 3] = 0xff;
    let blended_bgr = if nonseparable {
      blend_bgr(mode, [src[s], src[s + 1], src[s + 2]], gather_bgr(dest, d, swap))
    } else {
      [0; 3]
    };
    for color in 0..3 {
      let di = d + ch(swap, color);
      let src_color = src[s + color] as i32;
      let blended = if nonseparable {
        blended_bgr[color]
      } else {
        blend_channel(mode, dest[di] as i32, src_color)
      };
      dest[di] = alpha_merge(src_color, blended, back_alpha as i32);
    }
  }
}

pub(super) fn rgb_to_rgba_blend_clip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  mode: BlendMode,
  src_bpp: usize,
  swap: bool,
  clip: &[u8],
) {
  let nonseparable = mode.is_nonseparable();
  for col in 0..width {
    let src_alpha = clip[col] as i32;
    let d = col * 4;
    let s = col * src_bpp;
    let back_alpha = dest[d + 3];
    if back_alpha == 0 {
      // Color-only overwrite; alpha stays zero until coverage arrives.
      for color in 0..3 {
        dest[d + ch(swap, color)] = src[s + color];
      }
      continue;
    }
    if src_alpha == 0 {
      continue;
    }
    let dest_alpha = union(back_alpha, src_alpha);
    dest[d + 3] = dest_alpha;
    let alpha_ratio = src_alpha * 255 / dest_alpha as i32;
    let blended_bgr = if nonseparable {
      blend_bgr(mode, [src[s], src[s + 1], src[s + 2]], gather_bgr(dest, d, swap))
    } else {
      [0; 3]
    };
    for color in 0..3 {
      let di = d + ch(swap, color);
      let src_color = src[s + color] as i32;
      let blended = if nonseparable {
        blended_bgr[color]
      } else {
        blend_channel(mode, dest[di] as i32, src_color)
      };
      let blended = alpha_merge(src_color, blended, back_alpha as i32);
      dest[di] = merge(dest[di], blended as i32, alpha_ratio);
    }
  }
}

pub(super) fn rgb_to_rgba_noblend_noclip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  src_bpp: usize,
  swap: bool,
) {
  for col in 0..width {
    let d = col * 4;
    let s = col * src_bpp;
    for color in 0..3 {
      dest[d + ch(swap, color)] = src[s + color];
    }
    dest[d + 3] = 0xff;
  }
}

pub(super) fn rgb_to_rgba_noblend_clip(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  src_bpp: usize,
  swap: bool,
  clip: &[u8],
) {
  for col in 0..width {
    let src_alpha = clip[col] as i32;
    let d = col * 4;
    let s = col * src_bpp;
    if src_alpha == 255 {
      for color in 0..3 {
        dest[d + ch(swap, color)] = src[s + color];
      }
      dest[d + 3] = 255;
      continue;
    }
    if src_alpha == 0 {
      continue;
    }
    let back_alpha = dest[d + 3];
    let dest_alpha = union(back_alpha, src_alpha);
    dest[d + 3] = dest_alpha;
    let alpha_ratio = src_alpha * 255 / dest_alpha as i32;
    for color in 0..3 {
      let di = d + ch(swap, color);
      dest[di] = merge(dest[di], src[s + color] as i32, alpha_ratio);
    }
  }
}

// ===== Straight-alpha BGRA sources =====

pub(super) fn bgra_to_gray_row(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  mode: BlendMode,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let s = col * 4;
    let clip_value = clip.map_or(255, |c| c[col]) as i32;
    let src_alpha = src[s + 3] as i32 * clip_value / 255;
    if src_alpha == 0 {
      continue;
    }
    let gray = gray_with_blend([src[s], src[s + 1], src[s + 2]], dest[col], mode);
    dest[col] = merge(dest[col], gray as i32, src_alpha);
  }
}

pub(super) fn bgra_to_mask_row(dest: &mut [u8], src: &[u8], width: usize, clip: Option<&[u8]>) {
  for col in 0..width {
    let clip_value = clip.map_or(255, |c| c[col]) as i32;
    let src_alpha = (src[col * 4 + 3] as i32 * clip_value / 255) as u8;
    if dest[col] == 0 {
      dest[col] = src_alpha;
      continue;
    }
    if src_alpha == 0 {
      continue;
    }
    dest[col] = union(dest[col], src_alpha as i32);
  }
}

pub(super) fn bgra_to_rgb_row(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  mode: BlendMode,
  dest_bpp: usize,
  swap: bool,
  clip: Option<&[u8]>,
) {
  let nonseparable = mode.is_nonseparable();
  for col in 0..width {
    let s = col * 4;
    let d = col * dest_bpp;
    let clip_value = clip.map_or(255, |c| c[col]) as i32;
    let src_alpha = src[s + 3] as i32 * clip_value / 255;
    if nonseparable {
      if src_alpha == 0 {
        continue;
      }
      let blended_bgr =
        blend_bgr(mode, [src[s], src[s + 1], src[s + 2]], gather_bgr(dest, d, swap));
      for color in 0..3 {
        let di = d + ch(swap, color);
        dest[di] = merge(dest[di], blended_bgr[color], src_alpha);
      }
    } else if mode != BlendMode::Normal {
      if src_alpha == 0 {
        continue;
      }
      for color in 0..3 {
        let di = d + ch(swap, color);
        let blended = blend_channel(mode, dest[di] as i32, src[s + color] as i32);
        dest[di] = merge(dest[di], blended, src_alpha);
      }
    } else {
      if src_alpha == 255 {
        for color in 0..3 {
          dest[d + ch(swap, color)] = src[s + color];
        }
        continue;
      }
      if src_alpha == 0 {
        continue;
      }
      for color in 0..3 {
        let di = d + ch(swap, color);
        dest[di] = merge(dest[di], src[s + color] as i32, src_alpha);
      }
    }
  }
}

pub(super) fn bgra_to_rgba_row(
  dest: &mut [u8],
  src: &[u8],
  width: usize,
  mode: BlendMode,
  swap: bool,
  clip: Option<&[u8]>,
) {
  let nonseparable = mode.is_nonseparable();
  for col in 0..width {
    let s = col * 4;
    let d = col * 4;
    let clip_value = clip.map_or(255, |c| c[col]) as i32;
    let src_alpha = src[s + 3] as i32 * clip_value / 255;
    let back_alpha = dest[d + 3];
    if back_alpha == 0 {
      for color in 0..3 {
        dest[d + ch(swap, color)] = src[s + color];
      }
      dest[d + 3] = src_alpha as u8;
      continue;
    }
    if src_alpha == 0 {
      continue;
    }
    let dest_alpha = union(back_alpha, src_alpha);
    let alpha_ratio = src_alpha * 255 / dest_alpha as i32;
    if nonseparable {
      let mut blended_bgr =
        blend_bgr(mode, [src[s], src[s + 1], src[s + 2]], gather_bgr(dest, d, swap));
      for color in 0..3 {
        blended_bgr[color] =
          alpha_merge(src[s + color] as i32, blended_bgr[color], back_alpha as i32) as i32;
      }
      for color in 0..3 {
        let di = d + ch(swap, color);
        dest[di] = merge(dest[di], blended_bgr[color], alpha_ratio);
      }
    } else if mode != BlendMode::Normal {
      for color in 0..3 {
        let di = d + ch(swap, color);
        let src_color = src[s + color] as i32;
        let blended = blend_channel(mode, dest[di] as i32, src_color);
        let blended = alpha_merge(src_color, blended, back_alpha as i32);
        dest[di] = merge(dest[di], blended as i32, alpha_ratio);
      }
    } else {
      for color in 0..3 {
        let di = d + ch(swap, color);
        dest[di] = merge(dest[di], src[s + color] as i32, alpha_ratio);
      }
    }
    dest[d + 3] = dest_alpha;
  }
}

// ===== Paletted sources =====

pub(super) fn pal8_to_gray_row(
  dest: &mut [u8],
  src: &[u8],
  gray_palette: &[u8],
  width: usize,
  mode: BlendMode,
  clip: Option<&[u8]>,
) {
  let nonseparable = mode.is_nonseparable();
  for col in 0..width {
    let mut gray = gray_palette[src[col] as usize];
    if mode != BlendMode::Normal {
      if nonseparable {
        gray = if mode == BlendMode::Luminosity {
          gray
        } else {
          dest[col]
        };
      } else {
        gray = blend_channel(mode, dest[col] as i32, gray as i32) as u8;
      }
    }
    match clip {
      Some(c) if c[col] < 255 => dest[col] = merge(dest[col], gray as i32, c[col] as i32),
      _ => dest[col] = gray,
    }
  }
}

pub(super) fn pal1_to_gray_row(
  dest: &mut [u8],
  src: &[u8],
  src_left: usize,
  gray_palette: &[u8],
  width: usize,
  mode: BlendMode,
  clip: Option<&[u8]>,
) {
  let nonseparable = mode.is_nonseparable();
  let reset_gray = gray_palette[0];
  let set_gray = gray_palette[1];
  for col in 0..width {
    let mut gray = if bit_set(src, col + src_left) {
      set_gray
    } else {
      reset_gray
    };
    if mode != BlendMode::Normal {
      if nonseparable {
        gray = if mode == BlendMode::Luminosity {
          gray
        } else {
          dest[col]
        };
      } else {
        gray = blend_channel(mode, dest[col] as i32, gray as i32) as u8;
      }
    }
    match clip {
      Some(c) if c[col] < 255 => dest[col] = merge(dest[col], gray as i32, c[col] as i32),
      _ => dest[col] = gray,
    }
  }
}

fn argb_to_bgr(argb: u32) -> [u8; 3] {
  [(argb & 0xff) as u8, (argb >> 8) as u8, (argb >> 16) as u8]
}

pub(super) fn pal8_to_rgb_row(
  dest: &mut [u8],
  src: &[u8],
  palette: &[u32],
  width: usize,
  dest_bpp: usize,
  swap: bool,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let src_bgr = argb_to_bgr(palette[src[col] as usize]);
    let d = col * dest_bpp;
    match clip {
      Some(c) if c[col] < 255 => {
        for color in 0..3 {
          let di = d + ch(swap, color);
          dest[di] = merge(dest[di], src_bgr[color] as i32, c[col] as i32);
        }
      }
      _ => {
        for color in 0..3 {
          dest[d + ch(swap, color)] = src_bgr[color];
        }
      }
    }
  }
}

pub(super) fn pal1_to_rgb_row(
  dest: &mut [u8],
  src: &[u8],
  src_left: usize,
  palette: &[u32],
  width: usize,
  dest_bpp: usize,
  swap: bool,
  clip: Option<&[u8]>,
) {
  let reset_bgr = argb_to_bgr(palette[0]);
  let set_bgr = argb_to_bgr(palette[1]);
  for col in 0..width {
    let src_bgr = if bit_set(src, col + src_left) {
      set_bgr
    } else {
      reset_bgr
    };
    let d = col * dest_bpp;
    match clip {
      Some(c) if c[col] < 255 => {
        for color in 0..3 {
          let di = d + ch(swap, color);
          dest[di] = merge(dest[di], src_bgr[color] as i32, c[col] as i32);
        }
      }
      _ => {
        for color in 0..3 {
          dest[d + ch(swap, color)] = src_bgr[color];
        }
      }
    }
  }
}

fn pal_to_rgba_pixel(dest: &mut [u8], d: usize, src_bgr: [u8; 3], swap: bool, clip_value: Option<u8>) {
  match clip_value {
    None | Some(255) => {
      for color in 0..3 {
        dest[d + ch(swap, color)] = src_bgr[color];
      }
      dest[d + 3] = 255;
    }
    Some(0) => {}
    Some(src_alpha) => {
      let src_alpha = src_alpha as i32;
      let back_alpha = dest[d + 3];
      let dest_alpha = union(back_alpha, src_alpha);
      dest[d + 3] = dest_alpha;
      let alpha_ratio = src_alpha * 255 / dest_alpha as i32;
      for color in 0..3 {
        let di = d + ch(swap, color);
        dest[di] = merge(dest[di], src_bgr[color] as i32, alpha_ratio);
      }
    }
  }
}

pub(super) fn pal8_to_rgba_row(
  dest: &mut [u8],
  src: &[u8],
  palette: &[u32],
  width: usize,
  swap: bool,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let src_bgr = argb_to_bgr(palette[src[col] as usize]);
    pal_to_rgba_pixel(dest, col * 4, src_bgr, swap, clip.map(|c| c[col]));
  }
}

pub(super) fn pal1_to_rgba_row(
  dest: &mut [u8],
  src: &[u8],
  src_left: usize,
  palette: &[u32],
  width: usize,
  swap: bool,
  clip: Option<&[u8]>,
) {
  let reset_bgr = argb_to_bgr(palette[0]);
  let set_bgr = argb_to_bgr(palette[1]);
  for col in 0..width {
    let src_bgr = if bit_set(src, col + src_left) {
      set_bgr
    } else {
      reset_bgr
    };
    pal_to_rgba_pixel(dest, col * 4, src_bgr, swap, clip.map(|c| c[col]));
  }
}

// ===== Mask sources =====

fn mask_to_rgba_pixel(
  dest: &mut [u8],
  d: usize,
  src_alpha: i32,
  mask: &MaskColor,
  mode: BlendMode,
  swap: bool,
) {
  let back_alpha = dest[d + 3];
  if back_alpha == 0 {
    dest[d + ch(swap, 0)] = mask.blue;
    dest[d + ch(swap, 1)] = mask.green;
    dest[d + ch(swap, 2)] = mask.red;
    dest[d + 3] = src_alpha as u8;
    return;
  }
  if src_alpha == 0 {
    return;
  }
  let mask_bgr = [mask.blue, mask.green, mask.red];
  let dest_alpha = union(back_alpha, src_alpha);
  dest[d + 3] = dest_alpha;
  let alpha_ratio = src_alpha * 255 / dest_alpha as i32;
  if mode.is_nonseparable() {
    let blended_bgr = blend_bgr(mode, mask_bgr, gather_bgr(dest, d, swap));
    for color in 0..3 {
      let di = d + ch(swap, color);
      dest[di] = merge(dest[di], blended_bgr[color], alpha_ratio);
    }
  } else if mode != BlendMode::Normal {
    for color in 0..3 {
      let di = d + ch(swap, color);
      let src_color = mask_bgr[color] as i32;
      let blended = blend_channel(mode, dest[di] as i32, src_color);
      let blended = alpha_merge(src_color, blended, back_alpha as i32);
      dest[di] = merge(dest[di], blended as i32, alpha_ratio);
    }
  } else {
    for color in 0..3 {
      let di = d + ch(swap, color);
      dest[di] = merge(dest[di], mask_bgr[color] as i32, alpha_ratio);
    }
  }
}

fn mask_to_rgb_pixel(
  dest: &mut [u8],
  d: usize,
  src_alpha: i32,
  mask: &MaskColor,
  mode: BlendMode,
  swap: bool,
) {
  let mask_bgr = [mask.blue, mask.green, mask.red];
  if mode.is_nonseparable() {
    let blended_bgr = blend_bgr(mode, mask_bgr, gather_bgr(dest, d, swap));
    for color in 0..3 {
      let di = d + ch(swap, color);
      dest[di] = merge(dest[di], blended_bgr[color], src_alpha);
    }
  } else if mode != BlendMode::Normal {
    for color in 0..3 {
      let di = d + ch(swap, color);
      let blended = blend_channel(mode, dest[di] as i32, mask_bgr[color] as i32);
      dest[di] = merge(dest[di], blended, src_alpha);
    }
  } else {
    for color in 0..3 {
      let di = d + ch(swap, color);
      dest[di] = merge(dest[di], mask_bgr[color] as i32, src_alpha);
    }
  }
}

pub(super) fn byte_mask_to_rgba_row(
  dest: &mut [u8],
  src: &[u8],
  mask: &MaskColor,
  width: usize,
  mode: BlendMode,
  swap: bool,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let src_alpha = get_alpha_with_src(mask.alpha, clip, src, col);
    mask_to_rgba_pixel(dest, col * 4, src_alpha, mask, mode, swap);
  }
}

pub(super) fn byte_mask_to_rgb_row(
  dest: &mut [u8],
  src: &[u8],
  mask: &MaskColor,
  width: usize,
  mode: BlendMode,
  dest_bpp: usize,
  swap: bool,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let src_alpha = get_alpha_with_src(mask.alpha, clip, src, col);
    if src_alpha == 0 {
      continue;
    }
    mask_to_rgb_pixel(dest, col * dest_bpp, src_alpha, mask, mode, swap);
  }
}

pub(super) fn byte_mask_to_mask_row(
  dest: &mut [u8],
  src: &[u8],
  mask_alpha: u8,
  width: usize,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let src_alpha = get_alpha_with_src(mask_alpha, clip, src, col);
    let back_alpha = dest[col];
    if back_alpha == 0 {
      dest[col] = src_alpha as u8;
    } else if src_alpha != 0 {
      dest[col] = union(back_alpha, src_alpha);
    }
  }
}

pub(super) fn byte_mask_to_gray_row(
  dest: &mut [u8],
  src: &[u8],
  mask_alpha: u8,
  src_gray: u8,
  width: usize,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    let src_alpha = get_alpha_with_src(mask_alpha, clip, src, col);
    if src_alpha != 0 {
      dest[col] = merge(dest[col], src_gray as i32, src_alpha);
    }
  }
}

pub(super) fn bit_mask_to_rgba_row(
  dest: &mut [u8],
  src: &[u8],
  mask: &MaskColor,
  src_left: usize,
  width: usize,
  mode: BlendMode,
  swap: bool,
  clip: Option<&[u8]>,
) {
  if mode == BlendMode::Normal && clip.is_none() && mask.alpha == 255 {
    for col in 0..width {
      if bit_set(src, src_left + col) {
        let d = col * 4;
        dest[d + ch(swap, 0)] = mask.blue;
        dest[d + ch(swap, 1)] = mask.green;
        dest[d + ch(swap, 2)] = mask.red;
        dest[d + 3] = 0xff;
      }
    }
    return;
  }
  for col in 0..width {
    if !bit_set(src, src_left + col) {
      continue;
    }
    let src_alpha = get_alpha(mask.alpha, clip, col);
    mask_to_rgba_pixel(dest, col * 4, src_alpha, mask, mode, swap);
  }
}

pub(super) fn bit_mask_to_rgb_row(
  dest: &mut [u8],
  src: &[u8],
  mask: &MaskColor,
  src_left: usize,
  width: usize,
  mode: BlendMode,
  dest_bpp: usize,
  swap: bool,
  clip: Option<&[u8]>,
) {
  if mode == BlendMode::Normal && clip.is_none() && mask.alpha == 255 {
    for col in 0..width {
      if bit_set(src, src_left + col) {
        let d = col * dest_bpp;
        dest[d + ch(swap, 0)] = mask.blue;
        dest[d + ch(swap, 1)] = mask.green;
        dest[d + ch(swap, 2)] = mask.red;
      }
    }
    return;
  }
  for col in 0..width {
    if !bit_set(src, src_left + col) {
      continue;
    }
    let src_alpha = get_alpha(mask.alpha, clip, col);
    if src_alpha == 0 {
      continue;
    }
    mask_to_rgb_pixel(dest, col * dest_bpp, src_alpha, mask, mode, swap);
  }
}

pub(super) fn bit_mask_to_mask_row(
  dest: &mut [u8],
  src: &[u8],
  mask_alpha: u8,
  src_left: usize,
  width: usize,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    if !bit_set(src, src_left + col) {
      continue;
    }
    let src_alpha = get_alpha(mask_alpha, clip, col);
    let back_alpha = dest[col];
    if back_alpha == 0 {
      dest[col] = src_alpha as u8;
    } else if src_alpha != 0 {
      dest[col] = union(back_alpha, src_alpha);
    }
  }
}

pub(super) fn bit_mask_to_gray_row(
  dest: &mut [u8],
  src: &[u8],
  mask_alpha: u8,
  src_gray: u8,
  src_left: usize,
  width: usize,
  clip: Option<&[u8]>,
) {
  for col in 0..width {
    if !bit_set(src, src_left + col) {
      continue;
    }
    let src_alpha = get_alpha(mask_alpha, clip, col);
    if src_alpha != 0 {
      dest[col] = merge(dest[col], src_gray as i32, src_alpha);
    }
  }
}
