//! Device-independent bitmap
//!
//! An owned pixel buffer with an explicit [`PixelFormat`], a 32-bit
//! aligned row pitch, and optional palette. This is the unit the
//! compositor reads scanlines from and the glyph cache produces.
//!
//! The two geometric operations here exist for glyph rendering:
//! [`Bitmap::stretch_to`] covers the axis-aligned fast path (with
//! negative dimensions meaning a flip) and [`Bitmap::transform_to`] the
//! general affine fallback. Both resample nearest-neighbor.

use crate::error::Result;
use crate::format::{calculate_pitch_and_size, PixelFormat};
use crate::geometry::Matrix;

/// An owned pixel buffer.
#[derive(Debug, Clone)]
pub struct Bitmap {
  width: i32,
  height: i32,
  format: PixelFormat,
  pitch: usize,
  data: Vec<u8>,
  palette: Option<Vec<u32>>,
}

impl Bitmap {
  /// Allocates a zero-filled bitmap with the default aligned pitch.
  ///
  /// # Examples
  ///
  /// ```
  /// use fastcomposite::{Bitmap, PixelFormat};
  ///
  /// let bmp = Bitmap::new(100, 200, PixelFormat::Bgra).unwrap();
  /// assert_eq!(bmp.pitch(), 400);
  /// ```
  pub fn new(width: i32, height: i32, format: PixelFormat) -> Result<Self> {
    let layout = calculate_pitch_and_size(width, height, format, 0)?;
    Ok(Self {
      width,
      height,
      format,
      pitch: layout.pitch as usize,
      data: vec![0; layout.size as usize],
      palette: None,
    })
  }

  pub fn width(&self) -> i32 {
    self.width
  }

  pub fn height(&self) -> i32 {
    self.height
  }

  pub fn format(&self) -> PixelFormat {
    self.format
  }

  /// Row stride in bytes.
  pub fn pitch(&self) -> usize {
    self.pitch
  }

  /// ARGB palette for paletted formats, if one has been attached.
  pub fn palette(&self) -> Option<&[u32]> {
    self.palette.as_deref()
  }

  pub fn set_palette(&mut self, palette: Vec<u32>) {
    self.palette = Some(palette);
  }

  /// One full row, pitch bytes long.
  pub fn scanline(&self, row: i32) -> &[u8] {
    let start = row as usize * self.pitch;
    &self.data[start..start + self.pitch]
  }

  pub fn scanline_mut(&mut self, row: i32) -> &mut [u8] {
    let start = row as usize * self.pitch;
    &mut self.data[start..start + self.pitch]
  }

  /// Nearest-neighbor stretch to `dest_width` x `dest_height`.
  ///
  /// Negative dimensions mirror the respective axis. Returns `None`
  /// when a dimension is zero or the result cannot be allocated.
  pub fn stretch_to(&self, dest_width: i32, dest_height: i32) -> Option<Bitmap> {
    if dest_width == 0 || dest_height == 0 {
      return None;
    }
    let out_w = dest_width.unsigned_abs() as i32;
    let out_h = dest_height.unsigned_abs() as i32;
    let mut out = Bitmap::new(out_w, out_h, self.format).ok()?;
    out.palette = self.palette.clone();
    for y in 0..out_h {
      let mut src_y = (y as i64 * self.height as i64 / out_h as i64) as i32;
      if dest_height < 0 {
        src_y = self.height - 1 - src_y;
      }
      let src_row = self.scanline(src_y);
      let dest_row = &mut out.data[y as usize * out.pitch..(y + 1) as usize * out.pitch];
      for x in 0..out_w {
        let mut src_x = (x as i64 * self.width as i64 / out_w as i64) as i32;
        if dest_width < 0 {
          src_x = self.width - 1 - src_x;
        }
        copy_pixel(self.format, src_row, src_x, dest_row, x);
      }
    }
    Some(out)
  }

  /// General affine resample.
  ///
  /// Maps the bitmap rectangle through `matrix`, allocates the bounding
  /// box and inverse-samples every destination pixel. Pixels mapping
  /// outside the source stay zero. 1 bpp sources are widened to their
  /// 8 bpp counterpart so partial transforms stay representable.
  ///
  /// Returns the result plus the bounding box origin `(left, top)` in
  /// the transformed space, or `None` for a singular matrix or empty
  /// output.
  pub fn transform_to(&self, matrix: &Matrix) -> Option<(Bitmap, i32, i32)> {
    let inverse = matrix.invert()?;
    let corners = [
      matrix.transform_point(0.0, 0.0),
      matrix.transform_point(self.width as f32, 0.0),
      matrix.transform_point(0.0, self.height as f32),
      matrix.transform_point(self.width as f32, self.height as f32),
    ];
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for (x, y) in corners {
      min_x = min_x.min(x);
      min_y = min_y.min(y);
      max_x = max_x.max(x);
      max_y = max_y.max(y);
    }
    let left = min_x.floor() as i32;
    let top = min_y.floor() as i32;
    let out_w = (max_x.ceil() as i32) - left;
    let out_h = (max_y.ceil() as i32) - top;
    if out_w <= 0 || out_h <= 0 {
      return None;
    }
    let out_format = match self.format {
      PixelFormat::OneBppMask => PixelFormat::EightBppMask,
      PixelFormat::OneBppRgb => PixelFormat::EightBppRgb,
      other => other,
    };
    let mut out = Bitmap::new(out_w, out_h, out_format).ok()?;
    out.palette = self.palette.clone();
    for y in 0..out_h {
      let dest_row_start = y as usize * out.pitch;
      for x in 0..out_w {
        let (sx, sy) =
          inverse.transform_point((left + x) as f32 + 0.5, (top + y) as f32 + 0.5);
        let src_x = sx.floor() as i32;
        let src_y = sy.floor() as i32;
        if src_x < 0 || src_x >= self.width || src_y < 0 || src_y >= self.height {
          continue;
        }
        let src_row = self.scanline(src_y);
        let dest_row = &mut out.data[dest_row_start..dest_row_start + out.pitch];
        match self.format {
          PixelFormat::OneBppMask | PixelFormat::OneBppRgb => {
            let bit = src_row[src_x as usize / 8] & (1 << (7 - src_x as usize % 8));
            dest_row[x as usize] = if bit != 0 { 255 } else { 0 };
          }
          _ => copy_pixel(self.format, src_row, src_x, dest_row, x),
        }
      }
    }
    Some((out, left, top))
  }
}

fn copy_pixel(format: PixelFormat, src_row: &[u8], src_x: i32, dest_row: &mut [u8], dest_x: i32) {
  match format.bits_per_pixel() {
    1 => {
      let bit = src_row[src_x as usize / 8] & (1 << (7 - src_x as usize % 8));
      let byte = &mut dest_row[dest_x as usize / 8];
      let mask = 1 << (7 - dest_x as usize % 8);
      if bit != 0 {
        *byte |= mask;
      } else {
        *byte &= !mask;
      }
    }
    8 => dest_row[dest_x as usize] = src_row[src_x as usize],
    bpp => {
      let n = bpp as usize / 8;
      let s = src_x as usize * n;
      let d = dest_x as usize * n;
      dest_row[d..d + n].copy_from_slice(&src_row[s..s + n]);
    }
  }
}
