//! Type 3 glyph render cache
//!
//! Type 3 glyphs are tiny procedural bitmaps that get re-rendered at
//! the same size over and over inside a page. [`Type3GlyphCache`]
//! memoizes the rendered form per (quantized size matrix, charcode)
//! pair, including failures, so each glyph is rendered at most once
//! per size.
//!
//! Rendering has two paths. When the size matrix is axis-aligned
//! (negligible shear) and the glyph bitmap has ink in its first and
//! last rows, the glyph is stretched directly and its vertical
//! extremes are snapped to shared "blue" lines so baselines and
//! x-heights of neighbouring glyphs land on the same device rows.
//! Everything else goes through the general affine transform.

use std::rc::{Rc, Weak};

use log::debug;
use rustc_hash::FxHashMap;

use crate::bitmap::Bitmap;
use crate::geometry::Matrix;

/// At most this many distinct snap lines are remembered per size.
const MAX_BLUE_LINES: usize = 16;

/// Vertical extremes closer than this many device pixels to a
/// remembered line are snapped onto it.
const BLUE_SNAP_DISTANCE: f32 = 0.8;

/// A glyph definition delivered by the font: the ink bitmap plus the
/// glyph-space matrix mapping it to text space.
pub struct Type3Char {
  pub bitmap: Rc<Bitmap>,
  pub matrix: Matrix,
}

/// The font side of the cache: resolves a character code to its glyph
/// definition.
pub trait Type3Font {
  /// Returns the glyph for `charcode`, or `None` when the font has no
  /// procedure or no ink for it.
  fn load_char(&self, charcode: u32) -> Option<Type3Char>;
}

/// A rendered glyph: the device-space bitmap and its placement offset
/// relative to the text position.
pub struct GlyphBitmap {
  pub left: i32,
  pub top: i32,
  pub bitmap: Bitmap,
}

/// Rendered glyphs and snap lines for one quantized size matrix.
#[derive(Default)]
struct GlyphSizeMap {
  /// `None` records a failed render so it is never retried.
  glyphs: FxHashMap<u32, Option<GlyphBitmap>>,
  top_blue: Vec<i32>,
  bottom_blue: Vec<i32>,
}

impl GlyphSizeMap {
  fn adjust_blue(&mut self, top: f32, bottom: f32) -> (i32, i32) {
    (
      adjust_blue(top, &mut self.top_blue),
      adjust_blue(bottom, &mut self.bottom_blue),
    )
  }
}

/// Snaps `pos` to the closest remembered line within
/// [`BLUE_SNAP_DISTANCE`], or rounds and remembers it as a new line.
fn adjust_blue(pos: f32, blues: &mut Vec<i32>) -> i32 {
  let mut min_distance = f32::MAX;
  let mut closest = None;
  for &line in blues.iter() {
    let distance = (pos - line as f32).abs();
    if distance < BLUE_SNAP_DISTANCE && distance < min_distance {
      min_distance = distance;
      closest = Some(line);
    }
  }
  if let Some(line) = closest {
    return line;
  }
  let new_line = pos.round() as i32;
  if blues.len() < MAX_BLUE_LINES {
    blues.push(new_line);
  }
  new_line
}

/// Size matrix quantized to 1/10000 so float noise between text runs
/// does not fragment the cache. Translation is deliberately excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SizeKey {
  a: i32,
  b: i32,
  c: i32,
  d: i32,
}

impl SizeKey {
  fn quantize(matrix: &Matrix) -> Self {
    Self {
      a: (matrix.a * 10000.0).round() as i32,
      b: (matrix.b * 10000.0).round() as i32,
      c: (matrix.c * 10000.0).round() as i32,
      d: (matrix.d * 10000.0).round() as i32,
    }
  }
}

/// Per-font render cache for Type 3 glyphs.
///
/// Holds the font weakly; once the font is dropped, lookups simply
/// stop producing new renders.
pub struct Type3GlyphCache {
  font: Weak<dyn Type3Font>,
  size_maps: FxHashMap<SizeKey, GlyphSizeMap>,
}

impl Type3GlyphCache {
  pub fn new(font: &Rc<dyn Type3Font>) -> Self {
    Self {
      font: Rc::downgrade(font),
      size_maps: FxHashMap::default(),
    }
  }

  /// The font this cache renders from, if it is still alive.
  pub fn font(&self) -> Option<Rc<dyn Type3Font>> {
    self.font.upgrade()
  }

  /// Returns the rendered glyph for `charcode` at the size described
  /// by `matrix`, rendering and caching it on first use. Returns
  /// `None` when the glyph has no ink or the render failed; that
  /// outcome is cached too.
  pub fn load_glyph(&mut self, charcode: u32, matrix: &Matrix) -> Option<&GlyphBitmap> {
    let key = SizeKey::quantize(matrix);
    let font = self.font.upgrade();
    let size_map = self.size_maps.entry(key).or_default();
    if !size_map.glyphs.contains_key(&charcode) {
      debug!("rendering type3 glyph {charcode:#x} at {matrix}");
      let rendered =
        font.and_then(|font| render_glyph(size_map, font.as_ref(), charcode, matrix));
      size_map.glyphs.insert(charcode, rendered);
    }
    size_map.glyphs.get(&charcode).and_then(|glyph| glyph.as_ref())
  }
}

fn render_glyph(
  size_map: &mut GlyphSizeMap,
  font: &dyn Type3Font,
  charcode: u32,
  matrix: &Matrix,
) -> Option<GlyphBitmap> {
  let glyph = font.load_char(charcode)?;
  // The caller transform's translation is placement, applied outside
  // the cache; only the glyph's own matrix contributes offsets here.
  // Cached entries would otherwise bake in whichever translation was
  // seen first for a size.
  let mut size_matrix = *matrix;
  size_matrix.e = 0.0;
  size_matrix.f = 0.0;
  let image_matrix = glyph.matrix.then(&size_matrix);
  if let Some(rendered) = try_stretch(size_map, &glyph.bitmap, &image_matrix) {
    return Some(rendered);
  }
  let mut transform = image_matrix;
  transform.e = 0.0;
  transform.f = 0.0;
  let (bitmap, left, top) = glyph.bitmap.transform_to(&transform)?;
  Some(GlyphBitmap {
    left,
    top: -top,
    bitmap,
  })
}

/// The axis-aligned fast path: stretch vertically between snapped blue
/// lines. Requires negligible shear and ink reaching both the first
/// and last row, so the bitmap edges are the glyph's true vertical
/// extremes.
fn try_stretch(
  size_map: &mut GlyphSizeMap,
  bitmap: &Bitmap,
  image_matrix: &Matrix,
) -> Option<GlyphBitmap> {
  if image_matrix.b.abs() >= image_matrix.a.abs() / 100.0
    || image_matrix.c.abs() >= image_matrix.d.abs() / 100.0
  {
    return None;
  }
  let (first, last) = detect_first_last_scan(bitmap)?;
  if first != 0 || last != bitmap.height() - 1 {
    return None;
  }
  let mut top_y = image_matrix.d + image_matrix.f;
  let mut bottom_y = image_matrix.f;
  let flipped = top_y > bottom_y;
  if flipped {
    std::mem::swap(&mut top_y, &mut bottom_y);
  }
  let (top_line, bottom_line) = size_map.adjust_blue(top_y, bottom_y);
  let height = if flipped {
    top_line.checked_sub(bottom_line)?
  } else {
    bottom_line.checked_sub(top_line)?
  };
  let stretched = bitmap.stretch_to(image_matrix.a as i32, height)?;
  let left = if image_matrix.a < 0.0 {
    (image_matrix.e + image_matrix.a).round() as i32
  } else {
    image_matrix.e.round() as i32
  };
  Some(GlyphBitmap {
    left,
    top: -top_line,
    bitmap: stretched,
  })
}

/// Finds the first and last scanline with ink, or `None` for a blank
/// bitmap. 1 bpp rows count any set bit; wider rows count any byte
/// above 0x40 so antialiasing fringe does not register as an extreme.
fn detect_first_last_scan(bitmap: &Bitmap) -> Option<(i32, i32)> {
  let first = (0..bitmap.height()).find(|&row| scanline_has_ink(bitmap, row))?;
  let last = (0..bitmap.height())
    .rev()
    .find(|&row| scanline_has_ink(bitmap, row))?;
  Some((first, last))
}

fn scanline_has_ink(bitmap: &Bitmap, row: i32) -> bool {
  let scanline = bitmap.scanline(row);
  let width = bitmap.width() as usize;
  let bpp = bitmap.format().bits_per_pixel() as usize;
  if bpp == 1 {
    let full_bytes = width / 8;
    if scanline[..full_bytes].iter().any(|&b| b != 0) {
      return true;
    }
    if width % 8 != 0 && scanline[full_bytes] >> (8 - width % 8) != 0 {
      return true;
    }
    return false;
  }
  scanline[..width * bpp / 8].iter().any(|&b| b > 0x40)
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;
  use crate::format::PixelFormat;

  struct CountingFont {
    loads: Cell<u32>,
    has_ink: bool,
  }

  impl CountingFont {
    fn new(has_ink: bool) -> Rc<Self> {
      Rc::new(Self {
        loads: Cell::new(0),
        has_ink,
      })
    }
  }

  impl Type3Font for CountingFont {
    fn load_char(&self, _charcode: u32) -> Option<Type3Char> {
      self.loads.set(self.loads.get() + 1);
      if !self.has_ink {
        return None;
      }
      let mut bitmap = Bitmap::new(4, 4, PixelFormat::EightBppMask).unwrap();
      for row in 0..4 {
        bitmap.scanline_mut(row)[..4].fill(0xff);
      }
      Some(Type3Char {
        bitmap: Rc::new(bitmap),
        matrix: Matrix::IDENTITY,
      })
    }
  }

  fn cache_for(font: &Rc<CountingFont>) -> Type3GlyphCache {
    let font: Rc<dyn Type3Font> = font.clone();
    Type3GlyphCache::new(&font)
  }

  #[test]
  fn glyph_renders_at_most_once_per_size() {
    let font = CountingFont::new(true);
    let strong: Rc<dyn Type3Font> = font.clone();
    let mut cache = Type3GlyphCache::new(&strong);
    let matrix = Matrix::scale(8.0, 8.0);
    assert!(cache.load_glyph(b'a' as u32, &matrix).is_some());
    assert!(cache.load_glyph(b'a' as u32, &matrix).is_some());
    assert_eq!(font.loads.get(), 1);
    // A different size renders again.
    assert!(cache.load_glyph(b'a' as u32, &Matrix::scale(12.0, 12.0)).is_some());
    assert_eq!(font.loads.get(), 2);
  }

  #[test]
  fn failed_render_is_cached() {
    let font = CountingFont::new(false);
    let strong: Rc<dyn Type3Font> = font.clone();
    let mut cache = Type3GlyphCache::new(&strong);
    let matrix = Matrix::scale(8.0, 8.0);
    assert!(cache.load_glyph(b'a' as u32, &matrix).is_none());
    assert!(cache.load_glyph(b'a' as u32, &matrix).is_none());
    assert_eq!(font.loads.get(), 1);
  }

  #[test]
  fn dropped_font_stops_rendering() {
    let font = CountingFont::new(true);
    let mut cache = cache_for(&font);
    let weak_only = Rc::strong_count(&font);
    assert_eq!(weak_only, 1);
    // `cache_for` dropped its strong handle; drop ours too.
    drop(font);
    assert!(cache.load_glyph(b'a' as u32, &Matrix::scale(8.0, 8.0)).is_none());
  }

  #[test]
  fn size_key_quantizes_float_noise() {
    let font = CountingFont::new(true);
    let strong: Rc<dyn Type3Font> = font.clone();
    let mut cache = Type3GlyphCache::new(&strong);
    cache.load_glyph(b'a' as u32, &Matrix::scale(8.0, 8.0));
    cache.load_glyph(b'a' as u32, &Matrix::scale(8.00001, 8.00001));
    assert_eq!(font.loads.get(), 1);
  }

  #[test]
  fn fast_path_places_glyph_on_blue_lines() {
    let font = CountingFont::new(true);
    let strong: Rc<dyn Type3Font> = font.clone();
    let mut cache = Type3GlyphCache::new(&strong);
    // Axis-aligned 8x4 placement with baseline at y=0. The caller
    // translation (2, 0) positions the glyph, not the cached bitmap.
    let matrix = Matrix::new(8.0, 0.0, 0.0, 4.0, 2.0, 0.0);
    let glyph = cache.load_glyph(b'a' as u32, &matrix).unwrap();
    assert_eq!(glyph.left, 0);
    assert_eq!(glyph.top, 0);
    assert_eq!(glyph.bitmap.width(), 8);
    assert_eq!(glyph.bitmap.height(), 4);
  }

  #[test]
  fn caller_translation_does_not_affect_placement() {
    let font = CountingFont::new(true);
    let strong: Rc<dyn Type3Font> = font.clone();
    let mut cache = Type3GlyphCache::new(&strong);
    let at_origin = Matrix::new(8.0, 0.0, 0.0, 4.0, 0.0, 0.0);
    let (left, top) = {
      let glyph = cache.load_glyph(b'a' as u32, &at_origin).unwrap();
      (glyph.left, glyph.top)
    };
    // Same size, translated: shares the cache entry and its placement.
    let moved = Matrix::new(8.0, 0.0, 0.0, 4.0, 50.0, 7.0);
    let glyph = cache.load_glyph(b'a' as u32, &moved).unwrap();
    assert_eq!((glyph.left, glyph.top), (left, top));
    assert_eq!(font.loads.get(), 1);
  }

  #[test]
  fn translated_render_order_does_not_leak_into_cache() {
    let font = CountingFont::new(true);
    let strong: Rc<dyn Type3Font> = font.clone();
    let mut cache = Type3GlyphCache::new(&strong);
    // First render through the translated transform.
    let moved = Matrix::new(8.0, 0.0, 0.0, 4.0, 50.0, 7.0);
    let (left, top) = {
      let glyph = cache.load_glyph(b'a' as u32, &moved).unwrap();
      (glyph.left, glyph.top)
    };
    assert_eq!((left, top), (0, 0));
    let at_origin = Matrix::new(8.0, 0.0, 0.0, 4.0, 0.0, 0.0);
    let glyph = cache.load_glyph(b'a' as u32, &at_origin).unwrap();
    assert_eq!((glyph.left, glyph.top), (0, 0));
  }

  #[test]
  fn adjust_blue_snaps_nearby_lines() {
    let mut blues = Vec::new();
    assert_eq!(adjust_blue(10.3, &mut blues), 10);
    // Within 0.8 of the remembered line: snapped, not re-rounded.
    assert_eq!(adjust_blue(10.7, &mut blues), 10);
    assert_eq!(blues, vec![10]);
    // Beyond the snap distance: a new line.
    assert_eq!(adjust_blue(12.0, &mut blues), 12);
    assert_eq!(blues, vec![10, 12]);
  }

  #[test]
  fn adjust_blue_caps_remembered_lines() {
    let mut blues = Vec::new();
    for i in 0..16 {
      adjust_blue(i as f32 * 10.0, &mut blues);
    }
    assert_eq!(blues.len(), 16);
    // The 17th line still resolves but is not remembered.
    assert_eq!(adjust_blue(500.0, &mut blues), 500);
    assert_eq!(blues.len(), 16);
  }

  #[test]
  fn scan_detection_ignores_faint_bytes() {
    let mut bitmap = Bitmap::new(4, 3, PixelFormat::EightBppMask).unwrap();
    bitmap.scanline_mut(0)[0] = 0x40;
    bitmap.scanline_mut(1)[2] = 0x41;
    assert_eq!(detect_first_last_scan(&bitmap), Some((1, 1)));
  }

  #[test]
  fn scan_detection_handles_partial_one_bpp_bytes() {
    let mut bitmap = Bitmap::new(10, 2, PixelFormat::OneBppMask).unwrap();
    // Only bits past the 10-pixel width are set: blank.
    bitmap.scanline_mut(0)[1] = 0b0010_0000;
    assert_eq!(detect_first_last_scan(&bitmap), None);
    // Pixel 9 is inside the width.
    bitmap.scanline_mut(1)[1] = 0b0100_0000;
    assert_eq!(detect_first_last_scan(&bitmap), Some((1, 1)));
  }
}
