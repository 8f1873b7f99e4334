//! Scanline compositor
//!
//! [`ScanlineCompositor`] validates a destination/source format pair
//! once, resolves everything that is per-configuration rather than
//! per-pixel (destination layout, mask color, palette) and then
//! composites one scanline per call. The per-pixel loops live in
//! [`rows`]; this module owns configuration and dispatch.
//!
//! Destinations fall into four layouts: 8-bit gray, 8-bit coverage
//! mask, opaque BGR/BGRX (3 or 4 bytes, optionally RGB-ordered) and
//! BGRA with straight alpha. Sub-byte destinations are rejected at
//! construction, as are premultiplied buffers on either side.

mod rows;

use crate::error::CompositeError;
use crate::format::{
  argb_a, argb_b, argb_g, argb_r, rgb_to_gray, BlendMode, PixelFormat,
};

/// Constant color and alpha a mask source is composited with.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MaskColor {
  pub(crate) alpha: u8,
  pub(crate) red: u8,
  pub(crate) green: u8,
  pub(crate) blue: u8,
}

/// Source palette translated for the destination at construction.
#[derive(Debug, Clone)]
enum Palette {
  None,
  /// Per-index gray values, for gray destinations.
  Gray(Vec<u8>),
  /// Per-index ARGB colors, for color destinations.
  Argb(Vec<u32>),
}

impl Palette {
  fn gray(&self) -> &[u8] {
    match self {
      Palette::Gray(values) => values,
      _ => unreachable!("gray palette required"),
    }
  }

  fn argb(&self) -> &[u32] {
    match self {
      Palette::Argb(values) => values,
      _ => unreachable!("color palette required"),
    }
  }
}

/// Destination layout, resolved once from the destination format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DestLayout {
  Gray,
  Mask,
  Rgb { bpp: usize, swap: bool },
  Rgba { swap: bool },
}

/// A configured compositor for one destination/source format pair.
///
/// Construct once per drawing operation, then call the line method
/// matching the source class for each scanline. The optional `clip` in
/// every line method is a per-pixel coverage row, `width` bytes of
/// 0..=255.
///
/// # Examples
///
/// ```
/// use fastcomposite::{BlendMode, PixelFormat, ScanlineCompositor};
///
/// let compositor = ScanlineCompositor::new(
///   PixelFormat::Bgra,
///   PixelFormat::Bgra,
///   None,
///   0,
///   BlendMode::Normal,
///   false,
/// )
/// .unwrap();
/// let mut dest = [0u8; 4];
/// let src = [10u8, 20, 30, 255];
/// compositor.composite_rgb_line(&mut dest, &src, 1, None);
/// assert_eq!(dest, src);
/// ```
#[derive(Debug, Clone)]
pub struct ScanlineCompositor {
  dest: DestLayout,
  src_format: PixelFormat,
  blend_mode: BlendMode,
  mask: MaskColor,
  palette: Palette,
}

impl ScanlineCompositor {
  /// Validates the format pair and resolves the per-configuration
  /// state.
  ///
  /// `src_palette` applies to paletted sources; when absent a default
  /// palette is used (black/white for 1 bpp, the identity ramp for
  /// 8 bpp). `mask_color` is the ARGB color mask sources are drawn
  /// with. `rgb_byte_order` stores color destinations as R,G,B instead
  /// of B,G,R; it is not supported for 8-bit destinations.
  pub fn new(
    dest_format: PixelFormat,
    src_format: PixelFormat,
    src_palette: Option<&[u32]>,
    mask_color: u32,
    blend_mode: BlendMode,
    rgb_byte_order: bool,
  ) -> Result<Self, CompositeError> {
    let dest = match dest_format {
      PixelFormat::EightBppRgb => DestLayout::Gray,
      PixelFormat::EightBppMask => DestLayout::Mask,
      PixelFormat::Bgr => DestLayout::Rgb {
        bpp: 3,
        swap: rgb_byte_order,
      },
      PixelFormat::Bgrx => DestLayout::Rgb {
        bpp: 4,
        swap: rgb_byte_order,
      },
      PixelFormat::Bgra => DestLayout::Rgba {
        swap: rgb_byte_order,
      },
      _ => {
        return Err(CompositeError::UnsupportedDestination {
          format: dest_format,
        })
      }
    };
    if rgb_byte_order && matches!(dest, DestLayout::Gray | DestLayout::Mask) {
      return Err(CompositeError::UnsupportedByteOrder {
        format: dest_format,
      });
    }
    if src_format == PixelFormat::Invalid || src_format.is_premultiplied() {
      return Err(CompositeError::UnsupportedSource { format: src_format });
    }
    let mut compositor = Self {
      dest,
      src_format,
      blend_mode,
      mask: MaskColor::default(),
      palette: Palette::None,
    };
    if src_format.is_mask() {
      compositor.init_source_mask(mask_color);
    } else if src_format.is_paletted() {
      compositor.init_source_palette(src_palette);
    }
    Ok(compositor)
  }

  /// Splits the mask color; for gray destinations the red slot holds
  /// the gray-converted color instead.
  fn init_source_mask(&mut self, mask_color: u32) {
    self.mask = MaskColor {
      alpha: argb_a(mask_color),
      red: argb_r(mask_color),
      green: argb_g(mask_color),
      blue: argb_b(mask_color),
    };
    if self.dest == DestLayout::Gray {
      self.mask.red = rgb_to_gray(self.mask.red, self.mask.green, self.mask.blue);
    }
  }

  /// Builds the palette the line loops index. Mask destinations ignore
  /// source color entirely, so no palette is kept for them.
  fn init_source_palette(&mut self, src_palette: Option<&[u32]>) {
    if self.dest == DestLayout::Mask {
      return;
    }
    let entries = if self.src_format.bits_per_pixel() == 1 {
      2
    } else {
      256
    };
    self.palette = if self.dest == DestLayout::Gray {
      let values = match src_palette {
        Some(palette) => palette[..entries]
          .iter()
          .map(|&argb| rgb_to_gray(argb_r(argb), argb_g(argb), argb_b(argb)))
          .collect(),
        None if entries == 2 => vec![0, 255],
        None => (0..=255).collect(),
      };
      Palette::Gray(values)
    } else {
      let values = match src_palette {
        Some(palette) => palette[..entries].to_vec(),
        None if entries == 2 => vec![0xff000000, 0xffffffff],
        None => (0..=255u32).map(|v| v << 16 | v << 8 | v).collect(),
      };
      Palette::Argb(values)
    };
  }

  /// Composites one row of an opaque BGR/BGRX or straight-alpha BGRA
  /// source.
  pub fn composite_rgb_line(
    &self,
    dest: &mut [u8],
    src: &[u8],
    width: usize,
    clip: Option<&[u8]>,
  ) {
    debug_assert!(self.src_format.bytes_per_pixel() >= 3);
    if self.src_format.has_alpha() {
      self.composite_bgra_line(dest, src, width, clip);
      return;
    }
    let src_bpp = self.src_format.bytes_per_pixel() as usize;
    match self.dest {
      DestLayout::Gray => {
        rows::rgb_to_gray_row(dest, src, src_bpp, width, self.blend_mode, clip)
      }
      DestLayout::Mask => rows::rgb_to_mask_row(dest, width, clip),
      DestLayout::Rgb { bpp, swap } => match (self.blend_mode, clip) {
        (BlendMode::Normal, None) => {
          rows::rgb_to_rgb_noblend_noclip(dest, src, width, bpp, src_bpp, swap)
        }
        (BlendMode::Normal, Some(clip)) => {
          rows::rgb_to_rgb_noblend_clip(dest, src, width, bpp, src_bpp, swap, clip)
        }
        (mode, None) => {
          rows::rgb_to_rgb_blend_noclip(dest, src, width, mode, bpp, src_bpp, swap)
        }
        (mode, Some(clip)) => {
          rows::rgb_to_rgb_blend_clip(dest, src, width, mode, bpp, src_bpp, swap, clip)
        }
      },
      DestLayout::Rgba { swap } => match (self.blend_mode, clip) {
        (BlendMode::Normal, None) => {
          rows::rgb_to_rgba_noblend_noclip(dest, src, width, src_bpp, swap)
        }
        (BlendMode::Normal, Some(clip)) => {
          rows::rgb_to_rgba_noblend_clip(dest, src, width, src_bpp, swap, clip)
        }
        (mode, None) => rows::rgb_to_rgba_blend_noclip(dest, src, width, mode, src_bpp, swap),
        (mode, Some(clip)) => {
          rows::rgb_to_rgba_blend_clip(dest, src, width, mode, src_bpp, swap, clip)
        }
      },
    }
  }

  fn composite_bgra_line(&self, dest: &mut [u8], src: &[u8], width: usize, clip: Option<&[u8]>) {
    match self.dest {
      DestLayout::Gray => rows::bgra_to_gray_row(dest, src, width, self.blend_mode, clip),
      DestLayout::Mask => rows::bgra_to_mask_row(dest, src, width, clip),
      DestLayout::Rgb { bpp, swap } => {
        rows::bgra_to_rgb_row(dest, src, width, self.blend_mode, bpp, swap, clip)
      }
      DestLayout::Rgba { swap } => {
        rows::bgra_to_rgba_row(dest, src, width, self.blend_mode, swap, clip)
      }
    }
  }

  /// Composites one row of a paletted 1 or 8 bpp source. `src_left` is
  /// the bit offset of the first pixel within `src` for 1 bpp sources.
  pub fn composite_pal_line(
    &self,
    dest: &mut [u8],
    src: &[u8],
    src_left: usize,
    width: usize,
    clip: Option<&[u8]>,
  ) {
    debug_assert!(self.src_format.is_paletted());
    let one_bpp = self.src_format.bits_per_pixel() == 1;
    match self.dest {
      DestLayout::Gray => {
        if one_bpp {
          rows::pal1_to_gray_row(
            dest,
            src,
            src_left,
            self.palette.gray(),
            width,
            self.blend_mode,
            clip,
          );
        } else {
          rows::pal8_to_gray_row(dest, src, self.palette.gray(), width, self.blend_mode, clip);
        }
      }
      DestLayout::Mask => rows::rgb_to_mask_row(dest, width, clip),
      DestLayout::Rgb { bpp, swap } => {
        if one_bpp {
          rows::pal1_to_rgb_row(dest, src, src_left, self.palette.argb(), width, bpp, swap, clip);
        } else {
          rows::pal8_to_rgb_row(dest, src, self.palette.argb(), width, bpp, swap, clip);
        }
      }
      DestLayout::Rgba { swap } => {
        if one_bpp {
          rows::pal1_to_rgba_row(dest, src, src_left, self.palette.argb(), width, swap, clip);
        } else {
          rows::pal8_to_rgba_row(dest, src, self.palette.argb(), width, swap, clip);
        }
      }
    }
  }

  /// Composites one row of an 8 bpp coverage mask, drawn with the
  /// configured mask color.
  pub fn composite_byte_mask_line(
    &self,
    dest: &mut [u8],
    src: &[u8],
    width: usize,
    clip: Option<&[u8]>,
  ) {
    debug_assert_eq!(self.src_format, PixelFormat::EightBppMask);
    match self.dest {
      DestLayout::Gray => {
        rows::byte_mask_to_gray_row(dest, src, self.mask.alpha, self.mask.red, width, clip)
      }
      DestLayout::Mask => rows::byte_mask_to_mask_row(dest, src, self.mask.alpha, width, clip),
      DestLayout::Rgb { bpp, swap } => {
        rows::byte_mask_to_rgb_row(dest, src, &self.mask, width, self.blend_mode, bpp, swap, clip)
      }
      DestLayout::Rgba { swap } => {
        rows::byte_mask_to_rgba_row(dest, src, &self.mask, width, self.blend_mode, swap, clip)
      }
    }
  }

  /// Composites one row of a 1 bpp coverage mask, drawn with the
  /// configured mask color. `src_left` is the bit offset of the first
  /// pixel within `src`.
  pub fn composite_bit_mask_line(
    &self,
    dest: &mut [u8],
    src: &[u8],
    src_left: usize,
    width: usize,
    clip: Option<&[u8]>,
  ) {
    debug_assert_eq!(self.src_format, PixelFormat::OneBppMask);
    match self.dest {
      DestLayout::Gray => rows::bit_mask_to_gray_row(
        dest,
        src,
        self.mask.alpha,
        self.mask.red,
        src_left,
        width,
        clip,
      ),
      DestLayout::Mask => {
        rows::bit_mask_to_mask_row(dest, src, self.mask.alpha, src_left, width, clip)
      }
      DestLayout::Rgb { bpp, swap } => rows::bit_mask_to_rgb_row(
        dest,
        src,
        &self.mask,
        src_left,
        width,
        self.blend_mode,
        bpp,
        swap,
        clip,
      ),
      DestLayout::Rgba { swap } => rows::bit_mask_to_rgba_row(
        dest,
        src,
        &self.mask,
        src_left,
        width,
        self.blend_mode,
        swap,
        clip,
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::format::argb_encode;

  fn compositor(
    dest: PixelFormat,
    src: PixelFormat,
    mode: BlendMode,
  ) -> ScanlineCompositor {
    ScanlineCompositor::new(dest, src, None, 0, mode, false).unwrap()
  }

  #[test]
  fn rejects_sub_byte_destinations() {
    for dest in [
      PixelFormat::Invalid,
      PixelFormat::OneBppMask,
      PixelFormat::OneBppRgb,
    ] {
      let result = ScanlineCompositor::new(
        dest,
        PixelFormat::Bgra,
        None,
        0,
        BlendMode::Normal,
        false,
      );
      assert_eq!(
        result.unwrap_err(),
        CompositeError::UnsupportedDestination { format: dest }
      );
    }
  }

  #[test]
  fn rejects_premultiplied_buffers() {
    assert_eq!(
      ScanlineCompositor::new(
        PixelFormat::BgraPremul,
        PixelFormat::Bgra,
        None,
        0,
        BlendMode::Normal,
        false,
      )
      .unwrap_err(),
      CompositeError::UnsupportedDestination {
        format: PixelFormat::BgraPremul
      }
    );
    assert_eq!(
      ScanlineCompositor::new(
        PixelFormat::Bgra,
        PixelFormat::BgraPremul,
        None,
        0,
        BlendMode::Normal,
        false,
      )
      .unwrap_err(),
      CompositeError::UnsupportedSource {
        format: PixelFormat::BgraPremul
      }
    );
  }

  #[test]
  fn rejects_byte_order_on_eight_bpp_destinations() {
    for dest in [PixelFormat::EightBppMask, PixelFormat::EightBppRgb] {
      let result = ScanlineCompositor::new(
        dest,
        PixelFormat::Bgra,
        None,
        0,
        BlendMode::Normal,
        true,
      );
      assert_eq!(
        result.unwrap_err(),
        CompositeError::UnsupportedByteOrder { format: dest }
      );
    }
  }

  #[test]
  fn bgra_over_bgra_normal_row() {
    let compositor = compositor(PixelFormat::Bgra, PixelFormat::Bgra, BlendMode::Normal);
    // Transparent, opaque, and partial-coverage destinations.
    let mut dest = [
      255, 100, 0, 0, //
      255, 100, 0, 255, //
      255, 100, 0, 100,
    ];
    let src = [
      100, 0, 255, 255, //
      100, 0, 255, 0, //
      100, 0, 255, 100,
    ];
    compositor.composite_rgb_line(&mut dest, &src, 3, None);
    assert_eq!(&dest[..4], &[100, 0, 255, 255]);
    assert_eq!(&dest[4..8], &[255, 100, 0, 255]);
    // dest_alpha = union(100, 100) = 161, ratio = 100*255/161 = 158.
    assert_eq!(&dest[8..], &[158, 38, 158, 161]);
  }

  #[test]
  fn opaque_source_sets_full_alpha() {
    let compositor = compositor(PixelFormat::Bgra, PixelFormat::Bgr, BlendMode::Normal);
    let mut dest = [0u8; 8];
    let src = [1u8, 2, 3, 4, 5, 6];
    compositor.composite_rgb_line(&mut dest, &src, 2, None);
    assert_eq!(dest, [1, 2, 3, 255, 4, 5, 6, 255]);
  }

  #[test]
  fn bgrx_pad_byte_is_left_alone() {
    let compositor = compositor(PixelFormat::Bgrx, PixelFormat::Bgr, BlendMode::Normal);
    let mut dest = [9u8; 8];
    let src = [1u8, 2, 3, 4, 5, 6];
    compositor.composite_rgb_line(&mut dest, &src, 2, None);
    assert_eq!(dest, [1, 2, 3, 9, 4, 5, 6, 9]);
  }

  #[test]
  fn byte_order_swaps_color_channels() {
    let compositor = ScanlineCompositor::new(
      PixelFormat::Bgra,
      PixelFormat::Bgr,
      None,
      0,
      BlendMode::Normal,
      true,
    )
    .unwrap();
    let mut dest = [0u8; 4];
    compositor.composite_rgb_line(&mut dest, &[10, 20, 30], 1, None);
    assert_eq!(dest, [30, 20, 10, 255]);
  }

  #[test]
  fn gray_destination_uses_ntsc_weights() {
    let compositor = compositor(PixelFormat::EightBppRgb, PixelFormat::Bgr, BlendMode::Normal);
    let mut dest = [0u8; 1];
    // Pure red in BGR order.
    compositor.composite_rgb_line(&mut dest, &[0, 0, 255], 1, None);
    assert_eq!(dest[0], 76);
  }

  #[test]
  fn mask_destination_accumulates_coverage() {
    let compositor = compositor(PixelFormat::EightBppMask, PixelFormat::Bgra, BlendMode::Normal);
    let mut dest = [0u8, 100];
    let src = [0u8, 0, 0, 200, 0, 0, 0, 200];
    compositor.composite_rgb_line(&mut dest, &src, 2, None);
    assert_eq!(dest[0], 200);
    // union(100, 200) = 222.
    assert_eq!(dest[1], 222);
  }

  #[test]
  fn default_one_bpp_palette_is_black_and_white() {
    let compositor = compositor(PixelFormat::Bgr, PixelFormat::OneBppRgb, BlendMode::Normal);
    let mut dest = [7u8; 6];
    compositor.composite_pal_line(&mut dest, &[0b1000_0000], 0, 2, None);
    assert_eq!(dest, [255, 255, 255, 0, 0, 0]);
  }

  #[test]
  fn default_eight_bpp_palette_is_identity_ramp() {
    let compositor = compositor(PixelFormat::Bgr, PixelFormat::EightBppRgb, BlendMode::Normal);
    let mut dest = [0u8; 6];
    compositor.composite_pal_line(&mut dest, &[17, 200], 0, 2, None);
    assert_eq!(dest, [17, 17, 17, 200, 200, 200]);
  }

  #[test]
  fn supplied_palette_is_gray_folded_for_gray_destinations() {
    let palette: Vec<u32> = (0..256)
      .map(|i| if i == 3 { argb_encode(255, 255, 0, 0) } else { 0 })
      .collect();
    let compositor = ScanlineCompositor::new(
      PixelFormat::EightBppRgb,
      PixelFormat::EightBppRgb,
      Some(&palette),
      0,
      BlendMode::Normal,
      false,
    )
    .unwrap();
    let mut dest = [0u8; 1];
    compositor.composite_pal_line(&mut dest, &[3], 0, 1, None);
    assert_eq!(dest[0], 76);
  }

  #[test]
  fn byte_mask_draws_mask_color() {
    let compositor = ScanlineCompositor::new(
      PixelFormat::Bgr,
      PixelFormat::EightBppMask,
      None,
      argb_encode(255, 250, 130, 20),
      BlendMode::Normal,
      false,
    )
    .unwrap();
    let mut dest = [0u8; 6];
    compositor.composite_byte_mask_line(&mut dest, &[255, 0], 2, None);
    assert_eq!(dest, [20, 130, 250, 0, 0, 0]);
  }

  #[test]
  fn byte_mask_coverage_scales_color() {
    let compositor = ScanlineCompositor::new(
      PixelFormat::Bgr,
      PixelFormat::EightBppMask,
      None,
      argb_encode(255, 0, 0, 255),
      BlendMode::Normal,
      false,
    )
    .unwrap();
    let mut dest = [0u8; 3];
    compositor.composite_byte_mask_line(&mut dest, &[128], 1, None);
    // merge(0, 255, 128) = 128 on the blue channel only.
    assert_eq!(dest, [128, 0, 0]);
  }

  #[test]
  fn mask_color_gray_folds_for_gray_destination() {
    let compositor = ScanlineCompositor::new(
      PixelFormat::EightBppRgb,
      PixelFormat::EightBppMask,
      None,
      argb_encode(255, 255, 0, 0),
      BlendMode::Normal,
      false,
    )
    .unwrap();
    let mut dest = [0u8; 1];
    compositor.composite_byte_mask_line(&mut dest, &[255], 1, None);
    assert_eq!(dest[0], 76);
  }

  #[test]
  fn bit_mask_skips_clear_bits() {
    let compositor = ScanlineCompositor::new(
      PixelFormat::Bgra,
      PixelFormat::OneBppMask,
      None,
      argb_encode(255, 1, 2, 3),
      BlendMode::Normal,
      false,
    )
    .unwrap();
    let mut dest = [0u8; 12];
    compositor.composite_bit_mask_line(&mut dest, &[0b1010_0000], 0, 3, None);
    assert_eq!(dest, [3, 2, 1, 255, 0, 0, 0, 0, 3, 2, 1, 255]);
  }

  #[test]
  fn bit_mask_src_left_offsets_reads() {
    let compositor = ScanlineCompositor::new(
      PixelFormat::Bgra,
      PixelFormat::OneBppMask,
      None,
      argb_encode(255, 1, 2, 3),
      BlendMode::Normal,
      false,
    )
    .unwrap();
    let mut dest = [0u8; 8];
    compositor.composite_bit_mask_line(&mut dest, &[0b0100_0000], 1, 2, None);
    assert_eq!(&dest[..4], &[3, 2, 1, 255]);
    assert_eq!(&dest[4..], &[0, 0, 0, 0]);
  }

  #[test]
  fn clip_row_attenuates_coverage() {
    let compositor = compositor(PixelFormat::Bgr, PixelFormat::Bgr, BlendMode::Normal);
    let mut dest = [0u8; 6];
    let src = [200u8, 200, 200, 200, 200, 200];
    let clip = [255u8, 0];
    compositor.composite_rgb_line(&mut dest, &src, 2, Some(&clip));
    assert_eq!(dest, [200, 200, 200, 0, 0, 0]);
  }

  #[test]
  fn darken_blend_on_opaque_destination() {
    let compositor = compositor(PixelFormat::Bgr, PixelFormat::Bgr, BlendMode::Darken);
    let mut dest = [100u8, 100, 100];
    compositor.composite_rgb_line(&mut dest, &[50, 150, 100], 1, None);
    assert_eq!(dest, [50, 100, 100]);
  }
}
