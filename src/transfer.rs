//! Transfer functions
//!
//! A transfer function remaps device color channels through 0..=255
//! lookup tables sampled once from one or three color functions. The
//! sampled form is immutable and shared; [`TransferFunction::translate_color`]
//! remaps a single color and [`TransferFunction::translate_image`]
//! wraps a bitmap in a view that remaps scanlines as they are read.

use std::rc::Rc;

use log::debug;

use crate::bitmap::Bitmap;
use crate::format::{argb_a, argb_b, argb_encode, argb_g, argb_r, rgb_b, rgb_encode, rgb_g, rgb_r, PixelFormat};

/// Functions producing more outputs than this are not sampled.
pub const MAX_FUNCTION_OUTPUTS: usize = 16;

/// A sampled color function, evaluated on `[0, 1]` inputs.
pub trait ColorFunction {
  fn count_outputs(&self) -> usize;

  /// Evaluates the function. `outputs` holds at least
  /// [`MAX_FUNCTION_OUTPUTS`] slots and keeps its previous contents
  /// wherever the function writes nothing.
  fn call(&self, inputs: &[f32], outputs: &mut [f32]);
}

/// A lazily-loadable function definition, as found in a document.
pub trait FunctionDef {
  /// Parses the definition into a callable function, or `None` when
  /// the definition is malformed.
  fn load(&self) -> Option<Box<dyn ColorFunction>>;
}

/// A transfer entry: either one function for all three channels or an
/// array of three per-channel functions.
pub enum TransferDef {
  Single(Rc<dyn FunctionDef>),
  Array([Rc<dyn FunctionDef>; 3]),
}

/// A transfer function sampled into per-channel byte tables.
///
/// The table is channel-major: red occupies samples 0..256, green
/// 256..512, blue 512..768.
pub struct TransferFunction {
  identity: bool,
  samples: Box<[u8; 768]>,
}

impl TransferFunction {
  /// Samples `def` into lookup tables. Returns `None` when any
  /// referenced function fails to load.
  pub fn build(def: &TransferDef) -> Option<TransferFunction> {
    // Array entries map to channels in reverse: the first entry drives
    // blue, the last red.
    let funcs: Vec<Box<dyn ColorFunction>> = match def {
      TransferDef::Single(single) => vec![single.load()?],
      TransferDef::Array(defs) => {
        let mut loaded: Vec<Option<Box<dyn ColorFunction>>> =
          defs.iter().map(|_| None).collect();
        for (i, def) in defs.iter().enumerate() {
          loaded[2 - i] = Some(def.load()?);
        }
        loaded.into_iter().collect::<Option<Vec<_>>>()?
      }
    };
    let mut output = [0f32; MAX_FUNCTION_OUTPUTS];
    let mut samples = Box::new([0u8; 768]);
    let mut identity = true;
    for v in 0..256usize {
      let input = v as f32 / 255.0;
      if funcs.len() == 3 {
        for (channel, func) in funcs.iter().enumerate() {
          if func.count_outputs() > MAX_FUNCTION_OUTPUTS {
            samples[channel * 256 + v] = v as u8;
            continue;
          }
          func.call(&[input], &mut output);
          let o = (output[0] * 255.0).round() as i32;
          if o != v as i32 {
            identity = false;
          }
          samples[channel * 256 + v] = o.clamp(0, 255) as u8;
        }
      } else {
        // A function with too many outputs is never called; the sample
        // then reads whatever the previous evaluation left in slot 0.
        if funcs[0].count_outputs() <= MAX_FUNCTION_OUTPUTS {
          funcs[0].call(&[input], &mut output);
        }
        let o = (output[0] * 255.0).round() as i32;
        if o != v as i32 {
          identity = false;
        }
        for channel in 0..3 {
          samples[channel * 256 + v] = o.clamp(0, 255) as u8;
        }
      }
    }
    debug!("sampled transfer function, identity={identity}");
    Some(TransferFunction {
      identity,
      samples,
    })
  }

  /// True when every table maps each value to itself; callers can skip
  /// translation entirely.
  pub fn identity(&self) -> bool {
    self.identity
  }

  fn red(&self, v: u8) -> u8 {
    self.samples[v as usize]
  }

  fn green(&self, v: u8) -> u8 {
    self.samples[256 + v as usize]
  }

  fn blue(&self, v: u8) -> u8 {
    self.samples[512 + v as usize]
  }

  /// Remaps a COLORREF-packed color through the tables.
  pub fn translate_color(&self, colorref: u32) -> u32 {
    rgb_encode(
      self.red(rgb_r(colorref)) as u32,
      self.green(rgb_g(colorref)) as u32,
      self.blue(rgb_b(colorref)) as u32,
    )
  }

  /// Wraps `source` in a view that remaps scanlines on read. Palettes
  /// of paletted sources are remapped here, once; mask formats pass
  /// through untouched.
  pub fn translate_image(self: &Rc<Self>, source: Bitmap) -> TranslatedBitmap {
    let palette = if source.format().is_paletted() {
      let defaults: Vec<u32>;
      let entries = match source.palette() {
        Some(palette) => palette,
        None if source.format().bits_per_pixel() == 1 => {
          defaults = vec![0xff000000, 0xffffffff];
          &defaults[..]
        }
        None => {
          defaults = (0..=255).map(|v| argb_encode(255, v, v, v)).collect();
          &defaults[..]
        }
      };
      Some(
        entries
          .iter()
          .map(|&argb| {
            argb_encode(
              argb_a(argb) as u32,
              self.red(argb_r(argb)) as u32,
              self.green(argb_g(argb)) as u32,
              self.blue(argb_b(argb)) as u32,
            )
          })
          .collect(),
      )
    } else {
      None
    };
    let row = vec![0; source.pitch()];
    TranslatedBitmap {
      source,
      transfer: self.clone(),
      palette,
      row,
    }
  }
}

/// A bitmap view remapping color through a [`TransferFunction`].
///
/// Scanlines are translated into an internal row buffer as they are
/// requested; the source bitmap is never modified.
pub struct TranslatedBitmap {
  source: Bitmap,
  transfer: Rc<TransferFunction>,
  palette: Option<Vec<u32>>,
  row: Vec<u8>,
}

impl TranslatedBitmap {
  pub fn width(&self) -> i32 {
    self.source.width()
  }

  pub fn height(&self) -> i32 {
    self.source.height()
  }

  pub fn format(&self) -> PixelFormat {
    self.source.format()
  }

  /// The remapped palette, for paletted sources.
  pub fn palette(&self) -> Option<&[u32]> {
    self.palette.as_deref()
  }

  /// One translated row. The returned slice is valid until the next
  /// call.
  pub fn scanline(&mut self, row: i32) -> &[u8] {
    self.row.copy_from_slice(self.source.scanline(row));
    match self.source.format() {
      PixelFormat::Bgr | PixelFormat::Bgrx | PixelFormat::Bgra => {
        let bpp = self.source.format().bytes_per_pixel() as usize;
        for col in 0..self.source.width() as usize {
          let p = col * bpp;
          self.row[p] = self.transfer.blue(self.row[p]);
          self.row[p + 1] = self.transfer.green(self.row[p + 1]);
          self.row[p + 2] = self.transfer.red(self.row[p + 2]);
        }
      }
      // Masks carry coverage, paletted rows carry indexes; both are
      // already handled (or untouched) elsewhere.
      _ => {}
    }
    &self.row
  }
}
