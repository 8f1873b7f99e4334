//! Pixel-exact scanline compositing and Type 3 glyph caching.
//!
//! The crate has three layers:
//!
//! - [`compositor`]: [`ScanlineCompositor`] blends one source scanline
//!   into a destination scanline for every supported format pair,
//!   blend mode and clip, with bit-exact integer arithmetic.
//! - [`glyph`]: [`Type3GlyphCache`] renders and memoizes Type 3 font
//!   glyphs per quantized size, snapping vertical extremes to shared
//!   lines so neighbouring glyphs align.
//! - [`document`]: [`DocumentRenderCache`] ties both to document
//!   object lifetimes, together with sampled [`transfer`] functions.

pub mod bitmap;
pub mod blend;
pub mod compositor;
pub mod document;
pub mod error;
pub mod format;
pub mod geometry;
pub mod glyph;
pub mod transfer;

pub use bitmap::Bitmap;
pub use compositor::ScanlineCompositor;
pub use document::DocumentRenderCache;
pub use error::{BitmapError, CompositeError, Error, Result};
pub use format::{
  argb_encode, calculate_pitch_and_size, BlendMode, PitchAndSize, PixelFormat,
};
pub use geometry::Matrix;
pub use glyph::{GlyphBitmap, Type3Char, Type3Font, Type3GlyphCache};
pub use transfer::{TransferDef, TransferFunction, TranslatedBitmap};
