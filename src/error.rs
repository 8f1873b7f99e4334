//! Error types for fastcomposite
//!
//! This module provides error types for the compositing subsystems:
//! - Bitmap errors (layout, allocation)
//! - Composite errors (unsupported format combinations)
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations.
//!
//! Recoverable absences (a glyph that fails to render, a transfer
//! function whose definition fails to load) are expressed as `None` by
//! the caches rather than as errors; this module covers requests that
//! are invalid outright.

use thiserror::Error;

use crate::format::PixelFormat;

/// Result type alias for fastcomposite operations
///
/// This is a convenience type that uses our Error type as the error variant.
///
/// # Examples
///
/// ```
/// use fastcomposite::Result;
///
/// fn prepare() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for fastcomposite
///
/// Each variant wraps a more specific error type for that subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Bitmap layout or allocation error
  #[error("Bitmap error: {0}")]
  Bitmap(#[from] BitmapError),

  /// Compositor configuration error
  #[error("Composite error: {0}")]
  Composite(#[from] CompositeError),
}

/// Errors that occur while laying out or allocating a bitmap
///
/// # Examples
///
/// ```
/// use fastcomposite::error::BitmapError;
///
/// let error = BitmapError::InvalidDimensions { width: 0, height: 32 };
/// println!("{}", error);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitmapError {
  /// Width or height is zero or negative
  #[error("Invalid bitmap dimensions: {width}x{height}")]
  InvalidDimensions { width: i32, height: i32 },

  /// The pixel format has no byte layout (`Invalid`)
  #[error("Invalid pixel format for bitmap layout")]
  InvalidFormat,

  /// Pitch or total size does not fit the addressable range
  #[error("Bitmap size overflow for {width}x{height}")]
  SizeOverflow { width: i32, height: i32 },
}

/// Errors that occur while configuring a scanline compositor
///
/// These indicate a source/destination combination the compositor has no
/// path for; compositing itself never fails once configured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
  /// The destination format cannot be composited into (1 bpp
  /// destinations, `Invalid`, and premultiplied buffers)
  #[error("Unsupported destination format: {format:?}")]
  UnsupportedDestination { format: PixelFormat },

  /// The source format has no compositing path
  #[error("Unsupported source format: {format:?}")]
  UnsupportedSource { format: PixelFormat },

  /// Byte-swapped output was requested for a destination without a
  /// swapped layout (8 bpp gray and mask buffers)
  #[error("Byte-order swap unavailable for destination: {format:?}")]
  UnsupportedByteOrder { format: PixelFormat },
}
