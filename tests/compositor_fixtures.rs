//! Golden scanline fixtures for BGRA-over-BGRA compositing.
//!
//! Every expectation byte below was produced by the exact integer
//! formulas the compositor implements; any arithmetic drift (rounding
//! mode, operation order, alpha handling) shows up as a byte diff.

use fastcomposite::{BlendMode, PixelFormat, ScanlineCompositor};

const WIDTH: usize = 8;

// Pixels are B,G,R,A. The destination covers the interesting alpha
// cases: transparent, opaque and two partial coverages.
const DEST_SCAN: [u8; WIDTH * 4] = [
  255, 100, 0, 0, //
  255, 100, 0, 0, //
  255, 100, 0, 255, //
  255, 100, 0, 255, //
  255, 100, 0, 100, //
  255, 100, 0, 100, //
  255, 100, 0, 200, //
  255, 100, 0, 200,
];

const SRC_SCAN_1: [u8; WIDTH * 4] = [
  255, 100, 0, 0, //
  255, 100, 0, 255, //
  255, 100, 0, 0, //
  255, 100, 0, 255, //
  255, 100, 0, 100, //
  255, 100, 0, 200, //
  255, 100, 0, 100, //
  255, 100, 0, 200,
];

const SRC_SCAN_2: [u8; WIDTH * 4] = [
  100, 0, 255, 0, //
  100, 0, 255, 255, //
  100, 0, 255, 0, //
  100, 0, 255, 255, //
  100, 0, 255, 100, //
  100, 0, 255, 200, //
  100, 0, 255, 100, //
  100, 0, 255, 200,
];

const SRC_SCAN_3: [u8; WIDTH * 4] = [
  0, 255, 100, 0, //
  0, 255, 100, 255, //
  0, 255, 100, 0, //
  0, 255, 100, 255, //
  0, 255, 100, 100, //
  0, 255, 100, 200, //
  0, 255, 100, 100, //
  0, 255, 100, 200,
];

fn run(mode: BlendMode, src: &[u8; WIDTH * 4], expected: &[u8; WIDTH * 4]) {
  let compositor = ScanlineCompositor::new(
    PixelFormat::Bgra,
    PixelFormat::Bgra,
    None,
    0,
    mode,
    false,
  )
  .unwrap();
  let mut dest = DEST_SCAN;
  compositor.composite_rgb_line(&mut dest, src, WIDTH, None);
  assert_eq!(&dest, expected, "{mode:?}");
}

#[test]
fn bgra_over_bgra_normal() {
  run(
    BlendMode::Normal,
    &SRC_SCAN_1,
    &[
      255, 100, 0, 0, //
      255, 100, 0, 255, //
      255, 100, 0, 255, //
      255, 100, 0, 255, //
      255, 100, 0, 161, //
      255, 100, 0, 222, //
      255, 100, 0, 222, //
      255, 100, 0, 244,
    ],
  );
  run(
    BlendMode::Normal,
    &SRC_SCAN_2,
    &[
      100, 0, 255, 0, //
      100, 0, 255, 255, //
      255, 100, 0, 255, //
      100, 0, 255, 255, //
      158, 38, 158, 161, //
      115, 10, 229, 222, //
      185, 55, 114, 222, //
      127, 18, 209, 244,
    ],
  );
  run(
    BlendMode::Normal,
    &SRC_SCAN_3,
    &[
      0, 255, 100, 0, //
      0, 255, 100, 255, //
      255, 100, 0, 255, //
      0, 255, 100, 255, //
      97, 196, 61, 161, //
      26, 239, 89, 222, //
      141, 169, 44, 222, //
      46, 227, 81, 244,
    ],
  );
}

#[test]
fn bgra_over_bgra_darken() {
  run(
    BlendMode::Darken,
    &SRC_SCAN_1,
    &[
      255, 100, 0, 0, //
      255, 100, 0, 255, //
      255, 100, 0, 255, //
      255, 100, 0, 255, //
      255, 100, 0, 161, //
      255, 100, 0, 222, //
      255, 100, 0, 222, //
      255, 100, 0, 244,
    ],
  );
  run(
    BlendMode::Darken,
    &SRC_SCAN_2,
    &[
      100, 0, 255, 0, //
      100, 0, 255, 255, //
      255, 100, 0, 255, //
      100, 0, 0, 255, //
      158, 38, 96, 161, //
      115, 10, 139, 222, //
      185, 55, 24, 222, //
      127, 18, 45, 244,
    ],
  );
  run(
    BlendMode::Darken,
    &SRC_SCAN_3,
    &[
      0, 255, 100, 0, //
      0, 255, 100, 255, //
      255, 100, 0, 255, //
      0, 100, 0, 255, //
      97, 158, 37, 161, //
      26, 184, 53, 222, //
      141, 114, 9, 222, //
      46, 127, 17, 244,
    ],
  );
}

#[test]
fn bgra_over_bgra_hue() {
  run(
    BlendMode::Hue,
    &SRC_SCAN_1,
    &[
      255, 100, 0, 0, //
      255, 100, 0, 255, //
      255, 100, 0, 255, //
      255, 100, 0, 255, //
      255, 100, 0, 161, //
      255, 100, 0, 222, //
      255, 100, 0, 222, //
      255, 100, 0, 244,
    ],
  );
  run(
    BlendMode::Hue,
    &SRC_SCAN_2,
    &[
      100, 0, 255, 0, //
      100, 0, 255, 255, //
      255, 100, 0, 255, //
      100, 0, 255, 255, //
      158, 38, 158, 161, //
      115, 10, 229, 222, //
      185, 55, 114, 222, //
      127, 18, 209, 244,
    ],
  );
  run(
    BlendMode::Hue,
    &SRC_SCAN_3,
    &[
      0, 255, 100, 0, //
      0, 255, 100, 255, //
      255, 100, 0, 255, //
      0, 123, 49, 255, //
      97, 163, 49, 161, //
      26, 192, 71, 222, //
      141, 122, 26, 222, //
      46, 141, 49, 244,
    ],
  );
}
