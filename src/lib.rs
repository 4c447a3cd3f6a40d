//! Shared types for the IR-controlled LED matrix driver.
//!
//! This module provides the pieces the binary and the tests both need:
//! - Matrix dimensions and strip configuration
//! - The packed `Pixel` type and its clamped channel arithmetic
//! - Signal handling for clean shutdown
//!
//! It also re-exports the frame, effect, command, and render modules used
//! by the main binary.

pub mod command;
pub mod effect;
pub mod frame;
#[cfg(feature = "hardware")]
pub mod hardware;
pub mod render;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Matrix configuration ───────────────────────────────────────────

/// WS281x signal frequency in Hz. 800 kHz suits WS2811/WS2812 strips.
pub const TARGET_FREQ: u32 = 800_000;

/// Configuration for the matrix dimensions.
///
/// `Clone, Copy` make this cheaply copyable (it's just two usizes).
/// Dimensions are fixed for the lifetime of the process once parsed —
/// every frame buffer is sized from this one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixConfig {
    pub width: usize,
    pub height: usize,
}

impl MatrixConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of LEDs on the matrix.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 1,
        }
    }
}

// ── Pixel ──────────────────────────────────────────────────────────

/// A packed RGB pixel, `0x00RRGGBB`, decoupled from the hardware crate.
///
/// This is the same word layout the WS281x driver consumes, which keeps
/// the hardware staging copy a plain per-cell assignment. Channel access
/// is pure bit twiddling; all channel arithmetic clamps to [0, 255].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pixel(u32);

impl Pixel {
    pub const BLACK: Pixel = Pixel(0);
    /// The soft white the remote's fill button produces: (32, 32, 32).
    pub const WHITE: Pixel = Pixel(0x0020_2020);

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Pixel((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Add a signed delta to each channel independently, clamped to [0, 255].
    pub fn add(self, dr: i16, dg: i16, db: i16) -> Self {
        fn channel(value: u8, delta: i16) -> u8 {
            (i32::from(value) + i32::from(delta)).clamp(0, 255) as u8
        }
        Self::from_rgb(
            channel(self.red(), dr),
            channel(self.green(), dg),
            channel(self.blue(), db),
        )
    }

    /// Scale each channel by `factor`, clamped to [0, 255].
    ///
    /// Factors above 1.0 are allowed (the throb effect swings up to 2.0);
    /// the clamp keeps channels from bleeding into each other the way
    /// scaling the packed word would.
    pub fn scale(self, factor: f64) -> Self {
        fn channel(value: u8, factor: f64) -> u8 {
            (f64::from(value) * factor).clamp(0.0, 255.0) as u8
        }
        Self::from_rgb(
            channel(self.red(), factor),
            channel(self.green(), factor),
            channel(self.blue(), factor),
        )
    }
}

// ── Strip configuration ────────────────────────────────────────────

/// Color ordering variants the WS281x driver understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StripType {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
    /// SK6812 four-channel variants.
    Rgbw,
    Grbw,
}

impl StripType {
    /// Parse a strip type from its CLI spelling, case-insensitively.
    ///
    /// The error string doubles as the clap diagnostic, so it names the
    /// accepted values.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "rbg" => Ok(Self::Rbg),
            "grb" => Ok(Self::Grb),
            "gbr" => Ok(Self::Gbr),
            "brg" => Ok(Self::Brg),
            "bgr" => Ok(Self::Bgr),
            "rgbw" => Ok(Self::Rgbw),
            "grbw" => Ok(Self::Grbw),
            other => Err(format!(
                "invalid strip type '{other}' (expected rgb, rbg, grb, gbr, brg, bgr, rgbw, or grbw)"
            )),
        }
    }
}

/// Everything the hardware sink needs to bring up the strip.
#[derive(Clone, Copy, Debug)]
pub struct StripOptions {
    pub matrix: MatrixConfig,
    pub gpio_pin: u8,
    pub dma_channel: u8,
    pub strip: StripType,
    pub invert: bool,
    pub brightness: u8,
    pub frequency: u32,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            matrix: MatrixConfig::default(),
            gpio_pin: 18,
            dma_channel: 10,
            strip: StripType::Gbr,
            invert: false,
            brightness: 255,
            frequency: TARGET_FREQ,
        }
    }
}

// ── Shutdown handling ──────────────────────────────────────────────

/// Set up a SIGINT/SIGTERM handler that sets `running` to false.
///
/// The flag is shared between the render loop and the signal handler:
/// `Arc` gives both an owner, `AtomicBool` makes the store/load safe
/// without a mutex. The render loop samples it once per tick, so a
/// shutdown request can be delayed by up to one tick period.
pub fn setup_signal_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting signal handler");

    running
}

/// Check if the render loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    // ── MatrixConfig tests ─────────────────────────────────────────

    #[test]
    fn matrix_config_default_is_16x1() {
        let matrix = MatrixConfig::default();
        assert_eq!(matrix.width, 16);
        assert_eq!(matrix.height, 1);
    }

    #[rstest]
    #[case(16, 1, 16)]
    #[case(8, 8, 64)]
    #[case(32, 16, 512)]
    fn test_pixel_count(#[case] width: usize, #[case] height: usize, #[case] expected: usize) {
        assert_eq!(MatrixConfig::new(width, height).pixel_count(), expected);
    }

    // ── Pixel tests ────────────────────────────────────────────────

    #[test]
    fn pixel_pack_and_extract() {
        let p = Pixel::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(p.red(), 0x12);
        assert_eq!(p.green(), 0x34);
        assert_eq!(p.blue(), 0x56);
    }

    #[test]
    fn white_is_32_32_32() {
        assert_eq!(Pixel::WHITE, Pixel::from_rgb(32, 32, 32));
    }

    #[rstest]
    #[case(Pixel::from_rgb(10, 20, 30), (2, 0, 0), Pixel::from_rgb(12, 20, 30))]
    #[case(Pixel::from_rgb(10, 20, 30), (-2, -2, -2), Pixel::from_rgb(8, 18, 28))]
    #[case(Pixel::from_rgb(254, 0, 0), (2, 0, 0), Pixel::from_rgb(255, 0, 0))]
    #[case(Pixel::from_rgb(1, 1, 1), (-2, -2, -2), Pixel::BLACK)]
    fn test_add_clamps(
        #[case] start: Pixel,
        #[case] delta: (i16, i16, i16),
        #[case] expected: Pixel,
    ) {
        assert_eq!(start.add(delta.0, delta.1, delta.2), expected);
    }

    #[test]
    fn add_300_increments_saturates_without_wraparound() {
        let mut p = Pixel::BLACK;
        for _ in 0..300 {
            p = p.add(1, 0, 0);
        }
        assert_eq!(p, Pixel::from_rgb(255, 0, 0));
    }

    #[test]
    fn scale_doubling_clamps_per_channel() {
        let p = Pixel::from_rgb(200, 10, 0).scale(2.0);
        assert_eq!(p, Pixel::from_rgb(255, 20, 0));
    }

    #[test]
    fn scale_zero_is_black() {
        assert_eq!(Pixel::from_rgb(255, 128, 3).scale(0.0), Pixel::BLACK);
    }

    // ── StripType tests ────────────────────────────────────────────

    #[rstest]
    #[case("rgb", StripType::Rgb)]
    #[case("rbg", StripType::Rbg)]
    #[case("grb", StripType::Grb)]
    #[case("gbr", StripType::Gbr)]
    #[case("brg", StripType::Brg)]
    #[case("bgr", StripType::Bgr)]
    #[case("rgbw", StripType::Rgbw)]
    #[case("GRBW", StripType::Grbw)]
    fn test_strip_type_parse(#[case] input: &str, #[case] expected: StripType) {
        assert_eq!(StripType::parse(input), Ok(expected));
    }

    #[test]
    fn strip_type_rejects_unknown() {
        assert!(StripType::parse("wrgb").is_err());
        assert!(StripType::parse("").is_err());
    }
}
