//! Per-frame transform effects.
//!
//! An effect is a small state machine the render loop advances once per
//! tick: it reads the live frame buffer, writes the transformed result
//! into the scheduler's scratch buffer, and steps its own phase. The
//! variants are a plain enum — "no active effect" is `Option::None` on
//! the display context, not a null sentinel.
//!
//! The one-shot sine fade is different in kind: it is applied directly
//! to the live buffer when its button is pressed and never runs again,
//! so it lives here as a free function rather than an `Effect` variant.

use std::f64::consts::TAU;

use crate::frame::FrameBuffer;

/// Rotation direction for the rotate effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Per-tick column offset step.
    pub fn step(self) -> i64 {
        match self {
            Self::Clockwise => 1,
            Self::CounterClockwise => -1,
        }
    }
}

/// The active per-tick transform, with its phase state inline.
///
/// Selecting an effect constructs a fresh variant, so phase state always
/// starts from its initial value — there is no teardown to forget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Shift columns by `offset / divisor` (wrapping), advancing `offset`
    /// by the direction step each tick. Larger divisors rotate slower.
    Rotate {
        offset: i64,
        direction: Direction,
        divisor: i64,
    },
    /// Scale every channel by `sin(2π·phase/period) + 1` ∈ [0, 2],
    /// advancing `phase` each tick. Periodic, never terminates.
    Throb { phase: u32, period: u32 },
}

impl Effect {
    pub fn rotate(direction: Direction, divisor: i64) -> Self {
        Self::Rotate {
            offset: 0,
            direction,
            divisor: divisor.max(1),
        }
    }

    pub fn throb(period: u32) -> Self {
        Self::Throb {
            phase: 0,
            period: period.max(1),
        }
    }

    /// Run one tick of the effect: read `input`, write `output`, step
    /// the phase. The caller guarantees the two buffers are distinct
    /// and identically sized, so a transform never reads its own
    /// half-written output.
    pub fn advance(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) {
        match self {
            Self::Rotate {
                offset,
                direction,
                divisor,
            } => {
                let width = input.width() as i64;
                for x in 0..input.width() {
                    let src = modulo(x as i64 + *offset / *divisor, width) as usize;
                    for y in 0..input.height() {
                        output.set(x, y, input.get(src, y));
                    }
                }
                *offset += direction.step();
            }
            Self::Throb { phase, period } => {
                let mult = (f64::from(*phase) * TAU / f64::from(*period)).sin() + 1.0;
                for y in 0..input.height() {
                    for x in 0..input.width() {
                        output.set(x, y, input.get(x, y).scale(mult));
                    }
                }
                // Wrapping at the period keeps the multiplier sequence
                // exactly periodic instead of drifting through f64 land.
                *phase = (*phase + 1) % *period;
            }
        }
    }
}

/// One-shot brightness sweep: cell `i` (scan order) is scaled by
/// `(sin(2π·i/steps) + 1) / 2` ∈ [0, 1]. Applied in place, once.
pub fn sine_fade(frame: &mut FrameBuffer, steps: u32) {
    let steps = f64::from(steps.max(1));
    let mut i = 0u32;
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let val = ((f64::from(i) * TAU / steps).sin() + 1.0) / 2.0;
            frame.set(x, y, frame.get(x, y).scale(val));
            i += 1;
        }
    }
}

/// Euclidean remainder: always in [0, n), even for negative x.
fn modulo(x: i64, n: i64) -> i64 {
    (x % n + n) % n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatrixConfig, Pixel};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ramp_4x1() -> FrameBuffer {
        let mut buf = FrameBuffer::new(MatrixConfig::new(4, 1));
        for x in 0..4 {
            buf.set(x, 0, Pixel::from_rgb(x as u8 * 10, 0, 0));
        }
        buf
    }

    #[rstest]
    #[case(-1, 4, 3)]
    #[case(-5, 4, 3)]
    #[case(0, 4, 0)]
    #[case(7, 4, 3)]
    #[case(8, 4, 0)]
    fn test_modulo_normalizes(#[case] x: i64, #[case] n: i64, #[case] expected: i64) {
        assert_eq!(modulo(x, n), expected);
    }

    #[test]
    fn rotate_output_sequence_has_period_width() {
        let input = ramp_4x1();
        let mut effect = Effect::rotate(Direction::Clockwise, 1);
        let mut scratch = FrameBuffer::new(MatrixConfig::new(4, 1));
        let outputs: Vec<FrameBuffer> = (0..8)
            .map(|_| {
                effect.advance(&input, &mut scratch);
                scratch.clone()
            })
            .collect();
        // Width ticks later the column arrangement repeats exactly.
        for k in 0..4 {
            assert_eq!(outputs[k], outputs[k + 4]);
        }
        assert_eq!(outputs[0], input);
    }

    #[test]
    fn rotate_clockwise_shifts_columns_left() {
        let input = ramp_4x1();
        let mut effect = Effect::rotate(Direction::Clockwise, 1);
        let mut scratch = FrameBuffer::new(MatrixConfig::new(4, 1));
        // First tick has offset 0: identity.
        effect.advance(&input, &mut scratch);
        assert_eq!(scratch, input);
        // Second tick reads column x+1.
        effect.advance(&input, &mut scratch);
        for x in 0..4 {
            assert_eq!(scratch.get(x, 0), input.get((x + 1) % 4, 0));
        }
    }

    #[test]
    fn rotate_counter_clockwise_wraps_negative_offsets() {
        let input = ramp_4x1();
        let mut effect = Effect::rotate(Direction::CounterClockwise, 1);
        let mut scratch = FrameBuffer::new(MatrixConfig::new(4, 1));
        effect.advance(&input, &mut scratch); // offset 0
        effect.advance(&input, &mut scratch); // offset -1
        for x in 0..4 {
            assert_eq!(scratch.get(x, 0), input.get((x + 3) % 4, 0));
        }
    }

    #[test]
    fn throb_multiplier_sequence_repeats_after_period() {
        let mut input = FrameBuffer::new(MatrixConfig::new(1, 1));
        input.set(0, 0, Pixel::from_rgb(100, 100, 100));
        let mut scratch = FrameBuffer::new(MatrixConfig::new(1, 1));

        let mut effect = Effect::throb(8);
        let first_cycle: Vec<Pixel> = (0..8)
            .map(|_| {
                effect.advance(&input, &mut scratch);
                scratch.get(0, 0)
            })
            .collect();
        let second_cycle: Vec<Pixel> = (0..8)
            .map(|_| {
                effect.advance(&input, &mut scratch);
                scratch.get(0, 0)
            })
            .collect();
        assert_eq!(first_cycle, second_cycle);
    }

    #[test]
    fn throb_peak_doubles_and_clamps() {
        let mut input = FrameBuffer::new(MatrixConfig::new(1, 1));
        input.set(0, 0, Pixel::from_rgb(100, 200, 0));
        let mut scratch = FrameBuffer::new(MatrixConfig::new(1, 1));

        // Phase period/4 puts sin at its maximum: multiplier 2.0.
        let mut effect = Effect::Throb { phase: 4, period: 16 };
        effect.advance(&input, &mut scratch);
        assert_eq!(scratch.get(0, 0), Pixel::from_rgb(200, 255, 0));
    }

    #[test]
    fn fresh_selection_resets_phase() {
        let input = ramp_4x1();
        let mut scratch = FrameBuffer::new(MatrixConfig::new(4, 1));

        let mut first = Effect::rotate(Direction::Clockwise, 1);
        for _ in 0..3 {
            first.advance(&input, &mut scratch);
        }
        // Re-selecting constructs a fresh effect, independent of how far
        // the previous run got.
        let second = Effect::rotate(Direction::Clockwise, 1);
        assert_eq!(second, Effect::rotate(Direction::Clockwise, 1));
        assert_ne!(first, second);
    }

    #[test]
    fn sine_fade_4_steps_on_white_row() {
        let mut buf = FrameBuffer::new(MatrixConfig::new(4, 1));
        buf.fill(Pixel::WHITE);
        sine_fade(&mut buf, 4);
        // sin at 0, π/2, π, 3π/2 → scales 0.5, 1.0, 0.5, 0.0.
        assert_eq!(buf.get(0, 0), Pixel::from_rgb(16, 16, 16));
        assert_eq!(buf.get(1, 0), Pixel::from_rgb(32, 32, 32));
        assert_eq!(buf.get(2, 0), Pixel::from_rgb(16, 16, 16));
        assert_eq!(buf.get(3, 0), Pixel::BLACK);
    }
}
