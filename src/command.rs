//! Mapping from decoded IR scan codes to display commands.
//!
//! This is the producer side of the shared-state contract: the IR
//! receiver invokes [`handle_ir_event`] on its own thread whenever the
//! remote sends a frame, and every buffer mutation happens under the
//! display gate. All commands are bounded to at most one pass over the
//! buffer so a chatty remote cannot starve the render cadence.
//!
//! Repeat frames (button held down) are meaningful for the color nudges
//! — holding the button ramps the color — but one-shot and mode-switch
//! buttons only act on the initial press.

use std::sync::Mutex;

use crate::effect::{Direction, Effect, sine_fade};
use crate::render::DisplayContext;
use crate::Pixel;

/// Per-press channel delta for the color nudge buttons.
pub const COLOR_STEP: i16 = 2;
/// Ticks per throb cycle when selected from the remote.
pub const THROB_PERIOD: u32 = 16;
/// Offset divisor for remote-selected rotation (4 ticks per column).
pub const ROTATE_DIVISOR: i64 = 4;
/// Sweep length of the one-shot sine fade.
pub const FADE_STEPS: u32 = 4;

/// NEC scan codes for the 24-key remote, `addr << 16 | !cmd << 8 | cmd`.
pub mod codes {
    pub const FILL_WHITE: u32 = 0x00BA45;
    pub const FILL_BLACK: u32 = 0x00B946;
    pub const RED_UP: u32 = 0x00BB44;
    pub const RED_DOWN: u32 = 0x00F807;
    pub const GREEN_UP: u32 = 0x00BF40;
    pub const GREEN_DOWN: u32 = 0x00EA15;
    pub const BLUE_UP: u32 = 0x00BC43;
    pub const BLUE_DOWN: u32 = 0x00F609;
    pub const SINE_FADE: u32 = 0x00E916;
    pub const THROB: u32 = 0x00F30C;
    pub const ROTATE_CW: u32 = 0x00E619;
    pub const ROTATE_CCW: u32 = 0x00F20D;
}

/// A decoded remote action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    FillWhite,
    FillBlack,
    /// Additive per-channel color nudge.
    Nudge { dr: i16, dg: i16, db: i16 },
    StartRotate(Direction),
    StartThrob { period: u32 },
    /// One-shot sweep, applied immediately rather than registered.
    SineFade { steps: u32 },
}

impl Command {
    /// Look up the command for a scan code. Unknown codes are expected —
    /// the remote has more buttons than we assign — and map to `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            codes::FILL_WHITE => Some(Self::FillWhite),
            codes::FILL_BLACK => Some(Self::FillBlack),
            codes::RED_UP => Some(Self::Nudge {
                dr: COLOR_STEP,
                dg: 0,
                db: 0,
            }),
            codes::RED_DOWN => Some(Self::Nudge {
                dr: -COLOR_STEP,
                dg: 0,
                db: 0,
            }),
            codes::GREEN_UP => Some(Self::Nudge {
                dr: 0,
                dg: COLOR_STEP,
                db: 0,
            }),
            codes::GREEN_DOWN => Some(Self::Nudge {
                dr: 0,
                dg: -COLOR_STEP,
                db: 0,
            }),
            codes::BLUE_UP => Some(Self::Nudge {
                dr: 0,
                dg: 0,
                db: COLOR_STEP,
            }),
            codes::BLUE_DOWN => Some(Self::Nudge {
                dr: 0,
                dg: 0,
                db: -COLOR_STEP,
            }),
            codes::SINE_FADE => Some(Self::SineFade { steps: FADE_STEPS }),
            codes::THROB => Some(Self::StartThrob {
                period: THROB_PERIOD,
            }),
            codes::ROTATE_CW => Some(Self::StartRotate(Direction::Clockwise)),
            codes::ROTATE_CCW => Some(Self::StartRotate(Direction::CounterClockwise)),
            _ => None,
        }
    }

    /// Whether the command should also fire on repeat frames.
    pub fn applies_on_repeat(&self) -> bool {
        matches!(self, Self::Nudge { .. })
    }
}

/// Apply a command to the display context. The caller holds the gate.
pub fn apply(ctx: &mut DisplayContext, command: Command) {
    match command {
        Command::FillWhite => ctx.frame.fill(Pixel::WHITE),
        Command::FillBlack => ctx.frame.clear(),
        Command::Nudge { dr, dg, db } => ctx.frame.add_color(dr, dg, db),
        Command::StartRotate(direction) => {
            ctx.effect = Some(Effect::rotate(direction, ROTATE_DIVISOR));
        }
        Command::StartThrob { period } => {
            ctx.effect = Some(Effect::throb(period));
        }
        Command::SineFade { steps } => sine_fade(&mut ctx.frame, steps),
    }
}

/// Entry point for the IR receiver callback.
///
/// Runs on the receiver's interrupt thread; the lock is held only for
/// the (bounded) buffer mutation, never across hardware I/O.
pub fn handle_ir_event(gate: &Mutex<DisplayContext>, code: u32, is_repeat: bool) {
    let Some(command) = Command::from_code(code) else {
        tracing::trace!("Ignoring unmapped IR code {:#08x}", code);
        return;
    };

    if is_repeat && !command.applies_on_repeat() {
        return;
    }

    tracing::debug!("IR code {:#08x} -> {:?} (repeat: {})", code, command, is_repeat);
    apply(&mut gate.lock().unwrap(), command);
}
