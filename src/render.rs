//! Render scheduler: the fixed-rate loop that owns the hardware sink.
//!
//! Two threads touch the display state: the IR receiver's callback
//! thread (producer, see `command`) and this loop (consumer). Both go
//! through one `Mutex<DisplayContext>` — the gate. Each tick the loop
//! locks the gate, runs the active effect from the live frame buffer
//! into its private scratch buffer (or plain-copies when no effect is
//! active), releases the gate, and only then submits the scratch buffer
//! to the hardware. Holding the lock across hardware I/O would let a
//! slow render starve the remote.
//!
//! ## Rust concepts
//! - `Mutex` guards release on every exit path, so there is no missed
//!   wait/post pair to deadlock on
//! - Destructuring through `&mut *guard` splits one borrow into
//!   disjoint field borrows (frame read, effect phase write)
//! - `&mut dyn FrameSink` keeps the loop testable without hardware

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use crate::effect::Effect;
use crate::frame::FrameBuffer;
use crate::{MatrixConfig, is_running};

/// Target cadence: 15 frames per second.
pub const TICK: Duration = Duration::from_micros(1_000_000 / 15);

// ── Display context ──────────────────────────────────────────────────

/// Everything the gate protects: the live frame buffer and the active
/// effect (with its phase state). There is no hidden global — whoever
/// holds the lock holds all of it.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayContext {
    pub frame: FrameBuffer,
    /// `None` renders the frame buffer pass-through.
    pub effect: Option<Effect>,
}

impl DisplayContext {
    pub fn new(matrix: MatrixConfig) -> Self {
        Self {
            frame: FrameBuffer::new(matrix),
            effect: None,
        }
    }
}

// ── Sink boundary ────────────────────────────────────────────────────

/// A frame submission failure. Fatal: the loop reports it and stops,
/// and `status` becomes the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    pub status: i32,
    pub message: String,
}

impl SinkError {
    pub fn new(status: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SinkError {}

/// Where finished frames go. The hardware implementation lives in
/// `hardware::Ws281xSink`; tests substitute an in-memory sink.
pub trait FrameSink {
    fn submit(&mut self, frame: &FrameBuffer) -> Result<(), SinkError>;
}

// ── Scheduler ────────────────────────────────────────────────────────

/// Knobs for the render loop. `tick` is configurable so tests can run
/// the loop flat out; production uses [`TICK`].
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub tick: Duration,
    pub clear_on_exit: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tick: TICK,
            clear_on_exit: true,
        }
    }
}

/// Run the render loop until `running` goes false or the sink fails.
///
/// The shutdown flag is sampled once per tick, at the top of the loop,
/// so a termination signal takes effect within one tick period. Missed
/// ticks are not back-filled — drift is tolerated. On a clean stop with
/// `clear_on_exit` set, one final all-black frame is submitted so the
/// matrix doesn't stay lit after the process exits.
pub fn render_loop(
    gate: &Mutex<DisplayContext>,
    running: &AtomicBool,
    sink: &mut dyn FrameSink,
    options: RenderOptions,
) -> Result<(), SinkError> {
    let mut scratch = {
        let ctx = gate.lock().unwrap();
        ctx.frame.clone()
    };

    tracing::info!("Render loop started ({} ms tick)", options.tick.as_millis());

    while is_running(running) {
        {
            let mut ctx = gate.lock().unwrap();
            let DisplayContext { frame, effect } = &mut *ctx;
            match effect {
                Some(effect) => effect.advance(frame, &mut scratch),
                None => scratch.copy_from(frame),
            }
        }

        // Hardware I/O happens outside the gate.
        if let Err(e) = sink.submit(&scratch) {
            tracing::error!("Frame submission failed: {}", e);
            return Err(e);
        }

        if !options.tick.is_zero() {
            thread::sleep(options.tick);
        }
    }

    if options.clear_on_exit {
        {
            let mut ctx = gate.lock().unwrap();
            ctx.frame.clear();
            ctx.effect = None;
            scratch.copy_from(&ctx.frame);
        }
        sink.submit(&scratch)?;
    }

    tracing::info!("Render loop stopped");
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────
