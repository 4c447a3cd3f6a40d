//! IR-Controlled LED Matrix Driver
//!
//! Drives a WS281x LED matrix from a Raspberry Pi and reacts to an NEC
//! infrared remote: fill, per-channel color nudging, a one-shot sine
//! fade, rotation, and throbbing.
//!
//! ## Architecture
//! - **Render loop** (main thread): owns the LED strip, submits a frame
//!   every ~66.7 ms (15 Hz)
//! - **IR receiver** (GPIO interrupt thread): decodes remote presses and
//!   mutates the shared display state
//! - `Arc<Mutex<DisplayContext>>` is the single gate serializing the two
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/ir-led-rs --width 16 --height 1 --strip gbr --clear
//! ```

#[cfg(not(feature = "hardware"))]
fn main() {
    eprintln!("This binary requires the 'hardware' feature (rs_ws281x + rppal).");
    eprintln!("Build with: cargo build --release");
    eprintln!("Tests can run without it: cargo test --no-default-features");
    std::process::exit(1);
}

#[cfg(feature = "hardware")]
fn main() {
    use clap::Parser;
    use ir_led_rs::command::handle_ir_event;
    use ir_led_rs::hardware::{IrReceiver, Ws281xSink};
    use ir_led_rs::render::{self, DisplayContext, RenderOptions};
    use ir_led_rs::{MatrixConfig, StripOptions, StripType, TARGET_FREQ, setup_signal_handler};
    use std::sync::{Arc, Mutex};

    /// IR remote control for a WS281x LED matrix
    #[derive(Parser)]
    #[command(name = "ir-led-rs")]
    #[command(about = "IR remote control for WS281x LED matrices on Raspberry Pi")]
    #[command(version)]
    struct Args {
        /// Matrix width in pixels
        #[arg(short = 'x', long, default_value = "16",
              value_parser = clap::value_parser!(usize).range(1..))]
        width: usize,

        /// Matrix height in pixels
        #[arg(short = 'y', long, default_value = "1",
              value_parser = clap::value_parser!(usize).range(1..))]
        height: usize,

        /// DMA channel to use (must be below 14)
        #[arg(short, long, default_value = "10",
              value_parser = clap::value_parser!(u8).range(..14))]
        dma: u8,

        /// GPIO pin driving the strip data line (default is PWM0)
        #[arg(short, long, default_value = "18")]
        gpio: u8,

        /// GPIO pin the IR receiver is wired to
        #[arg(long, default_value = "17")]
        ir_gpio: u8,

        /// Strip color ordering: rgb, rbg, grb, gbr, brg, bgr, rgbw, grbw
        #[arg(short, long, default_value = "gbr", value_parser = StripType::parse)]
        strip: StripType,

        /// Invert the data line (pulse LOW)
        #[arg(short, long)]
        invert: bool,

        /// Clear the matrix on exit
        #[arg(short, long)]
        clear: bool,

        /// Strip brightness (0-255)
        #[arg(short, long, default_value = "255")]
        brightness: u8,
    }

    // No ANSI color codes so logs read cleanly under systemd/journald.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .compact()
        .init();

    let args = Args::parse();
    let matrix = MatrixConfig::new(args.width, args.height);
    let strip_options = StripOptions {
        matrix,
        gpio_pin: args.gpio,
        dma_channel: args.dma,
        strip: args.strip,
        invert: args.invert,
        brightness: args.brightness,
        frequency: TARGET_FREQ,
    };

    tracing::info!("ir-led-rs v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Matrix: {}x{} ({} LEDs)",
        matrix.width,
        matrix.height,
        matrix.pixel_count()
    );
    tracing::info!(
        "Strip: {:?} on GPIO {}, DMA channel {}",
        strip_options.strip,
        strip_options.gpio_pin,
        strip_options.dma_channel
    );

    let running = setup_signal_handler();
    let gate = Arc::new(Mutex::new(DisplayContext::new(matrix)));

    // Bring up the strip first — if this fails there is nothing to drive.
    let mut sink = match Ws281xSink::new(&strip_options) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("Failed to initialize LED strip: {}", e);
            std::process::exit(e.status);
        }
    };

    // The receiver callback runs on its own thread; it shares the gate
    // with the render loop and nothing else.
    let ir_gate = gate.clone();
    let _ir = match IrReceiver::spawn(args.ir_gpio, move |code, is_repeat| {
        handle_ir_event(&ir_gate, code, is_repeat);
    }) {
        Ok(receiver) => receiver,
        Err(e) => {
            tracing::error!("Failed to start IR receiver on GPIO {}: {}", args.ir_gpio, e);
            std::process::exit(1);
        }
    };

    let options = RenderOptions {
        tick: render::TICK,
        clear_on_exit: args.clear,
    };
    if let Err(e) = render::render_loop(&gate, &running, &mut sink, options) {
        std::process::exit(e.status);
    }
}
