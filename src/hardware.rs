//! Hardware boundary: the WS281x strip driver and the IR receiver.
//!
//! Everything in this module talks to real Raspberry Pi peripherals and
//! is only compiled with the `hardware` feature. The rest of the crate
//! sees it through two narrow seams: the [`FrameSink`] trait for output
//! and a plain callback for decoded IR events.

use std::time::Duration;

use infrared::Receiver;
use rppal::gpio::{Event, Gpio, InputPin, Trigger};
use rs_ws281x::{ChannelBuilder, Controller, ControllerBuilder};

use crate::frame::FrameBuffer;
use crate::render::{FrameSink, SinkError};
use crate::{StripOptions, StripType};

// ── LED strip sink ───────────────────────────────────────────────────

/// The real output path: stages a frame into the driver's LED words and
/// kicks off the DMA transmit. Initialization or render failure is fatal
/// to the process; the driver releases GPIO/DMA resources on drop.
pub struct Ws281xSink {
    controller: Controller,
}

impl Ws281xSink {
    pub fn new(options: &StripOptions) -> Result<Self, SinkError> {
        let controller = ControllerBuilder::new()
            .freq(options.frequency)
            .dma(i32::from(options.dma_channel))
            .channel(
                0,
                ChannelBuilder::new()
                    .pin(i32::from(options.gpio_pin))
                    .count(options.matrix.pixel_count() as i32)
                    .strip_type(strip_type(options.strip))
                    .invert(options.invert)
                    .brightness(options.brightness)
                    .build(),
            )
            .build()
            .map_err(|e| SinkError::new(1, format!("ws2811 init failed: {e}")))?;

        Ok(Self { controller })
    }
}

impl FrameSink for Ws281xSink {
    fn submit(&mut self, frame: &FrameBuffer) -> Result<(), SinkError> {
        // Driver LED words are [B, G, R, W] byte order.
        for (led, pixel) in self.controller.leds_mut(0).iter_mut().zip(frame.cells()) {
            *led = [pixel.blue(), pixel.green(), pixel.red(), 0];
        }
        self.controller
            .render()
            .map_err(|e| SinkError::new(1, format!("ws2811 render failed: {e}")))
    }
}

fn strip_type(strip: StripType) -> rs_ws281x::StripType {
    match strip {
        StripType::Rgb => rs_ws281x::StripType::Ws2811Rgb,
        StripType::Rbg => rs_ws281x::StripType::Ws2811Rbg,
        StripType::Grb => rs_ws281x::StripType::Ws2811Grb,
        StripType::Gbr => rs_ws281x::StripType::Ws2811Gbr,
        StripType::Brg => rs_ws281x::StripType::Ws2811Brg,
        StripType::Bgr => rs_ws281x::StripType::Ws2811Bgr,
        StripType::Rgbw => rs_ws281x::StripType::Sk6812Rgbw,
        StripType::Grbw => rs_ws281x::StripType::Sk6812Grbw,
    }
}

// ── IR receiver ──────────────────────────────────────────────────────

/// Reassemble the 24-bit scan code a NEC frame carries:
/// address in the high byte, then the inverted and plain command bytes.
/// This matches the codes the remote's button map is written against.
pub fn nec_scan_code(addr: u32, cmd: u32) -> u32 {
    ((addr & 0xFF) << 16) | ((!cmd & 0xFF) << 8) | (cmd & 0xFF)
}

/// Asynchronous IR input: a GPIO edge interrupt feeds the NEC decoder,
/// and each decoded frame invokes `handler(scan_code, is_repeat)` on the
/// interrupt thread. Dropping the receiver unregisters the interrupt.
pub struct IrReceiver {
    // Held only to keep the async interrupt registered.
    _pin: InputPin,
}

impl IrReceiver {
    pub fn spawn<F>(gpio_pin: u8, mut handler: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: FnMut(u32, bool) + Send + 'static,
    {
        let gpio = Gpio::new()?;
        let mut pin = gpio.get(gpio_pin)?.into_input_pullup();

        // 1 MHz resolution: edge gaps are measured in microseconds.
        let mut decoder = Receiver::builder()
            .nec()
            .resolution(1_000_000)
            .event_driven()
            .build();
        let mut last_edge: Option<Duration> = None;

        pin.set_async_interrupt(Trigger::Both, None, move |event: Event| {
            let rising = matches!(event.trigger, Trigger::RisingEdge);
            let dt = match last_edge {
                Some(prev) => {
                    let gap = event.timestamp.saturating_sub(prev);
                    u32::try_from(gap.as_micros()).unwrap_or(u32::MAX)
                }
                // First edge ever: present it as following a long idle gap.
                None => u32::MAX,
            };
            last_edge = Some(event.timestamp);

            match decoder.event(dt, rising) {
                Ok(Some(cmd)) => handler(
                    nec_scan_code(u32::from(cmd.addr), u32::from(cmd.cmd)),
                    cmd.repeat,
                ),
                Ok(None) => {}
                // Decode noise is normal between frames; the decoder resyncs.
                Err(e) => tracing::trace!("IR decode error: {:?}", e),
            }
        })?;

        tracing::info!("IR receiver listening on GPIO {}", gpio_pin);
        Ok(Self { _pin: pin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0x00, 0x45, 0x00BA45)] // fill white
    #[case(0x00, 0x46, 0x00B946)] // fill black
    #[case(0x00, 0x0C, 0x00F30C)] // throb
    #[case(0x00, 0x19, 0x00E619)] // rotate clockwise
    fn test_nec_scan_code(#[case] addr: u32, #[case] cmd: u32, #[case] expected: u32) {
        assert_eq!(nec_scan_code(addr, cmd), expected);
    }
}
