//! Acoustic FSK modem for short text messages
//!
//! Transmit: bytes are framed UART-style (start bit, 8 data bits LSB first,
//! 1.5 stop bits) and keyed onto two continuous-phase tones.
//!
//! Receive: a per-sample pipeline of quadrature mixer, channel low-pass
//! filters, phase-difference FM discriminator and a bit-timing state machine
//! turns a live sample stream back into bytes, which a streaming UTF-8
//! reassembler turns into text.

pub mod config;
pub mod decoder;
pub mod discriminator;
pub mod error;
pub mod filter;
pub mod mixer;
pub mod reassembler;
pub mod receiver;
pub mod synth;

pub use config::ChannelConfig;
pub use decoder::{DecoderPhase, DecoderState, DecoderStats, FrameTiming, Symbol, SymbolDecoder};
pub use discriminator::Discriminator;
pub use error::{ModemError, Result};
pub use filter::{Biquad, IqFilter};
pub use mixer::{ComplexSample, QuadratureMixer};
pub use reassembler::TextReassembler;
pub use receiver::{Receiver, ReceiverOptions};
pub use synth::Synthesizer;

// Channel defaults
pub const DEFAULT_MARK_FREQ: f32 = 1650.0; // Hz
pub const DEFAULT_SPACE_FREQ: f32 = 1850.0; // Hz
pub const DEFAULT_BAUD_RATE: f32 = 300.0;
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

// Framing defaults, in bit periods
pub const DEFAULT_START_BITS: f32 = 1.0;
pub const DEFAULT_STOP_BITS: f32 = 1.5;
pub const DEFAULT_GUARD_UNITS: f32 = 30.0;

/// Discriminator dead zone below which a sample counts as silence
pub const DEFAULT_THRESHOLD: f32 = 1e-4;

/// Samples per host callback when streaming (Web Audio render quantum)
pub const BLOCK_SIZE: usize = 128;

/// Synthesize `text` as UTF-8 with the given channel settings
pub fn encode_text(config: &ChannelConfig, text: &str) -> Result<Vec<f32>> {
    Ok(Synthesizer::new(*config)?.synthesize_text(text))
}

/// Run `samples` through a fresh receiver and reassemble the bytes as text.
/// A trailing incomplete character is reported as U+FFFD.
pub fn decode_text(config: &ChannelConfig, samples: &[f32]) -> Result<String> {
    let mut receiver = Receiver::new(*config)?;
    let mut text = TextReassembler::new();
    for block in samples.chunks(BLOCK_SIZE) {
        receiver.process(block, |byte| {
            text.push(byte);
        });
    }
    Ok(text.finish())
}
