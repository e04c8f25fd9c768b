use crate::config::ChannelConfig;
use crate::error::{ModemError, Result};
use std::f64::consts::PI;

/// Continuous-phase FSK waveform synthesizer
///
/// Every byte is framed as one start bit (space tone), eight data bits LSB
/// first (1 = mark, 0 = space) and a stop bit of `stop_bits` units (mark).
/// The whole transmission is wrapped in `guard_units` of mark tone on both
/// sides so the receiver's filters and decoder can settle on the idle tone.
///
/// The oscillator phase is never reset between bits, so tone switches do not
/// produce discontinuities in the output.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: ChannelConfig,
    amplitude: f32,
}

impl Synthesizer {
    pub fn new(config: ChannelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            amplitude: 1.0,
        })
    }

    /// Scale the output by `amplitude` (default 1.0)
    pub fn with_amplitude(mut self, amplitude: f32) -> Result<Self> {
        if !(amplitude > 0.0 && amplitude <= 1.0) {
            return Err(ModemError::InvalidAmplitude(amplitude));
        }
        self.amplitude = amplitude;
        Ok(self)
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Number of samples `synthesize` produces for `byte_count` bytes
    pub fn expected_len(&self, byte_count: usize) -> usize {
        let units = byte_count as f64 * self.config.units_per_frame()
            + 2.0 * self.config.guard_units as f64;
        (units * self.config.unit_samples()).round() as usize
    }

    /// Encode raw bytes into a complete sample buffer
    pub fn synthesize(&self, bytes: &[u8]) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.expected_len(bytes.len()));
        self.synthesize_into(bytes, &mut samples);
        samples
    }

    /// Encode the UTF-8 bytes of `text`
    pub fn synthesize_text(&self, text: &str) -> Vec<f32> {
        self.synthesize(text.as_bytes())
    }

    /// Stream the waveform for `bytes` into any sample sink
    pub fn synthesize_into<E: Extend<f32>>(&self, bytes: &[u8], sink: &mut E) {
        let mut osc = ToneWriter::new(&self.config, self.amplitude);
        let guard = self.config.guard_units as f64;

        osc.tone(true, guard, sink);
        for &byte in bytes {
            osc.tone(false, self.config.start_bits as f64, sink);
            for bit in 0..8 {
                osc.tone(byte & (1 << bit) != 0, 1.0, sink);
            }
            osc.tone(true, self.config.stop_bits as f64, sink);
        }
        osc.tone(true, guard, sink);

        log::debug!(
            "Synthesized {} bytes into {} samples",
            bytes.len(),
            osc.written
        );
    }
}

/// Phase-continuous oscillator that lays bits on a cumulative unit grid.
///
/// Bit boundaries are placed at `round(units_so_far * unit_samples)`, so
/// fractional bit lengths (1.5 stop bits, non-integer samples per bit) never
/// accumulate rounding drift across a long message.
struct ToneWriter {
    phase: f64,
    mark_inc: f64,
    space_inc: f64,
    unit_samples: f64,
    units: f64,
    written: usize,
    amplitude: f64,
}

impl ToneWriter {
    fn new(config: &ChannelConfig, amplitude: f32) -> Self {
        let fs = config.sample_rate as f64;
        Self {
            phase: 0.0,
            mark_inc: 2.0 * PI * config.mark_freq as f64 / fs,
            space_inc: 2.0 * PI * config.space_freq as f64 / fs,
            unit_samples: config.unit_samples(),
            units: 0.0,
            written: 0,
            amplitude: amplitude as f64,
        }
    }

    fn tone<E: Extend<f32>>(&mut self, mark: bool, len_units: f64, sink: &mut E) {
        let inc = if mark { self.mark_inc } else { self.space_inc };
        self.units += len_units;
        let end = (self.units * self.unit_samples).round() as usize;
        let count = end.saturating_sub(self.written);

        let phase = &mut self.phase;
        let amplitude = self.amplitude;
        sink.extend((0..count).map(|_| {
            *phase += inc;
            if *phase >= 2.0 * PI {
                *phase -= 2.0 * PI;
            }
            (phase.sin() * amplitude) as f32
        }));
        self.written += count;
    }
}
