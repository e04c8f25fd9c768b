use crate::error::{ModemError, Result};
use crate::{
    DEFAULT_BAUD_RATE, DEFAULT_GUARD_UNITS, DEFAULT_MARK_FREQ, DEFAULT_SAMPLE_RATE,
    DEFAULT_SPACE_FREQ, DEFAULT_START_BITS, DEFAULT_STOP_BITS, DEFAULT_THRESHOLD,
};

/// Channel parameters shared by the transmitter and the receiver.
///
/// Both ends of a link must agree on every field except `threshold`
/// (receiver only) and `guard_units` (transmitter only). A config is
/// read-only once a pipeline has been built from it; changing any value
/// means constructing a new pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    /// Tone for logical 1 and for the idle line (Hz)
    pub mark_freq: f32,
    /// Tone for logical 0 and for the start bit (Hz)
    pub space_freq: f32,
    /// Bits per second
    pub baud_rate: f32,
    /// Start bit length in units
    pub start_bits: f32,
    /// Stop bit length in units
    pub stop_bits: f32,
    /// Samples per second
    pub sample_rate: f32,
    /// Discriminator dead zone; outputs inside +/- threshold count as silence
    pub threshold: f32,
    /// Mark tone padding before and after the frames, in units
    pub guard_units: f32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            mark_freq: DEFAULT_MARK_FREQ,
            space_freq: DEFAULT_SPACE_FREQ,
            baud_rate: DEFAULT_BAUD_RATE,
            start_bits: DEFAULT_START_BITS,
            stop_bits: DEFAULT_STOP_BITS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            threshold: DEFAULT_THRESHOLD,
            guard_units: DEFAULT_GUARD_UNITS,
        }
    }
}

impl ChannelConfig {
    pub fn with_tones(mut self, mark_freq: f32, space_freq: f32) -> Self {
        self.mark_freq = mark_freq;
        self.space_freq = space_freq;
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: f32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_framing(mut self, start_bits: f32, stop_bits: f32) -> Self {
        self.start_bits = start_bits;
        self.stop_bits = stop_bits;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_guard_units(mut self, guard_units: f32) -> Self {
        self.guard_units = guard_units;
        self
    }

    /// Midpoint between the two tones; the receiver mixes down around it.
    pub fn center_freq(&self) -> f32 {
        (self.mark_freq + self.space_freq) / 2.0
    }

    /// Exact (possibly fractional) number of samples in one bit period
    pub fn unit_samples(&self) -> f64 {
        self.sample_rate as f64 / self.baud_rate as f64
    }

    /// Bit period rounded to whole samples, as counted by the decoder
    pub fn unit(&self) -> usize {
        self.unit_samples().round() as usize
    }

    /// Units occupied by one framed byte: start + 8 data + stop
    pub fn units_per_frame(&self) -> f64 {
        self.start_bits as f64 + 8.0 + self.stop_bits as f64
    }

    /// True when mark sits below the center frequency
    pub fn mark_is_low(&self) -> bool {
        self.mark_freq < self.space_freq
    }

    /// Check every channel invariant.
    ///
    /// Called by each pipeline constructor so that a bad config fails before
    /// the first sample is processed.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("mark_freq", self.mark_freq),
            ("space_freq", self.space_freq),
            ("baud_rate", self.baud_rate),
            ("start_bits", self.start_bits),
            ("stop_bits", self.stop_bits),
            ("sample_rate", self.sample_rate),
            ("threshold", self.threshold),
            ("guard_units", self.guard_units),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }

        if self.sample_rate <= 0.0 {
            return Err(invalid(format!(
                "sample_rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.baud_rate <= 0.0 {
            return Err(invalid(format!(
                "baud_rate must be positive, got {}",
                self.baud_rate
            )));
        }

        let nyquist = self.sample_rate / 2.0;
        for (name, freq) in [("mark_freq", self.mark_freq), ("space_freq", self.space_freq)] {
            if freq <= 0.0 || freq >= nyquist {
                return Err(invalid(format!(
                    "{name} must lie in (0, {nyquist}) Hz, got {freq}"
                )));
            }
        }
        if self.mark_freq == self.space_freq {
            return Err(invalid(format!(
                "mark_freq and space_freq must differ, both are {}",
                self.mark_freq
            )));
        }

        if self.unit_samples() < 2.0 {
            return Err(invalid(format!(
                "sample_rate / baud_rate must be at least 2 samples per bit, got {:.3}",
                self.unit_samples()
            )));
        }

        if self.start_bits <= 0.0 || self.stop_bits <= 0.0 {
            return Err(invalid(format!(
                "start_bits and stop_bits must be positive, got {} and {}",
                self.start_bits, self.stop_bits
            )));
        }
        if self.threshold < 0.0 {
            return Err(invalid(format!(
                "threshold must not be negative, got {}",
                self.threshold
            )));
        }
        if self.guard_units < 0.0 {
            return Err(invalid(format!(
                "guard_units must not be negative, got {}",
                self.guard_units
            )));
        }

        Ok(())
    }
}

fn invalid(msg: String) -> ModemError {
    ModemError::InvalidConfig(msg)
}
