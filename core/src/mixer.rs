use crate::config::ChannelConfig;
use std::f64::consts::PI;

/// One in-phase/quadrature sample pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexSample {
    pub i: f64,
    pub q: f64,
}

impl ComplexSample {
    pub fn new(i: f64, q: f64) -> Self {
        Self { i, q }
    }

    /// Instantaneous power, i² + q²
    pub fn power(&self) -> f64 {
        self.i * self.i + self.q * self.q
    }
}

/// Heterodyne down-converter
///
/// Multiplies the real input by a local oscillator at the channel center
/// frequency, moving the mark and space tones to small offsets either side
/// of 0 Hz. The sum-frequency image this leaves behind is removed by the
/// channel filters.
#[derive(Debug, Clone)]
pub struct QuadratureMixer {
    phase: f64,
    phase_inc: f64,
}

impl QuadratureMixer {
    pub fn new(center_freq: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 2.0 * PI * center_freq as f64 / sample_rate as f64,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.center_freq(), config.sample_rate)
    }

    pub fn mix(&mut self, sample: f32) -> ComplexSample {
        let x = sample as f64;
        let out = ComplexSample {
            i: self.phase.cos() * x,
            q: self.phase.sin() * x,
        };

        self.phase += self.phase_inc;
        if self.phase >= 2.0 * PI {
            self.phase -= 2.0 * PI;
        }
        out
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
