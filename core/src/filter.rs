//! Second-order IIR sections for the receive chain.
//!
//! Coefficients follow the Audio EQ Cookbook (Robert Bristow-Johnson), the
//! same formulas Web Audio's `BiquadFilterNode` uses, so a browser front-end
//! and this crate see the same channel response.

use crate::config::ChannelConfig;
use crate::mixer::ComplexSample;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Q of the band-pass pre-filter ahead of the mixer
pub const PREFILTER_Q: f64 = 1.0;

/// Butterworth Q for the channel low-pass filters
pub const LOWPASS_Q: f64 = FRAC_1_SQRT_2;

/// Biquad in Direct Form II Transposed.
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn lowpass(cutoff: f64, q: f64, sample_rate: f64) -> Self {
        let (cos_w0, alpha) = Self::prewarp(cutoff, q, sample_rate);
        let b1 = 1.0 - cos_w0;
        let b0 = b1 / 2.0;
        Self::normalized(b0, b1, b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
    }

    /// Constant 0 dB peak gain band-pass
    pub fn bandpass(center: f64, q: f64, sample_rate: f64) -> Self {
        let (cos_w0, alpha) = Self::prewarp(center, q, sample_rate);
        Self::normalized(alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
    }

    fn prewarp(freq: f64, q: f64, sample_rate: f64) -> (f64, f64) {
        let w0 = 2.0 * PI * freq / sample_rate;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// Matched low-pass pair for the I and Q branches.
///
/// Cutoff sits at the baud rate: wide enough for the tone offsets and the
/// symbol transitions, narrow enough to kill the mixing image near twice the
/// center frequency.
#[derive(Debug, Clone)]
pub struct IqFilter {
    i: Biquad,
    q: Biquad,
}

impl IqFilter {
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        let branch = Biquad::lowpass(cutoff, LOWPASS_Q, sample_rate);
        Self {
            i: branch.clone(),
            q: branch,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.baud_rate as f64, config.sample_rate as f64)
    }

    pub fn process(&mut self, sample: ComplexSample) -> ComplexSample {
        ComplexSample {
            i: self.i.process(sample.i),
            q: self.q.process(sample.q),
        }
    }

    pub fn reset(&mut self) {
        self.i.reset();
        self.q.reset();
    }
}
