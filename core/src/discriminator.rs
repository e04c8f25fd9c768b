use crate::mixer::ComplexSample;
use std::f64::consts::PI;

/// Phase-difference FM discriminator
///
/// Tracks the angle of the baseband vector between consecutive samples.
/// Angles are normalized to [-2, 2] (a full turn spans 4) and the step is
/// folded into [0, 2) before centring on zero, so the output is:
///
/// - positive when the vector rotates as it does for a tone *below* the
///   mixer's center frequency,
/// - negative for a tone *above* the center frequency,
///
/// scaled by the instantaneous power so silence reads as ~0 whatever its
/// sign.
#[derive(Debug, Clone, Default)]
pub struct Discriminator {
    prev_phase: f64,
}

impl Discriminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, sample: ComplexSample) -> f64 {
        let amplitude = sample.power();
        let current_phase = sample.q.atan2(sample.i) / PI * 2.0;

        let mut delta = (self.prev_phase - current_phase + 2.0) % 2.0;
        if delta < 0.0 {
            delta += 2.0;
        }

        self.prev_phase = current_phase;
        (delta - 1.0) * amplitude
    }

    pub fn reset(&mut self) {
        self.prev_phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::IqFilter;
    use crate::mixer::QuadratureMixer;

    /// Run a pure tone through mixer, I/Q filter and discriminator and return
    /// the mean output once the filters have settled.
    fn mean_output(tone: f64) -> f64 {
        let fs = 48000.0;
        let mut mixer = QuadratureMixer::new(1750.0, fs as f32);
        let mut iq = IqFilter::new(300.0, fs);
        let mut disc = Discriminator::new();

        let n = 9600;
        let mut sum = 0.0;
        for k in 0..n {
            let x = (2.0 * PI * tone * k as f64 / fs).sin() as f32;
            let y = disc.process(iq.process(mixer.mix(x)));
            if k >= n / 2 {
                sum += y;
            }
        }
        sum / (n / 2) as f64
    }

    #[test]
    fn test_tone_below_center_is_positive() {
        let out = mean_output(1650.0);
        assert!(out > 0.1, "expected positive output, got {out}");
    }

    #[test]
    fn test_tone_above_center_is_negative() {
        let out = mean_output(1850.0);
        assert!(out < -0.1, "expected negative output, got {out}");
    }

    #[test]
    fn test_silence_is_zero() {
        let mut disc = Discriminator::new();
        for _ in 0..100 {
            assert_eq!(disc.process(ComplexSample::default()), 0.0);
        }
    }

    #[test]
    fn test_phase_step_folding() {
        let mut disc = Discriminator::new();
        // angle 0 -> normalized 0
        disc.process(ComplexSample::new(1.0, 0.0));
        // small positive rotation: delta folds to just under 2 -> ~ +1
        let angle: f64 = 0.01;
        let out = disc.process(ComplexSample::new(angle.cos(), angle.sin()));
        assert!(out > 0.98);

        // rotating back: delta just above 0 -> ~ -1
        let out = disc.process(ComplexSample::new(1.0, 0.0));
        assert!(out < -0.98);
    }

    #[test]
    fn test_output_scales_with_power() {
        let mut disc = Discriminator::new();
        disc.process(ComplexSample::new(0.5, 0.0));
        let angle: f64 = 0.01;
        let out = disc.process(ComplexSample::new(0.5 * angle.cos(), 0.5 * angle.sin()));
        assert!((out - 0.25 * (1.0 - angle * 2.0 / PI)).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_across_pi() {
        let mut disc = Discriminator::new();
        let before = PI - 0.005;
        let after = -PI + 0.005;
        disc.process(ComplexSample::new(before.cos(), before.sin()));
        // counter-clockwise across the branch cut still reads as a small positive rotation
        let out = disc.process(ComplexSample::new(after.cos(), after.sin()));
        assert!(out > 0.98, "got {out}");
    }
}
