use crate::config::ChannelConfig;
use crate::decoder::{Symbol, SymbolDecoder};
use crate::discriminator::Discriminator;
use crate::error::Result;
use crate::filter::{Biquad, IqFilter, LOWPASS_Q, PREFILTER_Q};
use crate::mixer::QuadratureMixer;

/// Optional conditioning stages around the core demodulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverOptions {
    /// Band-pass the raw input around the center frequency before mixing
    pub prefilter: bool,
    /// Low-pass the discriminator output before quantizing
    pub post_filter: bool,
}

impl Default for ReceiverOptions {
    fn default() -> Self {
        Self {
            prefilter: true,
            post_filter: true,
        }
    }
}

/// Receive pipeline: samples in, bytes out
///
/// ```text
/// input -> [band-pass] -> mixer -> I/Q low-pass -> discriminator
///       -> [low-pass] -> quantizer -> bit-timing decoder -> byte
/// ```
///
/// Every stage keeps its own state in this struct, so independent channels
/// are just independent `Receiver`s. `process_sample` does a fixed amount of
/// work and never allocates, which makes it safe to call from a real-time
/// audio callback.
#[derive(Debug, Clone)]
pub struct Receiver {
    config: ChannelConfig,
    options: ReceiverOptions,
    prefilter: Biquad,
    mixer: QuadratureMixer,
    channel: IqFilter,
    discriminator: Discriminator,
    post_filter: Biquad,
    decoder: SymbolDecoder,
    /// +1 when mark is the low tone, -1 otherwise
    polarity: f64,
    threshold: f64,
}

impl Receiver {
    pub fn new(config: ChannelConfig) -> Result<Self> {
        Self::with_options(config, ReceiverOptions::default())
    }

    pub fn with_options(config: ChannelConfig, options: ReceiverOptions) -> Result<Self> {
        config.validate()?;
        let fs = config.sample_rate as f64;
        let baud = config.baud_rate as f64;

        log::debug!(
            "Receiver: mark={} Hz, space={} Hz, {} baud, {} samples/bit, {:?}",
            config.mark_freq,
            config.space_freq,
            config.baud_rate,
            config.unit(),
            options
        );

        Ok(Self {
            config,
            options,
            prefilter: Biquad::bandpass(config.center_freq() as f64, PREFILTER_Q, fs),
            mixer: QuadratureMixer::from_config(&config),
            channel: IqFilter::from_config(&config),
            discriminator: Discriminator::new(),
            post_filter: Biquad::lowpass(baud, LOWPASS_Q, fs),
            decoder: SymbolDecoder::new(&config)?,
            polarity: if config.mark_is_low() { 1.0 } else { -1.0 },
            threshold: config.threshold as f64,
        })
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn options(&self) -> ReceiverOptions {
        self.options
    }

    pub fn decoder(&self) -> &SymbolDecoder {
        &self.decoder
    }

    /// Discriminator voltage for one sample, signed so that mark is positive
    fn demodulate_sample(&mut self, sample: f32) -> f64 {
        let x = if self.options.prefilter {
            self.prefilter.process(sample as f64) as f32
        } else {
            sample
        };
        let baseband = self.channel.process(self.mixer.mix(x));
        let mut v = self.discriminator.process(baseband) * self.polarity;
        if self.options.post_filter {
            v = self.post_filter.process(v);
        }
        v
    }

    pub fn process_sample(&mut self, sample: f32) -> Option<u8> {
        let v = self.demodulate_sample(sample);
        self.decoder.push(Symbol::quantize(v, self.threshold))
    }

    /// Push a block of samples, reporting each byte as it completes
    pub fn process<F: FnMut(u8)>(&mut self, block: &[f32], mut on_byte: F) {
        for &sample in block {
            if let Some(byte) = self.process_sample(sample) {
                on_byte(byte);
            }
        }
    }

    /// Push a block of samples and collect the bytes it completed
    pub fn demodulate(&mut self, block: &[f32]) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.process(block, |b| bytes.push(b));
        bytes
    }

    /// Back to a freshly constructed pipeline with the same configuration
    pub fn reset(&mut self) {
        self.prefilter.reset();
        self.mixer.reset();
        self.channel.reset();
        self.discriminator.reset();
        self.post_filter.reset();
        self.decoder.reset();
    }
}
