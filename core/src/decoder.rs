use crate::config::ChannelConfig;
use crate::error::Result;

/// Hard decision on one discriminator sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// Above +threshold
    Mark,
    /// Below -threshold
    Space,
    /// Inside the dead zone
    Silence,
}

impl Symbol {
    pub fn quantize(value: f64, threshold: f64) -> Self {
        if value < -threshold {
            Symbol::Space
        } else if value > threshold {
            Symbol::Mark
        } else {
            Symbol::Silence
        }
    }
}

/// Which part of a frame the decoder is currently timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderPhase {
    Waiting,
    Start,
    Data,
    Stop,
}

/// Full bit-timing state, exposed for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderState {
    pub phase: DecoderPhase,
    /// Mark samples seen in the current bit
    pub mark: usize,
    /// Space samples seen in the current bit
    pub space: usize,
    /// Samples elapsed in the current bit
    pub elapsed: usize,
    /// Byte being assembled, LSB first
    pub byte: u8,
    /// Next data bit index, 0..8
    pub bit: u8,
}

impl Default for DecoderState {
    fn default() -> Self {
        Self {
            phase: DecoderPhase::Waiting,
            mark: 0,
            space: 0,
            elapsed: 0,
            byte: 0,
            bit: 0,
        }
    }
}

impl DecoderState {
    fn clear_counts(&mut self) {
        self.mark = 0;
        self.space = 0;
        self.elapsed = 0;
    }

    fn count(&mut self, symbol: Symbol) {
        match symbol {
            Symbol::Mark => self.mark += 1,
            Symbol::Space => self.space += 1,
            Symbol::Silence => {}
        }
    }
}

/// Running totals of framing outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub bytes: usize,
    pub rejected_starts: usize,
    pub rejected_stops: usize,
}

/// Window lengths, in samples, for the start bit, the eight data bits and
/// the stop bit.
///
/// Boundaries sit on the same cumulative grid the synthesizer uses
/// (`round(units * sample_rate / baud_rate)` from the frame start), so a
/// fractional number of samples per bit does not stretch the frame. The end
/// of the stop window is rounded down: finishing a frame early only means a
/// few idle samples in `Waiting`, while finishing late would eat into the
/// next start bit and shift every following frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub start: usize,
    pub data: [usize; 8],
    pub stop: usize,
}

impl FrameTiming {
    pub fn from_config(config: &ChannelConfig) -> Self {
        let unit = config.unit_samples();
        let start_bits = config.start_bits as f64;
        let edge = |units: f64| (units * unit).round() as usize;

        let start = edge(start_bits).max(1);
        let mut data = [0usize; 8];
        let mut prev = start;
        for (k, len) in data.iter_mut().enumerate() {
            let next = edge(start_bits + (k + 1) as f64);
            *len = next.saturating_sub(prev).max(1);
            prev = next;
        }
        let frame_end = ((start_bits + 8.0 + config.stop_bits as f64) * unit).floor() as usize;
        let stop = frame_end.saturating_sub(prev).max(1);

        Self { start, data, stop }
    }

    /// Samples from the arming sample to the end of the stop window
    pub fn frame_len(&self) -> usize {
        self.start + self.data.iter().sum::<usize>() + self.stop
    }
}

/// Start/data/stop bit-timing state machine
///
/// Fed one quantized symbol per input sample. A space symbol while idle arms
/// the start bit; that arming sample counts towards the start bit's length
/// but not its vote. Each bit window is then decided by majority vote over
/// its samples. Ties go to space (0), both for data bits and for the
/// start/stop checks. Bad start or stop bits silently drop the partial byte
/// and return to `Waiting`, which is also how the decoder resynchronizes
/// after noise.
#[derive(Debug, Clone)]
pub struct SymbolDecoder {
    unit: usize,
    timing: FrameTiming,
    state: DecoderState,
    stats: DecoderStats,
}

impl SymbolDecoder {
    pub fn new(config: &ChannelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            unit: config.unit(),
            timing: FrameTiming::from_config(config),
            state: DecoderState::default(),
            stats: DecoderStats::default(),
        })
    }

    /// Samples per bit period, rounded
    pub fn unit(&self) -> usize {
        self.unit
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    pub fn phase(&self) -> DecoderPhase {
        self.state.phase
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Advance by one sample. Returns a byte when its stop bit validates.
    pub fn push(&mut self, symbol: Symbol) -> Option<u8> {
        let st = &mut self.state;

        if st.phase == DecoderPhase::Waiting {
            if symbol == Symbol::Space {
                st.clear_counts();
                st.elapsed = 1;
                st.phase = DecoderPhase::Start;
            } else {
                st.elapsed = 0;
            }
            return None;
        }

        st.count(symbol);
        st.elapsed += 1;

        match st.phase {
            DecoderPhase::Waiting => None,
            DecoderPhase::Start => {
                if st.elapsed >= self.timing.start {
                    if st.space > st.mark {
                        st.clear_counts();
                        st.byte = 0;
                        st.bit = 0;
                        st.phase = DecoderPhase::Data;
                    } else {
                        log::debug!(
                            "Rejected start bit (mark={}, space={})",
                            st.mark,
                            st.space
                        );
                        self.stats.rejected_starts += 1;
                        st.clear_counts();
                        st.byte = 0;
                        st.phase = DecoderPhase::Waiting;
                    }
                }
                None
            }
            DecoderPhase::Data => {
                if st.elapsed >= self.timing.data[st.bit as usize] {
                    if st.mark > st.space {
                        st.byte |= 1 << st.bit;
                    }
                    st.bit += 1;
                    st.clear_counts();
                    if st.bit >= 8 {
                        st.bit = 0;
                        st.phase = DecoderPhase::Stop;
                    }
                }
                None
            }
            DecoderPhase::Stop => {
                if st.elapsed < self.timing.stop {
                    return None;
                }
                let emitted = if st.mark > st.space {
                    log::trace!("Decoded byte 0x{:02x}", st.byte);
                    self.stats.bytes += 1;
                    Some(st.byte)
                } else {
                    log::debug!(
                        "Rejected stop bit for byte 0x{:02x} (mark={}, space={})",
                        st.byte,
                        st.mark,
                        st.space
                    );
                    self.stats.rejected_stops += 1;
                    None
                };
                st.clear_counts();
                st.byte = 0;
                st.bit = 0;
                st.phase = DecoderPhase::Waiting;
                emitted
            }
        }
    }

    /// Drop any partial frame and return to `Waiting`. Statistics are kept.
    pub fn reset(&mut self) {
        self.state = DecoderState::default();
    }
}
