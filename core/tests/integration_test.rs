// ============================================================================
// INTEGRATION TESTS
// ============================================================================
// Full synthesize -> receive round trips through the real DSP chain. Each
// test pushes a few hundred thousand samples through per-sample filters, so
// debug builds take a couple of seconds; release mode is much faster:
//   cargo test -p fskwave-core --test integration_test --release
// ============================================================================

use fskwave_core::{
    decode_text, encode_text, ChannelConfig, DecoderPhase, Receiver, Synthesizer,
    TextReassembler, BLOCK_SIZE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn round_trip(config: ChannelConfig, data: &[u8]) -> Vec<u8> {
    let samples = Synthesizer::new(config)
        .expect("Failed to create synthesizer")
        .synthesize(data);
    let mut receiver = Receiver::new(config).expect("Failed to create receiver");
    receiver.demodulate(&samples)
}

fn add_noise(samples: &mut [f32], sigma: f32, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0f32, sigma).unwrap();
    for sample in samples.iter_mut() {
        *sample += normal.sample(&mut rng);
    }
}

#[test]
fn test_printable_ascii_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = ChannelConfig::default();
    let text: String = (0x20u8..0x7F).map(char::from).collect();

    let samples = encode_text(&config, &text).expect("Failed to encode");
    let decoded = decode_text(&config, &samples).expect("Failed to decode");

    assert_eq!(decoded, text, "Printable ASCII round-trip failed");
}

#[test]
fn test_utf8_round_trip() {
    let config = ChannelConfig::default();
    let text = "こんにちは、世界! Grüße 🎵";

    let samples = encode_text(&config, text).expect("Failed to encode");
    let decoded = decode_text(&config, &samples).expect("Failed to decode");

    assert_eq!(decoded, text, "UTF-8 round-trip failed");
}

#[test]
fn test_binary_data_round_trip() {
    let data = vec![0u8, 1, 2, 255, 128, 64, 32, 16, 8, 4, 2, 1, 0, 0xAA, 0x55];
    assert_eq!(round_trip(ChannelConfig::default(), &data), data);
}

#[test]
fn test_long_message_does_not_drift() {
    // Hundreds of back-to-back frames: any per-frame timing excess would
    // accumulate and eventually shift the bit windows.
    let data: Vec<u8> = (0..300u32).map(|i| (i * 37 + 11) as u8).collect();
    assert_eq!(round_trip(ChannelConfig::default(), &data), data);
}

#[test]
fn test_empty_message_decodes_nothing() {
    assert!(round_trip(ChannelConfig::default(), b"").is_empty());
}

#[test]
fn test_letter_a_end_to_end() {
    let config = ChannelConfig::default();
    assert_eq!(config.unit(), 160);

    let synth = Synthesizer::new(config).unwrap();
    let samples = synth.synthesize(&[0x41]);
    assert_eq!(samples.len(), ((10.5 + 60.0) * 160.0) as usize);

    let mut receiver = Receiver::new(config).unwrap();
    let bytes = receiver.demodulate(&samples);
    assert_eq!(bytes, vec![0x41]);
    assert_eq!(receiver.decoder().stats().rejected_stops, 0);
}

#[test]
fn test_silence_never_emits() {
    let config = ChannelConfig::default();
    let mut receiver = Receiver::new(config).unwrap();
    let silence = vec![0.0f32; 48000 * 3];
    assert!(receiver.demodulate(&silence).is_empty());
    assert_eq!(receiver.decoder().phase(), DecoderPhase::Waiting);
    assert_eq!(receiver.decoder().stats().bytes, 0);
}

#[test]
fn test_mark_tone_never_emits() {
    let config = ChannelConfig::default();
    // An empty message is nothing but guard tone, i.e. idle mark
    let idle = Synthesizer::new(config).unwrap().synthesize(&[]);
    let mut receiver = Receiver::new(config).unwrap();
    for _ in 0..10 {
        assert!(receiver.demodulate(&idle).is_empty());
    }
}

#[test]
fn test_leading_and_trailing_silence() {
    let config = ChannelConfig::default();
    let text = "Hello, Audio Modem!";
    let mut samples = vec![0.0f32; 16000];
    samples.extend(encode_text(&config, text).unwrap());
    samples.extend(vec![0.0f32; 16000]);

    assert_eq!(decode_text(&config, &samples).unwrap(), text);
}

#[test]
fn test_additive_gaussian_noise() {
    let config = ChannelConfig::default();
    let data = b"Hello, Audio Modem!";
    let mut samples = Synthesizer::new(config).unwrap().synthesize(data);
    add_noise(&mut samples, 0.1, 7);

    let mut receiver = Receiver::new(config).unwrap();
    assert_eq!(receiver.demodulate(&samples), data.to_vec());
}

#[test]
fn test_resync_after_leading_noise() {
    let config = ChannelConfig::default();
    let data = b"Hello, Audio Modem!";
    let mut rng = StdRng::seed_from_u64(42);

    // Loud white noise keeps arming the decoder and may even produce junk
    // bytes, but the real frames after the guard tone must come through intact.
    let mut samples: Vec<f32> = (0..24000).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    samples.extend(Synthesizer::new(config).unwrap().synthesize(data));

    let mut receiver = Receiver::new(config).unwrap();
    let bytes = receiver.demodulate(&samples);
    assert!(
        bytes.ends_with(data),
        "message not recovered after noise: {:?}",
        String::from_utf8_lossy(&bytes)
    );
}

#[test]
fn test_trailing_noise_keeps_message_prefix() {
    let config = ChannelConfig::default();
    let data = b"Hello, Audio Modem!";
    let mut samples = Synthesizer::new(config).unwrap().synthesize(data);
    let mut rng = StdRng::seed_from_u64(54321);
    samples.extend((0..24000).map(|_| rng.gen_range(-0.5f32..0.5)));

    let mut receiver = Receiver::new(config).unwrap();
    let bytes = receiver.demodulate(&samples);
    assert!(bytes.starts_with(data));
}

#[test]
fn test_quiet_signal() {
    let config = ChannelConfig::default();
    let data = b"quiet";
    let samples = Synthesizer::new(config)
        .unwrap()
        .with_amplitude(0.1)
        .unwrap()
        .synthesize(data);
    let mut receiver = Receiver::new(config).unwrap();
    assert_eq!(receiver.demodulate(&samples), data.to_vec());
}

#[test]
fn test_other_sample_rates() {
    let data = b"fractional grid!";
    for sample_rate in [8000.0, 16000.0, 22050.0, 44100.0] {
        let config = ChannelConfig::default().with_sample_rate(sample_rate);
        assert_eq!(
            round_trip(config, data),
            data.to_vec(),
            "round trip failed at {} Hz",
            sample_rate
        );
    }
}

#[test]
fn test_bell_202_tone_plan() {
    // 1200 baud with 1200/2200 Hz tones at 44.1 kHz: 36.75 samples per bit
    let config = ChannelConfig::default()
        .with_sample_rate(44100.0)
        .with_baud_rate(1200.0)
        .with_tones(1200.0, 2200.0);
    let data: Vec<u8> = (0..120u8).collect();
    assert_eq!(round_trip(config, &data), data);
}

#[test]
fn test_streaming_blocks_with_reassembler() {
    let config = ChannelConfig::default();
    let text = "ストリーム stream";
    let samples = encode_text(&config, text).unwrap();

    let mut receiver = Receiver::new(config).unwrap();
    let mut reassembler = TextReassembler::new();
    let mut pieces = Vec::new();
    for block in samples.chunks(BLOCK_SIZE) {
        receiver.process(block, |byte| {
            if let Some(piece) = reassembler.push(byte) {
                pieces.push(piece);
            }
        });
    }

    // Each multi-byte character arrives as one piece, never split
    assert_eq!(pieces.concat(), text);
    assert_eq!(pieces.len(), text.chars().count());
    assert!(reassembler.pending().is_empty());
}

#[test]
fn test_independent_channels() {
    let low = ChannelConfig::default();
    let high = ChannelConfig::default().with_tones(2650.0, 2850.0);

    let a = Synthesizer::new(low).unwrap().synthesize(b"low");
    let b = Synthesizer::new(high).unwrap().synthesize(b"high");

    let mut rx_low = Receiver::new(low).unwrap();
    let mut rx_high = Receiver::new(high).unwrap();
    assert_eq!(rx_low.demodulate(&a), b"low".to_vec());
    assert_eq!(rx_high.demodulate(&b), b"high".to_vec());
}

#[test]
fn test_invalid_config_rejected_everywhere() {
    let config = ChannelConfig::default().with_tones(1650.0, 1650.0);
    assert!(Synthesizer::new(config).is_err());
    assert!(Receiver::new(config).is_err());
    assert!(encode_text(&config, "x").is_err());
    assert!(decode_text(&config, &[0.0; 16]).is_err());
}
