use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::CliError;

/// Write mono samples as 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CliError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let file = File::create(path)?;
    let mut writer = WavWriter::new(file, spec)?;

    for &sample in samples {
        // Clamp to [-1.0, 1.0] range to avoid overflow, then scale to i16
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Decoded WAV contents: the first channel as floats plus its sample rate
pub struct WavAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Read a WAV file, keeping only the first channel
pub fn read_wav(path: &Path) -> Result<WavAudio, CliError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    log::debug!(
        "Read WAV: {} Hz, {} channels, {} bits, {:?}",
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    let interleaved = read_samples(reader, spec)?;
    let channels = spec.channels.max(1) as usize;
    let samples = interleaved.into_iter().step_by(channels).collect();

    Ok(WavAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

fn read_samples(
    mut reader: WavReader<BufReader<File>>,
    spec: WavSpec,
) -> Result<Vec<f32>, CliError> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            let samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            Ok(samples?)
        }
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            let samples: Result<Vec<i32>, _> = reader.samples::<i32>().collect();
            Ok(samples?.into_iter().map(|s| s as f32 / scale).collect())
        }
        (format, bits) => Err(CliError::UnsupportedFormat { format, bits }),
    }
}
