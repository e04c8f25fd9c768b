use clap::{Parser, Subcommand};
use fskwave_core::{ChannelConfig, ModemError, Receiver, Synthesizer, TextReassembler, BLOCK_SIZE};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod config;
mod wav;

use config::ChannelArgs;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Modem(#[from] ModemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported WAV format: {bits}-bit {format:?}")]
    UnsupportedFormat {
        format: hound::SampleFormat,
        bits: u16,
    },

    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("WAV files need a whole-number sample rate, got {0}")]
    FractionalSampleRate(f32),

    #[error("Loopback mismatch: sent {sent:?}, received {received:?}")]
    LoopbackMismatch { sent: String, received: String },
}

#[derive(Parser)]
#[command(name = "fskwave")]
#[command(about = "Acoustic FSK modem: text to audio and back")]
struct Cli {
    #[command(flatten)]
    channel: ChannelArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file (or literal text) to a WAV audio file
    Encode {
        /// Input file, or the message itself with --text
        #[arg(value_name = "INPUT")]
        input: String,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Treat INPUT as the message text instead of a file path
        #[arg(short, long)]
        text: bool,

        /// Output amplitude in (0, 1]
        #[arg(short, long, default_value = "0.8")]
        amplitude: f32,
    },

    /// Decode a WAV audio file
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Write raw decoded bytes here instead of printing text
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Synthesize a message and decode it again in-process
    Loopback {
        /// Message text
        #[arg(value_name = "TEXT")]
        text: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.channel.resolve()?;

    match cli.command {
        Commands::Encode {
            input,
            output,
            text,
            amplitude,
        } => encode_command(&config, &input, text, &output, amplitude)?,
        Commands::Decode { input, output } => decode_command(config, &input, output.as_deref())?,
        Commands::Loopback { text } => loopback_command(&config, &text)?,
    }

    Ok(())
}

fn encode_command(
    config: &ChannelConfig,
    input: &str,
    literal: bool,
    output_path: &Path,
    amplitude: f32,
) -> Result<(), CliError> {
    let data = if literal {
        input.as_bytes().to_vec()
    } else {
        let data = std::fs::read(input)?;
        eprintln!("Read {} bytes from {}", data.len(), input);
        data
    };

    let synth = Synthesizer::new(*config)?.with_amplitude(amplitude)?;
    let samples = synth.synthesize(&data);
    eprintln!(
        "Encoded {} bytes to {} audio samples ({:.2} s at {} baud)",
        data.len(),
        samples.len(),
        samples.len() as f32 / config.sample_rate,
        config.baud_rate
    );

    wav::write_wav(output_path, &samples, config.sample_rate as u32)?;
    eprintln!("Wrote {}", output_path.display());
    Ok(())
}

fn decode_command(
    mut config: ChannelConfig,
    input_path: &Path,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let audio = wav::read_wav(input_path)?;
    eprintln!(
        "Read WAV: {} Hz, {} channels, {} samples",
        audio.sample_rate,
        audio.channels,
        audio.samples.len()
    );
    if audio.channels > 1 {
        log::warn!("{} channels in input, decoding the first one only", audio.channels);
    }

    // The recording's own rate wins over anything configured
    config.sample_rate = audio.sample_rate as f32;
    let mut receiver = Receiver::new(config)?;

    let mut bytes = Vec::new();
    let mut reassembler = TextReassembler::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for block in audio.samples.chunks(BLOCK_SIZE) {
        let mut io_result = Ok(());
        receiver.process(block, |byte| {
            bytes.push(byte);
            if output_path.is_none() {
                if let Some(piece) = reassembler.push(byte) {
                    if io_result.is_ok() {
                        io_result = out.write_all(piece.as_bytes()).and_then(|_| out.flush());
                    }
                }
            }
        });
        io_result?;
    }

    let stats = receiver.decoder().stats();
    log::info!(
        "Framing: {} bytes, {} rejected start bits, {} rejected stop bits",
        stats.bytes,
        stats.rejected_starts,
        stats.rejected_stops
    );

    match output_path {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            eprintln!("Decoded {} bytes, wrote {}", bytes.len(), path.display());
        }
        None => {
            // Everything up to here has been streamed; only the flushed tail is new
            let streamed = reassembler.text().len();
            let text = reassembler.finish();
            writeln!(out, "{}", &text[streamed..])?;
            eprintln!("Decoded {} bytes", bytes.len());
        }
    }

    Ok(())
}

fn loopback_command(config: &ChannelConfig, text: &str) -> Result<(), CliError> {
    let samples = fskwave_core::encode_text(config, text)?;
    let decoded = fskwave_core::decode_text(config, &samples)?;

    println!("{}", decoded);
    if decoded != text {
        return Err(CliError::LoopbackMismatch {
            sent: text.to_string(),
            received: decoded,
        });
    }
    eprintln!("Loopback OK: {} samples, {} bytes", samples.len(), text.len());
    Ok(())
}
