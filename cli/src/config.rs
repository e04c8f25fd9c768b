use clap::Args;
use fskwave_core::ChannelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::CliError;

/// Channel settings shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct ChannelArgs {
    /// JSON file with channel settings (flags override it)
    #[arg(long, global = true, value_name = "FILE.JSON")]
    pub config: Option<PathBuf>,

    /// Mark (logical 1 / idle) tone in Hz [default: 1650]
    #[arg(long, global = true)]
    pub mark: Option<f32>,

    /// Space (logical 0 / start bit) tone in Hz [default: 1850]
    #[arg(long, global = true)]
    pub space: Option<f32>,

    /// Bits per second [default: 300]
    #[arg(long, global = true)]
    pub baud: Option<f32>,

    /// Sample rate in Hz for encoding [default: 48000]; decoding uses the WAV header
    #[arg(long, global = true)]
    pub sample_rate: Option<f32>,

    /// Discriminator noise threshold [default: 0.0001]
    #[arg(long, global = true)]
    pub threshold: Option<f32>,
}

/// On-disk form of a channel config; every field is optional
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub mark_freq: Option<f32>,
    pub space_freq: Option<f32>,
    pub baud_rate: Option<f32>,
    pub start_bits: Option<f32>,
    pub stop_bits: Option<f32>,
    pub sample_rate: Option<f32>,
    pub threshold: Option<f32>,
    pub guard_units: Option<f32>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(&self, config: &mut ChannelConfig) {
        let fields = [
            (self.mark_freq, &mut config.mark_freq),
            (self.space_freq, &mut config.space_freq),
            (self.baud_rate, &mut config.baud_rate),
            (self.start_bits, &mut config.start_bits),
            (self.stop_bits, &mut config.stop_bits),
            (self.sample_rate, &mut config.sample_rate),
            (self.threshold, &mut config.threshold),
            (self.guard_units, &mut config.guard_units),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

impl ChannelArgs {
    /// defaults <- config file <- flags
    pub fn resolve(&self) -> Result<ChannelConfig, CliError> {
        let mut config = ChannelConfig::default();

        if let Some(path) = &self.config {
            let file = ConfigFile::load(path)?;
            log::debug!("Loaded channel config from {}: {:?}", path.display(), file);
            file.apply(&mut config);
        }

        let flags = ConfigFile {
            mark_freq: self.mark,
            space_freq: self.space,
            baud_rate: self.baud,
            sample_rate: self.sample_rate,
            threshold: self.threshold,
            ..ConfigFile::default()
        };
        flags.apply(&mut config);

        config.validate()?;
        if config.sample_rate.fract() != 0.0 {
            return Err(CliError::FractionalSampleRate(config.sample_rate));
        }
        Ok(config)
    }
}
