use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

const CONFIG_PATHS: [&str; 2] = ["config/p1meter.yaml", "p1meter.yaml"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Unable to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

fn httpd_port_default() -> u16 { return 8080 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct HttpdConfig {
    #[serde(default="httpd_port_default")]
    pub port: u16,
}

impl Default for HttpdConfig {
    fn default() -> Self {
        HttpdConfig { port: httpd_port_default() }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    None,
    Even,
    Odd,
}

fn serial_baud_rate_default() -> u32 { return 115200 }
fn serial_data_bits_default() -> u8 { return 8 }
fn serial_parity_default() -> ParityConfig { return ParityConfig::None }
fn serial_stop_bits_default() -> u8 { return 1 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SerialConfig {
    /// Device path, usually overridden with `USBDEVICE`
    #[serde(default)]
    pub device: String,
    #[serde(default="serial_baud_rate_default")]
    pub baud_rate: u32,
    #[serde(default="serial_data_bits_default")]
    pub data_bits: u8,
    #[serde(default="serial_parity_default")]
    pub parity: ParityConfig,
    #[serde(default="serial_stop_bits_default")]
    pub stop_bits: u8,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            device: String::new(),
            baud_rate: serial_baud_rate_default(),
            data_bits: serial_data_bits_default(),
            parity: serial_parity_default(),
            stop_bits: serial_stop_bits_default(),
        }
    }
}

fn telegram_gas_channel_default() -> u8 { return 1 }
fn telegram_max_length_default() -> usize { return 8192 }
fn telegram_verify_checksum_default() -> bool { return false }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TelegramConfig {
    /// M-Bus channel of the gas meter, the `B` in `0-B:24.2.1`
    #[serde(default="telegram_gas_channel_default")]
    pub gas_channel: u8,
    #[serde(default="telegram_max_length_default")]
    pub max_telegram_length: usize,
    #[serde(default="telegram_verify_checksum_default")]
    pub verify_checksum: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        TelegramConfig {
            gas_channel: telegram_gas_channel_default(),
            max_telegram_length: telegram_max_length_default(),
            verify_checksum: telegram_verify_checksum_default(),
        }
    }
}

fn backoff_initial_ms_default() -> u64 { return 100 }
fn backoff_max_ms_default() -> u64 { return 5000 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BackoffConfig {
    #[serde(default="backoff_initial_ms_default")]
    pub initial_ms: u64,
    #[serde(default="backoff_max_ms_default")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig {
            initial_ms: backoff_initial_ms_default(),
            max_ms: backoff_max_ms_default(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub httpd: HttpdConfig,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl Config {
    /// Loads the first config file found and applies environment overrides.
    /// Running without any config file is fine, defaults are used then.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(path) => Config::from_file(path)?,
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;

        let config = Config::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path_str.clone(),
            source,
        })?;

        info!("Loaded config from {}", path_str);
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        /* An empty file is a valid "all defaults" config */
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    /// Environment wins over the file. `USBDEVICE` is kept for compatibility
    /// with existing deployments.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(device) = lookup("USBDEVICE") {
            debug!("Serial device overridden by environment: {}", device);
            self.serial.device = device;
        }

        if let Some(baud) = lookup("P1_BAUD_RATE") {
            self.serial.baud_rate = baud.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "P1_BAUD_RATE".to_string(),
                value: baud.clone(),
            })?;
        }

        if let Some(port) = lookup("P1_HTTP_PORT") {
            self.httpd.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "P1_HTTP_PORT".to_string(),
                value: port.clone(),
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.baud_rate == 0 {
            return Err(invalid("serial.baud_rate", self.serial.baud_rate));
        }
        if !(5..=8).contains(&self.serial.data_bits) {
            return Err(invalid("serial.data_bits", self.serial.data_bits));
        }
        if !(1..=2).contains(&self.serial.stop_bits) {
            return Err(invalid("serial.stop_bits", self.serial.stop_bits));
        }
        if self.telegram.gas_channel == 0 || self.telegram.gas_channel > 9 {
            return Err(invalid("telegram.gas_channel", self.telegram.gas_channel));
        }
        if self.telegram.max_telegram_length == 0 {
            return Err(invalid("telegram.max_telegram_length", self.telegram.max_telegram_length));
        }
        Ok(())
    }
}

fn invalid<T: ToString>(key: &str, value: T) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}
