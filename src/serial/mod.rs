use crate::config::{ParityConfig, SerialConfig};
use log::info;
use std::future::Future;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_serial::{DataBits, Parity, SerialStream, StopBits};

pub mod backoff;
pub mod fake;

/// Sequential supplier of bytes from the meter link.
///
/// `Ok(Some(byte))` is the next byte, `Ok(None)` means the stream ended and
/// will not produce anything more, `Err(_)` is a read failure.
pub trait ByteSource {
    fn read_byte(&mut self) -> impl Future<Output = io::Result<Option<u8>>> + Send;
}

impl<R: AsyncRead + Unpin + Send> ByteSource for BufReader<R> {
    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.read_u8().await {
            Ok(byte) => Ok(Some(byte)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum SerialError {
    #[error("No serial device configured, set USBDEVICE or serial.device")]
    NoDevice,
    #[error("Unable to open serial device {device}: {source}")]
    Open {
        device: String,
        source: tokio_serial::Error,
    },
}

/// Opens the configured serial device and wraps it in a buffered byte source.
pub fn open_port(config: &SerialConfig) -> Result<BufReader<SerialStream>, SerialError> {
    if config.device.trim().is_empty() {
        return Err(SerialError::NoDevice);
    }

    let builder = tokio_serial::new(config.device.clone(), config.baud_rate)
        .data_bits(data_bits(config.data_bits))
        .parity(parity(&config.parity))
        .stop_bits(stop_bits(config.stop_bits));

    let stream = SerialStream::open(&builder).map_err(|source| SerialError::Open {
        device: config.device.clone(),
        source,
    })?;

    info!("Opened serial device {} at {} baud", config.device, config.baud_rate);
    Ok(BufReader::new(stream))
}

fn data_bits(bits: u8) -> DataBits {
    match bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    }
}

fn parity(parity: &ParityConfig) -> Parity {
    match parity {
        ParityConfig::None => Parity::None,
        ParityConfig::Even => Parity::Even,
        ParityConfig::Odd => Parity::Odd,
    }
}

fn stop_bits(bits: u8) -> StopBits {
    match bits {
        2 => StopBits::Two,
        _ => StopBits::One,
    }
}

/// Errors after which reading from the device again is pointless.
pub fn is_fatal(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
    )
}
