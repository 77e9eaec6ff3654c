use super::structs::DeviceIdentification;
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum IdentificationError {
    #[error("Identification line does not start with '/'")]
    MissingMarker,
    #[error("Identification line too short")]
    TooShort,
}

#[derive(Error, Debug, PartialEq)]
pub enum ChecksumError {
    #[error("Checksum {0:?} is not a 4 digit hex number")]
    Malformed(String),
    #[error("Checksum mismatch, telegram says {expected:04X}, calculated {calculated:04X}")]
    Mismatch { expected: u16, calculated: u16 },
}

pub fn parse_identification_line(line: &str) -> Result<DeviceIdentification, IdentificationError> {
    // Example formats:
    // /ISk5\2MT382-1000
    // /KFM5KAIFA-METER
    // /Ene5\T210-D ESMR5.0

    let content = line
        .trim()
        .strip_prefix('/')
        .ok_or(IdentificationError::MissingMarker)?;

    let manufacturer: String = content.chars().take(3).collect();
    if manufacturer.chars().count() < 3 {
        return Err(IdentificationError::TooShort);
    }

    debug!("Parsed identification - Manufacturer: {}, ID: {}", manufacturer, content);

    Ok(DeviceIdentification {
        manufacturer,
        identification: content.to_string(),
    })
}

/// CRC16/ARC over the telegram body, `/` through `!` inclusive, as DSMR 4+ meters send it.
#[cfg(feature = "checksum")]
pub fn calculate_checksum(body: &[u8]) -> u16 {
    crc16::State::<crc16::ARC>::calculate(body)
}

/// Checks the trailer against the body. Meters before DSMR 4 send an empty
/// trailer, those are accepted.
#[cfg(feature = "checksum")]
pub fn verify_checksum(body: &[u8], provided: &str) -> Result<(), ChecksumError> {
    let provided = provided.trim();
    if provided.is_empty() {
        debug!("Telegram carries no checksum");
        return Ok(());
    }

    if provided.len() != 4 {
        return Err(ChecksumError::Malformed(provided.to_string()));
    }
    let expected = u16::from_str_radix(provided, 16)
        .map_err(|_| ChecksumError::Malformed(provided.to_string()))?;

    let calculated = calculate_checksum(body);
    if calculated != expected {
        return Err(ChecksumError::Mismatch { expected, calculated });
    }
    Ok(())
}
