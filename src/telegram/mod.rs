//! DSMR P1 telegrams: framing the serial byte stream and parsing the
//! OBIS data lines of a framed telegram.

pub mod framer;
pub mod parser;
pub mod structs;
pub mod utils;

pub use framer::{FrameError, FramerState, TelegramFramer};
pub use parser::{parse_data_line, parse_telegram, LineError};
pub use structs::{DataObject, DeviceIdentification, RawTelegram, Telegram};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::fake::ScriptedSource;

    #[tokio::test]
    async fn test_frame_and_parse() {
        let mut source = ScriptedSource::from_bytes(
            b"\r\n/XMX5LGBBFFB231215493\r\n\r\n1-0:32.7.0(230.1*V)\r\n1-0:31.7.0(001*A)\r\n!5E0D\r\n",
        );
        let mut framer = TelegramFramer::new(1024);

        let raw = framer.next_telegram(&mut source).await.unwrap();
        let telegram = parse_telegram(&raw.text());
        assert_eq!(telegram.identification.as_ref().unwrap().manufacturer, "XMX");
        assert_eq!(telegram.get("1-0:32.7.0").unwrap().value, "230.1");
        assert_eq!(telegram.get("1-0:31.7.0").unwrap().unit, Some("A".to_string()));
        assert_eq!(raw.checksum, "5E0D");
    }
}
