use super::structs::RawTelegram;
use crate::serial::ByteSource;
use log::{debug, trace};
use std::io;
use thiserror::Error;

pub const START_MARKER: u8 = b'/';
pub const END_MARKER: u8 = b'!';

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Read from byte source failed: {0}")]
    Io(#[from] io::Error),
    #[error("Telegram longer than {limit} bytes, discarded")]
    TooLong { limit: usize },
    #[error("Byte source reached end of stream")]
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramerState {
    SeekStart,
    Capturing,
    AwaitTrailer,
}

/// Cuts telegrams out of an endless byte stream.
///
/// Bytes before `/` are dropped, the body is captured up to and including the
/// first `!`, and the rest of that line is taken as the checksum trailer. A `/`
/// inside a body is not special, so a broken telegram followed by a good one
/// comes out as a single frame starting at the first `/`.
pub struct TelegramFramer {
    state: FramerState,
    body: Vec<u8>,
    trailer: Vec<u8>,
    max_length: usize,
}

impl TelegramFramer {
    pub fn new(max_length: usize) -> Self {
        Self {
            state: FramerState::SeekStart,
            body: Vec::new(),
            trailer: Vec::new(),
            max_length,
        }
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Reads until one full telegram was framed. Any error abandons the frame
    /// in progress, the next call starts looking for `/` again.
    pub async fn next_telegram<S: ByteSource>(&mut self, source: &mut S) -> Result<RawTelegram, FrameError> {
        loop {
            let byte = match source.read_byte().await {
                Ok(Some(byte)) => byte,
                Ok(None) => {
                    self.reset();
                    return Err(FrameError::EndOfStream);
                }
                Err(e) => {
                    self.reset();
                    return Err(FrameError::Io(e));
                }
            };

            if let Some(telegram) = self.push(byte)? {
                return Ok(telegram);
            }
        }
    }

    /// Feeds a single byte through the state machine.
    pub fn push(&mut self, byte: u8) -> Result<Option<RawTelegram>, FrameError> {
        match self.state {
            FramerState::SeekStart => {
                if byte == START_MARKER {
                    self.body.push(byte);
                    self.state = FramerState::Capturing;
                } else {
                    trace!("Discarding byte {:#04x} outside of telegram", byte);
                }
            }
            FramerState::Capturing => {
                if self.body.len() >= self.max_length {
                    self.reset();
                    return Err(FrameError::TooLong { limit: self.max_length });
                }
                self.body.push(byte);
                if byte == END_MARKER {
                    self.state = FramerState::AwaitTrailer;
                }
            }
            FramerState::AwaitTrailer => {
                if byte == b'\n' {
                    let checksum = String::from_utf8_lossy(&self.trailer).trim().to_string();
                    let telegram = RawTelegram {
                        body: std::mem::take(&mut self.body),
                        checksum,
                    };
                    self.reset();
                    debug!("Framed telegram with {} bytes", telegram.body.len());
                    return Ok(Some(telegram));
                }
                if self.trailer.len() >= self.max_length {
                    self.reset();
                    return Err(FrameError::TooLong { limit: self.max_length });
                }
                self.trailer.push(byte);
            }
        }
        Ok(None)
    }

    fn reset(&mut self) {
        self.state = FramerState::SeekStart;
        self.body.clear();
        self.trailer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::fake::ScriptedSource;

    const TELEGRAM: &[u8] = b"/ISk5\\2MT382-1000\r\n\r\n1-0:1.8.1(000123.456*kWh)\r\n!1E2B\r\n";

    #[tokio::test]
    async fn test_frames_single_telegram() {
        let mut source = ScriptedSource::from_bytes(TELEGRAM);
        let mut framer = TelegramFramer::new(1024);

        let telegram = framer.next_telegram(&mut source).await.unwrap();
        assert_eq!(telegram.body.first(), Some(&b'/'));
        assert_eq!(telegram.body.last(), Some(&b'!'));
        assert_eq!(telegram.checksum, "1E2B");
        assert_eq!(framer.state(), FramerState::SeekStart);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn test_frames_all_telegrams_between_noise() {
        let mut source = ScriptedSource::new();
        source.push_bytes(b"\x00\xffgarbage\r\n");
        for i in 0..3u8 {
            source.push_bytes(format!("/AAA{}\r\n1-0:1.7.0(00.{}*kW)\r\n!\r\n", i, i).as_bytes());
            source.push_bytes(b"noise between!!\n");
        }

        let mut framer = TelegramFramer::new(1024);
        for i in 0..3u8 {
            let telegram = framer.next_telegram(&mut source).await.unwrap();
            assert!(telegram.text().starts_with(&format!("/AAA{}", i)));
            assert!(telegram.text().contains(&format!("(00.{}*kW)", i)));
            assert_eq!(telegram.checksum, "");
        }
        assert!(matches!(framer.next_telegram(&mut source).await, Err(FrameError::EndOfStream)));
    }

    #[tokio::test]
    async fn test_read_error_abandons_frame_and_resumes() {
        let mut source = ScriptedSource::new();
        source
            .push_bytes(b"/BROKEN\r\n1-0:1.7")
            .push_error(io::ErrorKind::TimedOut)
            .push_bytes(b".0(01.000*kW)\r\n!\r\n")
            .push_bytes(TELEGRAM);

        let mut framer = TelegramFramer::new(1024);
        let err = framer.next_telegram(&mut source).await.unwrap_err();
        assert!(matches!(err, FrameError::Io(_)));
        assert_eq!(framer.state(), FramerState::SeekStart);

        let telegram = framer.next_telegram(&mut source).await.unwrap();
        assert!(telegram.text().starts_with("/ISk5"));
        assert_eq!(telegram.checksum, "1E2B");
    }

    #[tokio::test]
    async fn test_overlong_capture_is_discarded() {
        let mut source = ScriptedSource::new();
        source.push_bytes(b"/");
        source.push_bytes(&[b'x'; 64]);
        source.push_bytes(TELEGRAM);

        let mut framer = TelegramFramer::new(32);
        let err = framer.next_telegram(&mut source).await.unwrap_err();
        assert!(matches!(err, FrameError::TooLong { limit: 32 }));

        let mut framer = TelegramFramer::new(1024);
        let telegram = framer.next_telegram(&mut source).await.unwrap();
        assert!(telegram.text().starts_with("/ISk5"));
    }

    #[tokio::test]
    async fn test_stray_start_marker_inside_body() {
        let mut source = ScriptedSource::from_bytes(b"/AAA5\r\n1-0:1.7.0(0/1)\r\n/BBB5\r\n!\r\n");
        let mut framer = TelegramFramer::new(1024);

        let telegram = framer.next_telegram(&mut source).await.unwrap();
        let text = telegram.text();
        assert!(text.starts_with("/AAA5"));
        assert!(text.contains("/BBB5"));
        assert!(matches!(framer.next_telegram(&mut source).await, Err(FrameError::EndOfStream)));
    }

    #[test]
    fn test_push_states() {
        let mut framer = TelegramFramer::new(16);
        assert!(framer.push(b'x').unwrap().is_none());
        assert_eq!(framer.state(), FramerState::SeekStart);
        framer.push(b'/').unwrap();
        assert_eq!(framer.state(), FramerState::Capturing);
        framer.push(b'!').unwrap();
        assert_eq!(framer.state(), FramerState::AwaitTrailer);
        framer.push(b'\r').unwrap();
        let telegram = framer.push(b'\n').unwrap().unwrap();
        assert_eq!(telegram.body, b"/!".to_vec());
        assert_eq!(telegram.checksum, "");
    }
}
