use crate::config::Config;
use crate::metrics::{now_timestamp, Extraction, MetricExtractor, MetricField, SnapshotStore};
use crate::serial::{self, backoff::BackoffController, ByteSource, SerialError};
use crate::telegram::{parse_telegram, FrameError, RawTelegram, TelegramFramer};
use log::{debug, error, info, warn};
use std::io;
use std::sync::Arc;
use thiserror::Error;

#[cfg(feature = "checksum")]
use crate::telegram::utils;

/// Why ingestion stopped. Every variant leaves the store at its last value.
#[derive(Error, Debug)]
pub enum ReaderExit {
    #[error("Serial port unavailable: {0}")]
    Open(#[from] SerialError),
    #[error("Unrecoverable read error: {0}")]
    Fatal(io::Error),
    #[error("Byte source reached end of stream")]
    EndOfStream,
}

/// Background worker that feeds telegrams from the meter into the store.
pub struct MeterReader {
    config: Config,
    store: Arc<SnapshotStore>,
    framer: TelegramFramer,
    extractor: MetricExtractor,
    backoff: BackoffController,
}

impl MeterReader {
    pub fn new(config: &Config, store: Arc<SnapshotStore>) -> Self {
        let extractor = MetricExtractor::new(config.telegram.gas_channel);
        if let Some(code) = extractor.code_for(MetricField::GasDelivered) {
            info!("Reading gas from {}", code);
        }

        Self {
            config: config.clone(),
            store,
            framer: TelegramFramer::new(config.telegram.max_telegram_length),
            extractor,
            backoff: BackoffController::new(config.backoff.initial_ms, config.backoff.max_ms),
        }
    }

    /// Opens the serial device and reads until the device is gone. Returning
    /// only stops ingestion, the HTTP side keeps serving the last snapshot.
    pub async fn start_thread(&mut self) -> ReaderExit {
        info!("Starting P1 reader thread");

        let exit = match serial::open_port(&self.config.serial) {
            Ok(mut source) => self.run(&mut source).await,
            Err(e) => ReaderExit::Open(e),
        };

        error!("P1 reader stopped, serving last known values from now on: {}", exit);
        exit
    }

    pub async fn run<S: ByteSource>(&mut self, source: &mut S) -> ReaderExit {
        loop {
            match self.framer.next_telegram(source).await {
                Ok(raw) => {
                    self.backoff.mark_success();
                    if let Some(extraction) = self.process(&raw) {
                        self.store.update(extraction.snapshot);
                    }
                }
                Err(FrameError::Io(e)) if serial::is_fatal(&e) => {
                    return ReaderExit::Fatal(e);
                }
                Err(FrameError::Io(e)) => {
                    let delay = self.backoff.mark_failure();
                    warn!("Read failed, retrying in {:?}: {}", delay, e);
                    tokio::time::sleep(delay).await;
                }
                Err(FrameError::EndOfStream) => {
                    return ReaderExit::EndOfStream;
                }
                Err(e) => {
                    warn!("{}", e);
                }
            }
        }
    }

    /// Turns one framed telegram into the next snapshot, based on what the
    /// store currently holds.
    pub fn process(&self, raw: &RawTelegram) -> Option<Extraction> {
        let timestamp = now_timestamp();

        if !self.checksum_ok(raw) {
            return None;
        }

        let telegram = parse_telegram(&raw.text());
        let extraction = self.extractor.extract(&telegram, &self.store.get(), timestamp);
        debug!(
            "Telegram applied: {} fields updated, {} values rejected",
            extraction.updated.len(),
            extraction.failed.len()
        );
        Some(extraction)
    }

    #[cfg(feature = "checksum")]
    fn checksum_ok(&self, raw: &RawTelegram) -> bool {
        if !self.config.telegram.verify_checksum {
            debug!("Checksum {:?} not verified", raw.checksum);
            return true;
        }

        match utils::verify_checksum(&raw.body, &raw.checksum) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping telegram: {}", e);
                false
            }
        }
    }

    #[cfg(not(feature = "checksum"))]
    fn checksum_ok(&self, _raw: &RawTelegram) -> bool {
        if self.config.telegram.verify_checksum {
            warn!("Checksum verification requested but built without the checksum feature");
        }
        true
    }
}
