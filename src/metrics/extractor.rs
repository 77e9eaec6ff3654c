use super::{MetricField, MetricsSnapshot};
use crate::obis_utils;
use crate::telegram::Telegram;
use log::{debug, warn};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Value {value:?} of {code} is not a number")]
    NotANumber { code: String, value: String },
}

/// Result of applying one telegram to the previous snapshot.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub snapshot: MetricsSnapshot,
    pub updated: Vec<MetricField>,
    pub failed: Vec<ExtractError>,
}

/// Maps known reference codes onto snapshot fields.
pub struct MetricExtractor {
    table: Vec<(String, MetricField)>,
}

impl MetricExtractor {
    pub fn new(gas_channel: u8) -> Self {
        let mut table: Vec<(String, MetricField)> = [
            ("1-0:1.7.0", MetricField::CurrentPowerConsumption),
            ("1-0:32.7.0", MetricField::InstVoltL1),
            ("1-0:52.7.0", MetricField::InstVoltL2),
            ("1-0:72.7.0", MetricField::InstVoltL3),
            ("1-0:31.7.0", MetricField::InstCurrentL1),
            ("1-0:51.7.0", MetricField::InstCurrentL2),
            ("1-0:71.7.0", MetricField::InstCurrentL3),
            ("1-0:1.8.1", MetricField::PowerDeliveredTariff1),
            ("1-0:1.8.2", MetricField::PowerDeliveredTariff2),
        ]
        .iter()
        .map(|(code, field)| (code.to_string(), *field))
        .collect();

        table.push((obis_utils::gas_delivered_code(gas_channel), MetricField::GasDelivered));
        MetricExtractor { table }
    }

    pub fn code_for(&self, field: MetricField) -> Option<&str> {
        self.table
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(code, _)| code.as_str())
    }

    /// Builds the next snapshot. Fields whose code is missing from the
    /// telegram, or whose value does not parse, keep their previous value.
    /// The timestamp is always replaced.
    pub fn extract(&self, telegram: &Telegram, previous: &MetricsSnapshot, timestamp: String) -> Extraction {
        let mut snapshot = previous.clone();
        snapshot.timestamp = timestamp;

        let mut updated = Vec::new();
        let mut failed = Vec::new();

        for (code, field) in &self.table {
            let Some(object) = telegram.get(code) else {
                continue;
            };

            match parse_value(code, &object.value) {
                Ok(value) => {
                    debug!(
                        "{} ({}) = {}, was {}",
                        code,
                        obis_utils::get_obis_description(code).unwrap_or("unknown"),
                        value,
                        field.get(&snapshot)
                    );
                    field.set(&mut snapshot, value);
                    updated.push(*field);
                }
                Err(e) => {
                    warn!("Not updating {:?}: {}", field, e);
                    failed.push(e);
                }
            }
        }

        Extraction {
            snapshot,
            updated,
            failed,
        }
    }
}

/// Only finite numbers count, `NaN` and `inf` would end up as `null` in JSON.
fn parse_value(code: &str, raw: &str) -> Result<f64, ExtractError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ExtractError::NotANumber {
            code: code.to_string(),
            value: raw.to_string(),
        }),
    }
}
