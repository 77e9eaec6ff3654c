use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

pub mod extractor;
pub mod store;

pub use extractor::{Extraction, MetricExtractor};
pub use store::SnapshotStore;

/// Latest known values of the meter, serialized as the `/data` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub current_power_consumption: f64,
    pub inst_volt_l1: f64,
    pub inst_volt_l2: f64,
    pub inst_volt_l3: f64,
    pub inst_current_l1: f64,
    pub inst_current_l2: f64,
    pub inst_current_l3: f64,
    pub gas_delivered: f64,
    pub power_delivered_tariff1: f64,
    pub power_delivered_tariff2: f64,
}

impl MetricsSnapshot {
    /// All values zero, stamped with the current time.
    pub fn new() -> Self {
        MetricsSnapshot {
            timestamp: now_timestamp(),
            ..Default::default()
        }
    }
}

/// Snapshot fields that are filled from telegram values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    CurrentPowerConsumption,
    InstVoltL1,
    InstVoltL2,
    InstVoltL3,
    InstCurrentL1,
    InstCurrentL2,
    InstCurrentL3,
    GasDelivered,
    PowerDeliveredTariff1,
    PowerDeliveredTariff2,
}

impl MetricField {
    pub fn set(&self, snapshot: &mut MetricsSnapshot, value: f64) {
        match self {
            MetricField::CurrentPowerConsumption => snapshot.current_power_consumption = value,
            MetricField::InstVoltL1 => snapshot.inst_volt_l1 = value,
            MetricField::InstVoltL2 => snapshot.inst_volt_l2 = value,
            MetricField::InstVoltL3 => snapshot.inst_volt_l3 = value,
            MetricField::InstCurrentL1 => snapshot.inst_current_l1 = value,
            MetricField::InstCurrentL2 => snapshot.inst_current_l2 = value,
            MetricField::InstCurrentL3 => snapshot.inst_current_l3 = value,
            MetricField::GasDelivered => snapshot.gas_delivered = value,
            MetricField::PowerDeliveredTariff1 => snapshot.power_delivered_tariff1 = value,
            MetricField::PowerDeliveredTariff2 => snapshot.power_delivered_tariff2 = value,
        }
    }

    pub fn get(&self, snapshot: &MetricsSnapshot) -> f64 {
        match self {
            MetricField::CurrentPowerConsumption => snapshot.current_power_consumption,
            MetricField::InstVoltL1 => snapshot.inst_volt_l1,
            MetricField::InstVoltL2 => snapshot.inst_volt_l2,
            MetricField::InstVoltL3 => snapshot.inst_volt_l3,
            MetricField::InstCurrentL1 => snapshot.inst_current_l1,
            MetricField::InstCurrentL2 => snapshot.inst_current_l2,
            MetricField::InstCurrentL3 => snapshot.inst_current_l3,
            MetricField::GasDelivered => snapshot.gas_delivered,
            MetricField::PowerDeliveredTariff1 => snapshot.power_delivered_tariff1,
            MetricField::PowerDeliveredTariff2 => snapshot.power_delivered_tariff2,
        }
    }
}

/// RFC 3339 with local offset and second precision, e.g. `2026-10-16T12:00:00+02:00`.
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}
