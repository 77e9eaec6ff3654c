use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref OBIS_DESCRIPTIONS: HashMap<&'static str, &'static str> = get_standard_obis_descriptions();
}

pub fn get_obis_description(obis_code: &str) -> Option<&'static str> {
    OBIS_DESCRIPTIONS.get(obis_code).copied()
}

/// Reference codes seen in DSMR P1 telegrams.
pub fn get_standard_obis_descriptions() -> HashMap<&'static str, &'static str> {
    let mut map = HashMap::new();

    // Header data
    map.insert("1-3:0.2.8", "DSMR version");
    map.insert("0-0:1.0.0", "Date and time");
    map.insert("0-0:96.1.1", "Equipment identifier");
    map.insert("0-0:96.14.0", "Tariff indicator");
    map.insert("0-0:96.13.0", "Text message");

    // Energy
    map.insert("1-0:1.8.1", "Electricity delivered to client (tariff 1)");
    map.insert("1-0:1.8.2", "Electricity delivered to client (tariff 2)");
    map.insert("1-0:2.8.1", "Electricity delivered by client (tariff 1)");
    map.insert("1-0:2.8.2", "Electricity delivered by client (tariff 2)");

    // Power
    map.insert("1-0:1.7.0", "Actual electricity power delivered");
    map.insert("1-0:2.7.0", "Actual electricity power received");
    map.insert("1-0:21.7.0", "Instantaneous active power + (L1)");
    map.insert("1-0:41.7.0", "Instantaneous active power + (L2)");
    map.insert("1-0:61.7.0", "Instantaneous active power + (L3)");

    // Voltage
    map.insert("1-0:32.7.0", "Instantaneous voltage (L1)");
    map.insert("1-0:52.7.0", "Instantaneous voltage (L2)");
    map.insert("1-0:72.7.0", "Instantaneous voltage (L3)");

    // Current
    map.insert("1-0:31.7.0", "Instantaneous current (L1)");
    map.insert("1-0:51.7.0", "Instantaneous current (L2)");
    map.insert("1-0:71.7.0", "Instantaneous current (L3)");

    // Power quality
    map.insert("0-0:96.7.21", "Number of power failures");
    map.insert("0-0:96.7.9", "Number of long power failures");
    map.insert("1-0:99.97.0", "Power failure event log");
    map.insert("1-0:32.32.0", "Number of voltage sags (L1)");
    map.insert("1-0:52.32.0", "Number of voltage sags (L2)");
    map.insert("1-0:72.32.0", "Number of voltage sags (L3)");

    // M-Bus devices, channel 1
    map.insert("0-1:24.1.0", "M-Bus device type");
    map.insert("0-1:96.1.0", "M-Bus equipment identifier");
    map.insert("0-1:24.2.1", "Gas delivered to client");

    map
}

/// Reference code of the gas reading on the given M-Bus channel.
pub fn gas_delivered_code(channel: u8) -> String {
    format!("0-{}:24.2.1", channel)
}

pub fn normalize_obis_code(code: &str) -> String {
    code.trim().to_string()
}

/// Splits `value*unit` at the last `*`. An empty unit counts as no unit.
pub fn split_value_unit(content: &str) -> (String, Option<String>) {
    match content.rfind('*') {
        Some(star_pos) => {
            let unit = &content[star_pos + 1..];
            let value = content[..star_pos].to_string();
            if unit.is_empty() {
                (value, None)
            } else {
                (value, Some(unit.to_string()))
            }
        }
        None => (content.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_obis_description() {
        assert_eq!(get_obis_description("1-0:32.7.0"), Some("Instantaneous voltage (L1)"));
        assert_eq!(get_obis_description("0-1:24.2.1"), Some("Gas delivered to client"));
        assert_eq!(get_obis_description("nonexistent"), None);
    }

    #[test]
    fn test_gas_delivered_code() {
        assert_eq!(gas_delivered_code(1), "0-1:24.2.1");
        assert_eq!(gas_delivered_code(3), "0-3:24.2.1");
    }

    #[test]
    fn test_split_value_unit() {
        assert_eq!(split_value_unit("000123.456*kWh"), ("000123.456".to_string(), Some("kWh".to_string())));
        assert_eq!(split_value_unit("12785.123*m3"), ("12785.123".to_string(), Some("m3".to_string())));
        assert_eq!(split_value_unit("0001"), ("0001".to_string(), None));
        assert_eq!(split_value_unit("123*"), ("123".to_string(), None));
        assert_eq!(split_value_unit(""), ("".to_string(), None));
    }

    #[test]
    fn test_normalize_obis_code() {
        assert_eq!(normalize_obis_code("  1-0:1.8.1  "), "1-0:1.8.1");
        assert_eq!(normalize_obis_code("1-0:15.7.0"), "1-0:15.7.0");
    }
}
