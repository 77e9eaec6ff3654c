use std::collections::HashMap;

/// One framed telegram as it came off the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTelegram {
    /// Everything from `/` through `!`, both included
    pub body: Vec<u8>,
    /// Trailer line after `!` without line terminators, empty when the meter sends no CRC
    pub checksum: String,
}

impl RawTelegram {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceIdentification {
    pub manufacturer: String,
    pub identification: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataObject {
    pub code: String,
    /// Raw value of the last group, kept as text until extraction
    pub value: String,
    pub unit: Option<String>,
    /// Raw content of the groups in front of the value, e.g. the capture time of a gas reading
    pub captures: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Telegram {
    pub identification: Option<DeviceIdentification>,
    pub objects: HashMap<String, DataObject>,
    pub skipped_lines: Vec<String>,
}

impl Telegram {
    pub fn get(&self, code: &str) -> Option<&DataObject> {
        self.objects.get(code)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
