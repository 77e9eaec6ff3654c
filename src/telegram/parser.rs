use super::structs::{DataObject, Telegram};
use super::utils;
use crate::obis_utils;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use thiserror::Error;

lazy_static! {
    // A-B:C.D.E followed by one or more (...) groups, nothing else on the line
    static ref DATA_LINE: Regex = Regex::new(r"^(\d{1,3}-\d{1,3}:\d{1,3}\.\d{1,3}\.\d{1,3})((?:\([^()]*\))+)$").unwrap();
    static ref GROUP: Regex = Regex::new(r"\(([^()]*)\)").unwrap();
}

#[derive(Error, Debug, PartialEq)]
pub enum LineError {
    #[error("Line does not match <code>(<value>[*<unit>])...: {0:?}")]
    InvalidDataLine(String),
}

/// Parses a single data line such as `1-0:32.7.0(230.1*V)` or
/// `0-1:24.2.1(101209112500W)(12785.123*m3)`.
pub fn parse_data_line(line: &str) -> Result<DataObject, LineError> {
    let line = line.trim();
    let caps = DATA_LINE
        .captures(line)
        .ok_or_else(|| LineError::InvalidDataLine(line.to_string()))?;

    let code = obis_utils::normalize_obis_code(&caps[1]);
    let mut groups: Vec<String> = GROUP
        .captures_iter(&caps[2])
        .map(|g| g[1].to_string())
        .collect();

    // the regex guarantees at least one group
    let last = groups.pop().unwrap_or_default();
    let (value, unit) = obis_utils::split_value_unit(&last);

    Ok(DataObject {
        code,
        value,
        unit,
        captures: groups,
    })
}

/// Parses a framed telegram body. The identification line and blank lines are
/// not data; lines that do not parse are logged and remembered, the rest of
/// the telegram is still used.
pub fn parse_telegram(text: &str) -> Telegram {
    let mut telegram = Telegram::default();
    let mut lines = text.lines();

    if let Some(header) = lines.next() {
        match utils::parse_identification_line(header) {
            Ok(identification) => telegram.identification = Some(identification),
            Err(e) => debug!("Unusable identification line {:?}: {}", header, e),
        }
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('!') {
            break;
        }

        match parse_data_line(line) {
            Ok(object) => {
                if telegram.objects.contains_key(&object.code) {
                    debug!("Reference code {} repeated, keeping the later value", object.code);
                }
                telegram.objects.insert(object.code.clone(), object);
            }
            Err(e) => {
                warn!("Skipping telegram line: {}", e);
                telegram.skipped_lines.push(line.to_string());
            }
        }
    }

    debug!(
        "Parsed telegram with {} data objects, {} lines skipped",
        telegram.objects.len(),
        telegram.skipped_lines.len()
    );
    telegram
}
