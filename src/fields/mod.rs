//! Date and path fields read from (and written into) settings text.
//!
//! Fields are looked up by key anywhere in the document, case-insensitively,
//! on non-comment lines containing `=`. When a key repeats, the last line
//! wins. Updates rewrite matching lines in place and leave every other line
//! untouched.

mod dates;

pub use dates::{DEFAULT_OUTPUT_FORMAT, DateRange, SimulationDates, format_date, parse_date};

use crate::highlight::split_key_value;

/// Date keys recognised by the synchronizer.
pub const DATE_KEYS: [&str; 3] = ["stepstart", "spinup", "stepend"];
/// Path keys recognised by the synchronizer.
pub const PATH_KEYS: [&str; 2] = ["pathout", "maskmap"];

/// Literal date values, exactly as written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DateFields {
    pub stepstart: Option<String>,
    pub spinup: Option<String>,
    pub stepend: Option<String>,
}

/// Literal path values, exactly as written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathFields {
    pub pathout: Option<String>,
    pub maskmap: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldValues {
    pub dates: DateFields,
    pub paths: PathFields,
}

impl FieldValues {
    /// Extract date and path fields from settings text.
    #[must_use]
    pub fn extract(text: &str) -> Self {
        let mut values = Self::default();
        for line in text.split('\n') {
            let Some((key, value)) = split_key_value(line) else {
                continue;
            };
            let value = Some(value.trim().to_string());
            match key.trim().to_lowercase().as_str() {
                "stepstart" => values.dates.stepstart = value,
                "spinup" => values.dates.spinup = value,
                "stepend" => values.dates.stepend = value,
                "pathout" => values.paths.pathout = value,
                "maskmap" => values.paths.maskmap = value,
                _ => {}
            }
        }
        values
    }

    #[must_use]
    pub fn simulation_dates(&self) -> SimulationDates {
        SimulationDates::from_fields(&self.dates)
    }
}

/// Zero-based line number of the first line setting `key`.
#[must_use]
pub fn find_parameter_line(text: &str, key: &str) -> Option<usize> {
    text.split('\n').position(|line| {
        split_key_value(line).is_some_and(|(k, _)| k.trim().eq_ignore_ascii_case(key))
    })
}

/// Rewrite every line whose key matches one of `updates` (case-insensitive)
/// as `"{key part}= {value}"`. A trailing `\r` is kept.
#[must_use]
pub fn update_fields<K, V>(text: &str, updates: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    text.split('\n')
        .map(|line| {
            let Some((key, _)) = split_key_value(line) else {
                return line.to_string();
            };
            let wanted = key.trim();
            match updates
                .iter()
                .find(|(k, _)| k.as_ref().eq_ignore_ascii_case(wanted))
            {
                Some((_, value)) => {
                    let cr = if line.ends_with('\r') { "\r" } else { "" };
                    format!("{key}= {}{cr}", value.as_ref())
                }
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `range` into the date keys using `pattern`.
#[must_use]
pub fn apply_dates(text: &str, range: &DateRange, pattern: &str) -> String {
    update_fields(text, &range.formatted(pattern))
}
