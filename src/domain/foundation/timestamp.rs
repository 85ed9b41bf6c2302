//! UTC instants for session starts and submission records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// RFC 3339 with second precision, as exposed over HTTP.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 18, 14, 5, 9).unwrap().into()
    }

    #[test]
    fn renders_second_precision_with_zulu_suffix() {
        assert_eq!(fixed().to_rfc3339(), "2024-03-18T14:05:09Z");
        assert_eq!(fixed().to_string(), "2024-03-18T14:05:09Z");
    }

    #[test]
    fn serializes_as_a_plain_string() {
        let json = serde_json::to_value(fixed()).unwrap();
        assert!(json.as_str().unwrap().starts_with("2024-03-18T14:05:09"));
        let back: Timestamp = serde_json::from_value(json).unwrap();
        assert_eq!(back, fixed());
    }

    #[test]
    fn now_is_monotone_enough_for_ordering() {
        let earlier = fixed();
        assert!(earlier < Timestamp::now());
    }
}
