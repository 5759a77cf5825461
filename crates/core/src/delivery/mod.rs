//! Delivery-domain types: working hours and zone matching.

pub mod zone;

pub use zone::{DeliveryZone, match_zone};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// The delivery service's daily operating window.
///
/// Wire shape is `{"open_time": "HH:MM", "close_time": "HH:MM",
/// "timezone": …}`; the backend also emits seconds, which the parser
/// accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Opening time, local to `timezone`.
    #[serde(rename = "open_time", with = "hhmm")]
    pub open: NaiveTime,
    /// Closing time, local to `timezone`. May be earlier than `open` for an
    /// overnight window.
    #[serde(rename = "close_time", with = "hhmm")]
    pub close: NaiveTime,
    /// IANA timezone name the window is expressed in.
    pub timezone: String,
}

impl WorkingHours {
    /// Whether the service is open at the given local time.
    ///
    /// A window with `close` earlier than `open` spans midnight. Equal open
    /// and close times mean closed all day.
    #[must_use]
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        if self.open <= self.close {
            self.open <= time && time < self.close
        } else {
            time >= self.open || time < self.close
        }
    }
}

/// Serde adapter for `HH:MM` clock times.
///
/// Serializes without seconds; deserializes both `HH:MM` and `HH:MM:SS`.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M"))
            .map_err(de::Error::custom)
    }
}
