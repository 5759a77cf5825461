//! Free-text address to delivery-zone matching.
//!
//! The storefront lets users type their address; this matcher pre-selects a
//! delivery zone from keywords in the text so the checkout form starts with a
//! sensible default. Matching is best-effort: an unmatched address simply
//! yields `None` and the user picks manually.

use serde::{Deserialize, Serialize};

/// A zone the service delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryZone {
    /// Islamabad proper: the lettered sectors and Blue Area.
    Islamabad,
    /// Rawalpindi city, including Saddar and the cantonment.
    Rawalpindi,
    /// Bahria Town phases.
    BahriaTown,
    /// DHA Islamabad phases.
    Dha,
}

impl DeliveryZone {
    /// Human-readable zone label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Islamabad => "Islamabad",
            Self::Rawalpindi => "Rawalpindi",
            Self::BahriaTown => "Bahria Town",
            Self::Dha => "DHA",
        }
    }
}

impl core::fmt::Display for DeliveryZone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword table searched in order; earlier entries win, so sub-zones that
/// sit inside a larger city (Bahria, DHA) come before the city names.
const ZONE_KEYWORDS: &[(&str, DeliveryZone)] = &[
    ("bahria", DeliveryZone::BahriaTown),
    ("dha", DeliveryZone::Dha),
    ("saddar", DeliveryZone::Rawalpindi),
    ("rawalpindi", DeliveryZone::Rawalpindi),
    ("rwp", DeliveryZone::Rawalpindi),
    ("blue area", DeliveryZone::Islamabad),
    ("islamabad", DeliveryZone::Islamabad),
    ("isb", DeliveryZone::Islamabad),
    ("e-7", DeliveryZone::Islamabad),
    ("e-11", DeliveryZone::Islamabad),
    ("f-6", DeliveryZone::Islamabad),
    ("f-7", DeliveryZone::Islamabad),
    ("f-8", DeliveryZone::Islamabad),
    ("f-10", DeliveryZone::Islamabad),
    ("f-11", DeliveryZone::Islamabad),
    ("g-6", DeliveryZone::Islamabad),
    ("g-7", DeliveryZone::Islamabad),
    ("g-8", DeliveryZone::Islamabad),
    ("g-9", DeliveryZone::Islamabad),
    ("g-10", DeliveryZone::Islamabad),
    ("g-11", DeliveryZone::Islamabad),
    ("i-8", DeliveryZone::Islamabad),
    ("i-9", DeliveryZone::Islamabad),
    ("i-10", DeliveryZone::Islamabad),
];

/// Match a free-text address to a delivery zone.
///
/// The address is lowercased and runs of whitespace are collapsed before
/// keyword search, so `"Blue  AREA"` still matches. Returns `None` when no
/// keyword is found.
#[must_use]
pub fn match_zone(address: &str) -> Option<DeliveryZone> {
    let normalized = normalize(address);
    ZONE_KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|&(_, zone)| zone)
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
