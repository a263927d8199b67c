//! Closed vocabularies used throughout the pipeline.
//!
//! Language, incident domain and severity are all fixed sets. Keeping them
//! as enums means every lookup table keyed on them is checked by `match`
//! exhaustiveness rather than by string keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source language of a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    En,

    /// Hindi (Devanagari script)
    Hi,

    /// Tamil (Tamil script)
    Ta,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Ta];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Ta => "ta",
        }
    }

    /// Parse a language code, accepting only the three supported languages
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "hi" | "hindi" => Some(Self::Hi),
            "ta" | "tamil" => Some(Self::Ta),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Incident category a field observation is filed under.
///
/// Variant order is the canonical enumeration order; classification ties are
/// broken in favour of the variant listed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    PestOutbreak,
    CropDisease,
    WaterStress,
    SoilIssue,
    WeatherAlert,
    IrrigationProblem,
}

impl Domain {
    /// Canonical enumeration order
    pub const ALL: [Domain; 6] = [
        Domain::PestOutbreak,
        Domain::CropDisease,
        Domain::WaterStress,
        Domain::SoilIssue,
        Domain::WeatherAlert,
        Domain::IrrigationProblem,
    ];

    /// Wire tag (e.g. `pest_outbreak`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PestOutbreak => "pest_outbreak",
            Self::CropDisease => "crop_disease",
            Self::WaterStress => "water_stress",
            Self::SoilIssue => "soil_issue",
            Self::WeatherAlert => "weather_alert",
            Self::IrrigationProblem => "irrigation_problem",
        }
    }

    /// Fixed English sentence used in synthesized summaries
    pub fn description(&self) -> &'static str {
        match self {
            Self::PestOutbreak => "Pest outbreak detected",
            Self::CropDisease => "Crop disease identified",
            Self::WaterStress => "Water stress reported",
            Self::SoilIssue => "Soil issue detected",
            Self::WeatherAlert => "Weather alert issued",
            Self::IrrigationProblem => "Irrigation problem reported",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown domain '{}'", s))
    }
}

/// Urgency tier, totally ordered `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// High and critical reports are flagged for immediate action
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| format!("unknown severity '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert!(Severity::Critical.is_urgent());
        assert!(!Severity::Medium.is_urgent());
    }

    #[test]
    fn test_domain_wire_format() {
        let json = serde_json::to_string(&Domain::IrrigationProblem).unwrap();
        assert_eq!(json, "\"irrigation_problem\"");

        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
        assert!("drought".parse::<Domain>().is_err());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("HI"), Some(Language::Hi));
        assert_eq!(Language::from_code("tamil"), Some(Language::Ta));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(serde_json::to_string(&Language::Ta).unwrap(), "\"ta\"");
    }
}
