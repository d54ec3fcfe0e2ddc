//! Treatment types and the clinical protocols that have step catalogs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Assisted-reproduction protocol with a defined step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "IUI")]
    Iui,
    #[serde(rename = "IVF")]
    Ivf,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Iui => "IUI",
            Protocol::Ivf => "IVF",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The treatment type recorded on a treatment.
///
/// Anything other than IUI or IVF is kept verbatim; such treatments have no
/// step catalog and are exempt from the consent gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TreatmentType {
    Iui,
    Ivf,
    Other(String),
}

impl TreatmentType {
    /// Returns the protocol whose catalog applies, if any.
    pub fn protocol(&self) -> Option<Protocol> {
        match self {
            TreatmentType::Iui => Some(Protocol::Iui),
            TreatmentType::Ivf => Some(Protocol::Ivf),
            TreatmentType::Other(_) => None,
        }
    }

    /// Returns true for the types gated on signed consent.
    pub fn requires_consent(&self) -> bool {
        self.protocol().is_some()
    }
}

impl From<Protocol> for TreatmentType {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Iui => TreatmentType::Iui,
            Protocol::Ivf => TreatmentType::Ivf,
        }
    }
}

impl From<String> for TreatmentType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IUI" => TreatmentType::Iui,
            "IVF" => TreatmentType::Ivf,
            _ => TreatmentType::Other(raw),
        }
    }
}

impl From<TreatmentType> for String {
    fn from(tt: TreatmentType) -> Self {
        tt.to_string()
    }
}

impl fmt::Display for TreatmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreatmentType::Iui => write!(f, "IUI"),
            TreatmentType::Ivf => write!(f, "IVF"),
            TreatmentType::Other(raw) => write!(f, "{}", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(TreatmentType::from("ivf".to_string()), TreatmentType::Ivf);
        assert_eq!(TreatmentType::from(" IUI ".to_string()), TreatmentType::Iui);
    }

    #[test]
    fn unknown_types_are_preserved() {
        let tt = TreatmentType::from("ICSI-only".to_string());
        assert_eq!(tt, TreatmentType::Other("ICSI-only".to_string()));
        assert_eq!(tt.protocol(), None);
        assert!(!tt.requires_consent());
    }

    #[test]
    fn iui_and_ivf_require_consent() {
        assert!(TreatmentType::Iui.requires_consent());
        assert!(TreatmentType::Ivf.requires_consent());
    }

    #[test]
    fn deserializes_from_json_string() {
        let tt: TreatmentType = serde_json::from_str("\"IVF\"").unwrap();
        assert_eq!(tt.protocol(), Some(Protocol::Ivf));
        assert_eq!(serde_json::to_string(&tt).unwrap(), "\"IVF\"");
    }
}
