//! Service directory records. Each branch line has a location, addressing, bandwidth and
//! billing numbers; the numeric columns come from hand-edited files and may hold either
//! numbers or text.

mod search;

pub use search::{SearchMode, search};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A column that may hold a number or text. Numbers keep their JSON form, so integers
/// are written back as integers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Bool(bool),
    Text(String),
    #[default]
    Null,
}

impl FieldValue {
    /// Normalized display form. Integral numbers print without exponent or decimals,
    /// other numbers keep their fraction, null prints as an empty string.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Number(n) => display_number(n),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Null => String::new(),
        }
    }
}

fn display_number(n: &serde_json::Number) -> String {
    if n.is_f64() {
        match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
            Some(f) => f.to_string(),
            None => n.to_string(),
        }
    } else {
        n.to_string()
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRecord {
    pub location: String,
    pub wan_ip: String,
    pub lan_ip: String,
    pub connection_type: String,
    pub bandwidth: FieldValue,
    pub line_type: String,
    pub service_number: FieldValue,
    pub account_number: FieldValue,
}

impl ServiceRecord {
    /// Searchable field values, lowercased. Numeric columns use their display form.
    pub fn search_fields(&self) -> [String; 8] {
        [
            self.location.to_lowercase(),
            self.wan_ip.to_lowercase(),
            self.lan_ip.to_lowercase(),
            self.connection_type.to_lowercase(),
            self.bandwidth.display().to_lowercase(),
            self.line_type.to_lowercase(),
            self.service_number.display().to_lowercase(),
            self.account_number.display().to_lowercase(),
        ]
    }

    pub fn set(&mut self, field: ServiceField, value: &str) {
        match field {
            ServiceField::Location => self.location = value.to_string(),
            ServiceField::WanIp => self.wan_ip = value.to_string(),
            ServiceField::LanIp => self.lan_ip = value.to_string(),
            ServiceField::ConnectionType => self.connection_type = value.to_string(),
            ServiceField::Bandwidth => self.bandwidth = value.into(),
            ServiceField::LineType => self.line_type = value.to_string(),
            ServiceField::ServiceNumber => self.service_number = value.into(),
            ServiceField::AccountNumber => self.account_number = value.into(),
        }
    }

    /// LAN IP comparison used to pick records for an update
    pub fn has_lan_ip(&self, lan_ip: &str) -> bool {
        self.lan_ip.trim().eq_ignore_ascii_case(lan_ip.trim())
    }
}

/// Updatable column of a [`ServiceRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    Location,
    WanIp,
    LanIp,
    ConnectionType,
    Bandwidth,
    LineType,
    ServiceNumber,
    AccountNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for ServiceField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "location" => Ok(ServiceField::Location),
            "wanip" => Ok(ServiceField::WanIp),
            "lanip" => Ok(ServiceField::LanIp),
            "connectiontype" => Ok(ServiceField::ConnectionType),
            "bandwidth" => Ok(ServiceField::Bandwidth),
            "linetype" => Ok(ServiceField::LineType),
            "servicenumber" => Ok(ServiceField::ServiceNumber),
            "accountnumber" => Ok(ServiceField::AccountNumber),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}
