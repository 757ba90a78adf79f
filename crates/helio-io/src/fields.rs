use serde::{Deserialize, Serialize};

/// Attribute names read from the raw layers.
///
/// Defaults follow the Pronovo installation register and the cantonal
/// girec / communes layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    /// Installation nameplate power, in kW
    #[serde(default = "default_power")]
    pub power: String,
    /// Installation commissioning date
    #[serde(default = "default_commissioning")]
    pub commissioning: String,
    /// District identifier on the girec layer
    #[serde(default = "default_district_name")]
    pub district_name: String,
    /// Parent commune number on the girec layer
    #[serde(default = "default_commune_id")]
    pub district_commune: String,
    /// Commune number on the communes layer
    #[serde(default = "default_commune_id")]
    pub commune_id: String,
    /// Commune name on the communes layer
    #[serde(default = "default_commune_name")]
    pub commune_name: String,
}

fn default_power() -> String {
    "TotalPower".to_string()
}

fn default_commissioning() -> String {
    "BeginningOfOperation".to_string()
}

fn default_district_name() -> String {
    "NOM".to_string()
}

fn default_commune_id() -> String {
    "NO_COMM".to_string()
}

fn default_commune_name() -> String {
    "COMMUNE".to_string()
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            power: default_power(),
            commissioning: default_commissioning(),
            district_name: default_district_name(),
            district_commune: default_commune_id(),
            commune_id: default_commune_id(),
            commune_name: default_commune_name(),
        }
    }
}
