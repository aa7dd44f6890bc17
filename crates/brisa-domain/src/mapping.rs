use crate::types::{Parameter, Station};
use std::collections::HashMap;

/// Identity of a catalog parameter as carried through the forwarding path.
#[derive(Debug, Clone, PartialEq)]
struct ParameterIdentity {
    id: i64,
    name: String,
}

/// One raw field resolved against a station's parameter mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub parameter_id: i64,
    pub parameter_name: String,
    pub value: f64,
}

/// Mapping from raw field key to catalog parameter, scoped to one station's
/// sensor bindings. Derived fresh each reconciliation pass, never persisted.
#[derive(Debug, Clone, Default)]
pub struct ParameterMapping {
    entries: HashMap<String, ParameterIdentity>,
}

/// Derive the raw field key for a parameter display name: lowercased,
/// keeping only ASCII alphanumerics and underscores.
pub fn derive_field_key(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// The raw field key under which a parameter's readings arrive: the key
/// configured in the catalog when present, otherwise derived from the
/// display name.
pub fn parameter_field_key(parameter: &Parameter) -> String {
    match parameter.field_key.as_deref() {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => derive_field_key(&parameter.name),
    }
}

impl ParameterMapping {
    /// Build the mapping for one station from the full parameter catalog.
    ///
    /// Only parameters bound to the station through a sensor are included;
    /// sensors whose parameter is missing from the catalog are skipped.
    pub fn for_station(station: &Station, parameters: &[Parameter]) -> Self {
        let by_id: HashMap<i64, &Parameter> = parameters.iter().map(|p| (p.id, p)).collect();

        let mut entries = HashMap::new();
        for sensor in &station.sensors {
            let Some(parameter) = by_id.get(&sensor.parameter_id) else {
                continue;
            };
            let key = parameter_field_key(parameter);
            if key.is_empty() {
                continue;
            }
            entries.insert(
                key,
                ParameterIdentity {
                    id: parameter.id,
                    name: parameter.name.clone(),
                },
            );
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filter raw fields down to the (parameter, value) pairs known to this
    /// mapping. Unmapped fields are dropped without error; so are mapped
    /// fields whose value is not numeric.
    pub fn resolve(
        &self,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Vec<ResolvedField> {
        fields
            .iter()
            .filter_map(|(key, value)| {
                let identity = self.entries.get(key)?;
                let value = value.as_f64()?;
                Some(ResolvedField {
                    parameter_id: identity.id,
                    parameter_name: identity.name.clone(),
                    value,
                })
            })
            .collect()
    }
}
