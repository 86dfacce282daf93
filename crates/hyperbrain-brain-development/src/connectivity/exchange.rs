// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
JSON export/import of the manager's registry, patterns and connection records.

```json
{
  "version": 1,
  "regions": { "v1": 0, "v2": 1 },
  "patterns": { "cortical_feedforward": { "topology": "feedforward", ... } },
  "connections": [ { "id": 0, "source": "v1", "target": "v2", ... } ]
}
```

Import parses and validates the whole document before touching the
manager. Unknown fields are reported as warnings, never as errors.
*/

use super::connection::RegionConnection;
use super::manager::ConnectivityManager;
use super::connection::CONNECTION_FIELDS;
use super::parameters::{ConnectionParameters, PARAMETER_FIELDS};
use crate::types::{BduError, BduResult};
use hyperbrain_npu_neural::RegionId;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

pub const CONNECTIVITY_DOCUMENT_VERSION: u64 = 1;

const TOP_LEVEL_FIELDS: &[&str] = &["version", "regions", "patterns", "connections"];

/// What an import applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub regions: usize,
    pub patterns: usize,
    pub connections: usize,
    pub warnings: Vec<String>,
}

impl ConnectivityManager {
    pub fn export_json(&self) -> Value {
        let regions: BTreeMap<String, u32> = self
            .regions
            .read()
            .iter()
            .map(|(name, id)| (name.clone(), id.0))
            .collect();
        let patterns: BTreeMap<String, ConnectionParameters> = self
            .patterns
            .read()
            .iter()
            .map(|(name, params)| (name.clone(), params.clone()))
            .collect();
        let connections = self.connections.lock().clone();
        json!({
            "version": CONNECTIVITY_DOCUMENT_VERSION,
            "regions": regions,
            "patterns": patterns,
            "connections": connections,
        })
    }

    /// Merge a document produced by [`ConnectivityManager::export_json`].
    ///
    /// Regions and patterns are upserted by name; connection records replace
    /// records with the same (source, target, topology) or are appended.
    pub fn import_json(&self, document: &Value) -> BduResult<ImportReport> {
        let parsed = parse_document(document)?;
        let report = ImportReport {
            regions: parsed.regions.len(),
            patterns: parsed.patterns.len(),
            connections: parsed.connections.len(),
            warnings: parsed.warnings,
        };

        {
            let mut regions = self.regions.write();
            for (name, id) in parsed.regions {
                regions.insert(name, id);
            }
        }
        {
            let mut patterns = self.patterns.write();
            for (name, params) in parsed.patterns {
                patterns.insert(name, params);
            }
        }
        {
            let mut connections = self.connections.lock();
            for incoming in parsed.connections {
                match connections.iter_mut().find(|c| c.key() == incoming.key()) {
                    Some(existing) => *existing = incoming,
                    None => connections.push(incoming),
                }
            }
            let total: usize = connections.iter().map(|c| c.synapse_count).sum();
            self.total_synapses.store(total as u64, Ordering::Relaxed);
            let next_id = connections.iter().map(|c| c.id + 1).max().unwrap_or(0);
            self.next_connection_id.fetch_max(next_id, Ordering::Relaxed);
        }

        for warning in &report.warnings {
            warn!(target: "hyperbrain-bdu", "Connectivity import: {}", warning);
        }
        info!(
            target: "hyperbrain-bdu",
            "Imported {} regions, {} patterns, {} connections ({} warnings)",
            report.regions,
            report.patterns,
            report.connections,
            report.warnings.len()
        );
        Ok(report)
    }
}

struct ParsedDocument {
    regions: Vec<(String, RegionId)>,
    patterns: Vec<(String, ConnectionParameters)>,
    connections: Vec<RegionConnection>,
    warnings: Vec<String>,
}

fn parse_document(document: &Value) -> BduResult<ParsedDocument> {
    let invalid = |msg: String| BduError::InvalidDocument(msg);
    let root = document
        .as_object()
        .ok_or_else(|| invalid("document must be a JSON object".into()))?;

    let mut warnings = unknown_fields(root, TOP_LEVEL_FIELDS, "document");

    if let Some(version) = root.get("version") {
        match version.as_u64() {
            Some(CONNECTIVITY_DOCUMENT_VERSION) => {}
            _ => {
                return Err(invalid(format!(
                    "unsupported version {} (expected {})",
                    version, CONNECTIVITY_DOCUMENT_VERSION
                )))
            }
        }
    }

    let mut regions = Vec::new();
    if let Some(value) = root.get("regions") {
        let map = value
            .as_object()
            .ok_or_else(|| invalid("'regions' must be an object".into()))?;
        for (name, id) in map {
            let id = id
                .as_u64()
                .and_then(|id| u32::try_from(id).ok())
                .ok_or_else(|| invalid(format!("region '{}' has an invalid id {}", name, id)))?;
            regions.push((name.clone(), RegionId(id)));
        }
    }

    let mut patterns = Vec::new();
    if let Some(value) = root.get("patterns") {
        let map = value
            .as_object()
            .ok_or_else(|| invalid("'patterns' must be an object".into()))?;
        for (name, raw) in map {
            let fields = raw
                .as_object()
                .ok_or_else(|| invalid(format!("pattern '{}' must be an object", name)))?;
            warnings.extend(unknown_fields(
                fields,
                PARAMETER_FIELDS,
                &format!("pattern '{}'", name),
            ));
            let params: ConnectionParameters = serde_json::from_value(raw.clone())
                .map_err(|e| invalid(format!("pattern '{}': {}", name, e)))?;
            params.validate()?;
            patterns.push((name.clone(), params));
        }
    }

    let mut connections = Vec::new();
    if let Some(value) = root.get("connections") {
        let list = value
            .as_array()
            .ok_or_else(|| invalid("'connections' must be an array".into()))?;
        for (index, raw) in list.iter().enumerate() {
            if let Some(fields) = raw.as_object() {
                warnings.extend(unknown_fields(
                    fields,
                    CONNECTION_FIELDS,
                    &format!("connection #{}", index),
                ));
            }
            let connection: RegionConnection = serde_json::from_value(raw.clone())
                .map_err(|e| invalid(format!("connection #{}: {}", index, e)))?;
            connections.push(connection);
        }
    }

    Ok(ParsedDocument {
        regions,
        patterns,
        connections,
        warnings,
    })
}

fn unknown_fields(map: &Map<String, Value>, known: &[&str], context: &str) -> Vec<String> {
    map.keys()
        .filter(|key| !known.contains(&key.as_str()))
        .map(|key| format!("unknown field '{}' in {}", key, context))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::parameters::TopologyType;

    #[test]
    fn test_unknown_fields_are_warnings() {
        let manager = ConnectivityManager::new();
        let doc = json!({
            "version": 1,
            "regions": { "a": 0 },
            "patterns": { "p": { "topology": "lateral", "colour": "blue" } },
            "extra": true,
        });
        let report = manager.import_json(&doc).unwrap();
        assert_eq!(report.regions, 1);
        assert_eq!(report.patterns, 1);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(manager.pattern("p").unwrap().topology, TopologyType::Lateral);
    }

    #[test]
    fn test_unknown_connection_fields_are_warnings() {
        let source = ConnectivityManager::with_seed(1);
        source.register_region("a", RegionId(0));
        source.register_region("b", RegionId(1));
        let mut doc = source.export_json();
        doc["connections"] = json!([{
            "id": 4,
            "source": "a",
            "target": "b",
            "source_id": 0,
            "target_id": 1,
            "topology": "feedforward",
            "synapse_count": 6,
            "average_weight": 0.5,
            "connection_strength": 0.25,
            "active": true,
            "created_at": 0,
            "plasticity_rate": 0.01,
            "plasticity_rule": "hebbian",
            "delay_ms": 3,
        }]);

        let manager = ConnectivityManager::new();
        let report = manager.import_json(&doc).unwrap();
        assert_eq!(report.connections, 1);
        assert_eq!(
            report.warnings,
            vec!["unknown field 'delay_ms' in connection #0".to_string()]
        );
        assert_eq!(manager.connections()[0].synapse_count, 6);
    }

    #[test]
    fn test_bad_pattern_rejects_whole_document() {
        let manager = ConnectivityManager::new();
        let doc = json!({
            "regions": { "a": 0 },
            "patterns": { "bad": { "connection_probability": 7.0 } },
        });
        assert!(manager.import_json(&doc).is_err());
        assert!(manager.registered_region("a").is_none());
    }

    #[test]
    fn test_structural_errors() {
        let manager = ConnectivityManager::new();
        assert!(matches!(
            manager.import_json(&json!([1, 2])),
            Err(BduError::InvalidDocument(_))
        ));
        assert!(matches!(
            manager.import_json(&json!({ "version": 99 })),
            Err(BduError::InvalidDocument(_))
        ));
        assert!(matches!(
            manager.import_json(&json!({ "regions": { "a": -1 } })),
            Err(BduError::InvalidDocument(_))
        ));
    }
}
