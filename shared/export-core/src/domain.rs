//! Core domain types shared by the exporter and its host boundary

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Accepts an absent or `null` sequence as empty.
fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One dimension or metric column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Field descriptors of a snapshot, dimensions first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFields {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub dimensions: Vec<FieldDescriptor>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub metrics: Vec<FieldDescriptor>,
}

/// A single table cell. `v` is absent or `null` when the host has no value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub v: Option<Value>,
}

impl Cell {
    pub fn new(v: impl Into<Value>) -> Self {
        Self { v: Some(v.into()) }
    }

    pub fn null() -> Self {
        Self { v: None }
    }
}

/// Ordered cells, positionally aligned with the combined field ordering.
/// A `null` cell is kept as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: Vec<Option<Cell>>,
}

impl Row {
    pub fn new(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            cells: cells.into_iter().map(Some).collect(),
        }
    }
}

/// Named tables of a snapshot. Only `DEFAULT` is consumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(rename = "DEFAULT", default, deserialize_with = "nullable_vec")]
    pub default: Vec<Row>,
}

/// Point-in-time tabular payload delivered by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    #[serde(default)]
    pub fields: TableFields,
    #[serde(default)]
    pub tables: Tables,
}

impl TableSnapshot {
    pub fn new(dimensions: Vec<FieldDescriptor>, metrics: Vec<FieldDescriptor>, rows: Vec<Row>) -> Self {
        Self {
            fields: TableFields { dimensions, metrics },
            tables: Tables { default: rows },
        }
    }

    /// Dimension names followed by metric names
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .dimensions
            .iter()
            .chain(self.fields.metrics.iter())
            .map(|f| f.name.as_str())
    }

    pub fn first_row(&self) -> Option<&Row> {
        self.tables.default.first()
    }
}

/// Insertion-ordered mapping of field name to string value.
///
/// Re-inserting an existing name replaces its value but keeps its original
/// position, so serialization order is stable across duplicate names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRecord {
    entries: Vec<(String, String)>,
}

impl ExtractedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtractedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Destination and credentials for one export
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExportConfig {
    pub ingest_url: String,
    pub shared_secret: String,
    pub report_id: String,
}

impl ExportConfig {
    pub fn new(
        ingest_url: impl Into<String>,
        shared_secret: impl Into<String>,
        report_id: impl Into<String>,
    ) -> Self {
        Self {
            ingest_url: ingest_url.into(),
            shared_secret: shared_secret.into(),
            report_id: report_id.into(),
        }
    }

    /// Both the ingest URL and the shared secret are set
    pub fn is_complete(&self) -> bool {
        !self.ingest_url.is_empty() && !self.shared_secret.is_empty()
    }

    pub fn validate(&self) -> crate::Result<()> {
        let missing: Vec<&str> = [
            ("ingestUrl", self.ingest_url.is_empty()),
            ("sharedSecret", self.shared_secret.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(crate::ExportError::ConfigMissing(missing.join(", ")))
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("ingest_url", &self.ingest_url)
            .field("shared_secret", &"[REDACTED]")
            .field("report_id", &self.report_id)
            .finish()
    }
}
