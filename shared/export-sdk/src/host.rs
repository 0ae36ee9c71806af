//! Host update envelope
//!
//! The reporting host sends one object per data, filter or style change:
//! `{ fields, tables, style, themeId }`. Style entries arrive either as bare
//! strings or as style objects carrying `value` and `defaultValue`.

use export_core::{ExportConfig, ExportDefaults, TableFields, TableSnapshot, Tables};
use serde::Deserialize;
use serde_json::Value;

use crate::extractor::stringify_value;
use crate::stream::UpdateEvent;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Text(String),
    Entry {
        #[serde(default)]
        value: Option<Value>,
        #[serde(default, rename = "defaultValue")]
        default_value: Option<Value>,
    },
    Other(Value),
}

impl StyleValue {
    /// Effective string: a non-empty `value`, then `defaultValue`, else empty.
    pub fn resolve(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Entry { value, default_value } => [value, default_value]
                .into_iter()
                .flatten()
                .map(stringify_value)
                .find(|s| !s.is_empty())
                .unwrap_or_default(),
            Self::Other(v) => stringify_value(v),
        }
    }
}

fn resolve(value: &Option<StyleValue>) -> String {
    value.as_ref().map(StyleValue::resolve).unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStyle {
    #[serde(default)]
    pub ingest_url: Option<StyleValue>,
    #[serde(default)]
    pub shared_secret: Option<StyleValue>,
    #[serde(default)]
    pub report_id: Option<StyleValue>,
}

impl HostStyle {
    pub fn to_config(&self) -> ExportConfig {
        ExportConfig::new(
            resolve(&self.ingest_url),
            resolve(&self.shared_secret),
            resolve(&self.report_id),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUpdate {
    #[serde(default)]
    pub fields: TableFields,
    #[serde(default)]
    pub tables: Tables,
    #[serde(default)]
    pub style: Option<HostStyle>,
    #[serde(default)]
    pub theme_id: Option<String>,
}

impl HostUpdate {
    /// Build the exporter event, filling empty style values from `defaults`.
    /// The page id is the host's theme id.
    pub fn into_event(self, defaults: &ExportDefaults) -> UpdateEvent {
        let config = defaults.apply(self.style.unwrap_or_default().to_config());
        UpdateEvent {
            snapshot: TableSnapshot {
                fields: self.fields,
                tables: self.tables,
            },
            config,
            page_id: self.theme_id.unwrap_or_default(),
        }
    }
}
