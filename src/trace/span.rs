use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One timed operation of a trace. Timestamps are seconds since the Unix epoch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trace_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub span_id: String,
    #[serde(default)]
    pub parent_span_id: Option<String>,
    #[serde(default)]
    pub start_timestamp: f64,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub same_process_as_parent: Option<bool>,
}

impl Span {
    pub fn duration(&self) -> f64 {
        self.timestamp - self.start_timestamp
    }

    /// `op` and `description` joined by a long dash, falling back to whichever half exists.
    pub fn label(&self) -> String {
        let op = self.op.as_deref().filter(|op| !op.is_empty());
        let description = self
            .description
            .as_deref()
            .filter(|description| !description.is_empty());

        match (op, description) {
            (Some(op), Some(description)) => format!("{op} \u{2014} {description}"),
            (Some(op), None) => op.to_owned(),
            (None, Some(description)) => description.to_owned(),
            (None, None) => "<unknown>".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TraceContext {
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub span_id: Option<String>,
    #[serde(default)]
    pub op: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Contexts {
    #[serde(default)]
    pub trace: Option<TraceContext>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventEntry {
    Spans(Vec<Span>),
    Other { kind: String },
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl<'de> Deserialize<'de> for EventEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawEntry::deserialize(deserializer)?;
        if raw.kind != "spans" {
            return Ok(Self::Other { kind: raw.kind });
        }

        if raw.data.is_null() {
            return Ok(Self::Spans(Vec::new()));
        }

        Vec::<Span>::deserialize(raw.data)
            .map(Self::Spans)
            .map_err(de::Error::custom)
    }
}

/// Transaction event as delivered by the data-fetching side.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    #[serde(default, rename = "eventID")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_timestamp: f64,
    #[serde(default)]
    pub end_timestamp: f64,
    #[serde(default)]
    pub entries: Vec<EventEntry>,
    #[serde(default)]
    pub contexts: Contexts,
}

impl TraceEvent {
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn span_entry(&self) -> Option<&[Span]> {
        self.entries.iter().find_map(|entry| match entry {
            EventEntry::Spans(spans) => Some(spans.as_slice()),
            EventEntry::Other { .. } => None,
        })
    }

    pub fn trace_context(&self) -> Option<&TraceContext> {
        self.contexts.trace.as_ref()
    }
}
