use std::collections::HashMap;

use tracing::debug;

use super::span::{Span, TraceEvent};

const DEFAULT_ROOT_OP: &str = "transaction";

/// Parent → children lookup for one trace, plus the trace-wide time range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedTrace {
    pub child_spans: HashMap<String, Vec<Span>>,
    pub trace_id: String,
    pub root_span_id: String,
    pub op: String,
    pub trace_start_timestamp: f64,
    pub trace_end_timestamp: f64,
    pub num_of_spans: usize,
}

impl ParsedTrace {
    /// Synthetic root covering the whole trace.
    pub fn root_span(&self) -> Span {
        Span {
            trace_id: self.trace_id.clone(),
            span_id: self.root_span_id.clone(),
            parent_span_id: None,
            start_timestamp: self.trace_start_timestamp,
            timestamp: self.trace_end_timestamp,
            op: Some(self.op.clone()),
            ..Span::default()
        }
    }

    pub fn children_of(&self, span_id: &str) -> &[Span] {
        self.child_spans
            .get(span_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn duration(&self) -> f64 {
        (self.trace_end_timestamp - self.trace_start_timestamp).abs()
    }

    pub fn is_empty(&self) -> bool {
        self.num_of_spans == 0
    }

    pub fn has_context(&self) -> bool {
        !self.trace_id.is_empty() || !self.root_span_id.is_empty()
    }
}

fn is_valid_span_id(id: Option<&str>) -> bool {
    id.is_some_and(|id| !id.is_empty())
}

fn seed(timestamp: f64) -> Option<f64> {
    (timestamp.is_finite() && timestamp != 0.0).then_some(timestamp)
}

pub fn parse_trace(event: &TraceEvent) -> ParsedTrace {
    let context = event.trace_context();
    let trace_id = context
        .and_then(|context| context.trace_id.clone())
        .unwrap_or_default();
    let root_span_id = context
        .and_then(|context| context.span_id.clone())
        .unwrap_or_default();
    let op = context
        .and_then(|context| context.op.clone())
        .filter(|op| !op.is_empty())
        .unwrap_or_else(|| DEFAULT_ROOT_OP.to_owned());

    let mut parsed = ParsedTrace {
        child_spans: HashMap::new(),
        trace_id,
        root_span_id,
        op,
        trace_start_timestamp: event.start_timestamp,
        trace_end_timestamp: event.end_timestamp,
        num_of_spans: 0,
    };

    let spans = match event.span_entry() {
        Some(spans) if !spans.is_empty() => spans,
        _ => {
            debug!(trace_id = %parsed.trace_id, "event carries no spans");
            return parsed;
        }
    };

    let mut start = seed(event.start_timestamp);
    let mut end = seed(event.end_timestamp);

    for span in spans {
        start = Some(start.map_or(span.start_timestamp, |current| {
            current.min(span.start_timestamp)
        }));
        end = Some(end.map_or(span.timestamp, |current| current.max(span.timestamp)));

        let parent = span.parent_span_id.as_deref();
        if !is_valid_span_id(parent) {
            continue;
        }
        if let Some(parent) = parent {
            parsed
                .child_spans
                .entry(parent.to_owned())
                .or_default()
                .push(span.clone());
        }
    }

    // `sort_by` is stable, so equal starts keep input order.
    for children in parsed.child_spans.values_mut() {
        children.sort_by(|a, b| a.start_timestamp.total_cmp(&b.start_timestamp));
    }

    parsed.trace_start_timestamp = start.unwrap_or_default();
    parsed.trace_end_timestamp = end.unwrap_or_default();
    parsed.num_of_spans = spans.len();

    debug!(
        trace_id = %parsed.trace_id,
        spans = parsed.num_of_spans,
        parents = parsed.child_spans.len(),
        "parsed trace"
    );

    parsed
}
