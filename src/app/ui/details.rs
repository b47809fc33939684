use eframe::egui::{self, RichText, Ui};
use serde_json::Value;

use crate::trace::Span;
use crate::util::format_duration;

fn timestamp_text(timestamp: f64, trace_start: f64) -> String {
    format!(
        "+{} ({timestamp:.6})",
        format_duration(timestamp - trace_start)
    )
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub(in crate::app) fn span_details(ui: &mut Ui, span: &Span, trace_start: f64) {
    ui.label(RichText::new(span.label()).strong());
    ui.add_space(4.0);

    egui::Grid::new(("span_details", span.span_id.as_str()))
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            let mut row = |key: &str, value: String| {
                ui.label(RichText::new(key).weak());
                ui.label(value);
                ui.end_row();
            };

            row("Span ID", span.span_id.clone());
            row(
                "Parent Span ID",
                span.parent_span_id.clone().unwrap_or_else(|| "-".to_owned()),
            );
            row("Trace ID", span.trace_id.clone());
            row(
                "Description",
                span.description.clone().unwrap_or_else(|| "-".to_owned()),
            );
            row("Operation", span.op.clone().unwrap_or_else(|| "-".to_owned()));
            row("Start", timestamp_text(span.start_timestamp, trace_start));
            row("End", timestamp_text(span.timestamp, trace_start));
            row("Duration", format_duration(span.duration()));
            row(
                "Same process as parent",
                match span.same_process_as_parent {
                    Some(true) => "yes",
                    Some(false) => "no",
                    None => "unknown",
                }
                .to_owned(),
            );

            for (key, value) in &span.tags {
                row(&format!("tag: {key}"), value.clone());
            }
            for (key, value) in &span.data {
                row(&format!("data: {key}"), value_text(value));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_show_offset_and_raw_seconds() {
        assert_eq!(timestamp_text(101.5, 100.0), "+1,500.00ms (101.500000)");
    }

    #[test]
    fn string_values_are_unquoted() {
        assert_eq!(value_text(&Value::from("GET")), "GET");
        assert_eq!(value_text(&serde_json::json!({"a": 1})), r#"{"a":1}"#);
    }
}
