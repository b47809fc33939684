use std::fs;
use std::path::{Path, PathBuf};

use span_waterfall::config::ViewerConfig;
use span_waterfall::timeline::{Bounds, RenderRow, SpanTree, make_bounds_fn};
use span_waterfall::trace::{TraceLoadError, load_trace, load_trace_event, parse_trace};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn ids<'a>(spans: impl IntoIterator<Item = &'a span_waterfall::trace::Span>) -> Vec<&'a str> {
    spans.into_iter().map(|span| span.span_id.as_str()).collect()
}

#[test]
fn checkout_trace_builds_parent_lookup() {
    let loaded = load_trace(&fixture("checkout_trace.json")).unwrap();
    let trace = &loaded.trace;

    assert_eq!(loaded.title.as_deref(), Some("POST /checkout"));
    assert_eq!(trace.trace_id, "4c79f60c11214eb38604f4ae0781bfb2");
    assert_eq!(trace.root_span_id, "a000000000000001");
    assert_eq!(trace.op, "http.server");
    assert_eq!(trace.num_of_spans, 5);
    assert_eq!(trace.trace_start_timestamp, 1700000000.0);
    assert_eq!(trace.trace_end_timestamp, 1700000000.5);

    assert_eq!(
        ids(trace.children_of("a000000000000001")),
        ["b200000000000001", "b100000000000001"]
    );
    assert_eq!(
        ids(trace.children_of("b100000000000001")),
        ["c100000000000001", "c200000000000001"]
    );
    assert!(trace.children_of("").is_empty());
}

#[test]
fn checkout_tree_orders_rows_and_skips_orphans() {
    let loaded = load_trace(&fixture("checkout_trace.json")).unwrap();
    let tree = SpanTree::build(&loaded.trace);

    let order = tree
        .iter()
        .map(|(_, node)| node.span.span_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        [
            "a000000000000001",
            "b200000000000001",
            "b100000000000001",
            "c100000000000001",
            "c200000000000001",
        ]
    );

    let trace = &loaded.trace;
    let bounds = make_bounds_fn(
        trace.trace_start_timestamp,
        trace.trace_end_timestamp,
        0.0,
        1.0,
    );
    let rows = tree.rows(&bounds);
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| matches!(row, RenderRow::Span { .. })));

    let RenderRow::Span { bounds, .. } = rows[4] else {
        panic!("expected a span row");
    };
    assert!(matches!(bounds, Bounds::TimestampsEqual { is_visible: true, .. }));
}

#[test]
fn zooming_into_the_tail_folds_early_spans() {
    let loaded = load_trace(&fixture("checkout_trace.json")).unwrap();
    let tree = SpanTree::build(&loaded.trace);
    let trace = &loaded.trace;

    let rows = tree.rows(&make_bounds_fn(
        trace.trace_start_timestamp,
        trace.trace_end_timestamp,
        0.5,
        1.0,
    ));

    // root, [db.query], http.client, [cache.get], serialize
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1], RenderRow::HiddenSpans { count: 1 });
    assert_eq!(rows[3], RenderRow::HiddenSpans { count: 1 });
    assert!(matches!(rows[4], RenderRow::Span { node, .. } if node.index() == 4));
}

#[test]
fn empty_span_entry_parses_to_empty_trace() {
    let event = load_trace_event(&fixture("empty_trace.json")).unwrap();
    let trace = parse_trace(&event);

    assert!(trace.is_empty());
    assert!(trace.has_context());
    assert!(trace.child_spans.is_empty());
    assert_eq!(trace.op, "transaction");
}

#[test]
fn missing_trace_file_is_an_io_error() {
    let error = load_trace_event(&fixture("does_not_exist.json")).unwrap_err();
    assert!(matches!(error, TraceLoadError::Io { .. }));

    let error = load_trace(&fixture("does_not_exist.json")).unwrap_err();
    assert!(format!("{error:#}").contains("does_not_exist.json"));
}

#[test]
fn malformed_trace_file_is_a_json_error() {
    let path = std::env::temp_dir().join(format!(
        "span-waterfall-malformed-{}.json",
        std::process::id()
    ));
    fs::write(&path, "{\"entries\": [").unwrap();

    let error = load_trace_event(&path).unwrap_err();
    let _ = fs::remove_file(&path);

    assert!(matches!(error, TraceLoadError::Json { .. }));
}

#[test]
fn viewer_config_file_overrides_defaults() {
    let config = ViewerConfig::from_file(&fixture("viewer.json")).unwrap();

    assert_eq!(config.row_height, 28.0);
    assert_eq!(config.divider_position, 0.4);
    assert_eq!(config.minimap_bar_height, 5.0);
    assert_eq!(config.minimap_geometry().capacity(), 30);
}
