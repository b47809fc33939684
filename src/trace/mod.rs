mod load;
mod parse;
mod span;

pub use load::{LoadedTrace, TraceLoadError, load_trace, load_trace_event};
pub use parse::{ParsedTrace, parse_trace};
pub use span::{Contexts, EventEntry, Span, TraceContext, TraceEvent};
