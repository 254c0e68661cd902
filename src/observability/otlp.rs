//! OTLP/JSON encoding of finished spans.
//!
//! Each exported batch becomes one `resourceSpans` document, the same shape an
//! OTLP collector accepts over HTTP/JSON.

use std::time::{SystemTime, UNIX_EPOCH};

use opentelemetry::trace::{Event, Link, SpanId, SpanKind, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    resource_spans: Vec<ResourceSpans>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSpans {
    resource: Attributes,
    scope_spans: Vec<ScopeSpans>,
}

#[derive(Serialize)]
struct Attributes {
    attributes: Vec<Attribute>,
}

#[derive(Serialize)]
struct ScopeSpans {
    scope: Scope,
    spans: Vec<Span>,
}

#[derive(Serialize)]
struct Scope {
    name: String,
}

#[derive(Serialize)]
struct Attribute {
    key: String,
    value: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Span {
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: String,
    kind: u8,
    start_time_unix_nano: String,
    end_time_unix_nano: String,
    attributes: Vec<Attribute>,
    events: Vec<SpanEvent>,
    links: Vec<SpanLink>,
    status: SpanStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpanEvent {
    time_unix_nano: String,
    name: String,
    attributes: Vec<Attribute>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpanLink {
    trace_id: String,
    span_id: String,
    attributes: Vec<Attribute>,
}

#[derive(Serialize)]
struct SpanStatus {
    code: u8,
    message: String,
}

/// Encodes `batch` as a single-line OTLP/JSON document.
pub fn encode_batch(resource: &Resource, scope: &str, batch: &[SpanData]) -> String {
    let document = Document {
        resource_spans: vec![ResourceSpans {
            resource: Attributes {
                attributes: resource
                    .iter()
                    .map(|(key, value)| Attribute {
                        key: key.to_string(),
                        value: attribute_value(value),
                    })
                    .collect(),
            },
            scope_spans: vec![ScopeSpans {
                scope: Scope {
                    name: scope.to_string(),
                },
                spans: batch.iter().map(span).collect(),
            }],
        }],
    };

    serde_json::to_string(&document).unwrap_or_else(|e| {
        json!({ "encodingError": e.to_string() }).to_string()
    })
}

fn span(data: &SpanData) -> Span {
    let parent_span_id = if data.parent_span_id == SpanId::INVALID {
        String::new()
    } else {
        format!("{:016x}", data.parent_span_id)
    };
    let (code, message) = status(&data.status);

    Span {
        trace_id: format!("{:032x}", data.span_context.trace_id()),
        span_id: format!("{:016x}", data.span_context.span_id()),
        parent_span_id,
        name: data.name.to_string(),
        kind: kind(&data.span_kind),
        start_time_unix_nano: unix_nanos(data.start_time),
        end_time_unix_nano: unix_nanos(data.end_time),
        attributes: attributes(&data.attributes),
        events: data.events.iter().map(event).collect(),
        links: data.links.iter().map(link).collect(),
        status: SpanStatus { code, message },
    }
}

fn unix_nanos(time: SystemTime) -> String {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
        .to_string()
}

const fn kind(kind: &SpanKind) -> u8 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
        SpanKind::Client => 3,
        SpanKind::Producer => 4,
        SpanKind::Consumer => 5,
    }
}

fn status(status: &Status) -> (u8, String) {
    match status {
        Status::Unset => (0, String::new()),
        Status::Ok => (1, String::new()),
        Status::Error { description } => (2, description.to_string()),
    }
}

fn attributes(attributes: &[KeyValue]) -> Vec<Attribute> {
    attributes
        .iter()
        .map(|kv| Attribute {
            key: kv.key.to_string(),
            value: attribute_value(&kv.value),
        })
        .collect()
}

fn event(event: &Event) -> SpanEvent {
    SpanEvent {
        time_unix_nano: unix_nanos(event.timestamp),
        name: event.name.to_string(),
        attributes: attributes(&event.attributes),
    }
}

fn link(link: &Link) -> SpanLink {
    SpanLink {
        trace_id: format!("{:032x}", link.span_context.trace_id()),
        span_id: format!("{:016x}", link.span_context.span_id()),
        attributes: attributes(&link.attributes),
    }
}

/// OTLP typed value. Integers travel as strings; arrays fall back to their
/// debug rendering.
fn attribute_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => json!({ "boolValue": b }),
        Value::I64(i) => json!({ "intValue": i.to_string() }),
        Value::F64(f) => json!({ "doubleValue": f }),
        Value::String(s) => json!({ "stringValue": s.to_string() }),
        Value::Array(_) => json!({ "stringValue": format!("{value:?}") }),
    }
}
