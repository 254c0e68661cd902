//! Request worker and its wire protocol.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation and request dispatch
//! - `bridge`: Line-delimited JSON transport over any reader/writer pair

pub mod bridge;
pub mod handler;
pub mod messages;

pub use bridge::serve;
pub use handler::LibraryWorker;
pub use messages::{Request, RequestEnvelope, Response, ResponseEnvelope, TraceContext};
