//! Observability module - trace IDs and alerting.

mod alert;
mod trace_id;

pub use alert::AlertLayer;
pub use trace_id::{TraceId, TraceIdMiddleware};
