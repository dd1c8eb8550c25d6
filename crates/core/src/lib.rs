//! Core types for customer lifetime value reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod event;
pub mod order;
pub mod time;

pub use event::{Attributes, Event, EventKind};
pub use order::OrderRecord;

pub type CustomerId = String;
pub type OrderKey = String;

/// Events grouped by owning customer, each list kept in ingestion order.
///
/// Ordered by customer id so every pass over the store is deterministic.
pub type EventStore = BTreeMap<CustomerId, Vec<Event>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LtvResult {
    pub customer_id: CustomerId,
    pub value: f64,
}

impl LtvResult {
    pub fn new(customer_id: impl Into<CustomerId>, value: f64) -> Self {
        Self {
            customer_id: customer_id.into(),
            value,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("unrecognized event type `{0}`")]
    UnrecognizedEventType(String),
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },
    #[error("{kind} record is missing required field `{field}`")]
    MissingField { kind: String, field: &'static str },
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("unparseable event_time `{value}`")]
    DateParse { value: String },
    #[error("unparseable total_amount `{value}`")]
    AmountParse { value: String },
}

impl CoreError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    pub fn missing(kind: impl ToString, field: &'static str) -> Self {
        Self::MissingField {
            kind: kind.to_string(),
            field,
        }
    }

    /// Only unknown event types are skipped; every other error aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnrecognizedEventType(_))
    }
}
