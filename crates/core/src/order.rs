use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, Event, EventKind, OrderKey};

/// Order facts pulled out of an `ORDER` event for value estimation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub key: OrderKey,
    pub verb: Option<String>,
    pub event_time: DateTime<Utc>,
    pub amount: f64,
}

impl OrderRecord {
    pub fn from_event(event: &Event) -> Result<Self, CoreError> {
        if event.kind != EventKind::Order {
            return Err(CoreError::InvalidField {
                field: "type".to_string(),
                reason: format!("expected ORDER, found {}", event.kind),
            });
        }
        let key = event
            .key
            .clone()
            .ok_or_else(|| CoreError::missing(EventKind::Order, "key"))?;
        let event_time = event
            .event_time
            .ok_or_else(|| CoreError::missing(EventKind::Order, "event_time"))?;
        let raw_amount = event
            .total_amount
            .as_deref()
            .ok_or_else(|| CoreError::missing(EventKind::Order, "total_amount"))?;

        Ok(Self {
            key,
            verb: event.verb.clone(),
            event_time,
            amount: parse_amount(raw_amount)?,
        })
    }
}

/// Parse the leading number of a `"<decimal> <currency>"` amount.
pub fn parse_amount(raw: &str) -> Result<f64, CoreError> {
    let amount_error = || CoreError::AmountParse {
        value: raw.to_string(),
    };
    let token = raw.split_whitespace().next().ok_or_else(amount_error)?;
    let amount: f64 = token.parse().map_err(|_| amount_error())?;
    if !amount.is_finite() {
        return Err(amount_error());
    }
    Ok(amount)
}
