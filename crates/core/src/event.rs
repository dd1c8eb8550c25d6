use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::time::parse_event_time;
use crate::{CoreError, CustomerId};

/// Fields of a record that are carried along but not interpreted.
pub type Attributes = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Customer,
    SiteVisit,
    Image,
    Order,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Customer => "CUSTOMER",
            EventKind::SiteVisit => "SITE_VISIT",
            EventKind::Image => "IMAGE",
            EventKind::Order => "ORDER",
        }
    }

    /// Name of the field that identifies the owning customer.
    pub fn owner_field(self) -> &'static str {
        match self {
            EventKind::Customer => "key",
            EventKind::SiteVisit | EventKind::Image | EventKind::Order => "customer_id",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(EventKind::Customer),
            "SITE_VISIT" => Ok(EventKind::SiteVisit),
            "IMAGE" => Ok(EventKind::Image),
            "ORDER" => Ok(EventKind::Order),
            other => Err(CoreError::UnrecognizedEventType(other.to_string())),
        }
    }
}

/// One ingested lifecycle event.
///
/// `customer_id` is the resolved owner: the `key` of a `CUSTOMER` record or the
/// `customer_id` of every other kind. `key` keeps the record's own key (the
/// order key for `ORDER`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub customer_id: CustomerId,
    pub key: Option<String>,
    pub verb: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub total_amount: Option<String>,
    pub attributes: Attributes,
}

impl Event {
    pub fn new(kind: EventKind, customer_id: impl Into<CustomerId>) -> Self {
        Self {
            kind,
            customer_id: customer_id.into(),
            key: None,
            verb: None,
            event_time: None,
            total_amount: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_verb(mut self, verb: impl Into<String>) -> Self {
        self.verb = Some(verb.into());
        self
    }

    pub fn with_time(mut self, event_time: DateTime<Utc>) -> Self {
        self.event_time = Some(event_time);
        self
    }

    pub fn with_amount(mut self, total_amount: impl Into<String>) -> Self {
        self.total_amount = Some(total_amount.into());
        self
    }

    /// Build an event from a decoded record.
    ///
    /// Fails with `UnrecognizedEventType` for types outside the known set,
    /// `MissingField` when `type` or the owner field is absent, and
    /// `DateParse` when `event_time` is present but unreadable.
    pub fn from_fields(mut fields: Attributes) -> Result<Self, CoreError> {
        let kind: EventKind = match fields.remove("type") {
            Some(Value::String(raw)) => raw.parse()?,
            Some(other) => {
                return Err(CoreError::InvalidField {
                    field: "type".to_string(),
                    reason: format!("expected a string, found {other}"),
                })
            }
            None => return Err(CoreError::missing("untyped", "type")),
        };

        let owner_field = kind.owner_field();
        let customer_id = match fields.get(owner_field) {
            Some(value) => text_value(owner_field, value)?,
            None => return Err(CoreError::missing(kind, owner_field)),
        };
        if kind != EventKind::Customer {
            fields.remove("customer_id");
        }

        let key = take_text(&mut fields, "key")?;
        let verb = take_text(&mut fields, "verb")?;
        let total_amount = take_text(&mut fields, "total_amount")?;
        let event_time = take_text(&mut fields, "event_time")?
            .map(|raw| parse_event_time(&raw))
            .transpose()?;

        Ok(Self {
            kind,
            customer_id,
            key,
            verb,
            event_time,
            total_amount,
            attributes: fields,
        })
    }
}

fn take_text(fields: &mut Attributes, name: &str) -> Result<Option<String>, CoreError> {
    match fields.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => text_value(name, &value).map(Some),
    }
}

/// Identifiers and amounts arrive as strings; bare numbers are accepted too.
fn text_value(field: &str, value: &Value) -> Result<String, CoreError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(CoreError::InvalidField {
            field: field.to_string(),
            reason: format!("expected a string, found {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn customer_is_owned_by_its_key() {
        let event = Event::from_fields(fields(json!({
            "type": "CUSTOMER",
            "verb": "NEW",
            "key": "96f55c7d8f42",
            "event_time": "2017-01-06T12:46:46.384Z",
            "last_name": "Smith",
        })))
        .unwrap();

        assert_eq!(event.kind, EventKind::Customer);
        assert_eq!(event.customer_id, "96f55c7d8f42");
        assert_eq!(event.key.as_deref(), Some("96f55c7d8f42"));
        assert_eq!(event.verb.as_deref(), Some("NEW"));
        assert_eq!(event.attributes.get("last_name"), Some(&json!("Smith")));
        assert!(!event.attributes.contains_key("type"));
    }

    #[test]
    fn order_is_owned_by_customer_id() {
        let event = Event::from_fields(fields(json!({
            "type": "ORDER",
            "verb": "NEW",
            "key": "68d84e5d1a43",
            "event_time": "2017-01-06:12:55:55.555Z",
            "customer_id": "96f55c7d8f42",
            "total_amount": "12.34 USD",
        })))
        .unwrap();

        assert_eq!(event.kind, EventKind::Order);
        assert_eq!(event.customer_id, "96f55c7d8f42");
        assert_eq!(event.key.as_deref(), Some("68d84e5d1a43"));
        assert_eq!(event.total_amount.as_deref(), Some("12.34 USD"));
        assert_eq!(
            event.event_time,
            Some(
                Utc.with_ymd_and_hms(2017, 1, 6, 12, 55, 55).unwrap()
                    + chrono::Duration::milliseconds(555)
            )
        );
        assert!(event.attributes.is_empty());
    }

    #[test]
    fn unknown_type_is_recoverable() {
        let err = Event::from_fields(fields(json!({
            "type": "REFUND",
            "customer_id": "abc",
        })))
        .unwrap_err();

        assert!(matches!(err, CoreError::UnrecognizedEventType(ref t) if t == "REFUND"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn missing_owner_field_is_reported() {
        let err = Event::from_fields(fields(json!({
            "type": "SITE_VISIT",
            "key": "ac05e815502f",
        })))
        .unwrap_err();

        assert!(matches!(
            err,
            CoreError::MissingField { ref kind, field: "customer_id" } if kind == "SITE_VISIT"
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn missing_type_is_reported() {
        let err = Event::from_fields(fields(json!({ "key": "abc" }))).unwrap_err();
        assert!(matches!(err, CoreError::MissingField { field: "type", .. }));
    }

    #[test]
    fn numeric_identifiers_are_stringified() {
        let event = Event::from_fields(fields(json!({
            "type": "IMAGE",
            "customer_id": 42,
        })))
        .unwrap();
        assert_eq!(event.customer_id, "42");
        assert!(event.event_time.is_none());
    }

    #[test]
    fn empty_identifier_is_an_ordinary_customer() {
        let visit = Event::from_fields(fields(json!({ "type": "SITE_VISIT", "customer_id": "" }))).unwrap();
        assert_eq!(visit.customer_id, "");

        let customer = Event::from_fields(fields(json!({ "type": "CUSTOMER", "key": "" }))).unwrap();
        assert_eq!(customer.customer_id, "");
    }

    #[test]
    fn structured_identifier_is_invalid() {
        let err = Event::from_fields(fields(json!({
            "type": "IMAGE",
            "customer_id": ["a", "b"],
        })))
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidField { ref field, .. } if field == "customer_id"));
    }

    #[test]
    fn bad_event_time_fails_the_record() {
        let err = Event::from_fields(fields(json!({
            "type": "SITE_VISIT",
            "customer_id": "abc",
            "event_time": "not a date",
        })))
        .unwrap_err();
        assert!(matches!(err, CoreError::DateParse { ref value } if value == "not a date"));
    }
}
