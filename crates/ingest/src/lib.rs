//! Event ingestion: decode one record and file it under its customer.

use std::path::PathBuf;

use ltv_core::{Attributes, CoreError, CustomerId, Event, EventStore};
use tracing::{debug, warn};

pub mod literal;
pub mod reader;

pub use reader::{ingest_text, read_events, unframe, InputFormat, ReadSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested {
    Appended { customer_id: CustomerId },
    Skipped { event_type: String },
}

#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("cannot read input file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        reason: std::io::Error,
    },
    #[error("line {line}: bad record `{raw}`")]
    Record {
        line: usize,
        raw: String,
        #[source]
        reason: CoreError,
    },
}

/// Ingest one dictionary-literal record into `store`.
///
/// An unknown event type is logged and skipped. Every other problem is
/// returned to the caller and should end the run.
pub fn ingest(record: &str, store: &mut EventStore) -> Result<Ingested, CoreError> {
    let fields = literal::parse_mapping(record)?;
    ingest_fields(fields, store)
}

/// Ingest one JSON object record into `store`.
pub fn ingest_json(record: &str, store: &mut EventStore) -> Result<Ingested, CoreError> {
    let fields: Attributes =
        serde_json::from_str(record).map_err(|err| CoreError::malformed(err.to_string()))?;
    ingest_fields(fields, store)
}

fn ingest_fields(fields: Attributes, store: &mut EventStore) -> Result<Ingested, CoreError> {
    let event = match Event::from_fields(fields) {
        Ok(event) => event,
        Err(CoreError::UnrecognizedEventType(event_type)) => {
            warn!(%event_type, "unknown event type, record skipped");
            return Ok(Ingested::Skipped { event_type });
        }
        Err(err) => return Err(err),
    };

    debug!(customer_id = %event.customer_id, kind = %event.kind, time = ?event.event_time, "event parsed");
    let customer_id = event.customer_id.clone();
    store.entry(customer_id.clone()).or_default().push(event);
    Ok(Ingested::Appended { customer_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltv_core::EventKind;

    #[test]
    fn events_group_by_customer_in_arrival_order() {
        let mut store = EventStore::new();
        let records = [
            "{'type': 'CUSTOMER', 'verb': 'NEW', 'key': 'c1', 'event_time': '2017-01-01T00:00:00Z'}",
            "{'type': 'SITE_VISIT', 'verb': 'NEW', 'key': 'v1', 'event_time': '2017-01-02T00:00:00Z', 'customer_id': 'c2'}",
            "{'type': 'IMAGE', 'verb': 'UPLOAD', 'key': 'i1', 'event_time': '2017-01-03T00:00:00Z', 'customer_id': 'c1'}",
            "{'type': 'ORDER', 'verb': 'NEW', 'key': 'o1', 'event_time': '2017-01-04T00:00:00Z', 'customer_id': 'c1', 'total_amount': '10.00 USD'}",
        ];
        for record in records {
            ingest(record, &mut store).unwrap();
        }

        assert_eq!(store.len(), 2);
        let kinds: Vec<EventKind> = store["c1"].iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Customer, EventKind::Image, EventKind::Order]);
        assert_eq!(store["c2"].len(), 1);
        assert!(store.values().flatten().all(|e| e.event_time.is_some()));
    }

    #[test]
    fn unknown_type_is_skipped_without_touching_store() {
        let mut store = EventStore::new();
        let outcome = ingest("{'type': 'REFUND', 'customer_id': 'c1'}", &mut store).unwrap();
        assert_eq!(
            outcome,
            Ingested::Skipped {
                event_type: "REFUND".to_string()
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn missing_customer_id_is_an_error() {
        let mut store = EventStore::new();
        let err = ingest("{'type': 'IMAGE', 'key': 'i1'}", &mut store).unwrap_err();
        assert!(matches!(err, CoreError::MissingField { field: "customer_id", .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn json_records_are_accepted() {
        let mut store = EventStore::new();
        let outcome = ingest_json(
            r#"{"type": "SITE_VISIT", "key": "v1", "customer_id": "c9", "event_time": "2017-01-06T12:45:52.041Z"}"#,
            &mut store,
        )
        .unwrap();
        assert_eq!(
            outcome,
            Ingested::Appended {
                customer_id: "c9".to_string()
            }
        );

        let err = ingest_json("{'single': 'quotes'}", &mut store).unwrap_err();
        assert!(matches!(err, CoreError::MalformedRecord { .. }));
    }
}
