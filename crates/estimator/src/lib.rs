//! Lifetime value estimation over an ingested event store.

use ltv_core::{CoreError, CustomerId, Event, EventKind, EventStore, LtvResult};
use ltv_views::{top_k, TopKConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod cadence;
pub mod orders;

pub use cadence::{visit_marker, visit_times, weekly_occurrences};
pub use orders::latest_orders;

/// Turns one customer's events into a value.
pub trait ValueModel {
    fn estimate(&self, customer_id: &CustomerId, events: &[Event]) -> Result<f64, CoreError>;
}

/// `LTV = weeks_per_year * weekly spend * lifetime_years`, where weekly
/// spend is the deduplicated order total divided by the weeks the customer
/// has been visiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleLtv {
    pub weeks_per_year: f64,
    pub lifetime_years: f64,
}

impl Default for SimpleLtv {
    fn default() -> Self {
        Self {
            weeks_per_year: 52.0,
            lifetime_years: 10.0,
        }
    }
}

impl ValueModel for SimpleLtv {
    fn estimate(&self, customer_id: &CustomerId, events: &[Event]) -> Result<f64, CoreError> {
        if !events.iter().any(|e| e.kind == EventKind::Order) {
            return Ok(0.0);
        }

        let visits = visit_times(events, visit_marker(events))?;
        let (Some(&first), Some(&last)) = (visits.iter().min(), visits.iter().max()) else {
            return Ok(0.0);
        };
        let weeks = weekly_occurrences(first, last);
        debug!(%customer_id, weeks, "visiting weeks");

        let orders = latest_orders(events)?;
        debug!(%customer_id, ?orders, "deduplicated orders");
        let total: f64 = orders.iter().map(|o| o.amount).sum();
        let expenditure_per_visit = total / weeks as f64;

        Ok(self.weeks_per_year * expenditure_per_visit * self.lifetime_years)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("cannot value customer {customer_id}")]
pub struct EstimateError {
    pub customer_id: CustomerId,
    #[source]
    pub reason: CoreError,
}

/// Round to two decimals on the exact binary value, ties to even.
///
/// Scaling by 100 first would round the product instead, so a value stored
/// just below a half cent (2.925 is 2.92499...) would round up.
pub fn round_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Value every customer in the store, rounded to cents, in store order.
pub fn estimate_all<M: ValueModel>(
    model: &M,
    store: &EventStore,
) -> Result<Vec<LtvResult>, EstimateError> {
    store
        .iter()
        .map(|(customer_id, events)| {
            model
                .estimate(customer_id, events)
                .map(|value| LtvResult::new(customer_id.clone(), round_cents(value)))
                .map_err(|reason| EstimateError {
                    customer_id: customer_id.clone(),
                    reason,
                })
        })
        .collect()
}

/// The `x` customers with the highest simple LTV, highest first.
pub fn top_x_simple_ltv(x: usize, store: &EventStore) -> Result<Vec<LtvResult>, EstimateError> {
    let values = estimate_all(&SimpleLtv::default(), store)?;
    Ok(top_k(values, &TopKConfig { k: x }))
}
