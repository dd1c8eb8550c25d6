use std::collections::HashMap;

use ltv_core::{CoreError, Event, EventKind, OrderKey, OrderRecord};

/// Orders of one customer with repeated keys collapsed.
///
/// A later record for the same key replaces the kept one only when its
/// `event_time` is strictly later. Result keeps first-seen key order.
pub fn latest_orders(events: &[Event]) -> Result<Vec<OrderRecord>, CoreError> {
    let mut slots: HashMap<OrderKey, usize> = HashMap::new();
    let mut kept: Vec<OrderRecord> = Vec::new();

    for event in events.iter().filter(|e| e.kind == EventKind::Order) {
        let record = OrderRecord::from_event(event)?;
        match slots.get(&record.key) {
            Some(&slot) => {
                if record.event_time > kept[slot].event_time {
                    kept[slot] = record;
                }
            }
            None => {
                slots.insert(record.key.clone(), kept.len());
                kept.push(record);
            }
        }
    }

    Ok(kept)
}
