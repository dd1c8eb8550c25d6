//! Ranked views over estimated values and the report written from them.

use ltv_core::LtvResult;
use serde::{Deserialize, Serialize};

pub mod report;

pub use report::{render_report, write_report, ReportError, REPORT_HEADER};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopKConfig {
    pub k: usize,
}

impl Default for TopKConfig {
    fn default() -> Self {
        Self { k: 50 }
    }
}

/// Highest values first, equal values by customer id, cut to `k` entries.
pub fn top_k(mut values: Vec<LtvResult>, cfg: &TopKConfig) -> Vec<LtvResult> {
    values.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    values.truncate(cfg.k);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Vec<LtvResult> {
        vec![
            LtvResult::new("d", 0.0),
            LtvResult::new("b", 26000.0),
            LtvResult::new("c", 4160.0),
            LtvResult::new("a", 4160.0),
        ]
    }

    #[test]
    fn sorted_descending_with_id_tiebreak() {
        let ranked = top_k(values(), &TopKConfig::default());
        let ids: Vec<&str> = ranked.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn truncated_to_k() {
        assert_eq!(top_k(values(), &TopKConfig { k: 1 }), vec![LtvResult::new("b", 26000.0)]);
        assert!(top_k(values(), &TopKConfig { k: 0 }).is_empty());
        assert!(top_k(Vec::new(), &TopKConfig { k: 3 }).is_empty());
    }
}
