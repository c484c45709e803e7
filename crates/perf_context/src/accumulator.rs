//! Accumulated elapsed time per (context, label) pair

use crate::context::ContextId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Elapsed time per label, in milliseconds.
pub type LabelTimes = HashMap<String, f64>;

/// Mapping from context to label to accumulated milliseconds.
///
/// Entries are created lazily and never removed; [`TimeAccumulator::clear`]
/// zeroes them in place.
#[derive(Debug, Clone, Default)]
pub struct TimeAccumulator {
    contexts: HashMap<ContextId, LabelTimes>,
}

impl TimeAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `context` has an entry, even if nothing is charged yet.
    pub fn ensure_context(&mut self, context: &ContextId) {
        if !self.contexts.contains_key(context) {
            self.contexts.insert(context.clone(), LabelTimes::new());
        }
    }

    /// Add `elapsed_ms` to `(context, label)`.
    ///
    /// The label entry is created even when the charge is zero. Negative
    /// and non-finite charges count as zero.
    pub fn charge(&mut self, context: &ContextId, label: &str, elapsed_ms: f64) {
        let elapsed_ms = if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            elapsed_ms
        } else {
            0.0
        };

        let total = self
            .contexts
            .entry(context.clone())
            .or_default()
            .entry(label.to_string())
            .or_insert(0.0);
        *total += elapsed_ms;

        tracing::trace!(
            target: "perf::context",
            context = %context,
            label = label,
            elapsed_ms = elapsed_ms,
            "time charged"
        );
    }

    /// Accumulated time for one pair.
    pub fn get(&self, context: &str, label: &str) -> Option<f64> {
        self.contexts.get(context)?.get(label).copied()
    }

    /// Sum over every label of `context`.
    pub fn total_for(&self, context: &str) -> f64 {
        self.contexts
            .get(context)
            .map(|labels| labels.values().sum())
            .unwrap_or(0.0)
    }

    /// Zero every recorded duration, keeping all keys.
    pub fn clear(&mut self) {
        for labels in self.contexts.values_mut() {
            for total in labels.values_mut() {
                *total = 0.0;
            }
        }
    }

    /// Number of contexts seen so far.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Copy the current state into an ordered snapshot.
    pub fn snapshot(&self) -> PerfInfo {
        let contexts = self
            .contexts
            .iter()
            .map(|(context, labels)| {
                let labels = labels
                    .iter()
                    .map(|(label, total)| (label.clone(), *total))
                    .collect();
                (context.clone(), labels)
            })
            .collect();
        PerfInfo { contexts }
    }
}

/// A point-in-time copy of the accumulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerfInfo {
    contexts: BTreeMap<ContextId, BTreeMap<String, f64>>,
}

impl PerfInfo {
    /// Labels and their totals for `context`.
    pub fn context(&self, context: &str) -> Option<&BTreeMap<String, f64>> {
        self.contexts.get(context)
    }

    /// Accumulated time for one pair.
    pub fn get(&self, context: &str, label: &str) -> Option<f64> {
        self.contexts.get(context)?.get(label).copied()
    }

    /// Check whether `context` has an entry.
    pub fn contains(&self, context: &str) -> bool {
        self.contexts.contains_key(context)
    }

    /// Sum over every label of `context`.
    pub fn total_for(&self, context: &str) -> f64 {
        self.contexts
            .get(context)
            .map(|labels| labels.values().sum())
            .unwrap_or(0.0)
    }

    /// All contexts in the snapshot, in key order.
    pub fn contexts(&self) -> impl Iterator<Item = &ContextId> {
        self.contexts.keys()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Export to JSON (`{"context": {"label": ms}}`).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Compact text summary, busiest context first.
    pub fn summary(&self) -> String {
        let mut totals: Vec<(&ContextId, f64)> = self
            .contexts
            .keys()
            .map(|context| (context, self.total_for(context.as_str())))
            .collect();
        totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut output = String::new();
        for (context, total) in totals {
            output.push_str(&format!("{}: {:.3}ms\n", context, total));
            if let Some(labels) = self.contexts.get(context) {
                for (label, ms) in labels {
                    output.push_str(&format!("  {}: {:.3}ms\n", label, ms));
                }
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_charge_creates_entries_lazily() {
        let mut acc = TimeAccumulator::new();
        let ctx = ContextId::new("Feed");
        assert_eq!(acc.context_count(), 0);

        acc.charge(&ctx, "setTimeout", 0.0);
        assert_eq!(acc.get("Feed", "setTimeout"), Some(0.0));

        acc.charge(&ctx, "setTimeout", 2.5);
        acc.charge(&ctx, "fetch", 1.0);
        assert_eq!(acc.get("Feed", "setTimeout"), Some(2.5));
        assert_eq!(acc.total_for("Feed"), 3.5);
    }

    #[test]
    fn test_negative_charge_counts_as_zero() {
        let mut acc = TimeAccumulator::new();
        let ctx = ContextId::new("Feed");
        acc.charge(&ctx, "x", -4.0);
        acc.charge(&ctx, "x", f64::NAN);
        assert_eq!(acc.get("Feed", "x"), Some(0.0));
    }

    #[test]
    fn test_clear_zeroes_but_keeps_keys() {
        let mut acc = TimeAccumulator::new();
        let a = ContextId::new("A");
        let b = ContextId::new("B");
        acc.charge(&a, "x", 3.0);
        acc.charge(&b, "y", 4.0);
        acc.ensure_context(&ContextId::new("C"));

        acc.clear();

        assert_eq!(acc.context_count(), 3);
        assert_eq!(acc.get("A", "x"), Some(0.0));
        assert_eq!(acc.total_for("B"), 0.0);
        assert_eq!(acc.total_for("C"), 0.0);

        acc.charge(&a, "x", 1.5);
        assert_eq!(acc.get("A", "x"), Some(1.5));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut acc = TimeAccumulator::new();
        let a = ContextId::new("A");
        acc.charge(&a, "x", 3.0);

        let info = acc.snapshot();
        acc.charge(&a, "x", 3.0);

        assert_eq!(info.get("A", "x"), Some(3.0));
        assert_eq!(acc.get("A", "x"), Some(6.0));
    }

    #[test]
    fn test_perf_info_summary_orders_by_total() {
        let mut acc = TimeAccumulator::new();
        acc.charge(&ContextId::new("Small"), "x", 1.0);
        acc.charge(&ContextId::new("Big"), "y", 10.0);

        let summary = acc.snapshot().summary();
        let big = summary.find("Big").unwrap();
        let small = summary.find("Small").unwrap();
        assert!(big < small);
        assert!(summary.contains("  y: 10.000ms"));
    }

    #[test]
    fn test_perf_info_json_export() {
        let mut acc = TimeAccumulator::new();
        acc.charge(&ContextId::new("Inbox"), "NativeEventEmitter", 2.0);

        let json = acc.snapshot().to_json().unwrap();
        let parsed: PerfInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.get("Inbox", "NativeEventEmitter"), Some(2.0));
    }

    proptest! {
        #[test]
        fn prop_charges_are_additive(charges in proptest::collection::vec(0.0f64..1000.0, 0..50)) {
            let mut acc = TimeAccumulator::new();
            let ctx = ContextId::new("A");
            for ms in &charges {
                acc.charge(&ctx, "x", *ms);
            }
            let expected: f64 = charges.iter().sum();
            let actual = acc.get("A", "x").unwrap_or(0.0);
            prop_assert!((actual - expected).abs() < 1e-6);
        }
    }
}
