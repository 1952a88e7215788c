//! Prometheus metrics for the verdict node.
//!
//! The [`NodeMetrics`] struct owns a dedicated [`Registry`] that the RPC
//! `/metrics` endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub ballots_accepted: IntCounter,
    /// Labelled by rejection `reason` code.
    pub ballots_rejected: IntCounterVec,
    /// Resubmissions answered with the stored ballot.
    pub ballots_already_voted: IntCounter,
    pub tallies_computed: IntCounter,
    /// Date-driven transitions written by reconciliation.
    pub forced_transitions: IntCounter,
    pub integrity_failures: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time of one tally computation, in milliseconds.
    pub tally_duration_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let ballots_accepted = register_int_counter_with_registry!(
            Opts::new("verdict_ballots_accepted_total", "Ballots accepted and stored"),
            registry
        )
        .expect("failed to register ballots_accepted counter");

        let ballots_rejected = register_int_counter_vec_with_registry!(
            Opts::new("verdict_ballots_rejected_total", "Ballots rejected by validation"),
            &["reason"],
            registry
        )
        .expect("failed to register ballots_rejected counter");

        let ballots_already_voted = register_int_counter_with_registry!(
            Opts::new(
                "verdict_ballots_already_voted_total",
                "Resubmissions answered with the existing ballot"
            ),
            registry
        )
        .expect("failed to register ballots_already_voted counter");

        let tallies_computed = register_int_counter_with_registry!(
            Opts::new("verdict_tallies_computed_total", "Tallies computed"),
            registry
        )
        .expect("failed to register tallies_computed counter");

        let forced_transitions = register_int_counter_with_registry!(
            Opts::new(
                "verdict_forced_transitions_total",
                "Status transitions forced by reconciliation"
            ),
            registry
        )
        .expect("failed to register forced_transitions counter");

        let integrity_failures = register_int_counter_with_registry!(
            Opts::new(
                "verdict_integrity_failures_total",
                "Commitments whose stored payload no longer matches its hash"
            ),
            registry
        )
        .expect("failed to register integrity_failures counter");

        // 0.1 ms → ~1.6 s.
        let tally_duration_ms = register_histogram_with_registry!(
            HistogramOpts::new("verdict_tally_duration_ms", "Tally computation time in milliseconds")
                .buckets(prometheus::exponential_buckets(0.1, 2.0, 15).expect("valid bucket layout")),
            registry
        )
        .expect("failed to register tally_duration_ms histogram");

        Self {
            registry,
            ballots_accepted,
            ballots_rejected,
            ballots_already_voted,
            tallies_computed,
            forced_transitions,
            integrity_failures,
            tally_duration_ms,
        }
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_output_names_every_metric() {
        let metrics = NodeMetrics::new();
        metrics.ballots_accepted.inc();
        metrics.ballots_rejected.with_label_values(&["unknown_voter"]).inc();
        metrics.tally_duration_ms.observe(1.5);
        let text = metrics.encode();
        for name in [
            "verdict_ballots_accepted_total 1",
            "verdict_ballots_rejected_total{reason=\"unknown_voter\"} 1",
            "verdict_ballots_already_voted_total 0",
            "verdict_tallies_computed_total 0",
            "verdict_forced_transitions_total 0",
            "verdict_integrity_failures_total 0",
            "verdict_tally_duration_ms_count 1",
        ] {
            assert!(text.contains(name), "missing {name} in\n{text}");
        }
    }
}
