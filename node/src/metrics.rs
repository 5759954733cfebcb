//! # Prometheus Metrics
//!
//! Exposes ledger metrics for the node. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

use jpeth_contracts::{TokenError, TokenService};

/// Holds all Prometheus metric handles for the node.
#[derive(Clone)]
pub struct TokenMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Committed mutating operations, labelled by operation name.
    pub operations_total: IntCounterVec,
    /// Rejected mutating operations, labelled by error kind.
    pub rejections_total: IntCounterVec,
    /// JSON-RPC requests received, any method.
    pub rpc_requests_total: IntCounter,
    /// Current total supply, saturated at `i64::MAX`.
    pub total_supply: IntGauge,
    /// Accounts with a non-zero balance.
    pub holders: IntGauge,
    /// Whitelisted accounts.
    pub whitelisted_accounts: IntGauge,
    /// Time spent holding the write lock per mutating operation, in seconds.
    pub operation_latency_seconds: Histogram,
}

impl TokenMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("jpeth".into()), None)?;

        let operations_total = IntCounterVec::new(
            Opts::new("operations_total", "Committed mutating token operations"),
            &["operation"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new("rejections_total", "Rejected token operations by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let rpc_requests_total =
            IntCounter::new("rpc_requests_total", "JSON-RPC requests received")?;
        registry.register(Box::new(rpc_requests_total.clone()))?;

        let total_supply = IntGauge::new("total_supply", "Current total supply in raw units")?;
        registry.register(Box::new(total_supply.clone()))?;

        let holders = IntGauge::new("holders", "Accounts holding a non-zero balance")?;
        registry.register(Box::new(holders.clone()))?;

        let whitelisted_accounts =
            IntGauge::new("whitelisted_accounts", "Accounts on the transfer whitelist")?;
        registry.register(Box::new(whitelisted_accounts.clone()))?;

        let operation_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "operation_latency_seconds",
                "Time spent applying a mutating operation, in seconds",
            )
            .buckets(vec![
                0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1,
            ]),
        )?;
        registry.register(Box::new(operation_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            rejections_total,
            rpc_requests_total,
            total_supply,
            holders,
            whitelisted_accounts,
            operation_latency_seconds,
        })
    }

    /// Records the outcome of one mutating operation.
    pub fn record_operation(
        &self,
        operation: &str,
        result: &Result<(), TokenError>,
        elapsed: Duration,
    ) {
        self.operation_latency_seconds.observe(elapsed.as_secs_f64());
        match result {
            Ok(()) => self.operations_total.with_label_values(&[operation]).inc(),
            Err(e) => {
                let kind = e.kind().to_string();
                self.rejections_total.with_label_values(&[kind.as_str()]).inc();
            }
        }
    }

    /// Refreshes the gauges from the current ledger state.
    pub fn observe_ledger(&self, token: &TokenService) {
        self.total_supply
            .set(i64::try_from(token.total_supply()).unwrap_or(i64::MAX));
        self.holders
            .set(i64::try_from(token.holder_count()).unwrap_or(i64::MAX));
        self.whitelisted_accounts
            .set(i64::try_from(token.whitelist().len()).unwrap_or(i64::MAX));
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<TokenMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
