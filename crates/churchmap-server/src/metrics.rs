use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};

pub static OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("churchmap_ops_total", "Session operations", &["op"])
        .expect("churchmap_ops_total registers once")
});

pub static FILTER_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "filter_pass_seconds",
        "Filter and render pass duration",
        &["mode"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25]
    )
    .expect("filter_pass_seconds registers once")
});

pub static FEATURES_LOADED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("features_loaded", "Features in the store")
        .expect("features_loaded registers once")
});

pub static ACTIVE_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("active_sessions", "Open filter sessions")
        .expect("active_sessions registers once")
});

pub fn op(name: &str) {
    OPS_TOTAL.with_label_values(&[name]).inc();
}
