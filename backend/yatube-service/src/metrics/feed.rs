use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// Feed requests by scope (global, group, profile, followed).
    pub static ref FEED_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_feed_request_total",
        "Total feed requests segmented by scope",
        &["scope"]
    )
    .expect("failed to register yatube_feed_request_total");

    /// Time spent resolving and paging a feed, by scope.
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "yatube_feed_request_duration_seconds",
        "Feed request duration segmented by scope",
        &["scope"]
    )
    .expect("failed to register yatube_feed_request_duration_seconds");

    /// Global feed cache events (hit/miss/error/write/clear).
    pub static ref FEED_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "yatube_feed_cache_events_total",
        "Feed cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register yatube_feed_cache_events_total");
}

pub fn record_cache_event(event: &str) {
    FEED_CACHE_EVENTS.with_label_values(&[event]).inc();
}

pub fn record_feed_request(scope: &str, elapsed: std::time::Duration) {
    FEED_REQUEST_TOTAL.with_label_values(&[scope]).inc();
    FEED_REQUEST_DURATION_SECONDS
        .with_label_values(&[scope])
        .observe(elapsed.as_secs_f64());
}
