use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    /// Like toggles segmented by outcome (liked, unliked).
    pub static ref LIKE_TOGGLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "social_like_toggles_total",
        "Like toggles segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register social_like_toggles_total");

    pub static ref POSTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "social_posts_created_total",
        "Posts created"
    )
    .expect("failed to register social_posts_created_total");

    /// Registration and login attempts (event=register|login, outcome=success|failure).
    pub static ref AUTH_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "social_auth_events_total",
        "Authentication events segmented by event and outcome",
        &["event", "outcome"]
    )
    .expect("failed to register social_auth_events_total");

    /// Latency of store calls, including ones cut off by the deadline.
    pub static ref STORE_CALL_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "social_store_call_duration_seconds",
        "Store call duration segmented by operation",
        &["operation"]
    )
    .expect("failed to register social_store_call_duration_seconds");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "social_http_request_duration_seconds",
        "HTTP request duration segmented by method, route pattern and status",
        &["method", "route", "status"]
    )
    .expect("failed to register social_http_request_duration_seconds");
}
