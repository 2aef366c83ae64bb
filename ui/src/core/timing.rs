//! Timers and calendar helpers shared by the dashboard views.

#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(ms as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// Current calendar year, used for the upper publication-date bound and
/// the date-range shortcut buttons.
pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}
