/// Liveness probe.
pub async fn heartbeat() -> &'static str {
    "."
}
