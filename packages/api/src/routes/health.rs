use axum::http::StatusCode;

pub const HEALTHY: &str = concat!("chess games api ", env!("CARGO_PKG_VERSION"), ": healthy");

/// Liveness only; the stores are not touched.
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, HEALTHY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_reports_version() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(env!("CARGO_PKG_VERSION")));
    }
}
