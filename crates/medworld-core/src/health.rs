use axum::http::StatusCode;

/// `GET /healthz`. Answers 200 whenever the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz`. Answers 200 once the router is serving; a service with
/// external dependencies can mount its own probe instead.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn liveness_always_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_always_ok() {
        assert_eq!(readyz().await, StatusCode::OK);
    }
}
