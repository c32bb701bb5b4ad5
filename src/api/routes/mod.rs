pub mod events;
pub mod leaderboard;

/// Liveness check.
pub async fn index() -> &'static str {
    "Hello, World!"
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_index() {
        let (state, _) = test_state();
        let app = crate::api::build_router(state, false);

        let (status, body) = send(app, Request::builder().uri("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello, World!");
    }
}
