//! A development server for previewing a built site. It only serves files:
//! `/dist/*` from the static directory, `/posts/*` from the posts directory
//! and `/` from the generated `index.html`.

use crate::config::Layout;
use axum::Router;
use std::net::SocketAddr;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// The port the preview server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8081;

/// The environment variable which turns on the preview server when it is
/// exactly `"true"`.
pub const RUN_VARIABLE: &str = "run";

/// Reports whether the environment asks for the preview server.
pub fn requested_by_env() -> bool {
    is_enabled(std::env::var(RUN_VARIABLE).ok().as_deref())
}

fn is_enabled(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Builds the router serving the output of `layout`.
pub fn router(layout: &Layout) -> Router {
    Router::new()
        .nest_service("/dist", ServeDir::new(layout.static_directory()))
        .nest_service("/posts", ServeDir::new(layout.posts_directory()))
        .route_service("/", ServeFile::new(layout.index_output_file()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Serves the site on `0.0.0.0:{port}` until the process is terminated.
pub async fn serve(layout: &Layout, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router(layout)).await
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::fs;
    use tower::ServiceExt;

    fn site() -> (tempfile::TempDir, Layout) {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        fs::write(layout.index_output_file(), "<h1>index</h1>").unwrap();
        fs::create_dir_all(layout.static_directory()).unwrap();
        fs::write(layout.static_directory().join("site.css"), "body {}").unwrap();
        fs::create_dir_all(layout.posts_directory().join("a")).unwrap();
        fs::write(layout.post_output_file("a"), "<h1>A</h1>").unwrap();
        (root, layout)
    }

    async fn get(layout: &Layout, uri: &str) -> (StatusCode, String) {
        let response = router(layout)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_is_enabled() {
        assert!(is_enabled(Some("true")));
        assert!(!is_enabled(Some("TRUE")));
        assert!(!is_enabled(Some("1")));
        assert!(!is_enabled(None));
    }

    #[tokio::test]
    async fn test_serves_index() {
        let (_root, layout) = site();
        assert_eq!(
            get(&layout, "/").await,
            (StatusCode::OK, "<h1>index</h1>".to_owned())
        );
    }

    #[tokio::test]
    async fn test_serves_static_and_posts() {
        let (_root, layout) = site();
        assert_eq!(
            get(&layout, "/dist/site.css").await,
            (StatusCode::OK, "body {}".to_owned())
        );
        assert_eq!(
            get(&layout, "/posts/a/index.html").await,
            (StatusCode::OK, "<h1>A</h1>".to_owned())
        );
    }

    #[tokio::test]
    async fn test_unknown_file() {
        let (_root, layout) = site();
        let (status, _) = get(&layout, "/posts/missing/index.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
