//! Local preview server for the generated site.
//!
//! Serves the output directory as static files on `127.0.0.1:<port>` until
//! Ctrl-C. The site only uses relative links, so `index.html`, post pages and
//! images resolve the same way they will on a real host; `feed.xml` links
//! use `base_url`, which defaults to this server's address.

use axum::Router;
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Output directory not found: {0} (run `gramfeed generate` first)")]
    MissingOutput(PathBuf),
    #[error("Cannot bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("Server error: {0}")]
    Io(#[from] io::Error),
}

/// Static file router over `dir`; directory requests get their `index.html`.
pub fn router(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(TraceLayer::new_for_http())
}

/// Serve `dir` on an already bound listener until `shutdown` resolves.
pub async fn serve_until(
    listener: TcpListener,
    dir: &Path,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    axum::serve(listener, router(dir))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Serve `dir` on localhost at `port`, blocking until Ctrl-C.
pub fn serve(dir: &Path, port: u16) -> Result<(), ServeError> {
    if !dir.is_dir() {
        return Err(ServeError::MissingOutput(dir.to_path_buf()));
    }
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;
        tracing::info!("serving {} at http://{addr}/", dir.display());
        serve_until(listener, dir, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn get(dir: &Path, uri: &str) -> (StatusCode, String) {
        let response = router(dir)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn serves_index_and_posts() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("posts")).unwrap();
        std::fs::write(tmp.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(tmp.path().join("posts/1.html"), "post one").unwrap();

        assert_eq!(
            get(tmp.path(), "/").await,
            (StatusCode::OK, "<h1>home</h1>".to_string())
        );
        assert_eq!(
            get(tmp.path(), "/posts/1.html").await,
            (StatusCode::OK, "post one".to_string())
        );
        assert_eq!(get(tmp.path(), "/nope.html").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn graceful_shutdown_returns() {
        let tmp = TempDir::new().unwrap();
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        serve_until(listener, tmp.path(), async {}).await.unwrap();
    }

    #[test]
    fn missing_output_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = serve(&tmp.path().join("site"), 8000).unwrap_err();
        assert!(matches!(err, ServeError::MissingOutput(_)));
    }
}
