//! Local HTTP upstream for provider tests.

use std::sync::{Arc, Mutex};

use axum::{Router, http::Uri, http::header::CONTENT_TYPE};
use tokio::net::TcpListener;

/// Base URL of a refused port: every request is a transport failure.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub struct Stub {
    pub base: String,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    /// Answer every request with `body` as JSON.
    pub async fn serve(body: &'static str) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new().fallback({
            let seen = seen.clone();
            move |uri: Uri| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(uri.to_string());
                    ([(CONTENT_TYPE, "application/json")], body)
                }
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            seen,
        }
    }

    /// Path and query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}
