use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use aulos_net::{HttpClient, Net, NetOptions, RangeSpec};
use tokio::net::TcpListener;
use url::Url;

// ---------------------------------------------------------------------------
// Test server infrastructure
// ---------------------------------------------------------------------------

struct TestServer {
    base_url: Url,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    async fn new(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });

        tokio::spawn(async move {
            server.await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn url(&self, path: &str) -> Url {
        self.base_url.join(path).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

fn parse_range(headers: &HeaderMap, len: usize) -> Option<(usize, usize)> {
    let value = headers.get(header::RANGE)?.to_str().ok()?;
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let start: usize = start.parse().ok()?;
    let end: usize = if end.is_empty() {
        len - 1
    } else {
        end.parse::<usize>().ok()?.min(len - 1)
    };
    Some((start, end))
}

async fn file_handler(State(body): State<&'static [u8]>, headers: HeaderMap) -> impl IntoResponse {
    match parse_range(&headers, body.len()) {
        Some((start, end)) => (
            StatusCode::PARTIAL_CONTENT,
            [(
                header::CONTENT_RANGE,
                format!("bytes {start}-{end}/{}", body.len()),
            )],
            body[start..=end].to_vec(),
        )
            .into_response(),
        None => body.to_vec().into_response(),
    }
}

fn fixture_router() -> Router {
    static BODY: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    Router::new()
        .route("/track.ogg", get(file_handler).head(file_handler))
        .with_state(BODY)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_bytes_returns_whole_body() {
    let server = TestServer::new(fixture_router()).await;
    let client = HttpClient::new(NetOptions::default());

    let body = client.get_bytes(server.url("/track.ogg"), None).await.unwrap();
    assert_eq!(&body[..], b"0123456789abcdefghijklmnopqrstuvwxyz");
}

#[tokio::test]
async fn get_range_returns_requested_slice() {
    let server = TestServer::new(fixture_router()).await;
    let client = HttpClient::new(NetOptions::default());

    let body = client
        .get_range(server.url("/track.ogg"), RangeSpec::new(10, Some(15)), None)
        .await
        .unwrap();
    assert_eq!(&body[..], b"abcdef");
}

#[tokio::test]
async fn head_exposes_content_length() {
    let server = TestServer::new(fixture_router()).await;
    let client = HttpClient::new(NetOptions::default());

    let headers = client.head(server.url("/track.ogg"), None).await.unwrap();
    assert_eq!(headers.get("content-length"), Some("36"));
}

#[tokio::test]
async fn missing_file_is_a_status_error() {
    let server = TestServer::new(fixture_router()).await;
    let client = HttpClient::new(NetOptions::default());

    let err = client
        .get_range(server.url("/nope.ogg"), RangeSpec::from_start(0), None)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}
