//! End-to-end checks of `HttpSource` against a real HTTP server.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use aulos_io::{MediaSource, ReadTarget, SourceFactory};
use tokio::net::TcpListener;
use url::Url;

#[derive(Clone)]
struct Fixture {
    body: Arc<Vec<u8>>,
    requests: Arc<AtomicU32>,
}

async fn file_handler(State(fixture): State<Fixture>, headers: HeaderMap) -> impl IntoResponse {
    fixture.requests.fetch_add(1, Ordering::SeqCst);
    let len = fixture.body.len();

    let Some(range) = headers.get(header::RANGE) else {
        return fixture.body.as_ref().clone().into_response();
    };

    let spec = range.to_str().unwrap().strip_prefix("bytes=").unwrap();
    let (start, end) = spec.split_once('-').unwrap();
    let start: usize = start.parse().unwrap();
    let end: usize = if end.is_empty() {
        len - 1
    } else {
        end.parse::<usize>().unwrap().min(len - 1)
    };

    (
        StatusCode::PARTIAL_CONTENT,
        [(header::CONTENT_RANGE, format!("bytes {start}-{end}/{len}"))],
        fixture.body[start..=end].to_vec(),
    )
        .into_response()
}

async fn serve(body: Vec<u8>) -> (Url, Arc<AtomicU32>, tokio::sync::oneshot::Sender<()>) {
    let requests = Arc::new(AtomicU32::new(0));
    let fixture = Fixture {
        body: Arc::new(body),
        requests: requests.clone(),
    };
    let router = Router::new()
        .route("/track.ogg", get(file_handler).head(file_handler))
        .with_state(fixture);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let url = Url::parse(&format!("http://{addr}/track.ogg")).unwrap();
    (url, requests, shutdown_tx)
}

fn test_body(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn open_load_and_read_over_http() {
    let body = test_body(8 * 1024);
    let (url, requests, _shutdown) = serve(body.clone()).await;

    let factory = aulos_io::HttpSourceFactory::default();
    let target = ReadTarget::Url(url);
    assert!(factory.can_open(&target));

    let source = factory.open(&target).unwrap();
    source.init().await.unwrap();
    assert_eq!(source.len().unwrap(), 8 * 1024);

    source.load_range((0, 26)).await.unwrap();
    assert_eq!(source.bytes_at(0, 27).unwrap(), &body[..27]);

    // HEAD + one range GET; the follow-up read inside the same 1 KiB block
    // is served from the store.
    source.load_range((27, 100)).await.unwrap();
    assert_eq!(requests.load(Ordering::SeqCst), 2);

    assert_eq!(
        source
            .string_at(512, 4, aulos_io::TextEncoding::Latin1)
            .unwrap()
            .len(),
        4
    );
}

#[tokio::test]
async fn transport_failure_surfaces_as_net_error() {
    let (url, _requests, shutdown) = serve(test_body(1024)).await;

    let factory = aulos_io::HttpSourceFactory::default();
    let source = factory.open(&ReadTarget::Url(url)).unwrap();
    source.init().await.unwrap();

    // Kill the server; the next load must resolve through the error path.
    drop(shutdown);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = source.load_range((0, 512)).await.unwrap_err();
    assert!(matches!(err, aulos_io::SourceError::Net(_)));
}
