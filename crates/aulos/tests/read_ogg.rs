//! End-to-end: a synthesized Ogg/Vorbis file read over HTTP and from memory.

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
use aulos::{TagValue, Tags};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::net::TcpListener;
use url::Url;

// ---------------------------------------------------------------------------
// Ogg fixture
// ---------------------------------------------------------------------------

fn page(segments: &[u8], payload: &[u8]) -> Vec<u8> {
    assert_eq!(
        segments.iter().map(|&s| s as usize).sum::<usize>(),
        payload.len()
    );
    let mut out = Vec::new();
    out.extend_from_slice(b"OggS");
    out.extend_from_slice(&[0u8; 22]);
    out.push(segments.len() as u8);
    out.extend_from_slice(segments);
    out.extend_from_slice(payload);
    out
}

/// Segment table for one packet that terminates within its page.
fn segments_for(len: usize) -> Vec<u8> {
    assert!(len % 255 != 0, "fixture packets must not be 255-multiples");
    let mut table = vec![255u8; len / 255];
    table.push((len % 255) as u8);
    table
}

fn picture_comment() -> String {
    let image: Vec<u8> = (0..300u32).map(|i| (i % 256) as u8).collect();
    let mut raw = Vec::new();
    raw.extend_from_slice(&3u32.to_be_bytes()); // Cover (front)
    raw.extend_from_slice(&(b"image/png".len() as u32).to_be_bytes());
    raw.extend_from_slice(b"image/png");
    raw.extend_from_slice(&(b"cover".len() as u32).to_be_bytes());
    raw.extend_from_slice(b"cover");
    raw.extend_from_slice(&[0u8; 16]);
    raw.extend_from_slice(&(image.len() as u32).to_be_bytes());
    raw.extend_from_slice(&image);
    format!("METADATA_BLOCK_PICTURE={}", BASE64.encode(raw))
}

fn comment_packet() -> Vec<u8> {
    let picture = picture_comment();
    let comments = [
        "TITLE=Night Ride",
        "ARTIST=Analog Tape",
        "ALBUM=Side B",
        "DATE=2021",
        "TRACKNUMBER=3",
        "GENRE=Electronic",
        "ENCODER=reference encoder",
        picture.as_str(),
    ];

    let mut out = vec![0x03];
    out.extend_from_slice(b"vorbis");
    let vendor = b"aulos fixture";
    out.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    out.extend_from_slice(vendor);
    out.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for comment in comments {
        out.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        out.extend_from_slice(comment.as_bytes());
    }
    out
}

/// Two header pages plus a fat audio page nothing should ever fetch.
fn ogg_file() -> Vec<u8> {
    let mut ident = b"\x01vorbis".to_vec();
    ident.extend_from_slice(&[0u8; 23]);

    let comment = comment_packet();

    let mut file = page(&[ident.len() as u8], &ident);
    file.extend_from_slice(&page(&segments_for(comment.len()), &comment));
    for _ in 0..4 {
        file.extend_from_slice(&page(&[250], &[0xA5; 250]));
    }
    file
}

fn assert_expected_tags(tags: &Tags) {
    assert_eq!(tags.format, "Vorbis");
    assert_eq!(tags.text("title"), Some("Night Ride"));
    assert_eq!(tags.text("artist"), Some("Analog Tape"));
    assert_eq!(tags.text("album"), Some("Side B"));
    assert_eq!(tags.text("year"), Some("2021"));
    assert_eq!(tags.text("track"), Some("3"));
    assert_eq!(tags.text("genre"), Some("Electronic"));

    match tags.tags.get("picture") {
        Some(TagValue::Picture(picture)) => {
            assert_eq!(picture.format, "image/png");
            assert_eq!(picture.kind, "Cover (front)");
            assert_eq!(picture.description, "cover");
            assert_eq!(picture.data.len(), 300);
        }
        other => panic!("expected one picture, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// HTTP fixture server
// ---------------------------------------------------------------------------

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
    let end: usize = end.parse::<usize>().unwrap().min(len - 1);

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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reads_tags_over_http_in_two_requests() {
    let file = ogg_file();
    assert!(file.len() > 1024, "fixture must outgrow one request block");

    let (url, requests, _shutdown) = serve(file).await;
    let tags = aulos::read(url).await.unwrap();

    assert_expected_tags(&tags);
    // One HEAD for the size, one range GET whose 1 KiB rounding covers the
    // probe and both header pages; the audio pages are never requested.
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reads_tags_from_memory() {
    let tags = aulos::read(ogg_file()).await.unwrap();
    assert_expected_tags(&tags);
}

#[tokio::test]
async fn tags_to_read_filters_output() {
    let tags = aulos::Reader::new(ogg_file())
        .tags_to_read(["title", "picture"])
        .read()
        .await
        .unwrap();

    assert_eq!(tags.text("title"), Some("Night Ride"));
    assert!(tags.tags.contains_key("picture"));
    assert!(!tags.tags.contains_key("artist"));
    assert!(!tags.tags.contains_key("year"));
}

#[tokio::test]
async fn non_ogg_bytes_are_no_matching_format() {
    let err = aulos::read(vec![0u8; 512]).await.unwrap_err();
    assert!(matches!(err, aulos::ReadError::NoMatchingFormat));
}

#[tokio::test]
async fn tags_serialize_to_json() {
    let tags = aulos::read(ogg_file()).await.unwrap();
    let json = serde_json::to_value(&tags).unwrap();

    assert_eq!(json["format"], "Vorbis");
    assert_eq!(json["tags"]["title"], "Night Ride");
    assert_eq!(json["tags"]["picture"]["format"], "image/png");
    assert_eq!(json["tags"]["picture"]["type"], "Cover (front)");
}
