use std::sync::Once;
use std::time::Duration;

use docconv_client::{
    ClientConfig, ClientError, ConversionClient, ConversionRequest, HttpRequest, ReqwestTransport,
    Transport, TransportErrorKind,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docconv_logging::initialize_for_tests);
}

async fn accepting_server(uuid: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/buildvu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": uuid })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

async fn only_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

fn header_value<'a>(request: &'a Request, name: &str) -> &'a str {
    request.headers.get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn upload_sends_multipart_with_file_and_auth_header() {
    init_logging();
    let server = accepting_server("job-1").await;
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("report.pdf");
    std::fs::write(&file, b"%PDF-1.7 binary\x00\xff").unwrap();

    let client = ConversionClient::new(ClientConfig::new(format!("{}/buildvu", server.uri()))).unwrap();
    let handle = client
        .submit(
            ConversionRequest::upload(file.to_string_lossy())
                .with_token("tok")
                .with_param("org.jpedal.pdf2html.maxNumberOfPages", "2")
                .with_credentials("user", "pass"),
        )
        .await
        .unwrap();
    assert_eq!(handle.uuid(), "job-1");
    assert_eq!(handle.endpoint(), format!("{}/buildvu", server.uri()));

    let request = only_request(&server).await;
    let content_type = header_value(&request, "content-type");
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");
    assert_eq!(header_value(&request, "authorization"), "Basic dXNlcjpwYXNz");
    assert_eq!(
        header_value(&request, "content-length"),
        request.body.len().to_string()
    );

    let body = &request.body;
    assert!(body
        .windows(b"%PDF-1.7 binary\x00\xff".len())
        .any(|w| w == b"%PDF-1.7 binary\x00\xff"));
    let text = String::from_utf8_lossy(body);
    assert!(text.contains("name=\"file\"; filename=\"report.pdf\""));
    assert!(text.contains("Content-Type: application/pdf"));
    assert!(text.contains("name=\"token\"\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\ntok\r\n"));
    assert!(text.contains("name=\"input\""));
    assert!(text.contains("name=\"org.jpedal.pdf2html.maxNumberOfPages\""));
    assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    assert!(!text.contains("name=\"username\""));
    assert!(!text.contains("name=\"password\""));
    assert!(!text.contains("pass\r\n"));
}

#[tokio::test]
async fn download_sends_urlencoded_form() {
    init_logging();
    let server = accepting_server("job-2").await;
    let client = ConversionClient::new(ClientConfig::new(format!("{}/buildvu", server.uri()))).unwrap();

    client
        .submit(
            ConversionRequest::download("http://docs.example/a file.pdf")
                .with_credentials("user", "pass"),
        )
        .await
        .unwrap();

    let request = only_request(&server).await;
    assert_eq!(
        header_value(&request, "content-type"),
        "application/x-www-form-urlencoded"
    );
    assert_eq!(
        String::from_utf8(request.body.clone()).unwrap(),
        "input=download&url=http%3A%2F%2Fdocs.example%2Fa+file.pdf"
    );
    assert_eq!(header_value(&request, "authorization"), "Basic dXNlcjpwYXNz");
}

#[tokio::test]
async fn non_200_submission_carries_status_and_body() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("conversion queue full"))
        .mount(&server)
        .await;
    let client = ConversionClient::new(ClientConfig::new(server.uri())).unwrap();

    let err = client
        .submit(ConversionRequest::download("http://docs.example/a.pdf"))
        .await
        .unwrap_err();
    match err {
        ClientError::Submission { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "conversion queue full");
        }
        other => panic!("expected Submission, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_uuid_is_a_submission_error() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "queued" })))
        .mount(&server)
        .await;
    let client = ConversionClient::new(ClientConfig::new(server.uri())).unwrap();

    let err = client
        .submit(ConversionRequest::download("http://docs.example/a.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingUuid { ref body } if body.contains("queued")));
}

#[tokio::test]
async fn unreadable_upload_file_is_reported_before_sending() {
    init_logging();
    let server = MockServer::start().await;
    let client = ConversionClient::new(ClientConfig::new(server.uri())).unwrap();
    let dir = tempfile::TempDir::new().unwrap();

    let err = client
        .submit(ConversionRequest::upload(
            dir.path().join("missing.pdf").to_string_lossy(),
        ))
        .await
        .unwrap_err();

    match err {
        ClientError::Connectivity { source, .. } => assert_eq!(source.kind, TransportErrorKind::Io),
        other => panic!("expected Connectivity, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn refused_connection_is_a_connectivity_error() {
    init_logging();
    // Nothing listens on port 1.
    let client = ConversionClient::new(ClientConfig::new("http://127.0.0.1:1/buildvu")).unwrap();
    let err = client
        .submit(ConversionRequest::download("http://docs.example/a.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Connectivity { .. }), "{err:?}");
}

#[tokio::test]
async fn transport_times_out_on_slow_response() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_millis(50)).unwrap();
    let request = HttpRequest::get(format!("{}/slow", server.uri()))
        .with_header("Authorization", "Basic dXNlcjpwYXNz");

    let err = transport.send(request).await.unwrap_err();
    assert_eq!(err.kind, TransportErrorKind::Timeout);
}

#[tokio::test]
async fn transport_returns_error_bodies_instead_of_failing() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown uuid"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let response = transport
        .send(HttpRequest::get(format!("{}/buildvu?uuid=x", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.text(), "unknown uuid");
}
