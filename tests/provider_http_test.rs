//! プロバイダHTTPクライアントのテスト
//!
//! ローカルのTcpListenerで定型レスポンスを返し、ステータスごとの分類と
//! チェーン全体の遷移を検証

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tag_ai_common::{AnalysisRequest, EncodedImage, ErrorKind, ProviderOutcome};
use tag_ai_rust::analyzer::FallbackChain;
use tag_ai_rust::provider::{ChatCompletionsClient, ProviderSettings, VisionProvider};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SUCCESS_BODY: &str = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"US Army dog tag, circa 1944"}}]}"#;

/// 同じレスポンスを返し続けるテスト用サーバ
struct MockServer {
    url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    async fn start(status: u16, body: &'static str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    async fn start_with_delay(status: u16, body: &'static str, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (hits_task, requests_task) = (hits.clone(), requests.clone());
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { break };
                hits_task.fetch_add(1, Ordering::SeqCst);
                let raw = read_request(&mut stream).await;
                requests_task.lock().unwrap().push(raw);

                tokio::time::sleep(delay).await;
                let response = format!(
                    "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { url, hits, requests }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> String {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

/// ヘッダとContent-Length分の本文を読み切る
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn settings(name: &str, url: &str, api_key: Option<&str>) -> ProviderSettings {
    ProviderSettings {
        name: name.into(),
        endpoint: url.into(),
        model: "gpt-4o".into(),
        api_key: api_key.map(Into::into),
        timeout: Duration::from_secs(5),
        max_tokens: 1000,
        user_agent: None,
    }
}

fn client(name: &str, url: &str) -> ChatCompletionsClient {
    ChatCompletionsClient::new(settings(name, url, Some("test-key"))).unwrap()
}

fn image() -> EncodedImage {
    EncodedImage::new("/9j/", "image/jpeg")
}

#[tokio::test]
async fn test_success_extracts_first_message() {
    let server = MockServer::start(200, SUCCESS_BODY).await;

    let outcome = client("OpenAI", &server.url).analyze(&image(), "describe").await;

    assert_eq!(outcome, ProviderOutcome::success("US Army dog tag, circa 1944", "OpenAI"));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_request_carries_key_and_data_url() {
    let server = MockServer::start(200, SUCCESS_BODY).await;
    let settings = ProviderSettings {
        user_agent: Some("xAI-Client/1.0".into()),
        ..settings("xAI", &server.url, Some("xai-secret"))
    };

    ChatCompletionsClient::new(settings).unwrap().analyze(&image(), "read the tag").await;

    let raw = server.last_request();
    let lower = raw.to_lowercase();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(lower.contains("authorization: bearer xai-secret"));
    assert!(lower.contains("content-type: application/json"));
    assert!(lower.contains("user-agent: xai-client/1.0"));
    assert!(raw.contains("data:image/jpeg;base64,/9j/"));
    assert!(raw.contains("read the tag"));
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let cases = [
        (401, r#"{"error":{"message":"Incorrect API key provided"}}"#, ErrorKind::AuthError, "Incorrect API key provided"),
        (402, r#"{"error":{"message":"billing required"}}"#, ErrorKind::PaymentRequired, "billing required"),
        (429, r#"{"error":{"message":"quota exceeded"}}"#, ErrorKind::RateLimited, "quota exceeded"),
        (500, r#"{"error":{"message":"model crashed"}}"#, ErrorKind::ServerError, "model crashed"),
        (502, "Bad Gateway", ErrorKind::ServerError, "Bad Gateway"),
    ];

    for (status, body, kind, diagnostic) in cases {
        let server = MockServer::start(status, body).await;
        let outcome = client("xAI", &server.url).analyze(&image(), "describe").await;

        match outcome {
            ProviderOutcome::Failure { kind: actual, message } => {
                assert_eq!(actual, kind, "status {}", status);
                assert!(message.contains(diagnostic), "status {}: {}", status, message);
                assert!(message.contains(&status.to_string()));
            }
            other => panic!("status {}: unexpected {:?}", status, other),
        }
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_unknown() {
    let server = MockServer::start(200, r#"{"object":"chat.completion"}"#).await;
    let outcome = client("xAI", &server.url).analyze(&image(), "describe").await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::Unknown));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start_with_delay(200, SUCCESS_BODY, Duration::from_secs(5)).await;
    let settings = ProviderSettings {
        timeout: Duration::from_millis(200),
        ..settings("xAI", &server.url, Some("k"))
    };

    let outcome = ChatCompletionsClient::new(settings).unwrap().analyze(&image(), "describe").await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Timeout));
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    // 空きポートを確保してすぐ閉じる
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
    drop(listener);

    let outcome = client("OpenAI", &url).analyze(&image(), "describe").await;

    match outcome {
        ProviderOutcome::Failure { kind, message } => {
            assert_eq!(kind, ErrorKind::NetworkError);
            assert!(message.starts_with("OpenAI network error"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let server = MockServer::start(200, SUCCESS_BODY).await;
    let provider = ChatCompletionsClient::new(settings("xAI", &server.url, None)).unwrap();

    let outcome = provider.analyze(&image(), "describe").await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::AuthError));
    assert_eq!(server.hits(), 0);
}

fn chain(primary: &MockServer, secondary: &MockServer) -> FallbackChain {
    FallbackChain::new(
        Arc::new(client("xAI", &primary.url)),
        Arc::new(client("OpenAI", &secondary.url)),
    )
}

fn request(hint: &str) -> AnalysisRequest {
    AnalysisRequest::new(image(), "describe").with_context_hint(hint)
}

/// 1番目が429なら2番目へ進む
#[tokio::test]
async fn test_chain_rate_limited_primary_falls_back() {
    let primary = MockServer::start(429, r#"{"error":{"message":"slow down"}}"#).await;
    let secondary = MockServer::start(200, SUCCESS_BODY).await;

    let result = chain(&primary, &secondary).run(&request("dogtag_01.png")).await;

    assert!(result.success);
    assert!(!result.is_demo);
    assert_eq!(result.provider, "OpenAI");
    assert_eq!(result.text, "US Army dog tag, circa 1944");
    assert_eq!(result.failures[0].kind, ErrorKind::RateLimited);
    assert_eq!((primary.hits(), secondary.hits()), (1, 1));
}

/// 1番目が401でも2番目へ進む
#[tokio::test]
async fn test_chain_auth_failure_falls_back() {
    let primary = MockServer::start(401, r#"{"error":{"message":"invalid key"}}"#).await;
    let secondary = MockServer::start(200, SUCCESS_BODY).await;

    let result = chain(&primary, &secondary).run(&request("dogtag_01.png")).await;

    assert_eq!(result.provider, "OpenAI");
    assert_eq!(result.failures[0].kind, ErrorKind::AuthError);
    assert_eq!(secondary.hits(), 1);
}

/// 1番目が成功したら2番目には接続しない
#[tokio::test]
async fn test_chain_primary_success_never_contacts_secondary() {
    let primary = MockServer::start(200, SUCCESS_BODY).await;
    let secondary = MockServer::start(200, SUCCESS_BODY).await;

    let result = chain(&primary, &secondary).run(&request("dogtag_01.png")).await;

    assert_eq!(result.provider, "xAI");
    assert_eq!(secondary.hits(), 0);
}

/// 両方サーバエラーならデモ
#[tokio::test]
async fn test_chain_both_fail_uses_demo() {
    let primary = MockServer::start(500, "boom").await;
    let secondary = MockServer::start(503, "down").await;

    let result = chain(&primary, &secondary).run(&request("field_towel.jpg")).await;

    assert!(result.is_demo);
    assert!(result.success);
    assert!(result.text.contains("Cotton hand towel"));
    assert_eq!(result.failures.len(), 2);
    assert!(result.failures[1].message.contains("down"));
}
