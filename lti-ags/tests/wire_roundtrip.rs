//! Wire-level tests against a local one-shot HTTP responder.
//!
//! Each test serves one canned response on an ephemeral port and captures
//! the request head, so the client's method, path, query and body hit a
//! real socket without any platform dependency.

use std::time::Duration;

use lti_ags::{AgsCapabilities, AgsClient, LineItem, ResultsFilter, Score};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `body` as a 200 response to the next connection and hand back
/// the raw request head (request line + headers + any body read).
async fn one_shot_server(status: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        // Read until the header terminator, then drain the declared body.
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if let Some(header_end) = find_header_end(&request) {
                let head = String::from_utf8_lossy(&request[..header_end]).to_string();
                let content_length = content_length(&head);
                let mut body_read = request.len() - header_end;
                while body_read < content_length {
                    let n = stream.read(&mut buf).await.unwrap();
                    request.extend_from_slice(&buf[..n]);
                    body_read += n;
                }
                break;
            }
            if n == 0 {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        String::from_utf8_lossy(&request).to_string()
    });

    (format!("http://{addr}"), handle)
}

fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}

fn client(base: &str) -> AgsClient {
    AgsClient::builder()
        .line_items_url(format!("{base}/course/1/lineitems"))
        .access_token("access-token-1")
        .capabilities(AgsCapabilities::all())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn created_line_item_round_trips_through_get() {
    // The platform echoes the created item back with its assigned id.
    let stored = r#"{
        "id": "https://platform.example.edu/course/1/lineitems/7",
        "label": "Quiz 1",
        "scoreMaximum": 100.0,
        "resourceLinkId": "rl-1",
        "tag": "quiz"
    }"#;

    let (base, server) = one_shot_server("200 OK", stored.to_string()).await;
    let created = client(&base)
        .create_line_item(&LineItem {
            label: "Quiz 1".into(),
            score_maximum: 100.0,
            resource_link_id: Some("rl-1".into()),
            tag: Some("quiz".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /course/1/lineitems HTTP/1.1"));
    assert!(request.contains("authorization: Bearer access-token-1")
        || request.contains("Authorization: Bearer access-token-1"));
    assert!(request.contains("application/vnd.ims.lis.v2.lineitem+json"));

    // A follow-up GET at the echoed id returns an equal item.
    let (base, server) = one_shot_server("200 OK", stored.to_string()).await;
    let id = created.id.clone().unwrap();
    let item_url = format!("{base}{}", url::Url::parse(&id).unwrap().path());
    let fetched = client(&base).get_line_item(&item_url).await.unwrap();
    server.await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.label, "Quiz 1");
    assert_eq!(fetched.tag.as_deref(), Some("quiz"));
}

#[tokio::test]
async fn results_request_builds_filtered_query_on_results_path() {
    let (base, server) = one_shot_server(
        "200 OK",
        r#"[{"userId": "u1", "resultScore": 83.0, "resultMaximum": 100.0}]"#.to_string(),
    )
    .await;

    let filter = ResultsFilter {
        limit: Some(10),
        page: None,
        user_id: Some("u1".into()),
    };
    let results = client(&base)
        .get_line_item_results(&format!("{base}/course/1/lineitems/7"), &filter)
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(
        request.starts_with("GET /course/1/lineitems/7/results?limit=10&userId=u1 HTTP/1.1"),
        "unexpected request line in: {request}"
    );

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].user_id, "u1");
    assert_eq!(results[0].result_score, Some(83.0));
}

#[tokio::test]
async fn score_posts_to_scores_path_and_ignores_the_body() {
    let (base, server) = one_shot_server("200 OK", String::new()).await;

    client(&base)
        .score(
            &format!("{base}/course/1/lineitems/7"),
            &Score::graded("u1", 83.0, 100.0),
        )
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /course/1/lineitems/7/scores HTTP/1.1"));
    assert!(request.contains("application/vnd.ims.lis.v1.score+json"));
    assert!(request.contains("\"activityProgress\":\"Completed\""));
}

#[tokio::test]
async fn non_success_status_is_remote_rejected_with_diagnostics() {
    let (base, server) =
        one_shot_server("403 Forbidden", r#"{"error": "insufficient scope"}"#.to_string()).await;

    let err = client(&base)
        .delete_line_item(&format!("{base}/course/1/lineitems/7"))
        .await
        .unwrap_err();
    server.await.unwrap();

    match err {
        lti_ags::AgsError::RemoteRejected { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("insufficient scope"));
        }
        other => panic!("expected RemoteRejected, got {other:?}"),
    }
}
