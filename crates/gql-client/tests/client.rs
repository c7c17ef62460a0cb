use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use gql_client::{
    CredentialPolicy, FileUpload, GraphqlClientBuilder, GraphqlClientError, GraphqlOperation,
    RetryPolicy, RetryStrategy,
};

#[derive(Debug, Serialize)]
struct EmptyVars {}

#[derive(Debug, Serialize)]
struct ImageVars {
    image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Debug, Serialize, Deserialize)]
struct Viewer {
    id: String,
}

struct ViewerQuery;

impl GraphqlOperation for ViewerQuery {
    type Variables = EmptyVars;
    type ResponseData = ViewerData;

    const QUERY: &'static str = "query Viewer { viewer { id } }";
    const OPERATION_NAME: &'static str = "Viewer";
}

struct UploadImageMutation;

impl GraphqlOperation for UploadImageMutation {
    type Variables = ImageVars;
    type ResponseData = serde_json::Value;

    const QUERY: &'static str = "mutation UploadImage($image: Upload!) { uploadImage(image: $image) { id } }";
    const OPERATION_NAME: &'static str = "UploadImage";

    fn is_idempotent() -> bool {
        false
    }
}

struct DeleteViewerMutation;

impl GraphqlOperation for DeleteViewerMutation {
    type Variables = EmptyVars;
    type ResponseData = ViewerData;

    const QUERY: &'static str = "mutation DeleteViewer { deleteViewer { id } }";
    const OPERATION_NAME: &'static str = "DeleteViewer";

    fn is_idempotent() -> bool {
        false
    }
}

struct FailThenSucceed {
    counter: Arc<AtomicUsize>,
}

impl Respond for FailThenSucceed {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let attempt = self.counter.fetch_add(1, Ordering::SeqCst);
        if attempt == 0 {
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "fail"}))
        } else {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"viewer": {"id": "user-2"}}
            }))
        }
    }
}

fn fast_retry(strategy: RetryStrategy) -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        max_jitter: Duration::ZERO,
        strategy,
    }
}

#[tokio::test]
async fn execute_query_success() {
    let server = MockServer::start().await;

    let expected_body = serde_json::json!({
        "query": ViewerQuery::QUERY,
        "operationName": ViewerQuery::OPERATION_NAME,
        "variables": {},
    });

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"viewer": {"id": "user-1"}}
        })))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .build()
        .expect("client");

    let response = client
        .execute::<ViewerQuery>(EmptyVars {})
        .await
        .expect("query should succeed");

    assert!(response.is_ok());
    assert_eq!(response.data.expect("missing data").viewer.id, "user-1");
}

#[tokio::test]
async fn graphql_errors_surface_without_being_suppressed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errors": [{
                "message": "boom",
                "locations": [{"line": 1, "column": 9}],
                "path": ["viewer", "id"]
            }]
        })))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .build()
        .expect("client");

    // The full response keeps the error list intact.
    let response = client
        .execute::<ViewerQuery>(EmptyVars {})
        .await
        .expect("transport should succeed");
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "boom");
    assert_eq!(response.errors[0].path_string(), "viewer.id");

    // The strict form turns the same list into an error.
    let err = client
        .execute_strict::<ViewerQuery>(EmptyVars {})
        .await
        .expect_err("strict execution should fail");
    match err {
        GraphqlClientError::GraphqlErrors { errors } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn retries_idempotent_query_on_server_error() {
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(FailThenSucceed {
            counter: counter.clone(),
        })
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_retry_policy(fast_retry(RetryStrategy::Always))
        .build()
        .expect("client");

    let data = client
        .execute_strict::<ViewerQuery>(EmptyVars {})
        .await
        .expect("query should succeed after retry");

    assert_eq!(data.viewer.id, "user-2");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn mutation_is_not_retried() {
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(FailThenSucceed {
            counter: counter.clone(),
        })
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_retry_policy(fast_retry(RetryStrategy::IdempotentOnly))
        .build()
        .expect("client");

    let err = client
        .execute_strict::<DeleteViewerMutation>(EmptyVars {})
        .await
        .expect_err("mutation should fail without retry");

    assert!(matches!(err, GraphqlClientError::HttpStatus { .. }));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn upload_sends_multipart_operations_map_and_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"uploadImage": {"id": "img-1"}}
        })))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .build()
        .expect("client");

    let response = client
        .execute_upload::<UploadImageMutation>(
            ImageVars { image: None },
            vec![FileUpload::new(
                "variables.image",
                "photo.png",
                "image/png",
                b"PNGDATA".to_vec(),
            )],
        )
        .await
        .expect("upload should succeed");
    assert!(response.is_ok());

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let content_type = request
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .expect("content type");
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"operations\""));
    assert!(body.contains("name=\"map\""));
    assert!(body.contains("variables.image"));
    assert!(body.contains("filename=\"photo.png\""));
    assert!(body.contains("PNGDATA"));
}

#[tokio::test]
async fn upload_without_files_is_rejected() {
    let client = GraphqlClientBuilder::new("http://localhost:1/api/graphql")
        .build()
        .expect("client");

    let err = client
        .execute_upload::<UploadImageMutation>(ImageVars { image: None }, vec![])
        .await
        .expect_err("empty upload should be rejected");

    assert!(matches!(err, GraphqlClientError::InvalidUpload { .. }));
}

#[tokio::test]
async fn include_policy_carries_cookies_across_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc; Path=/")
                .set_body_json(serde_json::json!({
                    "data": {"viewer": {"id": "user-1"}}
                })),
        )
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_credentials(CredentialPolicy::Include)
        .build()
        .expect("client");

    client
        .execute::<ViewerQuery>(EmptyVars {})
        .await
        .expect("first request");
    client
        .execute::<ViewerQuery>(EmptyVars {})
        .await
        .expect("second request");

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 2);
    assert!(requests[0].headers.get("cookie").is_none());
    let cookie = requests[1]
        .headers
        .get("cookie")
        .and_then(|value| value.to_str().ok())
        .expect("cookie on second request");
    assert!(cookie.contains("session=abc"));
}

#[tokio::test]
async fn omit_policy_never_sends_cookies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc; Path=/")
                .set_body_json(serde_json::json!({
                    "data": {"viewer": {"id": "user-1"}}
                })),
        )
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_credentials(CredentialPolicy::Omit)
        .build()
        .expect("client");

    client
        .execute::<ViewerQuery>(EmptyVars {})
        .await
        .expect("first request");
    client
        .execute::<ViewerQuery>(EmptyVars {})
        .await
        .expect("second request");

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 2);
    assert!(requests[1].headers.get("cookie").is_none());
}
