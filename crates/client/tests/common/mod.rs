use axum::Router;
use serde_json::{json, Value};
use studio_client::{ApiClient, ApiConfig};

/// Serve `router` on an ephemeral local port and return the base URL
/// (including the `/api` prefix) a client should use.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Build a client pointed at `base_url` with an optional token.
pub fn client_for(base_url: &str, token: Option<&str>) -> ApiClient {
    ApiClient::new(ApiConfig {
        base_url: base_url.to_string(),
        token: token.map(str::to_string),
        ..Default::default()
    })
    .unwrap()
}

/// Wrap `data` in a success envelope.
pub fn ok(data: Value) -> Value {
    json!({
        "code": 200,
        "message": "操作成功",
        "data": data,
        "timestamp": 1_767_419_298_000_i64,
    })
}

/// A business-error envelope.
pub fn fail(code: i32, message: &str) -> Value {
    json!({
        "code": code,
        "message": message,
        "timestamp": 1_767_419_298_000_i64,
    })
}
