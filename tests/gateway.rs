//! End-to-end tests: real gateway, raw TCP mock backends, reqwest client.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

mod common;

use common::{client, host, start_backend, start_gateway, start_static_backend, MockRequest, MockResponse};

fn counting_backend(calls: Arc<AtomicU32>, response: MockResponse) -> impl Fn(MockRequest) -> std::future::Ready<MockResponse> + Send + Sync + 'static {
    move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(response.clone())
    }
}

#[tokio::test]
async fn test_sequential_backends_are_aggregated() {
    let seen_users = Arc::new(Mutex::new(Vec::<MockRequest>::new()));
    let seen_orders = Arc::new(Mutex::new(Vec::<MockRequest>::new()));

    let users = {
        let seen = seen_users.clone();
        start_backend(move |request| {
            seen.lock().unwrap().push(request);
            async { MockResponse::json(200, json!({"id": 7, "name": "ana"})) }
        })
        .await
    };
    let orders = {
        let seen = seen_orders.clone();
        start_backend(move |request| {
            seen.lock().unwrap().push(request);
            async { MockResponse::json(200, json!([{"id": 10}, {"id": 11}])) }
        })
        .await
    };

    let (gateway, shutdown) = start_gateway(json!({
        "endpoints": [{
            "path": "/users/:id",
            "method": "GET",
            "response": {"aggregate": true},
            "backends": [
                {"hosts": [host(users)], "path": "/users/:id", "method": "GET"},
                {
                    "hosts": [host(orders)], "path": "/orders", "method": "GET",
                    "extra-config": {"group-response": "orders"},
                    "modifiers": {
                        "query": [{"context": "REQUEST", "action": "SET", "key": "user", "value": "#request.params.id"}],
                        "header": [{"context": "REQUEST", "action": "SET", "key": "X-User-Name", "value": "#responses.0.body.name"}]
                    }
                }
            ]
        }]
    }))
    .await;

    let res = client()
        .get(format!("{}/users/7", host(gateway)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-gopen-success"], "true");
    assert_eq!(res.headers()["x-gopen-complete"], "true");
    assert_eq!(res.headers()["x-gopen-cache"], "false");
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"id": 7, "name": "ana", "orders": [{"id": 10}, {"id": 11}]}));

    let users_seen = seen_users.lock().unwrap();
    assert_eq!(users_seen[0].target, "/users/7");
    assert!(users_seen[0].header("x-forwarded-for").is_some());

    let orders_seen = seen_orders.lock().unwrap();
    assert_eq!(orders_seen[0].target, "/orders?user=7");
    assert_eq!(orders_seen[0].header("x-user-name"), Some("ana"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_array_response_when_not_aggregated() {
    let a = start_static_backend(MockResponse::json(200, json!({"a": 1}))).await;
    let b = start_static_backend(MockResponse::text(201, "plain")).await;

    let (gateway, shutdown) = start_gateway(json!({
        "endpoints": [{
            "path": "/both",
            "method": "GET",
            "backends": [
                {"hosts": [host(a)], "path": "/a", "method": "GET"},
                {"hosts": [host(b)], "path": "/b", "method": "GET"}
            ]
        }]
    }))
    .await;

    let res = client().get(format!("{}/both", host(gateway))).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!([
            {"a": 1, "ok": true, "code": 200},
            {"ok": true, "code": 201, "body": "plain"}
        ])
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_timeout_is_gateway_timeout() {
    let slow = start_static_backend(
        MockResponse::json(200, json!({"late": true})).delayed(Duration::from_secs(2)),
    )
    .await;

    let (gateway, shutdown) = start_gateway(json!({
        "timeout": "200ms",
        "endpoints": [{
            "path": "/slow",
            "method": "GET",
            "backends": [{"hosts": [host(slow)], "path": "/slow", "method": "GET"}]
        }]
    }))
    .await;

    let res = client().get(format!("{}/slow", host(gateway))).send().await.unwrap();
    assert_eq!(res.status(), 504);
    assert_eq!(res.headers()["x-gopen-success"], "false");
    assert_eq!(res.headers()["x-gopen-complete"], "false");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["endpoint"], "/slow");
    assert_eq!(body["backend"], "/slow");

    shutdown.trigger();
}

#[tokio::test]
async fn test_abort_stops_remaining_backends() {
    let later_calls = Arc::new(AtomicU32::new(0));
    let failing = start_static_backend(MockResponse::text(500, "boom")).await;
    let later = start_backend(counting_backend(
        later_calls.clone(),
        MockResponse::json(200, json!({"ok": true})),
    ))
    .await;

    let (gateway, shutdown) = start_gateway(json!({
        "endpoints": [{
            "path": "/abort",
            "method": "GET",
            "abort-if-status-codes": [500],
            "backends": [
                {"hosts": [host(failing)], "path": "/fail", "method": "GET"},
                {"hosts": [host(later)], "path": "/later", "method": "GET"}
            ]
        }]
    }))
    .await;

    let res = client().get(format!("{}/abort", host(gateway))).send().await.unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(res.headers()["x-gopen-complete"], "false");
    assert_eq!(res.text().await.unwrap(), "boom");
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_beforeware_rejection_aborts() {
    let backend_calls = Arc::new(AtomicU32::new(0));
    let auth = start_static_backend(MockResponse::json(401, json!({"error": "unauthorized"}))).await;
    let backend = start_backend(counting_backend(
        backend_calls.clone(),
        MockResponse::json(200, json!({"secret": 1})),
    ))
    .await;

    let (gateway, shutdown) = start_gateway(json!({
        "middlewares": {
            "auth": {"hosts": [host(auth)], "path": "/check", "method": "GET"}
        },
        "endpoints": [{
            "path": "/private",
            "method": "GET",
            "beforewares": ["auth", "not-configured"],
            "backends": [{"hosts": [host(backend)], "path": "/private", "method": "GET"}]
        }]
    }))
    .await;

    let res = client().get(format!("{}/private", host(gateway))).send().await.unwrap();
    assert_eq!(res.status(), 401);
    assert_eq!(backend_calls.load(Ordering::SeqCst), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_cache_hit_skips_backend() {
    let calls = Arc::new(AtomicU32::new(0));
    let backend = start_backend(counting_backend(
        calls.clone(),
        MockResponse::json(200, json!({"n": 1})),
    ))
    .await;

    let (gateway, shutdown) = start_gateway(json!({
        "cache": {"enabled": true, "duration": "1m"},
        "endpoints": [{
            "path": "/cached",
            "method": "GET",
            "backends": [{"hosts": [host(backend)], "path": "/cached", "method": "GET"}]
        }]
    }))
    .await;

    let url = format!("{}/cached", host(gateway));
    let first = client().get(&url).send().await.unwrap();
    assert_eq!(first.headers()["x-gopen-cache"], "false");

    let second = client().get(&url).send().await.unwrap();
    assert_eq!(second.status(), 200);
    assert_eq!(second.headers()["x-gopen-cache"], "true");
    assert!(second.headers().contains_key("x-gopen-cache-ttl"));
    let body: Value = second.json().await.unwrap();
    assert_eq!(body, json!({"n": 1}));

    assert_eq!(calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit() {
    let backend = start_static_backend(MockResponse::json(200, json!({}))).await;

    let (gateway, shutdown) = start_gateway(json!({
        "endpoints": [{
            "path": "/limited",
            "method": "GET",
            "limiter": {"rate": {"capacity": 1, "every": "1h"}},
            "backends": [{"hosts": [host(backend)], "path": "/", "method": "GET"}]
        }]
    }))
    .await;

    let url = format!("{}/limited", host(gateway));
    assert_eq!(client().get(&url).send().await.unwrap().status(), 200);

    let res = client().get(&url).send().await.unwrap();
    assert_eq!(res.status(), 429);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");

    shutdown.trigger();
}

#[tokio::test]
async fn test_size_limits() {
    let backend = start_static_backend(MockResponse::json(200, json!({}))).await;

    let (gateway, shutdown) = start_gateway(json!({
        "limiter": {"max-body-size": "16B", "max-header-size": "2KB"},
        "endpoints": [{
            "path": "/upload",
            "method": "POST",
            "backends": [{"hosts": [host(backend)], "path": "/", "method": "POST"}]
        }]
    }))
    .await;

    let url = format!("{}/upload", host(gateway));
    let ok = client().post(&url).body("small").send().await.unwrap();
    assert_eq!(ok.status(), 200);

    let large_body = client().post(&url).body("x".repeat(64)).send().await.unwrap();
    assert_eq!(large_body.status(), 413);

    let large_header = client()
        .post(&url)
        .header("X-Padding", "y".repeat(4096))
        .send()
        .await
        .unwrap();
    assert_eq!(large_header.status(), 431);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_backend_body_is_bad_gateway() {
    let backend = start_static_backend(MockResponse::json(200, json!({"data": "z".repeat(256)}))).await;

    let (gateway, shutdown) = start_gateway(json!({
        "limiter": {"max-body-size": "64B"},
        "endpoints": [{
            "path": "/big",
            "method": "GET",
            "backends": [{"hosts": [host(backend)], "path": "/big", "method": "GET"}]
        }]
    }))
    .await;

    let res = client().get(format!("{}/big", host(gateway))).send().await.unwrap();
    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()["x-gopen-success"], "false");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["backend"], "/big");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let backend = start_static_backend(MockResponse::json(200, json!({}))).await;

    let (gateway, shutdown) = start_gateway(json!({
        "endpoints": [{
            "path": "/only-get",
            "method": "GET",
            "backends": [{"hosts": [host(backend)], "path": "/", "method": "GET"}]
        }]
    }))
    .await;

    let missing = client().get(format!("{}/nope", host(gateway))).send().await.unwrap();
    assert_eq!(missing.status(), 404);

    let wrong_method = client().delete(format!("{}/only-get", host(gateway))).send().await.unwrap();
    assert_eq!(wrong_method.status(), 405);

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_requests() {
    let backend = start_static_backend(MockResponse::json(200, json!({"pong": true}))).await;

    let (gateway, shutdown) = start_gateway(json!({
        "endpoints": [{
            "path": "/ping",
            "method": "GET",
            "backends": [{"hosts": [host(backend)], "path": "/ping", "method": "GET"}]
        }]
    }))
    .await;

    let client = client();
    let url = format!("{}/ping", host(gateway));
    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let client = client.clone();
            let url = url.clone();
            tokio::spawn(async move {
                let mut ok = 0;
                for _ in 0..10 {
                    if let Ok(res) = client.get(&url).send().await {
                        if res.status().is_success() {
                            ok += 1;
                        }
                    }
                }
                ok
            })
        })
        .collect();

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }
    assert_eq!(total, 200);

    shutdown.trigger();
}
