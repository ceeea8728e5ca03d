//! Shared helpers for tests against a mocked Boost GraphQL endpoint

#![allow(dead_code)]

use boostsec::config::{Config, Settings};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// Settings pointing at the mock server's `/graphql`
pub fn settings(server: &MockServer) -> Settings {
    let explicit = Config {
        host: Some(format!("{}/graphql", server.uri())),
        token: Some(TOKEN.to_string()),
    };
    Settings::from_sources(&explicit, |_| None).expect("mock settings should resolve")
}

/// Answer `operation` with `data` whenever the body also matches `variables`
pub async fn mount_op(server: &MockServer, operation: &str, variables: Value, data: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": operation,
            "variables": variables,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

pub fn scanner_states(provisioned: &[&str]) -> Value {
    Value::Array(
        provisioned
            .iter()
            .map(|s| json!({"scannerId": s, "state": "PROVISIONED"}))
            .collect(),
    )
}

/// Providers query answering with one provider
pub async fn mount_provider(server: &MockServer, provider_id: &str, name: &str) {
    mount_op(
        server,
        "SecurityPosture",
        json!({}),
        json!({"securityPosture": {"providers": {"edges": [
            {"node": {"providerId": provider_id, "name": name}}
        ]}}}),
    )
    .await;
}

/// Collections page of bare `(id, name)` nodes
pub fn collections_page(nodes: &[(&str, &str)], has_next: bool, end: Option<&str>) -> Value {
    let edges: Vec<Value> = nodes
        .iter()
        .map(|(id, name)| {
            json!({"node": {"collectionId": id, "name": name, "scanners": [], "policy": null}})
        })
        .collect();
    json!({"provider": {"collections": {
        "edges": edges,
        "pageInfo": {"hasNextPage": has_next, "endCursor": end}
    }}})
}

/// Resources page of bare `(id, name)` nodes
pub fn resources_page(nodes: &[(&str, &str)], has_next: bool, end: Option<&str>) -> Value {
    let edges: Vec<Value> = nodes
        .iter()
        .map(|(id, name)| {
            json!({"node": {"resourceId": id, "name": name, "scanners": [], "policy": null}})
        })
        .collect();
    json!({"provider": {"collection": {"resources": {
        "edges": edges,
        "pageInfo": {"hasNextPage": has_next, "endCursor": end}
    }}}})
}

/// Every collection answers with no resources
pub async fn mount_no_resources(server: &MockServer) {
    mount_op(
        server,
        "ProviderCollection",
        json!({}),
        resources_page(&[], false, None),
    )
    .await;
}

/// Single provider `github` holding collection `org1` (id `c-org1`, policy
/// `strict`, scanner `sast` provisioned) with resource `api` (id `r-api`)
pub async fn mount_github_org1(server: &MockServer) {
    mount_op(
        server,
        "SecurityPosture",
        json!({}),
        json!({
            "securityPosture": {"providers": {"edges": [
                {"node": {"providerId": "p-github", "name": "github"}}
            ]}}
        }),
    )
    .await;

    mount_op(
        server,
        "ProviderCollections",
        json!({"providerId": "p-github"}),
        json!({
            "provider": {"collections": {
                "edges": [{"node": {
                    "collectionId": "c-org1",
                    "name": "org1",
                    "scanners": [
                        {"scannerId": "sast", "state": "PROVISIONED"},
                        {"scannerId": "sca", "state": "NOT_PROVISIONED"}
                    ],
                    "policy": {"policyId": "strict"}
                }}],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}
        }),
    )
    .await;

    mount_op(
        server,
        "ProviderCollection",
        json!({"providerId": "p-github", "collectionId": "c-org1"}),
        json!({
            "provider": {"collection": {"resources": {
                "edges": [{"node": {
                    "resourceId": "r-api",
                    "name": "api",
                    "scanners": scanner_states(&["sca"]),
                    "policy": null
                }}],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}
        }),
    )
    .await;
}

/// Offer `available` for every asset
pub async fn mount_available(server: &MockServer, available: &[&str]) {
    let scanners: Vec<Value> = available
        .iter()
        .map(|s| json!({"scannerId": s, "availability": "AVAILABLE"}))
        .chain(std::iter::once(
            json!({"scannerId": "legacy", "availability": "UNAVAILABLE"}),
        ))
        .collect();
    mount_op(
        server,
        "ProvisionPlan",
        json!({}),
        json!({"provisionPlan": {"scanners": scanners}}),
    )
    .await;
}

pub async fn mount_apply_ok(server: &MockServer) {
    mount_op(
        server,
        "ApplyProvisionPlan",
        json!({}),
        json!({"applyProvisionPlan": {"__typename": "ProvisionPlanApplied"}}),
    )
    .await;
}

/// Variables of every received request for `operation`, in order
pub async fn variables_for(server: &MockServer, operation: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter(|body| body["operationName"] == operation)
        .map(|body| body["variables"].clone())
        .collect()
}

/// Scanner ids of the given action in an ApplyProvisionPlan request
pub fn scanner_ids(variables: &Value, action: &str) -> Vec<String> {
    variables["scanners"]
        .as_array()
        .expect("scanners is a list")
        .iter()
        .filter(|op| op["action"] == action)
        .map(|op| op["scannerId"].as_str().unwrap_or_default().to_string())
        .collect()
}
