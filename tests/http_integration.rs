//! Integration tests for the EDA client and provider handlers using wiremock
//!
//! These tests run the handlers against mocked EDA endpoints, checking the
//! requests they send and how responses land in the resulting models.

use eda_services::codec::{any_map_to_model, mapping_from_json, string_value, Model, Value};
use eda_services::eda::auth::{Grant, TOKEN_PATH};
use eda_services::eda::client::EdaClient;
use eda_services::eda::http::format_eda_error;
use eda_services::provider::{DataSource, ManagedResource};
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::matchers::{bearer_token, body_partial_json, body_string_contains, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IRB_PATH: &str = "/apps/services.eda.nokia.com/v1/namespaces/eda/irbinterfaces";
const VLAN_TEMPLATE: &str = "/apps/services.eda.nokia.com/v1/namespaces/{namespace}/vlans/{name}";

fn client(server: &MockServer, grant: Grant) -> EdaClient {
    EdaClient::new(&server.uri(), grant, false).expect("client should build")
}

fn params(namespace: &str, name: &str) -> BTreeMap<String, String> {
    [
        ("namespace".to_string(), namespace.to_string()),
        ("name".to_string(), name.to_string()),
    ]
    .into()
}

/// Plan for an IRB interface the way the CLI builds one from a file
fn irb_plan(resource: &ManagedResource) -> Model {
    let mut document = json!({
        "metadata": { "name": "irb-1", "namespace": "eda", "labels": { "app": "web" } },
        "spec": { "bridgeDomain": "bd-1", "router": "router-1" }
    });
    resource.schema().apply_defaults(&mut document);

    let mut plan = resource.schema().unknown_model();
    any_map_to_model(resource.schema(), &mapping_from_json(&document).unwrap(), &mut plan)
        .expect("plan should decode");
    plan
}

/// Test module for the EDA client
mod client_tests {
    use super::*;

    /// Test GET with a static token sends the bearer header
    #[tokio::test]
    async fn test_get_with_static_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apps/services.eda.nokia.com/v1/namespaces/eda/vlans/vlan-100"))
            .and(bearer_token("static-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "VLAN" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, Grant::Token("static-token".to_string()));
        let response = client
            .get(VLAN_TEMPLATE, &params("eda", "vlan-100"))
            .await
            .expect("request should succeed");

        assert_eq!(response["kind"], "VLAN");
    }

    /// Test query parameters are appended to the templated path
    #[tokio::test]
    async fn test_get_by_query_sends_query_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apps/services.eda.nokia.com/v1/namespaces/eda/vlans/vlan-100"))
            .and(query_param("labelSelector", "app=web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, Grant::None);
        let query = [("labelSelector".to_string(), "app=web".to_string())].into();
        client
            .get_by_query(VLAN_TEMPLATE, &params("eda", "vlan-100"), &query)
            .await
            .expect("request should succeed");
    }

    /// Test the password grant hits the token endpoint once and reuses the token
    #[tokio::test]
    async fn test_password_grant_is_cached() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh-token",
                "expires_in": 300
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/apps/services.eda.nokia.com/v1/namespaces/eda/vlans/vlan-100"))
            .and(bearer_token("fresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let grant = Grant::Password {
            token_url: EdaClient::token_url(&server.uri()),
            client_id: "eda".to_string(),
            client_secret: None,
            username: "admin".to_string(),
            password: "admin".to_string(),
        };
        let client = client(&server, grant);

        for _ in 0..2 {
            client
                .get(VLAN_TEMPLATE, &params("eda", "vlan-100"))
                .await
                .expect("request should succeed");
        }
    }

    /// Test a rejected token request surfaces as an error
    #[tokio::test]
    async fn test_token_endpoint_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let grant = Grant::Password {
            token_url: EdaClient::token_url(&server.uri()),
            client_id: "eda".to_string(),
            client_secret: Some("secret".to_string()),
            username: "admin".to_string(),
            password: "wrong".to_string(),
        };
        let client = client(&server, grant);

        let err = client
            .get(VLAN_TEMPLATE, &params("eda", "vlan-100"))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Token request failed"));
    }

    /// Test 404 response is an error with a friendly message
    #[tokio::test]
    async fn test_404_returns_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": 404,
                "message": "not found"
            })))
            .mount(&server)
            .await;

        let client = client(&server, Grant::None);
        let err = client
            .get(VLAN_TEMPLATE, &params("eda", "missing"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("404"));
        assert_eq!(format_eda_error(&err), "Resource not found.");
    }

    /// Test an empty path parameter never produces a request
    #[tokio::test]
    async fn test_empty_path_param_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server, Grant::None);
        let err = client.get(VLAN_TEMPLATE, &params("eda", "")).await.unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}

/// Test module for resource and data source handlers
mod provider_tests {
    use super::*;

    /// Test create sends defaults and merges server-assigned status
    #[tokio::test]
    async fn test_create_merges_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IRB_PATH))
            .and(body_partial_json(json!({
                "metadata": { "name": "irb-1", "namespace": "eda", "labels": { "app": "web" } },
                "spec": { "bridgeDomain": "bd-1", "router": "router-1", "ipMTU": 1500, "arpTimeout": 14400 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "services.eda.nokia.com/v1",
                "kind": "IRBInterface",
                "status": { "operationalState": "up", "health": 98 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resource = ManagedResource::irb_interface(client(&server, Grant::None)).unwrap();
        let state = resource.create(irb_plan(&resource)).await.expect("create should succeed");

        assert_eq!(string_value(state.value("kind")), "IRBInterface");
        assert_eq!(string_value(state.get_path("spec.router").unwrap()), "router-1");
        assert_eq!(
            string_value(state.get_path("status.operationalState").unwrap()),
            "up"
        );
        assert_eq!(state.get_path("status.health"), Some(&Value::int64(98)));

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("status").is_none(), "server-assigned status must not be sent");
        assert!(body["spec"]["description"].is_null());
    }

    /// Test a response that contradicts the schema fails the operation
    #[tokio::test]
    async fn test_create_rejects_mismatched_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IRB_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spec": { "arpTimeout": "soon" }
            })))
            .mount(&server)
            .await;

        let resource = ManagedResource::irb_interface(client(&server, Grant::None)).unwrap();
        let err = resource.create(irb_plan(&resource)).await.unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Failed to build response from API result"));
        assert!(message.contains("spec.arpTimeout"));
    }

    /// Test update replaces with PUT on the named path
    #[tokio::test]
    async fn test_update_puts_to_named_path() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/irb-1", IRB_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spec": { "ipMTU": "9000" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resource = ManagedResource::irb_interface(client(&server, Grant::None)).unwrap();
        let state = resource.update(irb_plan(&resource)).await.expect("update should succeed");

        // string-encoded on the wire
        assert_eq!(state.get_path("spec.ipMTU"), Some(&Value::int64(9000)));
    }

    /// Test import followed by read fills the state from the API
    #[tokio::test]
    async fn test_import_then_read() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/irb-1", IRB_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": { "name": "irb-1", "namespace": "eda" },
                "spec": {
                    "bridgeDomain": "bd-1",
                    "router": "router-1",
                    "ipAddresses": [{ "ipv4Address": { "ipPrefix": "10.0.0.1/24", "primary": true } }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resource = ManagedResource::irb_interface(client(&server, Grant::None)).unwrap();
        let state = resource.import_state("eda/irb-1").unwrap();
        let state = resource.read(state).await.expect("read should succeed");

        assert_eq!(string_value(state.get_path("spec.bridgeDomain").unwrap()), "bd-1");
        let Some(Value::Known(eda_services::codec::Payload::List(addresses))) =
            state.get_path("spec.ipAddresses")
        else {
            panic!("expected ip address list");
        };
        assert_eq!(addresses.len(), 1);
    }

    /// Test delete issues a DELETE and accepts an empty body
    #[tokio::test]
    async fn test_delete() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/irb-1", IRB_PATH)))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let resource = ManagedResource::irb_interface(client(&server, Grant::None)).unwrap();
        let state = resource.import_state("eda/irb-1").unwrap();
        resource.delete(&state).await.expect("delete should succeed");
    }

    /// Test delete of a missing resource reports the failing stage
    #[tokio::test]
    async fn test_delete_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resource = ManagedResource::irb_interface(client(&server, Grant::None)).unwrap();
        let state = resource.import_state("eda/irb-1").unwrap();
        let err = resource.delete(&state).await.unwrap_err();
        assert!(format!("{:#}", err).starts_with("Error deleting resource"));
    }

    /// Test data source read keeps identity out of the query string
    #[tokio::test]
    async fn test_data_source_read() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apps/services.eda.nokia.com/v1/namespaces/eda/vlans/vlan-100"))
            .and(query_param_is_missing("name"))
            .and(query_param_is_missing("namespace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "services.eda.nokia.com/v1",
                "kind": "VLAN",
                "metadata": { "name": "vlan-100", "namespace": "eda" },
                "spec": { "bridgeDomain": "bd-1", "l2MTU": 9000 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vlans = DataSource::vlan(client(&server, Grant::None)).unwrap();
        let config = vlans
            .schema()
            .null_model()
            .with("namespace", Value::string("eda"))
            .with("name", Value::string("vlan-100"));

        let state = vlans.read(config).await.expect("read should succeed");

        assert_eq!(string_value(state.value("name")), "vlan-100");
        assert_eq!(string_value(state.get_path("spec.bridgeDomain").unwrap()), "bd-1");
        assert_eq!(state.get_path("spec.l2MTU"), Some(&Value::int64(9000)));
    }

    /// Test data source read without a name never reaches the API
    #[tokio::test]
    async fn test_data_source_requires_identity() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let networks = DataSource::virtual_network(client(&server, Grant::None)).unwrap();
        let config = networks
            .schema()
            .null_model()
            .with("namespace", Value::string("eda"));

        assert!(networks.read(config).await.is_err());
    }
}
