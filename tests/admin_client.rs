use keycloak_admin::{Config, Error, ErrorKind, KeycloakClient, Params};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn params(value: Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}

fn client_for(server: &MockServer, realm: &str) -> KeycloakClient {
    KeycloakClient::factory(Config {
        username: Some("admin".to_string()),
        password: Some("admin".to_string()),
        realm: Some(realm.to_string()),
        base_uri: Some(server.uri()),
        ..Config::default()
    })
    .unwrap()
}

async fn mount_password_grant(server: &MockServer, expires_in: u32, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=admin-cli"))
        .and(body_string_contains("username=admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "password-token",
            "expires_in": expires_in,
            "refresh_token": "refresh-1",
            "refresh_expires_in": 1800,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_users_in_configured_realm() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/users"))
        .and(header("Authorization", "Bearer password-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":"1"}]"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let users = client.get_users(Params::new()).await.unwrap();

    assert_eq!(users, json!([{"id": "1"}]));
    assert_eq!(users.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_caller_realm_is_overwritten() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/clients"))
        .and(query_param("clientId", "account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "c-1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let clients = client
        .invoke(
            "getClients",
            params(json!({"realm": "master", "clientId": "account"})),
        )
        .await
        .unwrap();

    assert_eq!(clients[0]["id"], "c-1");
}

#[tokio::test]
async fn test_token_is_reused_while_valid() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    for _ in 0..2 {
        let user = client.get_user(params(json!({"id": "42"}))).await.unwrap();
        assert_eq!(user["id"], "42");
    }
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    init_logging();
    let server = MockServer::start().await;
    // Shorter than the expiry leeway, so the token is stale right away
    mount_password_grant(&server, 5, 1).await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refreshed-token",
            "expires_in": 300,
            "refresh_token": "refresh-2",
            "refresh_expires_in": 1800
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/authentication/authenticator-providers"))
        .and(header("Authorization", "Bearer password-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/authentication/authenticator-providers"))
        .and(header("Authorization", "Bearer refreshed-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "auth-otp-form"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let first = client
        .get_authenticator_providers(Params::new())
        .await
        .unwrap();
    assert_eq!(first, json!([]));

    let second = client
        .get_authenticator_providers(Params::new())
        .await
        .unwrap();
    assert_eq!(second[0]["id"], "auth-otp-form");
}

#[tokio::test]
async fn test_create_user_accepts_empty_response() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 1).await;

    Mock::given(method("POST"))
        .and(path("/admin/realms/demo/users"))
        .and(body_json(json!({"username": "jdoe", "enabled": true})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let created = client
        .create_user(params(json!({"username": "jdoe", "enabled": true})))
        .await
        .unwrap();

    assert_eq!(created, Value::Null);
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let err = client.get_users(Params::new()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/users/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "User not found"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let err = client
        .get_user(params(json!({"id": "missing"})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    match err {
        Error::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("User not found"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_rejected_login_is_authentication_error() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid user credentials"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let err = client.get_users(Params::new()).await.unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_unauthorized_response_forces_new_login() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 2).await;

    Mock::given(method("DELETE"))
        .and(path("/admin/realms/demo/attack-detection/brute-force/users"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/admin/realms/demo/attack-detection/brute-force/users"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, "demo");
    let err = client
        .clear_all_login_failures(Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { .. }));

    let cleared = client
        .clear_all_login_failures(Params::new())
        .await
        .unwrap();
    assert_eq!(cleared, Value::Null);
}

#[tokio::test]
async fn test_missing_parameter_sends_nothing() {
    init_logging();
    let server = MockServer::start().await;
    mount_password_grant(&server, 300, 0).await;

    let client = client_for(&server, "demo");
    let err = client
        .get_client_role(params(json!({"id": "c-1"})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(err.to_string().contains("roleName"));
}

#[tokio::test]
async fn test_client_secret_uses_client_credentials_grant() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/realms/ops/protocol/openid-connect/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=provisioner"))
        .and(body_string_contains("client_secret=s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "service-token",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/clients/c-1/roles"))
        .and(header("Authorization", "Bearer service-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "admin"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = KeycloakClient::factory(Config {
        realm: Some("demo".to_string()),
        base_uri: Some(server.uri()),
        client_id: Some("provisioner".to_string()),
        client_secret: Some("s3cr3t".to_string()),
        auth_realm: Some("ops".to_string()),
        ..Config::default()
    })
    .unwrap();

    let roles = client
        .get_client_roles(params(json!({"id": "c-1"})))
        .await
        .unwrap();
    assert_eq!(roles[0]["name"], "admin");
}
