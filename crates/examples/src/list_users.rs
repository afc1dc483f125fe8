/// Example: List the users of a realm
///
/// Run with: cargo run -p examples --bin list_users [search]
///
/// Required environment variables:
/// - KEYCLOAK_BASE_URI (e.g. http://localhost:8080/auth)
/// - KEYCLOAK_USERNAME, KEYCLOAK_PASSWORD (an admin of the master realm)
///
/// Optional: KEYCLOAK_REALM (defaults to master), KEYCLOAK_VERSION, KEYCLOAK_CLIENT_ID
use keycloak_admin::{Config, KeycloakClient, Params};
use serde_json::Value;
use std::env;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Load environment variables
    dotenvy::dotenv().ok();
    env_logger::init();

    let client = KeycloakClient::factory(Config::from_env()).map_err(|e| e.to_string())?;

    let mut params = Params::new();
    if let Some(search) = env::args().nth(1) {
        params.insert("search".to_string(), Value::String(search));
    }

    println!("Users in realm {}:", client.get_realm());
    let users = client
        .get_users(params)
        .await
        .map_err(|e| format!("Failed to list users: {}", e))?;

    let users = users.as_array().cloned().unwrap_or_default();
    if users.is_empty() {
        println!("  (none)");
    }
    for user in &users {
        println!(
            "  {}  {}  {}",
            user["id"].as_str().unwrap_or("-"),
            user["username"].as_str().unwrap_or("-"),
            user["email"].as_str().unwrap_or(""),
        );
    }
    log::debug!("Listed {} user(s)", users.len());

    Ok(())
}
