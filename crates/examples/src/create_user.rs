/// Example: Create a user and read it back
///
/// Run with: cargo run -p examples --bin create_user <username> [email]
///
/// Required environment variables:
/// - KEYCLOAK_BASE_URI, KEYCLOAK_USERNAME, KEYCLOAK_PASSWORD
///
/// Optional: KEYCLOAK_REALM (defaults to master)
use keycloak_admin::{Config, KeycloakClient, Params};
use serde_json::{Value, json};
use std::env;

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let username = env::args()
        .nth(1)
        .ok_or_else(|| "Usage: create_user <username> [email]".to_string())?;
    let email = env::args().nth(2);

    let client = KeycloakClient::factory(Config::from_env()).map_err(|e| e.to_string())?;

    let mut user = Params::new();
    user.insert("username".to_string(), Value::String(username.clone()));
    user.insert("enabled".to_string(), Value::Bool(true));
    if let Some(email) = email {
        user.insert("email".to_string(), Value::String(email));
    }

    client
        .create_user(user)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;
    println!("✓ Created {} in realm {}", username, client.get_realm());

    // Creation returns no body, so look the user up to get its id
    let mut query = Params::new();
    query.insert("username".to_string(), json!(username));
    let found = client
        .get_users(query)
        .await
        .map_err(|e| format!("Failed to look up user: {}", e))?;

    match found.get(0).and_then(|user| user["id"].as_str()) {
        Some(id) => println!("  id: {}", id),
        None => println!("  (user not visible yet)"),
    }

    Ok(())
}
