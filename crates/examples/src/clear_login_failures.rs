/// Example: Inspect and clear brute force lockouts
///
/// Run with: cargo run -p examples --bin clear_login_failures [user-id]
///
/// With a user id, prints the user's brute force status and clears only that
/// user's failures. Without one, clears the failures of every user in the realm.
///
/// Required environment variables:
/// - KEYCLOAK_BASE_URI, KEYCLOAK_USERNAME, KEYCLOAK_PASSWORD
///
/// Optional: KEYCLOAK_REALM (defaults to master)
use keycloak_admin::{Config, KeycloakClient, Params};
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let client = KeycloakClient::factory(Config::from_env()).map_err(|e| e.to_string())?;

    match env::args().nth(1) {
        Some(user_id) => {
            let mut params = Params::new();
            params.insert("userId".to_string(), json!(user_id));

            let status = client
                .get_brute_force_user_status(params.clone())
                .await
                .map_err(|e| format!("Failed to get brute force status: {}", e))?;
            println!(
                "{}: disabled={} failures={}",
                user_id, status["disabled"], status["numFailures"]
            );

            client
                .clear_user_login_failures(params)
                .await
                .map_err(|e| format!("Failed to clear login failures: {}", e))?;
            println!("✓ Cleared login failures for {}", user_id);
        }
        None => {
            client
                .clear_all_login_failures(Params::new())
                .await
                .map_err(|e| format!("Failed to clear login failures: {}", e))?;
            println!("✓ Cleared login failures in realm {}", client.get_realm());
        }
    }

    Ok(())
}
