use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::roles::Role;

/// Mint a JWT locally with the configured secret. The role claim is
/// informational; authorization always re-reads the directory.
pub async fn handle(
    external_id: String,
    email: String,
    name: String,
    role: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    // Validate against the closed role set before embedding in a claim.
    let role: Role = role
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid role: {}", e))?;

    let claims = Claims::new(external_id, email, name, role.as_str().to_string());
    let token = generate_jwt(claims)?;

    output_success(&output_format, "Token minted", Some(json!({ "token": token })))
}
