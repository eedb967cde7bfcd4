use serde_json::{json, Value};

use crate::cli::utils::{bearer_or_bail, output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(
    server: &str,
    token: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/api/auth/whoami", server);
    let client = reqwest::Client::new();
    let request = bearer_or_bail(client.get(&url), token)?;

    let response = request.send().await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        output_success(
            &output_format,
            "Authenticated",
            Some(json!({ "user": body["data"] })),
        )
    } else {
        output_error(
            &output_format,
            body["message"].as_str().unwrap_or("request failed"),
            body["code"].as_str(),
        )
    }
}
