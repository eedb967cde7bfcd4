use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(server: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", server);
    let response = reqwest::get(&url).await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        output_success(
            &output_format,
            "Server healthy",
            Some(json!({ "health": body["data"] })),
        )
    } else {
        output_error(
            &output_format,
            &format!("Server degraded ({}): {}", status, body["error"]),
            None,
        )
    }
}
