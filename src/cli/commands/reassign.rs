use serde_json::{json, Value};

use crate::cli::utils::{bearer_or_bail, output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(
    server: &str,
    token: Option<String>,
    users: Vec<String>,
    supervisor: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/api/supervisors/reassign", server);
    let client = reqwest::Client::new();
    let request = bearer_or_bail(client.post(&url), token)?;

    let response = request
        .json(&json!({
            "user_emails": users,
            "new_supervisor_email": supervisor,
        }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        let affected = body["data"]["affected_count"].as_u64().unwrap_or(0);
        output_success(
            &output_format,
            &format!("Reassigned {} user(s)", affected),
            Some(json!({ "affected_count": affected })),
        )
    } else {
        output_error(
            &output_format,
            body["message"].as_str().unwrap_or("request failed"),
            body["code"].as_str(),
        )
    }
}
