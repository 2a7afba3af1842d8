use serde_json::{json, Value};
use std::time::Duration;

use crate::cli::utils::{load_config, output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = match url {
        Some(url) => url,
        None => load_config()?.images.base_url,
    };
    let endpoint = format!("{}/api/health", base.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let response = match client.get(&endpoint).send().await {
        Ok(response) => response,
        Err(e) => {
            output_error(&output_format, &format!("{} unreachable: {}", endpoint, e), Some("UNREACHABLE"))?;
            anyhow::bail!("server unreachable");
        }
    };

    let status = response.status();
    let body: Value = response.json().await.unwrap_or_else(|_| json!({}));

    if status.is_success() {
        output_success(&output_format, &format!("{} is healthy", base), Some(json!({ "health": body })))
    } else {
        output_error(
            &output_format,
            &format!("{} returned {} (database: {})", endpoint, status, body["database"]),
            Some("UNHEALTHY"),
        )?;
        anyhow::bail!("server unhealthy")
    }
}
