use reqwest::Client;
use tracing::debug;

use crate::Result;

/// Requests a page and returns a `Result<String>` containing the HTML.
/// Non-success statuses are errors.
pub(crate) async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    debug!(url, "requesting page");
    let res = client.get(url).send().await?.error_for_status()?;
    let html = res.text().await?;
    Ok(html)
}

/// Requests a document and returns its raw body.
pub(crate) async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    debug!(url, "requesting document");
    let res = client.get(url).send().await?.error_for_status()?;
    let bytes = res.bytes().await?;
    Ok(bytes.to_vec())
}
