use anyhow::Result;

/// Downloads a cohort source over HTTP with the blocking client.
///
/// # Errors
///
/// Returns an error on transport failure or a non-success status.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let resp = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}
