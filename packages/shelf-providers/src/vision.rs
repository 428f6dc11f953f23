use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{Client, header::CONTENT_TYPE};
use serde_json::Value;

/// Embeds raw image bytes through an image-embedding endpoint. The endpoint
/// may return one vector per detected region; the first vector is always the
/// whole-image embedding.
pub async fn embed_image(
	cfg: &shelf_config::VisionProviderConfig,
	image: &[u8],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}?model={}", cfg.api_base, cfg.path, cfg.model);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.header(CONTENT_TYPE, "application/octet-stream")
		.body(image.to_vec())
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = crate::parse_embedding_response(json)?;

	for vec in &vectors {
		if vec.len() != cfg.dimensions as usize {
			return Err(eyre::eyre!(
				"Image embedding dimension mismatch: expected {}, got {}.",
				cfg.dimensions,
				vec.len()
			));
		}
	}

	Ok(vectors)
}
