use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Embeds a batch of texts through an OpenAI-compatible embeddings endpoint.
/// The returned vectors are in input order regardless of response order.
pub async fn embed(
	cfg: &shelf_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = crate::parse_embedding_response(json)?;

	for vec in &vectors {
		if vec.len() != cfg.dimensions as usize {
			return Err(eyre::eyre!(
				"Embedding dimension mismatch: expected {}, got {}.",
				cfg.dimensions,
				vec.len()
			));
		}
	}

	Ok(vectors)
}
