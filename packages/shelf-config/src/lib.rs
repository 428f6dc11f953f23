mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Postgres, Providers, Qdrant, Ranking, Search, Service, Storage,
	VisionProviderConfig,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.text_vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.text_vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.image_vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.image_vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.text_vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.text_vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}

	if let Some(vision) = cfg.providers.vision.as_ref() {
		if vision.dimensions != cfg.storage.qdrant.image_vector_dim {
			return Err(Error::Validation {
				message: "providers.vision.dimensions must match storage.qdrant.image_vector_dim."
					.to_string(),
			});
		}
		if vision.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.vision.api_key must be non-empty.".to_string(),
			});
		}
	}

	for (label, weight) in
		[("alpha", cfg.ranking.alpha), ("beta", cfg.ranking.beta), ("gamma", cfg.ranking.gamma)]
	{
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("ranking.{label} must be a finite number."),
			});
		}
		if weight < 0.0 {
			return Err(Error::Validation {
				message: format!("ranking.{label} must be zero or greater."),
			});
		}
	}

	if cfg.search.default_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit < cfg.search.default_limit {
		return Err(Error::Validation {
			message: "search.max_limit must be at least search.default_limit.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// A [providers.vision] section with a blank model is treated as absent so a
	// deployment can disable vision search without deleting the section.
	if cfg
		.providers
		.vision
		.as_ref()
		.map(|vision| vision.model.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.vision = None;
	}
}
