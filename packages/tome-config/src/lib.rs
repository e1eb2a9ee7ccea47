mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EmbeddingProviderConfig, Providers, Qdrant, Retrieval, Service, Storage};

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
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.tags_collection.is_empty() || cfg.storage.qdrant.desc_collection.is_empty()
	{
		return Err(Error::Validation {
			message: "storage.qdrant collection names must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.tags_collection == cfg.storage.qdrant.desc_collection {
		return Err(Error::Validation {
			message: "storage.qdrant.tags_collection and desc_collection must differ.".to_string(),
		});
	}
	if cfg.providers.embedding.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.path.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.path must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.model must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.candidate_limit < cfg.retrieval.top_k {
		return Err(Error::Validation {
			message: "retrieval.candidate_limit must be at least retrieval.top_k.".to_string(),
		});
	}
	if cfg.retrieval.min_filtered_results > cfg.retrieval.candidate_limit {
		return Err(Error::Validation {
			message: "retrieval.min_filtered_results must not exceed retrieval.candidate_limit."
				.to_string(),
		});
	}

	for (label, threshold) in [
		("retrieval.filtered_score_threshold", cfg.retrieval.filtered_score_threshold),
		("retrieval.fallback_score_threshold", cfg.retrieval.fallback_score_threshold),
	] {
		if !threshold.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if !(0.0..=1.0).contains(&threshold) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let qdrant = &mut cfg.storage.qdrant;

	qdrant.tags_collection = qdrant.tags_collection.trim().to_string();
	qdrant.desc_collection = qdrant.desc_collection.trim().to_string();

	// Trailing slashes on the base URL would double up with the path.
	let embedding = &mut cfg.providers.embedding;

	while embedding.api_base.ends_with('/') {
		embedding.api_base.pop();
	}
}
