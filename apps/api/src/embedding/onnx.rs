use std::path::PathBuf;
use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::debug;

use super::{Embedder, EmbeddingError, ModelLoader};

/// Loads sentence-transformer models through fastembed's ONNX runtime.
/// Model files are downloaded on first load and reused from the cache dir afterwards.
pub struct OnnxModelLoader {
    cache_dir: Option<PathBuf>,
}

impl OnnxModelLoader {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self { cache_dir }
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&self, name: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        let model = resolve_model(name).ok_or_else(|| EmbeddingError::Load {
            model: name.to_string(),
            reason: "unknown model name".to_string(),
        })?;

        let mut options = InitOptions::new(model).with_show_download_progress(false);
        if let Some(dir) = &self.cache_dir {
            debug!("Using model cache dir {}", dir.display());
            options = options.with_cache_dir(dir.clone());
        }

        let model = TextEmbedding::try_new(options).map_err(|e| EmbeddingError::Load {
            model: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Arc::new(OnnxEmbedder {
            name: name.to_string(),
            model,
        }))
    }
}

struct OnnxEmbedder {
    name: String,
    model: TextEmbedding,
}

impl Embedder for OnnxEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let encode_err = |reason: String| EmbeddingError::Encode {
            model: self.name.clone(),
            reason,
        };

        self.model
            .embed(vec![text], None)
            .map_err(|e| encode_err(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| encode_err("model returned no embedding".to_string()))
    }
}

/// Maps sentence-transformers style names onto fastembed's model catalogue.
fn resolve_model(name: &str) -> Option<EmbeddingModel> {
    let short = name
        .trim()
        .trim_start_matches("sentence-transformers/")
        .trim_start_matches("BAAI/")
        .to_lowercase();

    match short.as_str() {
        "all-minilm-l6-v2" => Some(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" => Some(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        _ => None,
    }
}
