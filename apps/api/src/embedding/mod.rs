//! Embedding Provider — sentence-embedding models cached by name for the whole process.
//!
//! `ModelRegistry` is the model cache. Contract:
//! - lookup: `get_model(name)` returns the cached handle when present (read lock only).
//! - initialization: the first request for a name loads it through the `ModelLoader`
//!   while holding the load guard, so concurrent first requests load exactly once.
//! - teardown: none. Entries are never evicted and live until the process exits.
//!
//! `AppState` holds the registry as `Arc<ModelRegistry>`; the production loader is
//! `OnnxModelLoader` (fastembed). Tests swap in a deterministic in-process embedder.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use thiserror::Error;
use tracing::info;

mod onnx;

pub use onnx::OnnxModelLoader;

/// Model used for scoring unless `EMBEDDING_MODEL` overrides it.
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to load embedding model '{model}': {reason}")]
    Load { model: String, reason: String },

    #[error("failed to encode text with '{model}': {reason}")]
    Encode { model: String, reason: String },
}

/// A loaded sentence-embedding model. Implementations must be deterministic
/// for a given input.
pub trait Embedder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Instantiates embedders by model name. Called at most once per name by the registry.
pub trait ModelLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<Arc<dyn Embedder>, EmbeddingError>;
}

/// Cheap, cloneable reference to a cached model.
#[derive(Clone)]
pub struct ModelHandle {
    name: Arc<str>,
    embedder: Arc<dyn Embedder>,
}

impl ModelHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embedder.encode(text)
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle").field("name", &self.name).finish()
    }
}

pub struct ModelRegistry {
    loader: Arc<dyn ModelLoader>,
    models: RwLock<HashMap<String, ModelHandle>>,
    load_guard: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            models: RwLock::new(HashMap::new()),
            load_guard: Mutex::new(()),
        }
    }

    /// Returns the cached handle for `name`, loading it on first use.
    ///
    /// Blocking: the first call for a name may download and initialize a model.
    /// Async callers should run this on the blocking pool.
    pub fn get_model(&self, name: &str) -> Result<ModelHandle, EmbeddingError> {
        if let Some(handle) = self.lookup(name) {
            return Ok(handle);
        }

        let _guard = self
            .load_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another request may have finished loading while we waited on the guard.
        if let Some(handle) = self.lookup(name) {
            return Ok(handle);
        }

        info!("Loading embedding model '{name}'...");
        let started = Instant::now();
        let embedder = self.loader.load(name)?;
        let handle = ModelHandle {
            name: Arc::from(name),
            embedder,
        };

        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), handle.clone());

        info!(
            "Embedding model '{name}' ready in {}ms",
            started.elapsed().as_millis()
        );
        Ok(handle)
    }

    /// Names of all models loaded so far.
    pub fn loaded_models(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn lookup(&self, name: &str) -> Option<ModelHandle> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// Encodes `text` with the given model.
pub fn encode(text: &str, model: &ModelHandle) -> Result<Vec<f32>, EmbeddingError> {
    model.encode(text)
}

/// Cosine similarity in [-1, 1]. Zero-norm or mismatched vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic stand-ins for real models; no downloads.

    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{Embedder, EmbeddingError, ModelHandle, ModelLoader, ModelRegistry};

    pub const DIMENSIONS: usize = 64;

    /// Bag-of-words embedder: each lowercased word bumps one hashed bucket.
    pub struct HashingEmbedder;

    impl Embedder for HashingEmbedder {
        fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let mut vector = vec![0.0_f32; DIMENSIONS];
            for word in text.split_whitespace() {
                let word: String = word
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect();
                if word.is_empty() {
                    continue;
                }
                let mut hasher = DefaultHasher::new();
                word.hash(&mut hasher);
                vector[(hasher.finish() % DIMENSIONS as u64) as usize] += 1.0;
            }
            Ok(vector)
        }
    }

    /// Loader that counts how many times it was asked to load.
    #[derive(Default)]
    pub struct CountingLoader {
        pub loads: AtomicUsize,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, _name: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(HashingEmbedder))
        }
    }

    pub struct FailingLoader;

    impl ModelLoader for FailingLoader {
        fn load(&self, name: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
            Err(EmbeddingError::Load {
                model: name.to_string(),
                reason: "model files unavailable".to_string(),
            })
        }
    }

    pub fn hashing_registry() -> Arc<ModelRegistry> {
        Arc::new(ModelRegistry::new(Arc::new(CountingLoader::default())))
    }

    pub fn hashing_model() -> ModelHandle {
        ModelHandle {
            name: Arc::from("hashing-test"),
            embedder: Arc::new(HashingEmbedder),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::thread;

    use super::testing::{CountingLoader, FailingLoader};
    use super::*;

    #[test]
    fn test_get_model_is_idempotent_and_loads_once() {
        let loader = Arc::new(CountingLoader::default());
        let registry = ModelRegistry::new(loader.clone());

        let first = registry.get_model(DEFAULT_MODEL).unwrap();
        let second = registry.get_model(DEFAULT_MODEL).unwrap();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(first.name(), second.name());
        let text = "Senior Rust engineer with Kubernetes experience";
        assert_eq!(first.encode(text).unwrap(), second.encode(text).unwrap());
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let loader = Arc::new(CountingLoader::default());
        let registry = Arc::new(ModelRegistry::new(loader.clone()));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.get_model(DEFAULT_MODEL).map(|_| ()))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(registry.loaded_models(), vec![DEFAULT_MODEL.to_string()]);
    }

    #[test]
    fn test_distinct_names_are_cached_separately() {
        let loader = Arc::new(CountingLoader::default());
        let registry = ModelRegistry::new(loader.clone());

        registry.get_model("all-MiniLM-L6-v2").unwrap();
        registry.get_model("bge-small-en-v1.5").unwrap();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert_eq!(registry.loaded_models().len(), 2);
    }

    #[test]
    fn test_load_failure_propagates_and_caches_nothing() {
        let registry = ModelRegistry::new(Arc::new(FailingLoader));

        let err = registry.get_model(DEFAULT_MODEL).unwrap_err();
        assert!(matches!(err, EmbeddingError::Load { .. }));
        assert!(err.to_string().contains(DEFAULT_MODEL));
        assert!(registry.loaded_models().is_empty());
    }

    #[test]
    fn test_cosine_similarity_identical_vectors_is_one() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs_are_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
