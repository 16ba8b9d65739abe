//! lexrag-embed
//!
//! Embedding service for the legal corpus: BGE-M3 (XLM-RoBERTa backbone) on
//! candle with masked mean pooling + L2 normalisation, and a deterministic
//! hashing embedder for tests and offline development
//! (`APP_USE_FAKE_EMBEDDINGS=1`).
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{info, warn};

use lexrag_core::config::EmbeddingConfig;
use lexrag_core::{Embedder, Error};

pub mod device;
pub mod pool;
pub mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;
pub use tokenize::{encode, EncodedText};

/// Output dimension of BGE-M3 and of the default fake embedder.
pub const BGE_M3_DIM: usize = 1024;

pub struct BgeM3Embedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl BgeM3Embedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(model_dir = %model_dir.display(), "Loading BGE-M3 model from local files");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!(
                "Failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            )
        })?;

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {}", config_path.display(), e))?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_text)?;
        let raw: serde_json::Value = serde_json::from_str(&config_text)?;
        let dim = raw["hidden_size"]
            .as_u64()
            .map_or(BGE_M3_DIM, |d| d as usize);

        let dtype = DType::F32;
        let safetensors = model_dir.join("model.safetensors");
        let tensors: HashMap<String, Tensor> = if safetensors.exists() {
            info!("Loading weights from {}", safetensors.display());
            candle_core::safetensors::load(&safetensors, &device)?
        } else {
            let weights_path = model_dir.join("pytorch_model.bin");
            info!("Loading weights from {}", weights_path.display());
            candle_core::pickle::read_all(&weights_path)?
                .into_iter()
                .collect()
        };
        let vb = VarBuilder::from_tensors(tensors, dtype, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!(dim, max_len, "BGE-M3 model loaded");
        Ok(Self {
            model,
            tokenizer,
            device,
            dim,
            max_len,
        })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let encoded = encode(&self.tokenizer, text, self.max_len, &self.device)?;
        // XLM-RoBERTa ignores token types; feed zeros.
        let token_type_ids = Tensor::zeros((1, encoded.len), DType::I64, &self.device)?;
        let hidden = self.model.forward(
            &encoded.input_ids,
            &encoded.attention_mask,
            &token_type_ids,
            None,
            None,
            None,
        )?;
        let pooled = masked_mean_l2(&hidden, &encoded.attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: emb.len(),
            }
            .into());
        }
        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            warn!(
                "Slow embedding: {:?} for {} tokens ({} chars)",
                elapsed,
                encoded.len,
                text.chars().count()
            );
        }
        Ok(emb)
    }
}

impl Embedder for BgeM3Embedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text)
    }
}

/// Token-hashing embedder: same text, same unit vector; no model files needed.
///
/// Tokens are whitespace-separated words, or single characters for text
/// without spaces (Chinese), so related strings share dimensions.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        let tokens: Vec<String> = if text.contains(char::is_whitespace) {
            text.split_whitespace().map(str::to_string).collect()
        } else {
            text.chars().map(String::from).collect()
        };
        for (i, token) in tokens.iter().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

fn fake_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Fake embedder when configured or `APP_USE_FAKE_EMBEDDINGS=1`, otherwise
/// BGE-M3 loaded from the first model directory that exists.
pub fn embedder_for(config: &EmbeddingConfig, model_dir: &Path) -> Result<Box<dyn Embedder>> {
    if config.fake || fake_requested() {
        info!("Using FakeEmbedder (dim={})", BGE_M3_DIM);
        return Ok(Box::new(FakeEmbedder::new(BGE_M3_DIM)));
    }
    let dir = resolve_model_dir(model_dir)?;
    Ok(Box::new(BgeM3Embedder::load(&dir, config.max_len)?))
}

fn resolve_model_dir(preferred: &Path) -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() {
                info!("Using {}: {}", var, p.display());
                return Ok(p);
            }
        }
    }
    let candidates = [
        preferred,
        Path::new("../models/bge-m3"),
        Path::new("models/bge-m3"),
    ];
    for candidate in candidates {
        if candidate.exists() {
            info!("Using model dir: {}", candidate.display());
            return Ok(candidate.to_path_buf());
        }
    }
    Err(Error::NotFound(format!(
        "BGE-M3 model directory (checked APP_MODEL_DIR, MODEL_DIR, {}, \
         ../models/bge-m3, models/bge-m3)",
        preferred.display()
    ))
    .into())
}
