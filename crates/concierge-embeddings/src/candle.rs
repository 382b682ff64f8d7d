//! Candle-based encoder implementation.
//!
//! Runs all-MiniLM-L6-v2 locally for 384-dimensional sentence embeddings
//! with mean pooling and unit-length normalization.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::device::{select_device, DeviceKind, Precision};
use crate::error::EmbeddingError;
use crate::files::{get_or_download_model, ModelFileCache, ModelPaths};
use crate::model::{ModelInfo, TextEncoder};
use crate::output::EncoderOutput;
use crate::status::{LoadPhase, LoadStatus, ProgressEvent, StatusSink};

/// Embedding dimension for all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Maximum sequence length
pub const MAX_SEQ_LENGTH: usize = 256;

/// Load options for the encoder.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Prefer an accelerated device when the probe succeeds
    pub prefer_accelerated: bool,
    /// Request half-precision weights first
    pub precision: Precision,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            prefer_accelerated: true,
            precision: Precision::Reduced,
        }
    }
}

/// Candle-based encoder using all-MiniLM-L6-v2.
pub struct CandleEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    device_kind: DeviceKind,
    info: ModelInfo,
}

impl CandleEncoder {
    /// Load the encoder from cached model files (downloading if needed).
    ///
    /// Device policy: accelerated only when preferred and the probe
    /// succeeds, otherwise CPU. A reduced-precision load that fails is
    /// retried once at full precision before the error surfaces.
    pub fn load(
        cache: &ModelFileCache,
        options: &LoadOptions,
        sink: &dyn StatusSink,
    ) -> Result<Self, EmbeddingError> {
        let (device, device_kind) = select_device(options.prefer_accelerated);
        Self::load_on(cache, device, device_kind, options.precision, sink)
    }

    /// Load onto an already-resolved device.
    pub fn load_on(
        cache: &ModelFileCache,
        device: Device,
        device_kind: DeviceKind,
        precision: Precision,
        sink: &dyn StatusSink,
    ) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache, sink)?;

        sink.emit(LoadStatus::new(
            LoadPhase::Loading,
            match device_kind {
                DeviceKind::Accelerated => "Initializing accelerated mode…",
                DeviceKind::Cpu => "Initializing portable mode…",
            },
        ));

        let loaded = match Self::load_from_paths(&paths, &device, precision.dtype()) {
            Ok(encoder) => Ok(encoder),
            Err(err) if precision != Precision::Full => {
                sink.emit(LoadStatus::new(
                    LoadPhase::Loading,
                    "Retrying model load with default precision…",
                ));
                debug!(error = %err, "Reduced-precision load failed, retrying at full precision");
                Self::load_from_paths(&paths, &device, Precision::Full.dtype())
            }
            Err(err) => Err(err),
        };

        match loaded {
            Ok(mut encoder) => {
                encoder.device_kind = device_kind;
                sink.emit(crate::status::progress_status(&ProgressEvent::Ready));
                Ok(encoder)
            }
            Err(err) => {
                sink.emit(LoadStatus::new(LoadPhase::Error, err.to_string()));
                Err(err)
            }
        }
    }

    /// Load from explicit file paths at a fixed precision.
    fn load_from_paths(
        paths: &ModelPaths,
        device: &Device,
        dtype: DType,
    ) -> Result<Self, EmbeddingError> {
        info!("Loading encoder model...");

        let config_str = std::fs::read_to_string(&paths.config)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&paths.tokenizer)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[paths.weights.clone()], dtype, device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(
            dim = EMBEDDING_DIM,
            max_seq = MAX_SEQ_LENGTH,
            dtype = ?dtype,
            "Encoder loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device: device.clone(),
            device_kind: DeviceKind::Cpu,
            info: ModelInfo {
                name: "all-MiniLM-L6-v2".to_string(),
                dimension: EMBEDDING_DIM,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }

    /// Which device class this encoder runs on.
    pub fn device_kind(&self) -> DeviceKind {
        self.device_kind
    }

    /// Mean pooling over token embeddings (excluding padding)
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(embeddings.shape())?;
        let mask_f32 = mask.to_dtype(DType::F32)?;

        let masked = embeddings.broadcast_mul(&mask_f32)?;
        let sum = masked.sum(1)?;

        // Divide by number of real tokens, guarding empty sequences
        let mask_sum = mask_f32.sum(1)?;
        let mask_sum = mask_sum.clamp(1e-9, f64::MAX)?;

        let mean = sum.broadcast_div(&mask_sum)?;
        Ok(mean)
    }
}

impl TextEncoder for CandleEncoder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn encode(&self, texts: &[String]) -> Result<EncoderOutput, EmbeddingError> {
        if texts.is_empty() {
            return Ok(EncoderOutput::Rows(vec![]));
        }

        debug!(count = texts.len(), "Encoding batch");

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // Pad to same length
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LENGTH);

        let mut input_ids: Vec<Vec<u32>> = Vec::new();
        let mut attention_masks: Vec<Vec<u32>> = Vec::new();

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();

            let truncated_len = ids.len().min(max_len);
            let mut padded_ids = ids[..truncated_len].to_vec();
            let mut padded_mask = mask[..truncated_len].to_vec();

            padded_ids.resize(max_len, 0);
            padded_mask.resize(max_len, 0);

            input_ids.push(padded_ids);
            attention_masks.push(padded_mask);
        }

        let batch_size = texts.len();
        let input_ids_flat: Vec<u32> = input_ids.into_iter().flatten().collect();
        let mask_flat: Vec<u32> = attention_masks.into_iter().flatten().collect();

        let input_ids = Tensor::from_vec(input_ids_flat, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask_flat, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        // Reduced-precision weights still pool and normalize in f32
        let output = output.to_dtype(DType::F32)?;

        let pooled = self.mean_pooling(&output, &attention_mask)?;

        // Unit-length rows: downstream similarity is a plain dot product
        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        let normalized = pooled.broadcast_div(&norms)?;

        let dims = normalized.dims().to_vec();
        let data = normalized.flatten_all()?.to_vec1::<f32>()?;

        debug!(rows = dims[0], cols = dims[1], "Batch complete");

        Ok(EncoderOutput::Flat { data, dims })
    }
}
