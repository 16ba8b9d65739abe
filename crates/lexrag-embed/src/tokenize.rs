//! Single-text encoding for the embedding forward pass.
use anyhow::{anyhow, bail, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Model inputs for one text; both tensors are `[1, len]`.
pub struct EncodedText {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub len: usize,
}

/// Encode `text` at its own length, cutting it at `max_len` tokens.
///
/// Only one text goes through the model at a time, so there is nothing to pad
/// against; every returned position is a real token.
pub fn encode(
    tokenizer: &Tokenizer,
    text: &str,
    max_len: usize,
    device: &Device,
) -> Result<EncodedText> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let ids = encoding.get_ids();
    let len = ids.len().min(max_len);
    if len == 0 {
        bail!("text produced no tokens");
    }
    let input_ids = Tensor::new(&ids[..len], device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(&encoding.get_attention_mask()[..len], device)?.unsqueeze(0)?;
    Ok(EncodedText {
        input_ids,
        attention_mask,
        len,
    })
}
