//! Sentence pooling over the encoder's last hidden state.
use anyhow::{bail, Result};
use candle_core::Tensor;

/// Average the token states selected by `mask`, then scale each row to unit
/// length.
///
/// `hidden` is `[batch, seq, width]` and `mask` is `[batch, seq]` in any
/// numeric dtype (the tokenizer hands out `u32`). Rows whose mask is all zero
/// average over one token's worth of weight instead of dividing by zero.
pub fn masked_mean_l2(hidden: &Tensor, mask: &Tensor) -> Result<Tensor> {
    let (batch, seq, _width) = hidden.dims3()?;
    let mask_dims = mask.dims();
    if mask_dims != [batch, seq] {
        bail!("mask shape {mask_dims:?} does not cover hidden states [{batch}, {seq}, _]");
    }
    let weights = mask
        .to_device(hidden.device())?
        .to_dtype(hidden.dtype())?
        .unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&weights)?.sum(1)?;
    let counts = weights.sum(1)?.maximum(1.0)?;
    l2_normalize(&summed.broadcast_div(&counts)?)
}

/// Scale every row of a `[batch, width]` tensor to unit L2 norm.
pub fn l2_normalize(rows: &Tensor) -> Result<Tensor> {
    let norms = rows.sqr()?.sum_keepdim(1)?.sqrt()?.maximum(1e-12)?;
    Ok(rows.broadcast_div(&norms)?)
}
