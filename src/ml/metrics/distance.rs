//! 距離関数
//!
//! 行の最後の要素はラベル列とみなし、距離の計算から除外します。

use crate::error::{ensure_same_length, Result};
use num_traits::Float;

/// ユークリッド距離を計算（最後の要素を除く）
///
/// # Arguments
/// * `a` - 1つ目の行（最後の要素はラベル）
/// * `b` - 2つ目の行（最後の要素はラベル）
///
/// # Returns
/// * `Result<T>` - 最後の要素を除いた各成分の差の二乗和の平方根
pub fn euclidian_distance<T: Float>(a: &[T], b: &[T]) -> Result<T> {
    ensure_same_length(a.len(), b.len())?;

    let n_features = a.len().saturating_sub(1);
    let sum = a[..n_features]
        .iter()
        .zip(&b[..n_features])
        .fold(T::zero(), |acc, (&x, &y)| acc + (x - y).powi(2));

    Ok(sum.sqrt())
}
