//! 機械学習モデルモジュール
//!
//! 交差検証で評価される推定器のトレイトと、その参照実装を提供します。

use crate::error::Error;
use crate::ml::metrics::classification::MetricsReport;

pub mod knn;

pub use knn::{KNearestNeighbors, KNearestNeighborsConfig, KNearestNeighborsConfigBuilder};

/// 交差検証で評価される推定器に共通するトレイト
///
/// エラー型は推定器ごとに自由に定義でき、交差検証はそのエラーを
/// 変換せずに呼び出し元へ返します。クレート側のエラー（分割数や
/// データ長の不正）は `From<Error>` で推定器のエラー型へ変換されます。
pub trait Estimator<R, L> {
    /// 推定器のエラー型
    type Error: From<Error>;

    /// 訓練データでモデルを学習する
    fn train(&mut self, x: &[R], y: &[L]) -> std::result::Result<(), Self::Error>;

    /// テストデータで評価指標を計算する
    fn evaluate(&self, x: &[R], y: &[L]) -> std::result::Result<MetricsReport<L>, Self::Error>;
}
