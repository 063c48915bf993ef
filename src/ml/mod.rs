//! 機械学習の評価機能を提供するモジュール
//!
//! 分類指標の計算、k分割交差検証のための分割、そして推定器を
//! 各分割で学習・評価する交差検証を提供します。

pub mod metrics;
pub mod model_selection;
pub mod models;
