//! 機械学習の評価指標モジュール
//!
//! 分類モデルの評価に使用する指標と、近傍探索で使う距離関数を提供します。

pub mod classification;
pub mod distance;

pub use classification::{
    accuracy_metrics, all_metrics, binary_confusion_matrix, class_weights, f1_score_metrics,
    multilabel_confusion_matrix, precision_metrics, recall_metrics, weighted_average,
    ConfusionMatrix, ConfusionReport, MetricsReport, MultilabelConfusionMatrix, Scores,
};
pub use distance::euclidian_distance;
