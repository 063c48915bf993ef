//! 分類モデル評価のためのメトリクス
//!
//! 一対他（one-vs-rest）で二値化した2x2の混同行列と、そこから導かれる
//! 正解率・適合率・再現率・F1スコアを提供します。
//! 分母が0になる指標は例外ではなく `NaN` を返します。

use crate::error::{ensure_same_length, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;


/// 2x2の混同行列
///
/// `cells[true_class][predicted_class]` の形で保持し、
/// クラス 0 が陰性、クラス 1 が陽性を表します。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    cells: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// セルの値から混同行列を作成
    pub fn new(cells: [[usize; 2]; 2]) -> Self {
        ConfusionMatrix { cells }
    }

    /// `[true_class][predicted_class]` の値を取得
    pub fn get(&self, true_class: usize, predicted_class: usize) -> usize {
        self.cells[true_class][predicted_class]
    }

    /// 真陰性（TN）
    pub fn true_negatives(&self) -> usize {
        self.cells[0][0]
    }

    /// 偽陽性（FP）
    pub fn false_positives(&self) -> usize {
        self.cells[0][1]
    }

    /// 偽陰性（FN）
    pub fn false_negatives(&self) -> usize {
        self.cells[1][0]
    }

    /// 真陽性（TP）
    pub fn true_positives(&self) -> usize {
        self.cells[1][1]
    }

    /// 全サンプル数
    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    pub fn as_array(&self) -> [[usize; 2]; 2] {
        self.cells
    }

    fn record(&mut self, is_true: bool, is_pred: bool) {
        self.cells[usize::from(is_true)][usize::from(is_pred)] += 1;
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;
        writeln!(f, "        Pred 0 Pred 1")?;
        for (i, row) in self.cells.iter().enumerate() {
            writeln!(f, "True {} {:>6} {:>6}", i, row[0], row[1])?;
        }
        Ok(())
    }
}

/// 一対他の混同行列の列（ラベルごとに1つ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultilabelConfusionMatrix<L> {
    entries: Vec<(L, ConfusionMatrix)>,
}

impl<L: PartialEq> MultilabelConfusionMatrix<L> {
    /// ラベルに対応する混同行列を取得
    pub fn get(&self, label: &L) -> Option<&ConfusionMatrix> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, cm)| cm)
    }
}

impl<L> MultilabelConfusionMatrix<L> {
    /// ラベルを指定された順序で返す
    pub fn labels(&self) -> impl Iterator<Item = &L> {
        self.entries.iter().map(|(l, _)| l)
    }

    /// 混同行列をラベルの順序で返す
    pub fn matrices(&self) -> impl Iterator<Item = &ConfusionMatrix> {
        self.entries.iter().map(|(_, cm)| cm)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(L, ConfusionMatrix)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `all_metrics` が返す混同行列（二値の場合は1つ、多クラスの場合はラベルごと）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfusionReport<L> {
    Binary(ConfusionMatrix),
    Multilabel(MultilabelConfusionMatrix<L>),
}

/// 評価指標のレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport<L> {
    #[serde(rename = "Confusion Matrix")]
    pub confusion_matrix: ConfusionReport<L>,
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
    #[serde(rename = "F1-score")]
    pub f1_score: f64,
}

impl<L> MetricsReport<L> {
    /// 混同行列を除いたスカラー指標
    pub fn scores(&self) -> Scores {
        Scores {
            accuracy: self.accuracy,
            precision: self.precision,
            recall: self.recall,
            f1_score: self.f1_score,
        }
    }

    pub fn into_scores(self) -> Scores {
        self.scores()
    }
}

/// 混同行列を含まないスカラー指標
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
    #[serde(rename = "F1-score")]
    pub f1_score: f64,
}

impl Scores {
    /// 1つの混同行列から全ての指標を計算
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        Scores {
            accuracy: accuracy_metrics(cm),
            precision: precision_metrics(cm),
            recall: recall_metrics(cm),
            f1_score: f1_score_metrics(cm),
        }
    }
}

/// 指定ラベルを陽性として二値の混同行列を作成
///
/// # Arguments
/// * `y_pred` - 予測ラベル
/// * `y_true` - 真のラベル
/// * `label` - 陽性として扱うラベル
///
/// # Returns
/// * `Result<ConfusionMatrix>` - セルの合計はサンプル数に一致します
pub fn binary_confusion_matrix<L: PartialEq>(
    y_pred: &[L],
    y_true: &[L],
    label: &L,
) -> Result<ConfusionMatrix> {
    ensure_same_length(y_true.len(), y_pred.len())?;

    let mut cm = ConfusionMatrix::default();
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        cm.record(t == label, p == label);
    }

    Ok(cm)
}

/// ラベルごとに一対他の混同行列を作成（`labels` の順序を保持）
pub fn multilabel_confusion_matrix<L: PartialEq + Clone>(
    y_pred: &[L],
    y_true: &[L],
    labels: &[L],
) -> Result<MultilabelConfusionMatrix<L>> {
    let entries = labels
        .iter()
        .map(|label| {
            binary_confusion_matrix(y_pred, y_true, label).map(|cm| (label.clone(), cm))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MultilabelConfusionMatrix { entries })
}

/// 正解率 (TN+TP)/(TN+FP+FN+TP)
pub fn accuracy_metrics(cm: &ConfusionMatrix) -> f64 {
    let correct = (cm.true_negatives() + cm.true_positives()) as f64;
    correct / cm.total() as f64
}

/// 適合率 TP/(TP+FP)
pub fn precision_metrics(cm: &ConfusionMatrix) -> f64 {
    let tp = cm.true_positives() as f64;
    tp / (tp + cm.false_positives() as f64)
}

/// 再現率 TP/(TP+FN)
pub fn recall_metrics(cm: &ConfusionMatrix) -> f64 {
    let tp = cm.true_positives() as f64;
    tp / (tp + cm.false_negatives() as f64)
}

/// F1スコア TP/(TP+0.5(FP+FN))
pub fn f1_score_metrics(cm: &ConfusionMatrix) -> f64 {
    let tp = cm.true_positives() as f64;
    let errors = (cm.false_positives() + cm.false_negatives()) as f64;
    tp / (tp + 0.5 * errors)
}

/// 真のラベルの出現頻度（ラベルの自然順序で並ぶ）
pub fn class_weights<L: Ord + Clone>(y_true: &[L]) -> BTreeMap<L, f64> {
    let mut counts: BTreeMap<L, usize> = BTreeMap::new();
    for label in y_true {
        *counts.entry(label.clone()).or_insert(0) += 1;
    }

    let n = y_true.len() as f64;
    counts
        .into_iter()
        .map(|(label, count)| (label, count as f64 / n))
        .collect()
}

/// 重み付き平均
///
/// 重みが0の項は値に関係なく無視されるため、寄与しないクラスの `NaN` は
/// 結果に伝播しません。
///
/// # Returns
/// * `Result<f64>` - 重みの合計で正規化した平均値
pub fn weighted_average(values: &[f64], weights: &[f64]) -> Result<f64> {
    ensure_same_length(values.len(), weights.len())?;

    let (sum, total_weight) = values
        .iter()
        .zip(weights.iter())
        .filter(|(_, &w)| w != 0.0)
        .fold((0.0, 0.0), |(sum, total), (&v, &w)| (sum + v * w, total + w));

    if total_weight == 0.0 {
        return Err(Error::InvalidInput(
            "重みの合計が0です（どのラベルも真のラベルに含まれていません）".to_string(),
        ));
    }

    Ok(sum / total_weight)
}

/// 全ての評価指標を計算
///
/// ラベルが2つの場合は `labels[1]` を陽性とした二値分類として、
/// 3つ以上の場合は一対他の指標を真のラベルの頻度で重み付き平均します。
/// 重みはラベルの値で引くため、`labels` の並び順には依存しません。
///
/// # Arguments
/// * `y_pred` - 予測ラベル
/// * `y_true` - 真のラベル
/// * `labels` - 評価対象のラベル（2つ以上）
pub fn all_metrics<L: Ord + Clone>(
    y_pred: &[L],
    y_true: &[L],
    labels: &[L],
) -> Result<MetricsReport<L>> {
    ensure_same_length(y_true.len(), y_pred.len())?;

    match labels.len() {
        0 | 1 => Err(Error::InvalidConfiguration(format!(
            "ラベルは2つ以上必要です: {}個",
            labels.len()
        ))),
        2 => {
            let cm = binary_confusion_matrix(y_pred, y_true, &labels[1])?;
            let scores = Scores::from_confusion_matrix(&cm);
            log::trace!("binary confusion matrix: {:?}", cm.as_array());

            Ok(MetricsReport {
                confusion_matrix: ConfusionReport::Binary(cm),
                accuracy: scores.accuracy,
                precision: scores.precision,
                recall: scores.recall,
                f1_score: scores.f1_score,
            })
        }
        _ => {
            let mcm = multilabel_confusion_matrix(y_pred, y_true, labels)?;
            let frequencies = class_weights(y_true);
            let weights: Vec<f64> = labels
                .iter()
                .map(|l| frequencies.get(l).copied().unwrap_or(0.0))
                .collect();

            let per_label: Vec<Scores> = mcm.matrices().map(Scores::from_confusion_matrix).collect();
            for (i, cm) in mcm.matrices().enumerate() {
                log::trace!("label #{} confusion matrix: {:?}", i, cm.as_array());
            }

            let average = |metric: fn(&Scores) -> f64| -> Result<f64> {
                let values: Vec<f64> = per_label.iter().map(metric).collect();
                weighted_average(&values, &weights)
            };

            Ok(MetricsReport {
                accuracy: average(|s| s.accuracy)?,
                precision: average(|s| s.precision)?,
                recall: average(|s| s.recall)?,
                f1_score: average(|s| s.f1_score)?,
                confusion_matrix: ConfusionReport::Multilabel(mcm),
            })
        }
    }
}
