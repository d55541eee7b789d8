//! Gradient-boosted regression tree ensemble.
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "name": "sales_forecaster_xgb",
//!   "version": "1.0",
//!   "base_score": 1.2,
//!   "features": ["StockCode", "UnitPrice", "Country", "..."],
//!   "categories": { "Country": ["united kingdom", "france"] },
//!   "trees": [
//!     { "nodes": [
//!       { "id": 0, "split": { "numeric": { "feature": 1, "threshold": 3.0 } }, "left": 1, "right": 2 },
//!       { "id": 1, "leaf": 0.4 },
//!       { "id": 2, "leaf": -0.1 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A numeric split goes left when `value < threshold`. A categorical split
//! goes left when the value is one of its `categories`. Values the model
//! never saw (NaN, or a category outside the `categories` vocabulary of its
//! column) follow `default_left`, which defaults to `true`. The prediction is
//! `base_score` plus the leaf reached in every tree.

use super::Regressor;
use crate::error::{ForecastError, Result};
use crate::features::{
    CATEGORICAL_COLUMNS, ColumnKind, FEATURE_COLUMNS, FeatureRecord, FeatureValue, column_kind,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A split condition on one feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Numeric { feature: usize, threshold: f64 },
    Categorical { feature: usize, categories: Vec<String> },
}

impl Split {
    pub fn feature(&self) -> usize {
        match self {
            Split::Numeric { feature, .. } | Split::Categorical { feature, .. } => *feature,
        }
    }
}

/// A tree node: either a split with two children or a leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<Split>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<usize>,
    #[serde(default = "default_true")]
    pub default_left: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl Node {
    pub fn leaf(id: usize, value: f64) -> Self {
        Self {
            id,
            split: None,
            left: None,
            right: None,
            default_left: true,
            leaf: Some(value),
        }
    }

    pub fn internal(id: usize, split: Split, left: usize, right: usize) -> Self {
        Self {
            id,
            split: Some(split),
            left: Some(left),
            right: Some(right),
            default_left: true,
            leaf: None,
        }
    }

    pub fn with_default_left(mut self, default_left: bool) -> Self {
        self.default_left = default_left;
        self
    }
}

/// One regression tree. Node `i` lives at index `i`; children always have
/// larger ids than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    fn validate(&self, tree_index: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ForecastError::artifact(format!(
                "tree {} has no nodes",
                tree_index
            )));
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            let at = || format!("tree {} node {}", tree_index, i);
            if node.id != i {
                return Err(ForecastError::artifact(format!(
                    "{}: id {} does not match its position",
                    at(),
                    node.id
                )));
            }
            match (&node.split, node.leaf) {
                (Some(split), None) => {
                    let kind = column_kind(split.feature()).ok_or_else(|| {
                        ForecastError::artifact(format!(
                            "{}: feature index {} out of range",
                            at(),
                            split.feature()
                        ))
                    })?;
                    match (split, kind) {
                        (Split::Numeric { threshold, .. }, ColumnKind::Numeric) => {
                            if !threshold.is_finite() {
                                return Err(ForecastError::artifact(format!(
                                    "{}: threshold is not finite",
                                    at()
                                )));
                            }
                        }
                        (Split::Categorical { .. }, ColumnKind::Categorical) => {}
                        _ => {
                            return Err(ForecastError::artifact(format!(
                                "{}: split kind does not match column {}",
                                at(),
                                FEATURE_COLUMNS[split.feature()]
                            )));
                        }
                    }
                    for child in [node.left, node.right] {
                        let child = child.ok_or_else(|| {
                            ForecastError::artifact(format!("{}: split is missing a child", at()))
                        })?;
                        if child <= i || child >= len {
                            return Err(ForecastError::artifact(format!(
                                "{}: child {} must point forward inside the tree",
                                at(),
                                child
                            )));
                        }
                    }
                }
                (None, Some(value)) => {
                    if !value.is_finite() {
                        return Err(ForecastError::artifact(format!(
                            "{}: leaf value is not finite",
                            at()
                        )));
                    }
                }
                _ => {
                    return Err(ForecastError::artifact(format!(
                        "{}: must be either a split or a leaf",
                        at()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A boosted ensemble of regression trees over the [`FeatureRecord`] columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub base_score: f64,
    pub features: Vec<String>,
    /// Training vocabulary per categorical column.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Ensemble over the standard record columns with no vocabulary.
    pub fn new(name: &str, base_score: f64, trees: Vec<Tree>) -> Self {
        Self {
            name: name.to_string(),
            version: String::new(),
            base_score,
            features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            categories: BTreeMap::new(),
            trees,
        }
    }

    /// Parse and validate a JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Read, parse, and validate a JSON artifact file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Check the ensemble is compatible with [`FeatureRecord`] and well formed.
    pub fn validate(&self) -> Result<()> {
        let schema_matches = self.features.len() == FEATURE_COLUMNS.len()
            && self
                .features
                .iter()
                .zip(FEATURE_COLUMNS)
                .all(|(have, want)| have == want);
        if !schema_matches {
            return Err(ForecastError::artifact(format!(
                "feature list {:?} does not match the record columns {:?}",
                self.features, FEATURE_COLUMNS
            )));
        }
        if !self.base_score.is_finite() {
            return Err(ForecastError::artifact("base_score is not finite"));
        }
        if self.trees.is_empty() {
            return Err(ForecastError::artifact("ensemble has no trees"));
        }
        if let Some(name) = self
            .categories
            .keys()
            .find(|name| !CATEGORICAL_COLUMNS.contains(&name.as_str()))
        {
            return Err(ForecastError::artifact(format!(
                "vocabulary given for non-categorical column '{}'",
                name
            )));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index)?;
        }
        Ok(())
    }

    /// `base_score` plus the leaf reached in every tree.
    pub fn score(&self, record: &FeatureRecord) -> Result<f64> {
        let values = record.values();
        self.trees
            .iter()
            .enumerate()
            .try_fold(self.base_score, |total, (index, tree)| {
                self.evaluate_tree(index, tree, &values)
                    .map(|leaf| total + leaf)
            })
    }

    fn evaluate_tree(&self, tree_index: usize, tree: &Tree, values: &[FeatureValue]) -> Result<f64> {
        let mut index = 0;
        // Each step moves to a strictly larger id, so a valid walk is bounded by the node count.
        for _ in 0..tree.nodes.len() {
            let node = tree.nodes.get(index).ok_or_else(|| {
                ForecastError::model(format!("tree {}: node {} does not exist", tree_index, index))
            })?;
            let Some(split) = &node.split else {
                return node.leaf.ok_or_else(|| {
                    ForecastError::model(format!(
                        "tree {}: node {} has neither split nor leaf",
                        tree_index, node.id
                    ))
                });
            };
            let next = if self.goes_left(node, split, values)? {
                node.left
            } else {
                node.right
            };
            index = next.ok_or_else(|| {
                ForecastError::model(format!(
                    "tree {}: node {} is missing a child",
                    tree_index, node.id
                ))
            })?;
        }
        Err(ForecastError::model(format!(
            "tree {}: walk did not reach a leaf",
            tree_index
        )))
    }

    fn goes_left(&self, node: &Node, split: &Split, values: &[FeatureValue]) -> Result<bool> {
        let value = values.get(split.feature()).ok_or_else(|| {
            ForecastError::model(format!("feature index {} out of range", split.feature()))
        })?;
        match (split, value) {
            (Split::Numeric { threshold, .. }, FeatureValue::Numeric(v)) => {
                if v.is_nan() {
                    Ok(node.default_left)
                } else {
                    Ok(*v < *threshold)
                }
            }
            (Split::Categorical { categories, .. }, FeatureValue::Categorical(v)) => {
                if self.is_known(split.feature(), v) {
                    Ok(categories.iter().any(|c| c == v))
                } else {
                    Ok(node.default_left)
                }
            }
            _ => Err(ForecastError::model(format!(
                "split on {} does not match the value kind",
                FEATURE_COLUMNS[split.feature()]
            ))),
        }
    }

    fn is_known(&self, feature: usize, value: &str) -> bool {
        self.features
            .get(feature)
            .and_then(|name| self.categories.get(name))
            .is_none_or(|vocab| vocab.iter().any(|c| c == value))
    }
}

impl Regressor for TreeEnsemble {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn predict_log(&self, record: &FeatureRecord) -> Result<f64> {
        self.score(record)
    }
}
