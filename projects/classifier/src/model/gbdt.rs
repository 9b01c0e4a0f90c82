use std::path::Path;

use serde::Deserialize;

use super::{
    features::{FeatureVector, N_FEATURES},
    read_artifact, InvalidArtifactError, LoadArtifactError,
};

/// On-disk form of the ensemble.
///
/// Trees use the flat array layout of the training library: node `i` is a
/// leaf when `children_left[i] == -1`, otherwise samples with
/// `x[feature[i]] <= threshold[i]` continue at `children_left[i]` and the
/// rest at `children_right[i]`. Inputs are rounded to `f32` before the
/// comparison, as they were when the thresholds were learned.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub learning_rate: f64,
    pub init_raw_score: f64,
    pub n_features: usize,
    pub trees: Vec<TreeArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Children always sit after their parent, so a walk from the root ends.
#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_artifact(index: usize, artifact: TreeArtifact) -> Result<Self, InvalidArtifactError> {
        let len = artifact.children_left.len();
        if len == 0 {
            return Err(InvalidArtifactError::EmptyTree { tree: index });
        }
        if [
            artifact.children_right.len(),
            artifact.feature.len(),
            artifact.threshold.len(),
            artifact.value.len(),
        ]
        .iter()
        .any(|&other| other != len)
        {
            return Err(InvalidArtifactError::RaggedTree { tree: index });
        }

        let child = |node: usize, child: i64| -> Result<usize, InvalidArtifactError> {
            match usize::try_from(child) {
                Ok(c) if c > node && c < len => Ok(c),
                _ => Err(InvalidArtifactError::BadChild {
                    tree: index,
                    node,
                    child,
                }),
            }
        };

        let mut nodes = Vec::with_capacity(len);
        for node in 0..len {
            let left = artifact.children_left[node];
            if left == -1 {
                let value = artifact.value[node];
                if !value.is_finite() {
                    return Err(InvalidArtifactError::NonFinite { field: "value" });
                }
                nodes.push(Node::Leaf(value));
                continue;
            }

            let feature = artifact.feature[node];
            let feature = match usize::try_from(feature) {
                Ok(f) if f < N_FEATURES => f,
                _ => {
                    return Err(InvalidArtifactError::BadFeature {
                        tree: index,
                        node,
                        feature,
                    })
                }
            };
            let threshold = artifact.threshold[node];
            if !threshold.is_finite() {
                return Err(InvalidArtifactError::NonFinite { field: "threshold" });
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(node, left)?,
                right: child(node, artifact.children_right[node])?,
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_value(&self, x: &[f64; N_FEATURES]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = f64::from(x[feature] as f32);
                    index = if value <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Binary classifier: `raw = init + learning_rate * sum(leaf values)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedTrees {
    learning_rate: f64,
    init_raw_score: f64,
    trees: Vec<Tree>,
}

impl GradientBoostedTrees {
    pub fn load(path: &Path) -> Result<Self, LoadArtifactError> {
        let artifact: ModelArtifact = read_artifact(path)?;
        Self::from_artifact(artifact).map_err(|source| LoadArtifactError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, InvalidArtifactError> {
        if artifact.n_features != N_FEATURES {
            return Err(InvalidArtifactError::FeatureCount {
                expected: N_FEATURES,
                found: artifact.n_features,
            });
        }
        if !artifact.learning_rate.is_finite() {
            return Err(InvalidArtifactError::NonFinite {
                field: "learning_rate",
            });
        }
        if !artifact.init_raw_score.is_finite() {
            return Err(InvalidArtifactError::NonFinite {
                field: "init_raw_score",
            });
        }
        if artifact.trees.is_empty() {
            return Err(InvalidArtifactError::NoTrees);
        }

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| Tree::from_artifact(i, tree))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            learning_rate: artifact.learning_rate,
            init_raw_score: artifact.init_raw_score,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Log-odds of the positive class for an already scaled vector.
    pub fn raw_score(&self, scaled: &FeatureVector) -> f64 {
        let x = scaled.as_array();
        let sum: f64 = self.trees.iter().map(|tree| tree.leaf_value(x)).sum();
        self.init_raw_score + self.learning_rate * sum
    }

    pub fn predict_class(&self, scaled: &FeatureVector) -> u8 {
        class_of(self.raw_score(scaled))
    }
}

/// Class 1 wins only on strictly positive log-odds.
pub fn class_of(raw_score: f64) -> u8 {
    u8::from(raw_score > 0.0)
}

pub fn sigmoid(raw: f64) -> f64 {
    1.0 / (1.0 + (-raw).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: i64, threshold: f64, left: f64, right: f64) -> TreeArtifact {
        TreeArtifact {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![0.0, left, right],
        }
    }

    fn model(trees: Vec<TreeArtifact>) -> ModelArtifact {
        ModelArtifact {
            learning_rate: 0.5,
            init_raw_score: -0.25,
            n_features: N_FEATURES,
            trees,
        }
    }

    #[test]
    fn sums_leaves_over_trees() {
        let gbdt = GradientBoostedTrees::from_artifact(model(vec![
            stump(2, 0.0, -1.0, 1.0),
            stump(4, 1.0, -0.5, 2.0),
        ]))
        .unwrap();

        // kudos > 0 -> 1.0, hits <= 1 -> -0.5
        let x = FeatureVector([0.0, 0.0, 0.3, 0.0, 0.2, 0.0]);
        assert_eq!(gbdt.raw_score(&x), -0.25 + 0.5 * 0.5);
        assert_eq!(gbdt.predict_class(&x), 0);

        let y = FeatureVector([0.0, 0.0, 0.3, 0.0, 3.0, 0.0]);
        assert_eq!(gbdt.raw_score(&y), -0.25 + 0.5 * 3.0);
        assert_eq!(gbdt.predict_class(&y), 1);
    }

    #[test]
    fn threshold_is_inclusive_on_the_left() {
        let gbdt = GradientBoostedTrees::from_artifact(model(vec![stump(0, 1.5, -1.0, 1.0)])).unwrap();
        let at = FeatureVector([1.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(gbdt.raw_score(&at), -0.25 - 0.5);
    }

    #[test]
    fn compares_at_single_precision() {
        let gbdt = GradientBoostedTrees::from_artifact(model(vec![stump(0, 1.0, -1.0, 1.0)])).unwrap();
        let just_above = FeatureVector([1.0 + 1e-9, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(gbdt.raw_score(&just_above), -0.25 - 0.5);
        assert_eq!(gbdt.predict_class(&just_above), 0);

        let clearly_above = FeatureVector([1.001, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(gbdt.predict_class(&clearly_above), 1);
    }

    #[test]
    fn walks_deeper_trees() {
        let tree = TreeArtifact {
            children_left: vec![1, 3, -1, -1, -1],
            children_right: vec![2, 4, -1, -1, -1],
            feature: vec![1, 5, -2, -2, -2],
            threshold: vec![0.0, 0.0, -2.0, -2.0, -2.0],
            value: vec![0.0, 0.0, 3.0, -2.0, 1.0],
        };
        let gbdt = GradientBoostedTrees::from_artifact(model(vec![tree])).unwrap();
        let x = FeatureVector([0.0, -1.0, 0.0, 0.0, 0.0, 5.0]);
        assert_eq!(gbdt.raw_score(&x), -0.25 + 0.5 * 1.0);
    }

    #[test]
    fn rejects_backward_children() {
        let mut tree = stump(0, 0.0, 1.0, 1.0);
        tree.children_right[0] = 0;
        let err = GradientBoostedTrees::from_artifact(model(vec![tree])).unwrap_err();
        assert_eq!(
            err,
            InvalidArtifactError::BadChild {
                tree: 0,
                node: 0,
                child: 0
            }
        );
    }

    #[test]
    fn rejects_unknown_feature_and_ragged_arrays() {
        let err = GradientBoostedTrees::from_artifact(model(vec![stump(6, 0.0, 1.0, 1.0)])).unwrap_err();
        assert!(matches!(err, InvalidArtifactError::BadFeature { feature: 6, .. }));

        let mut ragged = stump(0, 0.0, 1.0, 1.0);
        ragged.value.pop();
        let err = GradientBoostedTrees::from_artifact(model(vec![ragged])).unwrap_err();
        assert_eq!(err, InvalidArtifactError::RaggedTree { tree: 0 });
    }

    #[test]
    fn rejects_wrong_feature_count_and_empty_models() {
        let mut wide = model(vec![stump(0, 0.0, 1.0, 1.0)]);
        wide.n_features = 7;
        assert!(matches!(
            GradientBoostedTrees::from_artifact(wide),
            Err(InvalidArtifactError::FeatureCount { found: 7, .. })
        ));
        assert_eq!(
            GradientBoostedTrees::from_artifact(model(vec![])).unwrap_err(),
            InvalidArtifactError::NoTrees
        );
    }

    #[test]
    fn sigmoid_is_centred() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(4.0) > 0.98);
        assert!(sigmoid(-4.0) < 0.02);
    }
}
