//! Pre-trained popularity model
//!
//! - `features`: fixed-order numeric summary of a work
//! - `scaler`: per-feature mean/variance normalisation
//! - `gbdt`: binary gradient boosted regression trees
//! - `classifier`: the immutable scaler + model context shared by requests
//!
//! Both artifacts are JSON documents exported from the training notebook and
//! loaded once at startup.

pub mod classifier;
pub mod features;
pub mod gbdt;
pub mod scaler;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use classifier::{Popularity, PopularityClassifier, Prediction};
pub use features::{FeatureVector, N_FEATURES};
pub use gbdt::{GradientBoostedTrees, ModelArtifact, TreeArtifact};
pub use scaler::{ScalerArtifact, StandardScaler};

#[derive(Debug, Error)]
pub enum LoadArtifactError {
    #[error("ReadArtifact {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("ParseArtifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("InvalidArtifact {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: InvalidArtifactError,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidArtifactError {
    #[error("expected {expected} features, found {found}")]
    FeatureCount { expected: usize, found: usize },

    #[error("non-finite value in {field}")]
    NonFinite { field: &'static str },

    #[error("model has no trees")]
    NoTrees,

    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },

    #[error("tree {tree} node arrays have different lengths")]
    RaggedTree { tree: usize },

    #[error("tree {tree} node {node} points to invalid child {child}")]
    BadChild { tree: usize, node: usize, child: i64 },

    #[error("tree {tree} node {node} splits on unknown feature {feature}")]
    BadFeature {
        tree: usize,
        node: usize,
        feature: i64,
    },
}

pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, LoadArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| LoadArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
