use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    features::FeatureVector,
    gbdt::{class_of, sigmoid, GradientBoostedTrees},
    scaler::StandardScaler,
    LoadArtifactError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Popularity {
    #[serde(rename = "Popular")]
    Popular,
    #[serde(rename = "Less Popular")]
    LessPopular,
}

impl Popularity {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Popularity::Popular
        } else {
            Popularity::LessPopular
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Popularity::Popular => "Popular",
            Popularity::LessPopular => "Less Popular",
        }
    }
}

impl fmt::Display for Popularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Popularity {
    type Err = UnknownPopularity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Popular" => Ok(Popularity::Popular),
            "Less Popular" => Ok(Popularity::LessPopular),
            _ => Err(UnknownPopularity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown popularity label")]
pub struct UnknownPopularity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub popularity: Popularity,
    pub raw_score: f64,
    pub probability: f64,
}

/// Scaler and model loaded once and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct PopularityClassifier {
    scaler: StandardScaler,
    model: GradientBoostedTrees,
}

impl PopularityClassifier {
    pub fn new(scaler: StandardScaler, model: GradientBoostedTrees) -> Self {
        Self { scaler, model }
    }

    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, LoadArtifactError> {
        let model = GradientBoostedTrees::load(model_path)?;
        let scaler = StandardScaler::load(scaler_path)?;
        info!(
            model = %model_path.display(),
            scaler = %scaler_path.display(),
            trees = model.n_trees(),
            "Loaded popularity model"
        );
        Ok(Self::new(scaler, model))
    }

    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let scaled = self.scaler.transform(features);
        let raw_score = self.model.raw_score(&scaled);
        Prediction {
            popularity: Popularity::from_class(class_of(raw_score)),
            raw_score,
            probability: sigmoid(raw_score),
        }
    }
}
