use std::path::Path;

use serde::Deserialize;

use super::{
    features::{FeatureVector, N_FEATURES},
    read_artifact, InvalidArtifactError, LoadArtifactError,
};

/// On-disk form: `{"mean": [...], "scale": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerArtifact {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Standardises each feature as `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; N_FEATURES],
    scale: [f64; N_FEATURES],
}

impl StandardScaler {
    pub fn load(path: &Path) -> Result<Self, LoadArtifactError> {
        let artifact: ScalerArtifact = read_artifact(path)?;
        Self::from_artifact(artifact).map_err(|source| LoadArtifactError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, InvalidArtifactError> {
        let mean = fixed_width(artifact.mean, "mean")?;
        let mut scale = fixed_width(artifact.scale, "scale")?;
        // Constant training columns are stored with a zero scale.
        for value in scale.iter_mut() {
            if *value == 0.0 {
                *value = 1.0;
            }
        }
        Ok(Self { mean, scale })
    }

    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let mut scaled = *features.as_array();
        for (i, value) in scaled.iter_mut().enumerate() {
            *value = (*value - self.mean[i]) / self.scale[i];
        }
        FeatureVector(scaled)
    }
}

fn fixed_width(
    values: Vec<f64>,
    field: &'static str,
) -> Result<[f64; N_FEATURES], InvalidArtifactError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(InvalidArtifactError::NonFinite { field });
    }
    let found = values.len();
    values
        .try_into()
        .map_err(|_| InvalidArtifactError::FeatureCount {
            expected: N_FEATURES,
            found,
        })
}
