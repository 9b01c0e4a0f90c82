use crate::works::WorkMetadata;

pub const N_FEATURES: usize = 6;

/// Chapters, words, kudos, bookmarks, hits, comments: the column order the
/// scaler and model were fitted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; N_FEATURES]);

impl FeatureVector {
    pub fn as_array(&self) -> &[f64; N_FEATURES] {
        &self.0
    }
}

impl From<&WorkMetadata> for FeatureVector {
    fn from(work: &WorkMetadata) -> Self {
        FeatureVector([
            work.chapters as f64,
            work.words as f64,
            work.kudos as f64,
            work.bookmarks as f64,
            work.hits as f64,
            work.comments as f64,
        ])
    }
}
