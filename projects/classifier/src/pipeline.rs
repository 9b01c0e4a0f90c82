//! fetch -> assemble features -> scale + classify -> persist
//!
//! Each stage runs once per request; the first failure ends the request and
//! nothing after it runs.

use tracing::{info, instrument};

use crate::{
    db::{InsertPredictionError, InsertedRecord, NewPrediction, RecordStore},
    model::{FeatureVector, Popularity, PopularityClassifier},
    works::{FetchWorkError, WorkMetadata, WorkSource},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub work: WorkMetadata,
    pub popularity: Popularity,
}

impl From<&PredictionResult> for NewPrediction {
    fn from(result: &PredictionResult) -> Self {
        let work = &result.work;
        NewPrediction {
            title: work.title.clone(),
            chapters: work.chapters,
            words: work.words,
            kudos: work.kudos,
            bookmarks: work.bookmarks,
            hits: work.hits,
            comments: work.comments,
            popularity: result.popularity,
        }
    }
}

#[instrument(skip(source, classifier))]
pub async fn predict_work(
    source: &dyn WorkSource,
    classifier: &PopularityClassifier,
    url: &str,
) -> Result<PredictionResult, FetchWorkError> {
    let work = source.fetch(url).await?;
    let features = FeatureVector::from(&work);
    let prediction = classifier.predict(&features);

    info!(
        title = %work.title,
        label = %prediction.popularity,
        raw_score = prediction.raw_score,
        probability = prediction.probability,
        "Classified work"
    );

    Ok(PredictionResult {
        work,
        popularity: prediction.popularity,
    })
}

pub async fn persist_prediction(
    store: &dyn RecordStore,
    result: &PredictionResult,
) -> Result<InsertedRecord, InsertPredictionError> {
    let record = NewPrediction::from(result);
    let inserted = store.insert(&record).await?;
    info!(title = %inserted.title, label = %inserted.popularity, "Stored prediction");
    Ok(inserted)
}
