use diesel::prelude::*;
use thiserror::Error;

use crate::db::{prediction::models::*, schema::popularity_classifier::dsl::*};

#[derive(Debug, Error)]
pub enum InsertPredictionRowError {
    #[error("InsertPredictionRow: {source}")]
    InsertPredictionRow {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn insert_prediction_row(
    conn: &mut PgConnection,
    new: &NewPredictionRow,
) -> Result<PredictionRow, InsertPredictionRowError> {
    diesel::insert_into(popularity_classifier)
        .values(new)
        .get_result(conn)
        .map_err(|source| InsertPredictionRowError::InsertPredictionRow { source })
}
