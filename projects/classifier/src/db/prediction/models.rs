use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{schema::popularity_classifier, InsertPredictionError, InsertedRecord, NewPrediction};

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = popularity_classifier)]
pub struct PredictionRow {
    pub id: Uuid,
    pub title: String,
    pub chapters: i64,
    pub words: i64,
    pub kudos: i64,
    pub bookmarks: i64,
    pub hits: i64,
    pub comments: i64,
    pub popularity: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = popularity_classifier)]
pub struct NewPredictionRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub chapters: i64,
    pub words: i64,
    pub kudos: i64,
    pub bookmarks: i64,
    pub hits: i64,
    pub comments: i64,
    pub popularity: &'a str,
}

impl<'a> NewPredictionRow<'a> {
    pub fn from_record(id: Uuid, record: &'a NewPrediction) -> Result<Self, InsertPredictionError> {
        Ok(Self {
            id,
            title: &record.title,
            chapters: to_column("chapters", record.chapters)?,
            words: to_column("words", record.words)?,
            kudos: to_column("kudos", record.kudos)?,
            bookmarks: to_column("bookmarks", record.bookmarks)?,
            hits: to_column("hits", record.hits)?,
            comments: to_column("comments", record.comments)?,
            popularity: record.popularity.as_str(),
        })
    }
}

impl TryFrom<PredictionRow> for InsertedRecord {
    type Error = InsertPredictionError;

    fn try_from(row: PredictionRow) -> Result<Self, Self::Error> {
        let popularity = row
            .popularity
            .parse()
            .map_err(|_| InsertPredictionError::UnknownPopularity {
                value: row.popularity.clone(),
            })?;
        Ok(Self {
            title: row.title,
            chapters: from_column("chapters", row.chapters)?,
            words: from_column("words", row.words)?,
            kudos: from_column("kudos", row.kudos)?,
            bookmarks: from_column("bookmarks", row.bookmarks)?,
            hits: from_column("hits", row.hits)?,
            comments: from_column("comments", row.comments)?,
            popularity,
        })
    }
}

fn to_column(field: &'static str, value: u64) -> Result<i64, InsertPredictionError> {
    i64::try_from(value).map_err(|_| InsertPredictionError::CountOutOfRange { field })
}

fn from_column(field: &'static str, value: i64) -> Result<u64, InsertPredictionError> {
    u64::try_from(value).map_err(|_| InsertPredictionError::CountOutOfRange { field })
}
