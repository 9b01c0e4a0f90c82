use async_trait::async_trait;
use diesel::{r2d2::ConnectionManager, PgConnection};
use uuid::Uuid;

use super::{
    prediction::{models::NewPredictionRow, queries::insert_prediction_row},
    InsertPredictionError, InsertedRecord, NewPrediction, PgPool, RecordStore,
};

/// Direct Postgres access to the same table the REST API exposes.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str) -> Result<Self, r2d2::Error> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder().max_size(4).build(manager)?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert(&self, record: &NewPrediction) -> Result<InsertedRecord, InsertPredictionError> {
        let pool = self.pool.clone();
        let record = record.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let row = NewPredictionRow::from_record(Uuid::new_v4(), &record)?;
            let stored = insert_prediction_row(&mut conn, &row)?;
            InsertedRecord::try_from(stored)
        })
        .await?
    }
}
