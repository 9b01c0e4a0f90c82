//! Fan fiction popularity prediction service
//!
//! - `POST /predict` endpoint in `endpoints/`
//! - work stats fetched from the archive in `works/`
//! - scaler + gradient boosted trees in `model/`
//! - prediction rows written through `db/` (Supabase REST or Postgres)
//! - Requires SUPABASE_URL and SUPABASE_KEY (or DATABASE_URL) to store results

pub mod app;
pub mod config;
pub mod db;
pub mod endpoints;
pub mod model;
pub mod pipeline;
pub mod works;
