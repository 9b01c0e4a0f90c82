//! Minimal PostgREST client for a hosted Supabase project
//!
//! Only row insertion is needed: `POST {project}/rest/v1/{table}` with the
//! project key in both the `apikey` and bearer headers.

pub mod index;
