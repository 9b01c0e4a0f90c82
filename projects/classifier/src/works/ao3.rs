use async_trait::async_trait;
use interfaces_ao3_works::{
    index::{fetch_work_page, is_login_redirect, workid_from_url, Ao3PageResult},
    page::{is_not_found_page, parse_work_page},
};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{FetchWorkError, WorkMetadata, WorkSource};

/// Reads work stats from the archive's HTML without loading chapter text.
pub struct Ao3Source {
    client: Client,
    base_url: String,
}

impl Ao3Source {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WorkSource for Ao3Source {
    async fn fetch(&self, url: &str) -> Result<WorkMetadata, FetchWorkError> {
        let work_id = workid_from_url(url).ok_or_else(|| FetchWorkError::InvalidUrl {
            url: url.to_string(),
        })?;

        let page = fetch_work_page(&self.client, &self.base_url, work_id).await?;
        debug!(work_id, status = %page.status, final_url = %page.final_url, "Fetched work page");

        metadata_from_response(work_id, page)
    }
}

fn metadata_from_response(
    work_id: u64,
    page: Ao3PageResult,
) -> Result<WorkMetadata, FetchWorkError> {
    if is_login_redirect(&page.final_url) {
        return Err(FetchWorkError::Restricted { work_id });
    }
    match page.status {
        StatusCode::NOT_FOUND => return Err(FetchWorkError::NotFound { work_id }),
        StatusCode::TOO_MANY_REQUESTS => return Err(FetchWorkError::RateLimited { work_id }),
        status if !status.is_success() => {
            return Err(FetchWorkError::Status {
                work_id,
                status: status.as_u16(),
            })
        }
        _ => {}
    }

    let parsed = parse_work_page(&page.body);
    // Chapter text can quote the error heading, so only a page without work
    // markup counts as the archive's 404.
    let has_work = parsed.title.is_some() || parsed.words.is_some() || parsed.chapters.is_some();
    if !has_work && is_not_found_page(&page.body) {
        return Err(FetchWorkError::NotFound { work_id });
    }

    WorkMetadata::from_page(parsed)
}
