use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://archiveofourown.org";

pub struct Ao3PageResult {
    pub body: String,
    pub status: StatusCode,
    /// Where the request ended up after redirects.
    pub final_url: Url,
}

/// Extracts the numeric work id from a work URL.
///
/// Accepts `https://archiveofourown.org/works/123`, chapter links such as
/// `/works/123/chapters/456`, URLs without a scheme and a bare `123`.
pub fn workid_from_url(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if is_digits(trimmed) {
        return trimmed.parse().ok();
    }

    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}")).ok()?
        }
        Err(_) => return None,
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let mut segments = url.path_segments()?;
    segments.by_ref().find(|segment| *segment == "works")?;
    let id = segments.next()?;
    if !is_digits(id) {
        return None;
    }
    id.parse().ok()
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn work_page_url(base_url: &str, work_id: u64) -> Result<Url, FetchWorkPageError> {
    let base = base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/works/{work_id}"))
        .map_err(|source| FetchWorkPageError::BaseUrl { source })?;
    // Only the first chapter and the stats block are needed.
    url.query_pairs_mut()
        .append_pair("view_adult", "true")
        .append_pair("view_full_work", "false");
    Ok(url)
}

pub async fn fetch_work_page(
    client: &Client,
    base_url: &str,
    work_id: u64,
) -> Result<Ao3PageResult, FetchWorkPageError> {
    let url = work_page_url(base_url, work_id)?;

    let response = client
        .get(url)
        .header("Accept", "text/html")
        .send()
        .await
        .map_err(|source| FetchWorkPageError::RequestSend { source })?;

    let status = response.status();
    let final_url = response.url().clone();

    let body = response
        .text()
        .await
        .map_err(|source| FetchWorkPageError::ResponseRead { source })?;

    Ok(Ao3PageResult {
        body,
        status,
        final_url,
    })
}

/// Restricted works bounce anonymous visitors to the login form.
pub fn is_login_redirect(url: &Url) -> bool {
    url.path().starts_with("/users/login")
}

#[derive(Debug, Error)]
pub enum FetchWorkPageError {
    #[error("BaseUrl: {source}")]
    BaseUrl { source: url::ParseError },

    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },
}
