use super::model::{Magazine, MagazineContent, MagazineStatus, MagazineSummary, sort_newest_first};
use super::{FetchError, MagazineSource};
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Reads issues from the publishing site's public API.
pub struct HttpSource {
    client: Client,
    base: Url,
    base_url: String,
}

/// List entries carry page stubs without image references.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedMagazine {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    publish_date: Option<DateTime<Utc>>,
    status: MagazineStatus,
    #[serde(default)]
    pages: Vec<IgnoredAny>,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|err| FetchError::Transport(format!("invalid site URL {base_url}: {err}")))?;
        Ok(Self {
            client,
            base,
            base_url,
        })
    }

    fn get(&self, url: Url, id: &str) -> Result<Vec<u8>, FetchError> {
        debug!(%url, "Requesting magazine data");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        if let Some(err) = status_error(response.status(), id) {
            return Err(err);
        }
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

impl MagazineSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn list(&self) -> Result<Vec<MagazineSummary>, FetchError> {
        let body = self.get(endpoint_url(&self.base, &["api", "magazines"])?, "list")?;
        let listed: Vec<ListedMagazine> =
            serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))?;
        let mut summaries: Vec<MagazineSummary> = listed
            .into_iter()
            .filter(|entry| entry.status == MagazineStatus::Published)
            .map(|entry| MagazineSummary {
                cover_image: entry
                    .cover_image
                    .map(|cover| resolve_image_url(&self.base_url, &cover)),
                id: entry.id,
                title: entry.title,
                description: entry.description,
                publish_date: entry.publish_date,
                page_count: entry.pages.len(),
            })
            .collect();
        sort_newest_first(&mut summaries);
        info!(count = summaries.len(), "Fetched magazine list");
        Ok(summaries)
    }

    fn fetch(&self, id: &str) -> Result<MagazineContent, FetchError> {
        self.fetch_with_progress(id, &|_| {})
    }

    fn fetch_with_progress(
        &self,
        id: &str,
        progress: &dyn Fn(u8),
    ) -> Result<MagazineContent, FetchError> {
        if matches!(id, "" | "." | "..") {
            return Err(FetchError::NotFound(id.to_string()));
        }
        let body = self.get(endpoint_url(&self.base, &["api", "magazines", id])?, id)?;
        progress(50);
        let mut magazine: Magazine =
            serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))?;
        progress(80);
        if !magazine.is_published() {
            return Err(FetchError::NotAvailable(id.to_string()));
        }
        for page in &mut magazine.pages {
            page.image_url = resolve_image_url(&self.base_url, &page.image_url);
        }
        info!(id, pages = magazine.pages.len(), "Fetched magazine");
        Ok(magazine.into_content())
    }
}

/// Each segment is percent-encoded, so ids cannot add path parts or a query.
fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| FetchError::Transport(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn status_error(status: StatusCode, id: &str) -> Option<FetchError> {
    match status {
        StatusCode::NOT_FOUND => Some(FetchError::NotFound(id.to_string())),
        StatusCode::FORBIDDEN => Some(FetchError::NotAvailable(id.to_string())),
        status if !status.is_success() => {
            Some(FetchError::Transport(format!("server answered {status}")))
        }
        _ => None,
    }
}

/// Site uploads are referenced relative to the site root.
fn resolve_image_url(base_url: &str, reference: &str) -> String {
    let reference = reference.trim();
    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        reference.to_string()
    } else if reference.starts_with('/') {
        format!("{base_url}{reference}")
    } else {
        format!("{base_url}/{reference}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_uploads_resolve_against_the_site() {
        let base = "https://mag.example.edu";
        assert_eq!(
            resolve_image_url(base, "/uploads/1.jpg"),
            "https://mag.example.edu/uploads/1.jpg"
        );
        assert_eq!(
            resolve_image_url(base, "uploads/1.jpg"),
            "https://mag.example.edu/uploads/1.jpg"
        );
        assert_eq!(
            resolve_image_url(base, "https://cdn.example/1.jpg"),
            "https://cdn.example/1.jpg"
        );
    }

    #[test]
    fn magazine_ids_are_encoded_as_one_path_segment() {
        let base = Url::parse("https://mag.example.edu").unwrap();
        let url = endpoint_url(&base, &["api", "magazines", "../admin/users"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://mag.example.edu/api/magazines/..%2Fadmin%2Fusers"
        );

        let url = endpoint_url(&base, &["api", "magazines", "a?x=1#b"]).unwrap();
        assert_eq!(url.as_str(), "https://mag.example.edu/api/magazines/a%3Fx=1%23b");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn endpoints_keep_a_site_prefix() {
        let base = Url::parse("https://example.edu/magazine/").unwrap();
        let url = endpoint_url(&base, &["api", "magazines"]).unwrap();
        assert_eq!(url.as_str(), "https://example.edu/magazine/api/magazines");
    }

    #[test]
    fn dot_ids_are_rejected_before_any_request() {
        let source = HttpSource::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(source.fetch(".."), Err(FetchError::NotFound(id)) if id == ".."));
        assert!(matches!(source.fetch(""), Err(FetchError::NotFound(_))));
    }

    #[test]
    fn http_statuses_map_to_fetch_errors() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "m1"),
            Some(FetchError::NotFound(id)) if id == "m1"
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "m1"),
            Some(FetchError::NotAvailable(_))
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "m1"),
            Some(FetchError::Transport(_))
        ));
        assert!(status_error(StatusCode::OK, "m1").is_none());
    }

    #[test]
    fn list_entries_tolerate_page_stubs() {
        let listed: Vec<ListedMagazine> = serde_json::from_str(
            r#"[{"id":"m1","title":"Spring","status":"PUBLISHED",
                 "pages":[{"id":"a","pageNumber":1},{"id":"b","pageNumber":2}]},
                {"id":"m2","title":"Draft","status":"DRAFT"}]"#,
        )
        .unwrap();
        assert_eq!(listed[0].pages.len(), 2);
        assert_eq!(listed[1].status, MagazineStatus::Draft);
    }
}
