use chrono::{DateTime, Utc};
use flipbook_core::Page;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MagazineStatus {
    Draft,
    Published,
}

/// A full magazine record as served by the publishing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Magazine {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    pub status: MagazineStatus,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Magazine {
    pub fn is_published(&self) -> bool {
        self.status == MagazineStatus::Published
    }

    pub fn summary(&self) -> MagazineSummary {
        MagazineSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            cover_image: self.cover_image.clone(),
            publish_date: self.publish_date,
            page_count: self.pages.len(),
        }
    }

    pub fn into_content(self) -> MagazineContent {
        MagazineContent {
            id: self.id,
            title: self.title,
            pages: self.pages,
        }
    }
}

/// Library entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MagazineSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub page_count: usize,
}

impl MagazineSummary {
    pub fn publish_label(&self) -> String {
        self.publish_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string())
    }
}

/// What the reader is mounted with.
#[derive(Debug, Clone, PartialEq)]
pub struct MagazineContent {
    pub id: String,
    pub title: String,
    pub pages: Vec<Page>,
}

/// Newest first; undated issues go last.
pub fn sort_newest_first(list: &mut [MagazineSummary]) {
    list.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_site_json() {
        let magazine: Magazine = serde_json::from_str(
            r#"{
                "id": "m1",
                "title": "Spring",
                "description": null,
                "coverImage": "/uploads/cover.jpg",
                "publishDate": "2024-03-01T00:00:00.000Z",
                "status": "PUBLISHED",
                "pages": [
                    {"id": "p2", "pageNumber": 2, "imageUrl": "/uploads/2.jpg", "content": null},
                    {"id": "p1", "pageNumber": 1, "imageUrl": "/uploads/1.jpg"}
                ]
            }"#,
        )
        .unwrap();

        assert!(magazine.is_published());
        assert_eq!(magazine.summary().page_count, 2);
        assert_eq!(magazine.summary().publish_label(), "2024-03-01");
        assert_eq!(magazine.cover_image.as_deref(), Some("/uploads/cover.jpg"));
    }

    #[test]
    fn undated_issues_sort_last() {
        let entry = |id: &str, date: Option<&str>| MagazineSummary {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            cover_image: None,
            publish_date: date.map(|d| d.parse().unwrap()),
            page_count: 0,
        };
        let mut list = vec![
            entry("old", Some("2023-01-01T00:00:00Z")),
            entry("none", None),
            entry("new", Some("2024-06-01T00:00:00Z")),
        ];
        sort_newest_first(&mut list);
        let ids: Vec<&str> = list.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "none"]);
    }
}
