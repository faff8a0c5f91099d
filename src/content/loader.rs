use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::source::ViewSource;
use super::{fallback, is_published, present, scalar_to_string, ContentError, GalleryPhoto, LabContent, View};
use crate::{quiz, quotes};

/// Fetches all seven views concurrently. Each view either yields its published
/// records or falls back to the built-in placeholders; nothing here fails.
pub async fn load_all<S: ViewSource>(source: &S, timeout: Duration) -> LabContent {
    let (roster, quotes, quiz, projects, announcements, scholarly, gallery) = tokio::join!(
        fetch_records(source, View::Roster, timeout),
        fetch_records(source, View::Quotes, timeout),
        fetch_records(source, View::Quiz, timeout),
        fetch_records(source, View::Projects, timeout),
        fetch_records(source, View::Announcements, timeout),
        fetch_records(source, View::Scholarly, timeout),
        fetch_records(source, View::Gallery, timeout),
    );

    let content = LabContent {
        members: parse_records(View::Roster, &or_fallback(View::Roster, roster)),
        quotes: quotes::normalize_quotes(&or_fallback(View::Quotes, quotes)),
        quiz_bank: quiz::normalize_bank(&or_fallback(View::Quiz, quiz)),
        projects: present::normalize_projects(&or_fallback(View::Projects, projects)),
        announcements: parse_records(
            View::Announcements,
            &or_fallback(View::Announcements, announcements),
        ),
        publications: present::publications(&or_fallback(View::Scholarly, scholarly)),
        gallery: resolve_gallery(gallery),
    };

    log::info!(
        "Content loaded: {} members, {} quotes, {} quiz questions, {} projects, {} announcements, {} publications, {} photos",
        content.members.len(),
        content.quotes.len(),
        content.quiz_bank.len(),
        content.projects.len(),
        content.announcements.len(),
        content.publications.len(),
        content.gallery.len(),
    );
    content
}

async fn fetch_records<S: ViewSource>(
    source: &S,
    view: View,
    timeout: Duration,
) -> Result<Vec<Value>, ContentError> {
    let value = tokio::time::timeout(timeout, source.fetch_view(view))
        .await
        .map_err(|_| ContentError::Timeout(timeout))??;

    match value {
        Value::Array(items) => Ok(items.into_iter().filter(is_published).collect()),
        _ => Err(ContentError::NotAnArray),
    }
}

fn or_fallback(view: View, fetched: Result<Vec<Value>, ContentError>) -> Vec<Value> {
    match fetched {
        Ok(records) => records,
        Err(err) => {
            log::warn!("Using fallback content for view '{}': {}", view, err);
            fallback::records(view)
        }
    }
}

fn parse_records<T: DeserializeOwned>(view: View, records: &[Value]) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match serde_json::from_value(record.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("Skipping malformed '{}' record: {}", view, err);
                None
            }
        })
        .collect()
}

/// The gallery feed is either `{id, url}` objects or bare URL strings.
fn gallery_photos(records: &[Value]) -> Vec<GalleryPhoto> {
    records
        .iter()
        .map(|record| match record {
            Value::String(url) => GalleryPhoto {
                id: String::new(),
                url: url.trim().to_string(),
            },
            _ => GalleryPhoto {
                id: record.get("id").map(scalar_to_string).unwrap_or_default(),
                url: record.get("url").map(scalar_to_string).unwrap_or_default(),
            },
        })
        .filter(|photo| !photo.url.is_empty())
        .collect()
}

fn resolve_gallery(fetched: Result<Vec<Value>, ContentError>) -> Vec<GalleryPhoto> {
    if let Ok(records) = &fetched {
        let photos = gallery_photos(records);
        if !photos.is_empty() {
            return photos;
        }
        log::warn!("Gallery feed had no usable photos, using fallback");
    }
    gallery_photos(&or_fallback(View::Gallery, fetched))
}
