//! Shaping of feed records for display: directory search, project rows,
//! publication ordering and date rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand::seq::SliceRandom;
use serde_json::Value;

use super::{first_field, scalar_to_string, GalleryPhoto, Member, Project, Publication};

pub const GALLERY_SAMPLE_SIZE: usize = 12;

const PUBLICATION_DATE_KEYS: [&str; 5] = [
    "publicationDate",
    "date",
    "addedToLibrary",
    "published",
    "updated",
];

/// Case-insensitive match on name, role, focus and any link.
pub fn filter_members<'a>(members: &'a [Member], query: &str) -> Vec<&'a Member> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return members.iter().collect();
    }

    members
        .iter()
        .filter(|member| {
            let links = member.links.values().cloned().collect::<Vec<_>>().join(" ");
            [&member.name, &member.role, &member.focus, &links]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

pub fn normalize_projects(records: &[Value]) -> Vec<Project> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let title = first_field(record, &["title"]);
            Project {
                title: if title.is_empty() {
                    format!("Project {}", idx + 1)
                } else {
                    title
                },
                summary: first_field(record, &["summary"]),
                funder: first_field(record, &["funder", "fundingAgency", "funding_agency", "agency"]),
                date: first_field(record, &["date", "dates", "period"]),
                url: first_field(record, &["url", "readMoreUrl", "link"]),
            }
        })
        .filter(|p| {
            !p.title.is_empty() || !p.summary.is_empty() || !p.funder.is_empty() || !p.date.is_empty()
        })
        .collect()
}

/// Flattens scholarly records and orders them newest first. Records without a
/// parseable date go last, keeping feed order among themselves.
pub fn publications(records: &[Value]) -> Vec<Publication> {
    let mut publications: Vec<Publication> = records
        .iter()
        .map(|record| {
            let title = first_field(record, &["title"]);
            Publication {
                title: if title.is_empty() { "Untitled".to_string() } else { title },
                first_author: first_author(record),
                journal: first_field(record, &["journal", "publicationTitle"]),
                date: record
                    .get("publicationDate")
                    .map(|v| date_string(&scalar_to_string(v)))
                    .unwrap_or_default(),
                url: first_field(record, &["articleUrl", "zoteroUrl"]),
                sort_key: parse_timestamp(&first_field(record, &PUBLICATION_DATE_KEYS))
                    .map(|t| t.timestamp_millis()),
            }
        })
        .collect();

    publications.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
    publications
}

fn first_author(record: &Value) -> String {
    let explicit = first_field(record, &["firstAuthor"]);
    if !explicit.is_empty() {
        return explicit;
    }
    let listed = record
        .get("authors")
        .and_then(Value::as_array)
        .and_then(|authors| authors.first())
        .map(scalar_to_string)
        .unwrap_or_default();
    if !listed.is_empty() {
        return listed;
    }
    first_field(record, &["creatorSummary"])
}

/// Accepts RFC 3339, naive date-times and plain dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        }
    }
    None
}

/// `YYYY-MM-DD`; values already in that shape pass through untouched.
pub fn date_string(raw: &str) -> String {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    let already_iso = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if already_iso {
        return raw.to_string();
    }
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// e.g. `Mar 5, 2024`
pub fn announcement_time(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

pub fn sample_gallery(photos: &[GalleryPhoto]) -> Vec<GalleryPhoto> {
    let mut sample = photos.to_vec();
    sample.shuffle(&mut rand::thread_rng());
    sample.truncate(GALLERY_SAMPLE_SIZE);
    sample
}
