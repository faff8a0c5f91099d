pub mod fallback;
pub mod loader;
pub mod present;
pub mod source;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::quiz::QuizQuestion;
use crate::quotes::QuoteItem;

/// A named feed served by the content API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Roster,
    Quotes,
    Quiz,
    Projects,
    Announcements,
    Scholarly,
    Gallery,
}

impl View {
    #[cfg(test)]
    pub const ALL: [View; 7] = [
        View::Roster,
        View::Quotes,
        View::Quiz,
        View::Projects,
        View::Announcements,
        View::Scholarly,
        View::Gallery,
    ];

    /// Value of the `view` query parameter.
    pub fn name(&self) -> &'static str {
        match self {
            View::Roster => "roster",
            View::Quotes => "quotes",
            View::Quiz => "quiz",
            View::Projects => "projects",
            View::Announcements => "announcements",
            View::Scholarly => "scholarly",
            View::Gallery => "gallery",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("expected a JSON array")]
    NotAnArray,
    #[error("no content endpoint configured")]
    NotConfigured,
}

/// Everything the bot shows, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct LabContent {
    pub members: Vec<Member>,
    pub quotes: Vec<QuoteItem>,
    pub quiz_bank: Vec<QuizQuestion>,
    pub projects: Vec<Project>,
    pub announcements: Vec<Announcement>,
    pub publications: Vec<Publication>,
    pub gallery: Vec<GalleryPhoto>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub focus: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub photo_url: String,
    #[serde(default, deserialize_with = "lenient_links")]
    pub links: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub title: String,
    pub summary: String,
    pub funder: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Announcement {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryPhoto {
    pub id: String,
    pub url: String,
}

/// A scholarly record flattened for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Publication {
    pub title: String,
    pub first_author: String,
    pub journal: String,
    /// `YYYY-MM-DD`, or empty when the feed has no usable date.
    pub date: String,
    pub url: String,
    /// Milliseconds since the epoch used for newest-first ordering.
    pub sort_key: Option<i64>,
}

/// Feed records flagged `"publish": false` are hidden; a missing flag means publish.
pub fn is_published(record: &Value) -> bool {
    record.get("publish") != Some(&Value::Bool(false))
}

pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// First non-empty scalar among `keys`.
pub(crate) fn first_field(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .map(scalar_to_string)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(scalar_to_string).unwrap_or_default())
}

fn lenient_links<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let links = match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, url)| (name.clone(), scalar_to_string(url)))
            .filter(|(_, url)| !url.is_empty())
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_flag_only_hides_explicit_false() {
        assert!(is_published(&json!({ "name": "a" })));
        assert!(is_published(&json!({ "publish": true })));
        assert!(is_published(&json!({ "publish": "false" })));
        assert!(!is_published(&json!({ "publish": false })));
    }

    #[test]
    fn member_accepts_loose_scalars() {
        let member: Member = serde_json::from_value(json!({
            "id": 42,
            "name": "  Ada  ",
            "role": null,
            "links": { "website": "https://example.org", "empty": "" }
        }))
        .unwrap();

        assert_eq!(member.id, "42");
        assert_eq!(member.name, "Ada");
        assert_eq!(member.role, "");
        assert_eq!(member.links.len(), 1);
        assert_eq!(member.links["website"], "https://example.org");
    }

    #[test]
    fn first_field_skips_blank_aliases() {
        let record = json!({ "funder": "", "fundingAgency": "NSF" });
        assert_eq!(first_field(&record, &["funder", "fundingAgency"]), "NSF");
        assert_eq!(first_field(&record, &["agency"]), "");
    }

    #[test]
    fn view_names_match_the_api() {
        let names: Vec<_> = View::ALL.iter().map(View::name).collect();
        assert_eq!(
            names,
            ["roster", "quotes", "quiz", "projects", "announcements", "scholarly", "gallery"]
        );
    }
}
