//! User profile records

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::store::{Document, Fields};

use super::favorites::FavoriteSet;
use super::types::EducationLevel;

pub const DEFAULT_TITLE: &str = "Petualang Pemula";

/// Authenticated identity as reported by the auth provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub username: String,
    pub profile_picture_url: Option<String>,
    pub education_level: Option<EducationLevel>,
    pub current_title: String,
    pub total_xp: i64,
    pub favorites: FavoriteSet,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            uid: String::new(),
            email: String::new(),
            username: String::new(),
            profile_picture_url: None,
            education_level: None,
            current_title: DEFAULT_TITLE.to_string(),
            total_xp: 0,
            favorites: FavoriteSet::new(),
            joined_at: None,
        }
    }
}

impl UserProfile {
    /// Minimal profile built from a session when no stored profile exists
    pub fn basic(session: &Session) -> Self {
        Self {
            uid: session.uid.clone(),
            email: session.email.clone(),
            ..Self::default()
        }
    }

    pub fn effective_level(&self) -> EducationLevel {
        self.education_level.unwrap_or(EducationLevel::FALLBACK)
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        let education_level = match doc.get_str("education_level")? {
            None | Some("") => None,
            Some(raw) => Some(
                EducationLevel::parse(raw)
                    .ok_or_else(|| Error::malformed(&doc.id, "education_level", format!("unknown level '{}'", raw)))?,
            ),
        };

        let joined_at = match doc.get_str("joined_at")? {
            None => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| Error::malformed(&doc.id, "joined_at", e.to_string()))?
                    .with_timezone(&Utc),
            ),
        };

        let uid = match doc.get_str("uid")? {
            Some(uid) if !uid.is_empty() => uid.to_string(),
            _ => doc.id.clone(),
        };

        Ok(Self {
            uid,
            email: doc.string_or_default("email")?,
            username: doc.string_or_default("username")?,
            profile_picture_url: doc
                .get_str("profile_picture_url")?
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            education_level,
            current_title: doc
                .get_str("current_title")?
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            total_xp: doc.get_i64("total_xp")?.unwrap_or(0),
            favorites: doc.get_string_list("favorite_animal_ids")?.into_iter().collect(),
            joined_at,
        })
    }

    /// Profile fields written on update. Favorites are left out: they only
    /// change through the store's atomic array operations.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("uid".into(), json!(self.uid));
        fields.insert("email".into(), json!(self.email));
        fields.insert("username".into(), json!(self.username));
        fields.insert(
            "profile_picture_url".into(),
            json!(self.profile_picture_url.clone().unwrap_or_default()),
        );
        fields.insert(
            "education_level".into(),
            json!(self.education_level.map(EducationLevel::as_str).unwrap_or_default()),
        );
        fields.insert("current_title".into(), json!(self.current_title));
        fields.insert("total_xp".into(), json!(self.total_xp));
        if let Some(joined_at) = self.joined_at {
            fields.insert("joined_at".into(), Value::String(joined_at.to_rfc3339()));
        }
        fields
    }
}
