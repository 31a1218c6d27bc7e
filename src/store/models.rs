use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;

/// A registered member. `password_hash` is deliberately not serializable;
/// clients only ever see the projections below.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub id: i32,
    pub uid: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub interests: Option<String>,
    pub avatar: Option<String>,
    pub title: Option<String>,
    pub badges: Option<String>,
    pub expertise: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// The `{uid, name, email}` shape returned by signup/login/verify.
    pub fn public(&self) -> Value {
        json!({
            "uid": self.uid,
            "name": self.name,
            "email": self.email,
        })
    }

    pub fn interest_list(&self) -> Vec<String> {
        self.interests
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect()
    }
}

/// Fields the signup path provides; the store assigns the surrogate id and
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub interests: Option<String>,
    pub avatar: Option<String>,
    pub title: Option<String>,
    pub badges: Option<String>,
    pub expertise: Option<String>,
}

/// A directory entry: a course, funding opportunity, training, etc.
#[derive(Debug, Clone, FromRow)]
pub struct Resource {
    pub id: i32,
    pub title: String,
    pub link: String,
    pub category: String,
    #[sqlx(rename = "type")]
    pub rtype: String,
    pub description: Option<String>,
    pub eligibility: Option<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i32>,
    pub popularity: Option<i32>,
    pub tags: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub members: Option<i32>,
    pub user_id: i32,
    pub uploaded_at: DateTime<Utc>,
}

impl Resource {
    /// Full projection used by the directory listing.
    pub fn directory_entry(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "link": self.link,
            "category": self.category,
            "type": self.rtype,
            "description": self.description,
            "user_id": self.user_id,
            "duration": self.duration,
            "rating": self.rating,
            "reviews": self.reviews,
            "popularity": self.popularity,
            "tags": self.tags,
            "deadline": self.deadline.map(|d| d.to_rfc3339()),
            "members": self.members,
            "uploaded_at": self.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    /// Compact projection used by search and recommendations.
    pub fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "link": self.link,
            "description": self.description,
            "uploadedAt": self.uploaded_at.to_rfc3339(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub title: String,
    pub link: String,
    pub category: String,
    pub rtype: String,
    pub description: Option<String>,
    pub user_id: i32,
}

/// Narrowing filters for the directory listing; every populated field must
/// match.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub rtype: Option<String>,
    pub duration: Option<String>,
    pub rating: Option<f64>,
}
