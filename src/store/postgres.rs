use crate::error::StoreError;
use crate::store::models::{NewResource, NewUser, Resource, ResourceFilter, UserProfile};
use crate::store::{CredentialStore, ResourceStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, QueryBuilder};
use std::sync::Arc;

const USER_COLUMNS: &str = "id, uid, name, email, password_hash, gender, location, language, \
     interests, avatar, title, badges, expertise, created_at";

const RESOURCE_COLUMNS: &str = "id, title, link, category, type, description, eligibility, \
     location, rating, reviews, popularity, tags, deadline, duration, members, user_id, uploaded_at";

/// Postgres-backed store. Queries are checked at runtime so the crate
/// builds without a live database; the schema lives in `migrations/`.
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM user_profiles WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM user_profiles WHERE uid = $1",
            USER_COLUMNS
        ))
        .bind(uid)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let created = sqlx::query_as::<_, UserProfile>(&format!(
            "INSERT INTO user_profiles \
             (uid, name, email, password_hash, gender, location, language, interests, \
              avatar, title, badges, expertise, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.uid)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.gender)
        .bind(&user.location)
        .bind(&user.language)
        .bind(&user.interests)
        .bind(&user.avatar)
        .bind(&user.title)
        .bind(&user.badges)
        .bind(&user.expertise)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(created)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn insert_resource(&self, resource: NewResource) -> Result<Resource, StoreError> {
        let created = sqlx::query_as::<_, Resource>(&format!(
            "INSERT INTO resources (title, link, category, type, description, user_id, uploaded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            RESOURCE_COLUMNS
        ))
        .bind(&resource.title)
        .bind(&resource.link)
        .bind(&resource.category)
        .bind(&resource.rtype)
        .bind(&resource.description)
        .bind(resource.user_id)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(created)
    }

    async fn list_resources(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, StoreError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM resources WHERE 1 = 1",
            RESOURCE_COLUMNS
        ));

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(search) = &filter.search {
            query.push(" AND title ILIKE ").push_bind(format!("%{}%", search));
        }
        if let Some(rtype) = &filter.rtype {
            query.push(" AND type = ").push_bind(rtype);
        }
        if let Some(duration) = &filter.duration {
            query.push(" AND duration = ").push_bind(duration);
        }
        if let Some(rating) = filter.rating {
            query.push(" AND rating = ").push_bind(rating);
        }
        query.push(" ORDER BY uploaded_at DESC");

        let resources = query
            .build_query_as::<Resource>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(resources)
    }

    async fn search_resources(&self, term: &str) -> Result<Vec<Resource>, StoreError> {
        let pattern = format!("%{}%", term);
        let resources = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {} FROM resources WHERE title ILIKE $1 OR description ILIKE $1 \
             ORDER BY uploaded_at DESC",
            RESOURCE_COLUMNS
        ))
        .bind(&pattern)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(resources)
    }

    async fn recommend_resources(
        &self,
        interests: &[String],
        include_women_focused: bool,
    ) -> Result<Vec<Resource>, StoreError> {
        let resources = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {} FROM resources \
             WHERE category = ANY($1) OR ($2 AND title ILIKE '%women%') \
             ORDER BY uploaded_at DESC",
            RESOURCE_COLUMNS
        ))
        .bind(interests)
        .bind(include_women_focused)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(resources)
    }

    async fn count_resources(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resources")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }

    async fn count_open_opportunities(&self) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM resources WHERE deadline > $1")
                .bind(Utc::now())
                .fetch_one(self.pool.as_ref())
                .await?;
        Ok(count)
    }
}
