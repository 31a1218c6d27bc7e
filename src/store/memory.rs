use crate::error::StoreError;
use crate::store::models::{NewResource, NewUser, Resource, ResourceFilter, UserProfile};
use crate::store::{CredentialStore, ResourceStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;

/// In-memory store used by tests and local development. Mirrors the
/// uniqueness rules the Postgres schema enforces.
pub struct MemoryStore {
    users: RwLock<Vec<UserProfile>>,
    resources: RwLock<Vec<Resource>>,
    next_user_id: AtomicI32,
    next_resource_id: AtomicI32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            resources: RwLock::new(Vec::new()),
            next_user_id: AtomicI32::new(1),
            next_resource_id: AtomicI32::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.uid == uid).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email || u.uid == user.uid) {
            return Err(StoreError::Duplicate);
        }

        let profile = UserProfile {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
            uid: user.uid,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            gender: user.gender,
            location: user.location,
            language: user.language,
            interests: user.interests,
            avatar: user.avatar,
            title: user.title,
            badges: user.badges,
            expertise: user.expertise,
            created_at: Utc::now(),
        };
        users.push(profile.clone());
        Ok(profile)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.users.read().await.len() as i64)
    }
}

fn matches_filter(resource: &Resource, filter: &ResourceFilter) -> bool {
    if let Some(category) = &filter.category {
        if &resource.category != category {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        if !resource
            .title
            .to_lowercase()
            .contains(&search.to_lowercase())
        {
            return false;
        }
    }
    if let Some(rtype) = &filter.rtype {
        if &resource.rtype != rtype {
            return false;
        }
    }
    if let Some(duration) = &filter.duration {
        if resource.duration.as_deref() != Some(duration.as_str()) {
            return false;
        }
    }
    if let Some(rating) = filter.rating {
        if resource.rating != Some(rating) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn insert_resource(&self, resource: NewResource) -> Result<Resource, StoreError> {
        let mut resources = self.resources.write().await;
        let stored = Resource {
            id: self.next_resource_id.fetch_add(1, Ordering::SeqCst),
            title: resource.title,
            link: resource.link,
            category: resource.category,
            rtype: resource.rtype,
            description: resource.description,
            eligibility: None,
            location: None,
            rating: None,
            reviews: None,
            popularity: None,
            tags: None,
            deadline: None,
            duration: None,
            members: None,
            user_id: resource.user_id,
            uploaded_at: Utc::now(),
        };
        resources.push(stored.clone());
        Ok(stored)
    }

    async fn list_resources(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, StoreError> {
        let resources = self.resources.read().await;
        Ok(resources
            .iter()
            .filter(|r| matches_filter(r, filter))
            .cloned()
            .collect())
    }

    async fn search_resources(&self, query: &str) -> Result<Vec<Resource>, StoreError> {
        let needle = query.to_lowercase();
        let resources = self.resources.read().await;
        Ok(resources
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn recommend_resources(
        &self,
        interests: &[String],
        include_women_focused: bool,
    ) -> Result<Vec<Resource>, StoreError> {
        let resources = self.resources.read().await;
        Ok(resources
            .iter()
            .filter(|r| {
                interests.contains(&r.category)
                    || (include_women_focused && r.title.to_lowercase().contains("women"))
            })
            .cloned()
            .collect())
    }

    async fn count_resources(&self) -> Result<i64, StoreError> {
        Ok(self.resources.read().await.len() as i64)
    }

    async fn count_open_opportunities(&self) -> Result<i64, StoreError> {
        let now = Utc::now();
        let resources = self.resources.read().await;
        Ok(resources
            .iter()
            .filter(|r| r.deadline.map(|d| d > now).unwrap_or(false))
            .count() as i64)
    }
}
