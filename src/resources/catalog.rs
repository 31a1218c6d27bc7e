use crate::error::AppError;
use serde::Deserialize;

/// A course offered by the external catalog, reshaped for clients.
#[derive(Debug, Clone)]
pub struct Course {
    pub name: String,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    elements: Vec<CatalogCourse>,
}

#[derive(Debug, Deserialize)]
struct CatalogCourse {
    name: String,
    slug: String,
    description: Option<String>,
}

/// Thin client for the Coursera-shaped course search API. The base URL is
/// configurable so tests can point it at a local mock.
pub struct CourseCatalog {
    http: reqwest::Client,
    base_url: String,
}

impl CourseCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn search(&self, topic: &str) -> Result<Vec<Course>, AppError> {
        let url = format!(
            "{}/api/courses.v1?q=search&query={}",
            self.base_url, topic
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::External(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "course catalog returned {}",
                response.status()
            )));
        }

        let payload: CatalogResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(e.to_string()))?;

        Ok(payload
            .elements
            .into_iter()
            .map(|course| Course {
                link: format!("https://www.coursera.org/learn/{}", course.slug),
                name: course.name,
                description: course
                    .description
                    .unwrap_or_else(|| "No description available".to_string()),
            })
            .collect())
    }
}
