use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::store::{NewResource, ResourceFilter};
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct ResourceQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub rtype: Option<String>,
    pub duration: Option<String>,
    pub rating: Option<f64>,
}

/// Directory listing with optional narrowing filters.
pub async fn list_resources(
    _auth: AuthenticatedUser,
    query: web::Query<ResourceQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let filter = ResourceFilter {
        category: query.category.clone().filter(|v| !v.is_empty()),
        search: query.search.clone().filter(|v| !v.is_empty()),
        rtype: query.rtype.clone().filter(|v| !v.is_empty()),
        duration: query.duration.clone().filter(|v| !v.is_empty()),
        rating: query.rating,
    };

    let resources = state.resources.list_resources(&filter).await?;
    let entries: Vec<_> = resources.iter().map(|r| r.directory_entry()).collect();

    Ok(HttpResponse::Ok().json(entries))
}

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub title: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub rtype: Option<String>,
    pub description: Option<String>,
}

/// Adds a directory entry owned by the authenticated user.
pub async fn create_resource(
    auth: AuthenticatedUser,
    req: web::Json<CreateResourceRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (title, link, category) = match (&req.title, &req.link, &req.category) {
        (Some(title), Some(link), Some(category))
            if !title.is_empty() && !link.is_empty() && !category.is_empty() =>
        {
            (title.clone(), link.clone(), category.clone())
        }
        _ => return Err(AppError::Validation("Missing required fields".into())),
    };

    // The token carries the public uid; the resource row references the
    // surrogate key.
    let owner = state
        .users
        .find_by_uid(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::Validation("User not found".into()))?;

    let resource = state
        .resources
        .insert_resource(NewResource {
            title,
            link,
            category,
            rtype: req.rtype.clone().unwrap_or_else(|| "general".into()),
            description: req.description.clone(),
            user_id: owner.id,
        })
        .await?;

    info!("Resource {} created by {}", resource.id, owner.uid);

    Ok(HttpResponse::Created().json(json!({
        "message": "Resource created successfully",
        "id": resource.id,
    })))
}

/// Interest-based recommendations; women-focused resources are included
/// for members who registered as female.
pub async fn recommendations(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let uid = path.into_inner();
    let user = match state.users.find_by_uid(&uid).await? {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found." })))
        }
    };

    let include_women_focused = user.gender.as_deref() == Some("female");
    let resources = state
        .resources
        .recommend_resources(&user.interest_list(), include_women_focused)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "recommendations": resources.iter().map(|r| r.summary()).collect::<Vec<_>>(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

pub async fn search(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let term = query.query.clone().unwrap_or_default().to_lowercase();
    if term.is_empty() {
        return Ok(HttpResponse::Ok().json(json!({ "results": [] })));
    }

    let resources = state.resources.search_resources(&term).await?;

    Ok(HttpResponse::Ok().json(json!({
        "results": resources.iter().map(|r| r.summary()).collect::<Vec<_>>(),
    })))
}

pub async fn stats(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(json!({
        "Total Resources": state.resources.count_resources().await?,
        "Active Opportunities": state.resources.count_open_opportunities().await?,
        "Community Members": state.users.count_users().await?,
    })))
}

/// Proxies the external course catalog. Upstream failure maps to a fixed
/// body rather than the generic error shape.
pub async fn fetch_courses(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let topic = path.into_inner();

    match state.courses.search(&topic).await {
        Ok(courses) => Ok(HttpResponse::Ok().json(json!({
            "courses": courses
                .iter()
                .map(|c| json!({
                    "name": c.name,
                    "link": c.link,
                    "description": c.description,
                }))
                .collect::<Vec<_>>(),
        }))),
        Err(e) => {
            error!("Course catalog request failed: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch courses" })))
        }
    }
}
