use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::{Post, Storage};
use crate::validators::{clean_profanity, validate_post_body};

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListPostsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    pub user_id: String,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
            body: post.body.clone(),
            user_id: post.user_id.to_string(),
        }
    }
}

/// Publishes a post under the authenticated user. The body is length-checked
/// and profanity-masked before it is stored.
pub async fn create_post(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<CreatePostRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.into_inner().0;

    validate_post_body(&form.body)?;
    let body = clean_profanity(&form.body);

    let post = storage.posts.create_post(&body, user_id).await?;

    tracing::info!(post_id = %post.id, user_id = %post.user_id, "post created");

    Ok(HttpResponse::Created().json(PostResponse::from(&post)))
}

/// Lists posts, oldest first. `?author_id=` narrows to one author and
/// `?sort=desc` flips the order.
pub async fn list_posts(
    query: web::Query<ListPostsQuery>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let author_id = match query.author_id.as_deref() {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ValidationError::InvalidFormat("author_id".to_string()))?,
        ),
        None => None,
    };

    let mut posts = storage.posts.list_posts(author_id).await?;
    if query.sort.as_deref() == Some("desc") {
        posts.reverse();
    }

    let body: Vec<PostResponse> = posts.iter().map(PostResponse::from).collect();

    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_post(
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let post_id = parse_post_id(&path)?;

    let post = storage
        .posts
        .find_post(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("post".to_string()))?;

    Ok(HttpResponse::Ok().json(PostResponse::from(&post)))
}

/// Deletes one of the caller's own posts. Deleting somebody else's post is a
/// `403`, not a `404`: the post exists, the caller just does not own it.
pub async fn delete_post(
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.into_inner().0;
    let post_id = parse_post_id(&path)?;

    let post = storage
        .posts
        .find_post(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("post".to_string()))?;

    if post.user_id != user_id {
        return Err(AppError::Forbidden(
            "you can only delete your own posts".to_string(),
        ));
    }

    storage.posts.delete_post(post_id).await?;

    tracing::info!(post_id = %post_id, user_id = %user_id, "post deleted");

    Ok(HttpResponse::NoContent().finish())
}

fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| ValidationError::InvalidFormat("post_id".to_string()).into())
}
