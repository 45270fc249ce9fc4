use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, ErrorDetail, ValidationDetail};
use crate::helpers::{AppJson, AppPath, AppQuery};
use crate::models::post::{CreatePost, PostResponse};
use crate::services::posts::{PostRegistry, DEFAULT_LIMIT};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Maximum number of posts to return.
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100, default = 10)]
    limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// `GET /posts`: the first `limit` posts in creation order.
#[utoipa::path(
    get,
    path = "/posts",
    tag = "Posts",
    summary = "Get a list of posts",
    params(ListParams),
    responses(
        (status = 200, description = "Posts in creation order", body = Vec<PostResponse>),
        (status = 422, description = "limit outside 1..=100", body = ValidationDetail),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_posts(
    State(registry): State<PostRegistry>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<AppJson<Vec<PostResponse>>, AppError> {
    let posts = registry.list(params.limit).await?;
    Ok(AppJson(posts.into_iter().map(PostResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/posts",
    tag = "Posts",
    summary = "Create a new post.",
    request_body = CreatePost,
    responses(
        (status = 201, description = "Post created", body = PostResponse,
            headers(("location" = String, description = "Path of the new post"))),
        (status = 422, description = "Missing or blank title/content", body = ValidationDetail),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_post(
    State(registry): State<PostRegistry>,
    AppJson(payload): AppJson<CreatePost>,
) -> Result<impl IntoResponse, AppError> {
    let post = registry.create(payload).await?;
    tracing::info!(id = post.id, "post created");

    let location = format!("/posts/{}", post.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        AppJson(PostResponse::from(post)),
    ))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "Posts",
    summary = "Get a post by ID.",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "Post not found", body = ErrorDetail,
            example = json!({ "detail": "Post not found." })),
    )
)]
#[tracing::instrument(skip_all, fields(id))]
pub async fn get_post(
    State(registry): State<PostRegistry>,
    AppPath(id): AppPath<i64>,
) -> Result<AppJson<PostResponse>, AppError> {
    tracing::Span::current().record("id", id);
    let post = registry.get(id).await?;
    Ok(AppJson(post.into()))
}

pub fn router() -> Router<PostRegistry> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post))
}
