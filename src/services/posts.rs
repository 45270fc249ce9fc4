use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::post::{CreatePost, Post};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;

const SEED: [(&str, &str); 10] = [
    (
        "Getting Started with FastAPI",
        "FastAPI is a modern, fast web framework for building APIs with Python. It is easy to learn and very powerful.",
    ),
    (
        "Why Use Python for Web APIs",
        "Python offers a clean syntax, a huge ecosystem of libraries, and excellent community support for backend development.",
    ),
    (
        "Understanding RESTful Endpoints",
        "RESTful APIs are based on standard HTTP methods such as GET, POST, PUT, and DELETE to manage resources.",
    ),
    (
        "FastAPI vs Flask",
        "While Flask is lightweight and flexible, FastAPI provides built-in data validation and automatic API documentation.",
    ),
    (
        "Working with Path Parameters",
        "Path parameters allow you to pass dynamic values in the URL and are commonly used to identify specific resources.",
    ),
    (
        "Using Query Parameters Effectively",
        "Query parameters are useful for filtering, sorting, and paginating API responses without changing the endpoint path.",
    ),
    (
        "Request Validation with Pydantic",
        "Pydantic models ensure that incoming request data is validated and parsed correctly before reaching your logic.",
    ),
    (
        "Handling Errors Gracefully",
        "Proper error handling improves user experience by returning clear messages and appropriate HTTP status codes.",
    ),
    (
        "Automatic API Documentation",
        "FastAPI automatically generates interactive API documentation using Swagger UI and ReDoc.",
    ),
    (
        "Deploying a FastAPI Application",
        "You can deploy FastAPI apps using tools like Uvicorn, Docker, and cloud platforms such as AWS or Azure.",
    ),
];

/// In-memory post store. Cloning shares the same underlying map.
///
/// Ids are assigned under the write lock, so concurrent `create` calls never
/// hand out the same id. Keys are ordered, and since ids only grow, iteration
/// order is insertion order.
#[derive(Debug, Clone)]
pub struct PostRegistry {
    posts: Arc<RwLock<BTreeMap<i64, Post>>>,
}

impl PostRegistry {
    /// A registry holding the ten fixed seed posts, ids 1 through 10.
    pub fn seeded() -> Self {
        let posts = SEED
            .iter()
            .zip(1..)
            .map(|(&(title, content), id)| {
                let post = Post {
                    id,
                    title: title.to_owned(),
                    content: content.to_owned(),
                };
                (id, post)
            })
            .collect();

        Self {
            posts: Arc::new(RwLock::new(posts)),
        }
    }

    /// The first `limit` posts; `limit` must lie in `MIN_LIMIT..=MAX_LIMIT`.
    pub async fn list(&self, limit: i64) -> Result<Vec<Post>, AppError> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::validation(
                "limit",
                format!("must be between {MIN_LIMIT} and {MAX_LIMIT}, got {limit}"),
            ));
        }

        let posts = self.posts.read().await;
        Ok(posts.values().take(limit as usize).cloned().collect())
    }

    pub async fn get(&self, id: i64) -> Result<Post, AppError> {
        self.posts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::PostNotFound)
    }

    pub async fn create(&self, new: CreatePost) -> Result<Post, AppError> {
        require_text("title", &new.title)?;
        require_text("content", &new.content)?;

        let mut posts = self.posts.write().await;
        let id = posts.keys().next_back().map_or(1, |max| max + 1);
        let post = Post {
            id,
            title: new.title,
            content: new.content,
        };
        posts.insert(id, post.clone());
        Ok(post)
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn new_post(title: &str, content: &str) -> CreatePost {
        CreatePost {
            title: title.into(),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn seeded_with_ten_posts_in_order() {
        let registry = PostRegistry::seeded();
        assert_eq!(registry.len().await, 10);

        let posts = registry.list(MAX_LIMIT).await.unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(posts[0].title, "Getting Started with FastAPI");
        assert_eq!(posts[9].title, "Deploying a FastAPI Application");
    }

    #[tokio::test]
    async fn list_returns_min_of_limit_and_total() {
        let registry = PostRegistry::seeded();
        for limit in MIN_LIMIT..=MAX_LIMIT {
            let posts = registry.list(limit).await.unwrap();
            assert_eq!(posts.len(), limit.min(10) as usize);
            assert!(posts.iter().zip(1..).all(|(p, id)| p.id == id));
        }
    }

    #[tokio::test]
    async fn list_rejects_out_of_range_limits() {
        let registry = PostRegistry::seeded();
        for limit in [-1, 0, 101, 1000] {
            let err = registry.list(limit).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { ref field, .. } if field == "limit"));
        }
    }

    #[tokio::test]
    async fn get_seeded_and_missing() {
        let registry = PostRegistry::seeded();
        let post = registry.get(4).await.unwrap();
        assert_eq!(post.title, "FastAPI vs Flask");
        assert!(post.content.starts_with("While Flask is lightweight"));

        assert!(matches!(registry.get(0).await, Err(AppError::PostNotFound)));
        assert!(matches!(registry.get(11).await, Err(AppError::PostNotFound)));
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let registry = PostRegistry::seeded();
        let post = registry.create(new_post("T", "C")).await.unwrap();
        assert_eq!(post.id, 11);

        let fetched = registry.get(11).await.unwrap();
        assert_eq!(fetched, post);

        let next = registry.create(new_post("T2", "C2")).await.unwrap();
        assert_eq!(next.id, 12);
        assert_eq!(registry.list(12).await.unwrap().last(), Some(&next));
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let registry = PostRegistry::seeded();

        let err = registry.create(new_post("  ", "C")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "title"));

        let err = registry.create(new_post("T", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "content"));

        assert_eq!(registry.len().await, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_unique_ids() {
        let registry = PostRegistry::seeded();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    registry
                        .create(new_post(&format!("t{i}"), "c"))
                        .await
                        .map(|p| p.id)
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(ids.len(), 50);
        assert_eq!(ids.iter().min(), Some(&11));
        assert_eq!(ids.iter().max(), Some(&60));
        assert_eq!(registry.len().await, 60);
    }
}
