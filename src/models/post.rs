use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// the input to our `create_post` handler
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
}

// what every `/posts` endpoint hands back; the id stays internal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub title: String,
    pub content: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            title: post.title,
            content: post.content,
        }
    }
}
