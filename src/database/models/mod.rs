pub mod comment;
pub mod post;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of forum content that can be liked and deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Post,
    Comment,
}

impl ResourceKind {
    pub fn table_name(self) -> &'static str {
        match self {
            ResourceKind::Post => "forum_posts",
            ResourceKind::Comment => "forum_comments",
        }
    }

    /// Capitalized label for client messages ("Post not found")
    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Post => "Post",
            ResourceKind::Comment => "Comment",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Post => write!(f, "post"),
            ResourceKind::Comment => write!(f, "comment"),
        }
    }
}

/// A stored post or comment. `author_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Post(Post),
    Comment(Comment),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Post(_) => ResourceKind::Post,
            Resource::Comment(_) => ResourceKind::Comment,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Resource::Post(post) => post.id,
            Resource::Comment(comment) => comment.id,
        }
    }

    pub fn author_id(&self) -> &str {
        match self {
            Resource::Post(post) => &post.author_id,
            Resource::Comment(comment) => &comment.author_id,
        }
    }

    pub fn into_post(self) -> Option<Post> {
        match self {
            Resource::Post(post) => Some(post),
            Resource::Comment(_) => None,
        }
    }

    pub fn into_comment(self) -> Option<Comment> {
        match self {
            Resource::Comment(comment) => Some(comment),
            Resource::Post(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NewResource {
    Post(NewPost),
    Comment(NewComment),
}

impl NewResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            NewResource::Post(_) => ResourceKind::Post,
            NewResource::Comment(_) => ResourceKind::Comment,
        }
    }
}
