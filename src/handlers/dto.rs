// handlers/dto.rs - Request bodies and query strings accepted by the forum routes

use serde::Deserialize;

use crate::middleware::RequiredFields;

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// POST /posts body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
}

impl RequiredFields for CreatePostRequest {
    const MESSAGE: &'static str = "Title and content are required";

    fn required_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("title", self.title.as_deref()), ("content", self.content.as_deref())]
    }
}

/// POST /posts/:id/comments body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: Option<String>,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
}

impl RequiredFields for CreateCommentRequest {
    const MESSAGE: &'static str = "Comment content is required";

    fn required_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("content", self.content.as_deref())]
    }
}

/// Blank or missing display names fall back to "Anonymous"
pub fn author_name_or_default(name: Option<String>) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string())
}

/// GET /posts query string. Kept as raw strings so bad values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub page: i64,
}

impl Page {
    /// Saturates for absurd page numbers; such a page is simply past the end
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

impl ListQuery {
    pub fn page(&self, default_limit: i64, max_limit: i64) -> Page {
        let positive = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
        };

        Page {
            limit: positive(&self.limit).unwrap_or(default_limit).min(max_limit),
            page: positive(&self.page).unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>, page: Option<&str>) -> ListQuery {
        ListQuery {
            limit: limit.map(str::to_string),
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn defaults_when_absent_or_invalid() {
        assert_eq!(query(None, None).page(10, 100), Page { limit: 10, page: 1 });
        assert_eq!(query(Some("abc"), Some("-2")).page(10, 100), Page { limit: 10, page: 1 });
        assert_eq!(query(Some("0"), Some("0")).page(10, 100), Page { limit: 10, page: 1 });
    }

    #[test]
    fn caps_limit_and_computes_offset() {
        let page = query(Some("500"), Some("3")).page(10, 50);
        assert_eq!(page, Page { limit: 50, page: 3 });
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let page = query(Some("10"), Some(&i64::MAX.to_string())).page(10, 100);
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.offset(), i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page { limit: 10, page: 1 };
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }

    #[test]
    fn post_body_reads_camel_case_author_fields() {
        let body: CreatePostRequest = serde_json::from_str(
            r#"{"title":"T","content":"C","authorName":"Ann","authorImage":"http://img"}"#,
        )
        .unwrap();
        assert_eq!(body.author_name.as_deref(), Some("Ann"));
        assert_eq!(body.author_image.as_deref(), Some("http://img"));
        assert!(body.validate().is_ok());
    }

    #[test]
    fn comment_body_requires_content() {
        let body: CreateCommentRequest = serde_json::from_str(r#"{"content":"  "}"#).unwrap();
        let err = body.validate().unwrap_err();
        assert_eq!(err.message(), "Comment content is required");
    }

    #[test]
    fn blank_author_name_is_anonymous() {
        assert_eq!(author_name_or_default(None), "Anonymous");
        assert_eq!(author_name_or_default(Some(" ".to_string())), "Anonymous");
        assert_eq!(author_name_or_default(Some("Ann".to_string())), "Ann");
    }
}
