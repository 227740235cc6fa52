use serde::{Deserialize, Serialize};

/// A post as returned by the remote API.
///
/// `id` is assigned by the server on create and never changes afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Post {
    pub id: u64,

    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub body: String,
}

impl Post {
    #[allow(dead_code)]
    pub fn new(id: u64, title: &str, body: &str) -> Self {
        Self {
            id,
            user_id: None,
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    pub fn with_draft(&self, draft: &PostDraft) -> Self {
        Self {
            title: draft.title.clone(),
            body: draft.body.clone(),
            ..self.clone()
        }
    }

    pub fn draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            body: self.body.clone(),
        }
    }
}

/// Request body for create and update.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PostDraft {
    pub title: String,
    pub body: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Comment {
    pub id: u64,

    #[serde(rename = "postId")]
    pub post_id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_contract_deserialize() {
        let json = r#"{"userId": 1, "id": 7, "title": "t", "body": "b"}"#;
        let post: Post = serde_json::from_str(json).expect("post should parse");
        assert_eq!(post.id, 7);
        assert_eq!(post.user_id, Some(1));
        assert_eq!(post.title, "t");
    }

    #[test]
    fn test_comment_contract_deserialize() {
        let json = r#"{"postId": 3, "id": 11, "name": "n", "email": "e@x.io", "body": "hi"}"#;
        let c: Comment = serde_json::from_str(json).expect("comment should parse");
        assert_eq!(c.post_id, 3);
        assert_eq!(c.email, "e@x.io");
    }

    #[test]
    fn test_draft_serializes_only_title_and_body() {
        let v = serde_json::to_value(PostDraft {
            title: "a".to_string(),
            body: "b".to_string(),
        })
        .expect("should serialize");
        assert_eq!(v, serde_json::json!({"title": "a", "body": "b"}));
    }

    #[test]
    fn test_with_draft_keeps_identity() {
        let p = Post::new(4, "old", "old body");
        let next = p.with_draft(&PostDraft {
            title: "new".to_string(),
            body: "new body".to_string(),
        });
        assert_eq!(next.id, 4);
        assert_eq!(next.title, "new");
        assert_eq!(next.draft().body, "new body");
    }
}
