use crate::models::{Post, PostDraft};
use serde::{Deserialize, Serialize};

pub(crate) const TITLE_REQUIRED: &str = "Title is required.";
pub(crate) const BODY_REQUIRED: &str = "Body is required.";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ValidationErrors {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = [self.title.as_deref(), self.body.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// What a successful submit asks the list to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EditorIntent {
    Create(PostDraft),
    /// The bound post with the edited fields merged in.
    Update(Post),
}

/// Create-or-edit form state. Bound to at most one post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PostEditor {
    pub title: String,
    pub body: String,
    pub errors: ValidationErrors,
    pub editing: Option<Post>,
}

impl PostEditor {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<u64> {
        self.editing.as_ref().map(|p| p.id)
    }

    pub fn open_new(&mut self) {
        *self = Self::default();
    }

    pub fn open_edit(&mut self, post: &Post) {
        *self = Self {
            title: post.title.clone(),
            body: post.body.clone(),
            errors: ValidationErrors::default(),
            editing: Some(post.clone()),
        };
    }

    pub fn validate(&self) -> ValidationErrors {
        ValidationErrors {
            title: self
                .title
                .trim()
                .is_empty()
                .then(|| TITLE_REQUIRED.to_string()),
            body: self
                .body
                .trim()
                .is_empty()
                .then(|| BODY_REQUIRED.to_string()),
        }
    }

    pub fn submit(&mut self) -> Result<EditorIntent, ValidationErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(errors);
        }
        self.errors = ValidationErrors::default();

        let draft = PostDraft {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
        };
        Ok(match &self.editing {
            Some(post) => EditorIntent::Update(post.with_draft(&draft)),
            None => EditorIntent::Create(draft),
        })
    }

    /// Empties the fields. Stays bound to the same post.
    pub fn clear(&mut self) {
        self.title.clear();
        self.body.clear();
        self.errors = ValidationErrors::default();
    }

    /// Unbinds and clears. Returns `true` so the caller hides the form.
    pub fn cancel(&mut self) -> bool {
        *self = Self::default();
        true
    }

    /// Drops the binding if it points at `id`, which no longer exists remotely.
    /// Returns `true` when the form was reset.
    pub fn release(&mut self, id: u64) -> bool {
        self.editing_id() == Some(id) && self.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_title_reports_required() {
        let mut ed = PostEditor {
            body: "body".to_string(),
            ..Default::default()
        };
        let errors = ed.submit().expect_err("empty title must fail");
        assert_eq!(errors.title.as_deref(), Some("Title is required."));
        assert!(errors.body.is_none());
        assert_eq!(ed.errors, errors);
    }

    #[test]
    fn test_whitespace_only_fields_are_empty() {
        let mut ed = PostEditor {
            title: "  ".to_string(),
            body: "\n\t".to_string(),
            ..Default::default()
        };
        let errors = ed.submit().expect_err("blank fields must fail");
        assert_eq!(errors.title.as_deref(), Some(TITLE_REQUIRED));
        assert_eq!(errors.body.as_deref(), Some(BODY_REQUIRED));
        assert_eq!(errors.to_string(), "Title is required. Body is required.");
    }

    #[test]
    fn test_submit_new_emits_create() {
        let mut ed = PostEditor::default();
        ed.title = " Hello ".to_string();
        ed.body = "World".to_string();
        assert_eq!(
            ed.submit(),
            Ok(EditorIntent::Create(PostDraft {
                title: "Hello".to_string(),
                body: "World".to_string(),
            }))
        );
    }

    #[test]
    fn test_submit_bound_emits_merged_update() {
        let original = Post {
            id: 5,
            user_id: Some(2),
            title: "old".to_string(),
            body: "old".to_string(),
        };
        let mut ed = PostEditor::default();
        ed.open_edit(&original);
        assert_eq!(ed.editing_id(), Some(5));
        ed.title = "new".to_string();

        match ed.submit() {
            Ok(EditorIntent::Update(p)) => {
                assert_eq!(p.id, 5);
                assert_eq!(p.user_id, Some(2));
                assert_eq!(p.title, "new");
                assert_eq!(p.body, "old");
            }
            other => panic!("expected update intent, got {other:?}"),
        }
    }

    #[test]
    fn test_switching_post_clears_errors() {
        let mut ed = PostEditor::default();
        let _ = ed.submit();
        assert!(!ed.errors.is_empty());

        ed.open_edit(&Post::new(1, "t", "b"));
        assert!(ed.errors.is_empty());

        ed.title.clear();
        assert!(ed.submit().is_err());
        assert!(ed.cancel());
        assert_eq!(ed, PostEditor::default());
    }

    #[test]
    fn test_clear_keeps_binding() {
        let mut ed = PostEditor::default();
        ed.open_edit(&Post::new(1, "t", "b"));
        ed.clear();
        assert!(ed.title.is_empty() && ed.body.is_empty());
        assert_eq!(ed.editing_id(), Some(1));
    }

    #[test]
    fn test_release_only_unbinds_matching_post() {
        let mut ed = PostEditor::default();
        ed.open_edit(&Post::new(3, "t", "b"));

        assert!(!ed.release(4));
        assert_eq!(ed.editing_id(), Some(3));

        assert!(ed.release(3));
        assert_eq!(ed, PostEditor::default());

        // A create form has no binding to drop.
        assert!(!ed.release(3));
    }
}
