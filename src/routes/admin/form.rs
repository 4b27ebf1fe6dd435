use crate::blog::Slug;
use crate::views::{FormErrors, PostFormView};
use serde::Deserialize;

pub(super) const TITLE_REQUIRED: &str = "Title is required";
pub(super) const SLUG_REQUIRED: &str = "Slug is required";
pub(super) const MARKDOWN_REQUIRED: &str = "Markdown is required";
pub(super) const SLUG_INVALID: &str = "Slug may only contain letters, numbers, '-' and '_'";
pub(super) const SLUG_RESERVED: &str = "This slug is reserved";
pub(super) const SLUG_TAKEN: &str = "A post with this slug already exists";

/// A submitted post form. Every field may be missing.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PostForm {
    title: Option<String>,
    slug: Option<String>,
    markdown: Option<String>,
    intent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Intent {
    Save,
    Delete,
}

#[derive(Debug)]
pub(super) struct ValidPost {
    pub title: String,
    pub slug: Slug,
    pub markdown: String,
}

#[derive(Debug)]
pub(super) struct InvalidPost {
    pub form: PostFormView,
    pub errors: FormErrors,
}

impl PostForm {
    pub fn intent(&self) -> Intent {
        match self.intent.as_deref() {
            Some("delete") => Intent::Delete,
            _ => Intent::Save,
        }
    }

    pub fn validate(self) -> Result<ValidPost, InvalidPost> {
        let title = self.title.unwrap_or_default();
        let slug = self.slug.unwrap_or_default();
        let markdown = self.markdown.unwrap_or_default();

        let errors = FormErrors {
            title: title.is_empty().then_some(TITLE_REQUIRED),
            slug: if slug.is_empty() {
                Some(SLUG_REQUIRED)
            } else if crate::blog::is_reserved_slug(&slug) {
                Some(SLUG_RESERVED)
            } else if !crate::blog::is_valid_slug(&slug) {
                Some(SLUG_INVALID)
            } else {
                None
            },
            markdown: markdown.is_empty().then_some(MARKDOWN_REQUIRED),
        };

        if errors.is_empty() {
            Ok(ValidPost {
                title,
                slug,
                markdown,
            })
        } else {
            Err(InvalidPost {
                form: PostFormView {
                    title,
                    slug,
                    markdown,
                },
                errors,
            })
        }
    }
}

impl ValidPost {
    /// Turns the post back into form values, flagging the slug as taken.
    pub fn slug_taken(self) -> InvalidPost {
        InvalidPost {
            form: PostFormView {
                title: self.title,
                slug: self.slug,
                markdown: self.markdown,
            },
            errors: FormErrors {
                slug: Some(SLUG_TAKEN),
                ..Default::default()
            },
        }
    }
}
