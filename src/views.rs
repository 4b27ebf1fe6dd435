use crate::blog::Post;
use askama::Template;
use axum::response::Html;

#[derive(Debug, Clone)]
pub struct PostLinkView {
    pub slug: String,
    pub title: String,
}

impl From<Post> for PostLinkView {
    fn from(post: Post) -> Self {
        PostLinkView {
            slug: post.slug,
            title: post.title,
        }
    }
}

/// Values shown in the post form's inputs.
#[derive(Debug, Clone, Default)]
pub struct PostFormView {
    pub title: String,
    pub slug: String,
    pub markdown: String,
}

impl From<&Post> for PostFormView {
    fn from(post: &Post) -> Self {
        PostFormView {
            title: post.title.clone(),
            slug: post.slug.clone(),
            markdown: post.markdown.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub title: Option<&'static str>,
    pub slug: Option<&'static str>,
    pub markdown: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.slug.is_none() && self.markdown.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FormMode {
    Edit,
    New,
}

#[derive(Template)]
#[template(path = "admin/edit.html")]
pub struct AdminPostFormTemplate {
    pub page_title: String,
    pub action: String,
    pub preview_html: Option<String>,
    pub form: PostFormView,
    pub errors: FormErrors,
    pub intent: &'static str,
    pub submit_label: &'static str,
    pub show_delete: bool,
}

impl AdminPostFormTemplate {
    pub fn new(
        mode: FormMode,
        action: String,
        preview_html: Option<String>,
        form: PostFormView,
        errors: FormErrors,
    ) -> Self {
        let (page_title, intent, submit_label, show_delete) = match mode {
            FormMode::Edit => (format!("Edit {}", form.title), "update", "Update Post", true),
            FormMode::New => (String::from("New Post"), "create", "Create Post", false),
        };

        AdminPostFormTemplate {
            page_title,
            action,
            preview_html,
            form,
            errors,
            intent,
            submit_label,
            show_delete,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
    pub posts: Vec<PostLinkView>,
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct PostListTemplate {
    pub posts: Vec<PostLinkView>,
}

#[derive(Template)]
#[template(path = "posts/post.html")]
pub struct PostTemplate {
    pub title: String,
    pub html: String,
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, askama::Error> {
    template.render().map(Html)
}
