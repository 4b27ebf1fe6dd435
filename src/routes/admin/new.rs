use super::form::{InvalidPost, PostForm};
use super::ADMIN_INDEX;
use crate::blog::Post;
use crate::error::HttpError;
use crate::state::SharedState;
use crate::store::StoreError;
use crate::views::{AdminPostFormTemplate, FormErrors, FormMode, PostFormView};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;

pub(super) async fn get() -> Result<Html<String>, HttpError> {
    page(PostFormView::default(), FormErrors::default())
}

pub(super) async fn post(
    State(state): SharedState,
    Form(form): Form<PostForm>,
) -> Result<Response, HttpError> {
    let post = match form.validate() {
        Ok(it) => it,
        Err(invalid) => return rejected(invalid),
    };

    let new_post = Post::new(post.slug.clone(), post.title.clone(), post.markdown.clone());
    match state.store.create(&new_post).await {
        Ok(()) => (),
        Err(StoreError::AlreadyExists(_)) => return rejected(post.slug_taken()),
        Err(err) => return Err(err.into()),
    }
    tracing::info!(slug = %new_post.slug, "created post");

    Ok(Redirect::to(ADMIN_INDEX).into_response())
}

fn rejected(invalid: InvalidPost) -> Result<Response, HttpError> {
    let page = page(invalid.form, invalid.errors)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

fn page(form: PostFormView, errors: FormErrors) -> Result<Html<String>, HttpError> {
    let template = AdminPostFormTemplate::new(
        FormMode::New,
        format!("{ADMIN_INDEX}/new"),
        None,
        form,
        errors,
    );
    Ok(crate::views::render(&template)?)
}
