use super::form::{Intent, InvalidPost, PostForm};
use super::ADMIN_INDEX;
use crate::blog::{Post, PostUpdate, Slug};
use crate::error::HttpError;
use crate::state::SharedState;
use crate::store::StoreError;
use crate::views::{AdminPostFormTemplate, FormErrors, FormMode, PostFormView};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;

pub(super) async fn get(
    State(state): SharedState,
    Path(slug): Path<Slug>,
) -> Result<Response, HttpError> {
    let Some(post) = state.store.get(&slug).await? else {
        return Err(HttpError::not_found(format!("Post not found: {slug}")));
    };

    let form = PostFormView::from(&post);
    Ok(page(&post, form, FormErrors::default()).await?.into_response())
}

pub(super) async fn post(
    State(state): SharedState,
    Path(old_slug): Path<Slug>,
    Form(form): Form<PostForm>,
) -> Result<Response, HttpError> {
    let Some(stored) = state.store.get(&old_slug).await? else {
        return Err(HttpError::not_found(format!("Post not found: {old_slug}")));
    };

    if form.intent() == Intent::Delete {
        state.store.delete(&old_slug).await?;
        tracing::info!(slug = %old_slug, "deleted post");
        return Ok(Redirect::to(ADMIN_INDEX).into_response());
    }

    let post = match form.validate() {
        Ok(it) => it,
        Err(invalid) => return rejected(&stored, invalid).await,
    };

    if post.slug != old_slug {
        // create the new slug before dropping the old one so a failed
        // rename never loses the post
        let renamed = Post::new(post.slug.clone(), post.title.clone(), post.markdown.clone());
        match state.store.create(&renamed).await {
            Ok(()) => (),
            Err(StoreError::AlreadyExists(_)) => {
                return rejected(&stored, post.slug_taken()).await;
            }
            Err(err) => return Err(err.into()),
        }
        state.store.delete(&old_slug).await?;
        tracing::info!(from = %old_slug, to = %post.slug, "renamed post");
    }

    state
        .store
        .update(
            &post.slug,
            PostUpdate {
                title: post.title,
                markdown: post.markdown,
            },
        )
        .await?;
    tracing::info!(slug = %post.slug, "updated post");

    Ok(Redirect::to(ADMIN_INDEX).into_response())
}

async fn rejected(stored: &Post, invalid: InvalidPost) -> Result<Response, HttpError> {
    let page = page(stored, invalid.form, invalid.errors).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

// the preview always shows the stored markdown, the form whatever was submitted
async fn page(
    stored: &Post,
    form: PostFormView,
    errors: FormErrors,
) -> Result<axum::response::Html<String>, HttpError> {
    let preview_html = crate::markdown::render_async(stored.markdown.clone()).await?;

    let template = AdminPostFormTemplate::new(
        FormMode::Edit,
        format!("{ADMIN_INDEX}/{}", stored.slug),
        Some(preview_html),
        form,
        errors,
    );
    Ok(crate::views::render(&template)?)
}
