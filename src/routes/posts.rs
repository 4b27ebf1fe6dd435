use crate::blog::Slug;
use crate::error::HttpError;
use crate::state::{NestedRouter, SharedState};
use crate::views::{PostLinkView, PostListTemplate, PostTemplate};
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;

pub fn route() -> NestedRouter {
    axum::Router::new()
        .route("/posts", get(list))
        .route("/posts/:slug", get(show))
}

async fn list(State(state): SharedState) -> Result<Html<String>, HttpError> {
    let posts = state
        .store
        .list()
        .await?
        .into_iter()
        .map(PostLinkView::from)
        .collect();

    Ok(crate::views::render(&PostListTemplate { posts })?)
}

async fn show(
    State(state): SharedState,
    Path(slug): Path<Slug>,
) -> Result<Html<String>, HttpError> {
    let Some(post) = state.store.get(&slug).await? else {
        return Err(HttpError::not_found(format!("Post not found: {slug}")));
    };

    let html = crate::markdown::render_async(post.markdown).await?;
    Ok(crate::views::render(&PostTemplate {
        title: post.title,
        html,
    })?)
}
