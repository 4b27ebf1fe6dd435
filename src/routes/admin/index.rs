use crate::error::HttpError;
use crate::state::SharedState;
use crate::views::{AdminIndexTemplate, PostLinkView};
use axum::extract::State;
use axum::response::Html;

pub(super) async fn get(State(state): SharedState) -> Result<Html<String>, HttpError> {
    let posts = state
        .store
        .list()
        .await?
        .into_iter()
        .map(PostLinkView::from)
        .collect();

    Ok(crate::views::render(&AdminIndexTemplate { posts })?)
}
