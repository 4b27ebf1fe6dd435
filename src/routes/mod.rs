use crate::state::NestedRouter;

pub mod admin;
pub mod posts;

pub fn route() -> NestedRouter {
    axum::Router::new()
        .nest("/posts/admin", admin::route())
        .merge(posts::route())
}
