use crate::store::PostStore;
use std::sync::Arc;

pub type SharedState = axum::extract::State<Arc<State>>;
pub type NestedRouter = axum::Router<Arc<State>>;

#[derive(Debug)]
pub struct State {
    pub store: PostStore,
}

impl State {
    pub fn new(store: PostStore) -> State {
        State { store }
    }
}
