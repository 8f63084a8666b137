use axum::{Router, routing::post};

use crate::App;

use super::expand::expand_comment;

pub fn route() -> Router<App> {
    Router::<App>::new().route("/service/expand_comment", post(expand_comment))
}
