use axum::{Router, routing::get};

use crate::App;

use super::view::{submit, view};

pub fn route() -> Router<App> {
    Router::<App>::new().route("/view.php", get(view).post(submit))
}
