//! Defines routes for the file manager API.
//!
//! ## Structure
//! - **Object endpoints** (session-gated)
//!   - `GET    /objects` — list one page (supports prefix, cursor)
//!   - `DELETE /objects` — delete a key
//!   - `POST   /objects/folder` — create a folder marker
//!   - `GET    /objects/download` — redirect to a signed GET URL
//!   - `POST   /objects/upload` — issue a signed POST policy
//!
//! - **Health endpoint** (open)
//!   - `GET    /health/s3` — bucket connectivity probe

use crate::{
    auth::require_session,
    handlers::{
        health_handlers::s3_health,
        object_handlers::{
            create_folder, delete_object, download_grant, list_objects, upload_grant,
        },
    },
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Build the router. Object routes sit behind the session middleware;
/// the health probe stays outside it.
pub fn routes(state: AppState) -> Router {
    let objects = Router::new()
        .route("/objects", get(list_objects).delete(delete_object))
        .route("/objects/folder", post(create_folder))
        .route("/objects/download", get(download_grant))
        .route("/objects/upload", post(upload_grant))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health/s3", get(s3_health))
        .merge(objects)
        .with_state(state)
}
