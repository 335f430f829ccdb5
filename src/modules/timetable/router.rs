use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    activate_entry, archive_entry, cancel_entry, check_conflicts, create_entry, delete_entry,
    generate_timetable, get_available_slots, get_entries, get_entry, get_statistics,
    publish_entry, refresh_conflicts, resolve_conflict, update_entry,
};

pub fn init_timetable_router() -> Router<AppState> {
    Router::new()
        .route("/entries", post(create_entry).get(get_entries))
        .route(
            "/entries/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/entries/{id}/publish", post(publish_entry))
        .route("/entries/{id}/activate", post(activate_entry))
        .route("/entries/{id}/archive", post(archive_entry))
        .route("/entries/{id}/cancel", post(cancel_entry))
        .route("/entries/{id}/conflicts/refresh", post(refresh_conflicts))
        .route(
            "/entries/{id}/conflicts/{index}/resolve",
            post(resolve_conflict),
        )
        .route("/conflicts/check", post(check_conflicts))
        .route("/generate", post(generate_timetable))
        .route("/available-slots", get(get_available_slots))
        .route("/statistics", get(get_statistics))
}
