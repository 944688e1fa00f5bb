use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/attendance/:ledger", get(handlers::list_attendance))
        .route(
            "/api/attendance/:ledger/:date",
            get(handlers::get_attendance_day).put(handlers::save_attendance_day),
        )
        .route("/api/analytics/:roster", get(handlers::get_analytics))
        .route("/api/noshow/:ledger", get(handlers::get_no_show))
        .route("/api/export/:report", get(handlers::export_csv))
        .route("/api/schedule/:date", get(handlers::get_schedule))
        .route("/api/cabins", get(handlers::get_cabins))
        .route(
            "/api/doctors",
            get(handlers::list_doctors).post(handlers::create_doctor),
        )
        .route("/api/doctors/:id", put(handlers::update_doctor))
        .route("/api/doctors/:id/active", put(handlers::set_doctor_active))
        .route(
            "/api/staff",
            get(handlers::list_staff).post(handlers::create_staff),
        )
        .route(
            "/api/staff/:id",
            put(handlers::update_staff).delete(handlers::delete_staff),
        )
        .route(
            "/api/holidays",
            get(handlers::list_holidays).post(handlers::create_holiday),
        )
        .route("/api/holidays/:date", delete(handlers::delete_holiday))
        .with_state(state)
}
