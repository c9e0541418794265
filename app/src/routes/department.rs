use axum::{Router, routing::get};

use infra::{
    AppState,
    http::handler::department::{by_id, create, list, list_with_employees},
};

pub fn create_department_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/departments", get(list).post(create))
        .route("/departments/with-employees", get(list_with_employees))
        .route("/departments/{id}", get(by_id))
        .with_state(app_state)
}
