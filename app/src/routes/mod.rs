pub mod department;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use infra::{AppState, http::handler::health_check};

use crate::routes::department::create_department_routes;

/// ルーターを作成する。
///
/// # 引数
///
/// * `app_state`: アプリケーションの状態
pub fn create_router(app_state: AppState) -> Router {
    axum::Router::new()
        .route("/health-check", get(health_check))
        .merge(create_department_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
