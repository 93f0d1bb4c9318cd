pub mod handlers;

pub use handlers::*;

use axum::{
    routing::{get, post},
    Router,
};

/// 构建路由
pub fn router(state: AppState) -> Router {
    let notice_routes = Router::new()
        .route("/api/notices/overdue", post(send_overdue_notices))
        .route("/api/invoices/overdue", get(list_overdue))
        .route("/api/invoices/overdue.csv", get(export_overdue_csv))
        .route("/api/invoices/:id/notice", get(open_notice).post(send_notice))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(notice_routes)
}
