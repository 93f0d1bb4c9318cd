use crate::db::queries;
use crate::error::NoticeError;
use crate::models::{BulkStatus, Invoice, Notification, PendingNotice, Sender};
use crate::service::NoticeDispatcher;
use axum::{
    extract::{Json, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 发起操作的用户名 (由前置认证代理写入)
pub const ACTING_USER_HEADER: &str = "x-acting-user";
/// 发起操作的用户邮箱
pub const ACTING_EMAIL_HEADER: &str = "x-acting-user-email";

/// 共享状态: 发送服务 + 发件人策略
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<NoticeDispatcher>,
    pub company_email: Option<String>,
    /// 请求未携带操作人时使用 (与定时任务相同)
    pub default_sender: Sender,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<NoticeDispatcher>,
        company_email: Option<String>,
        default_sender: Sender,
    ) -> Self {
        Self {
            dispatcher,
            company_email,
            default_sender,
        }
    }

    /// 由请求头确定操作人; 发件地址仍按公司邮箱优先
    fn acting_sender(&self, headers: &HeaderMap) -> Sender {
        let Some(user) = header_value(headers, ACTING_USER_HEADER) else {
            return self.default_sender.clone();
        };

        Sender::resolve(
            self.company_email.as_deref(),
            header_value(headers, ACTING_EMAIL_HEADER),
            user,
        )
        .unwrap_or_else(|| Sender {
            address: self.default_sender.address.clone(),
            acting_user: user.to_string(),
        })
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// 请求体: 可选的发票ID列表 (缺省时扫描全部发票)
#[derive(Debug, Default, Deserialize)]
pub struct BulkNoticeRequest {
    #[serde(default)]
    pub invoice_ids: Option<Vec<i64>>,
}

/// 批量发送响应体
#[derive(Debug, Serialize)]
pub struct BulkNoticeResponse {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub notification: Notification,
}

/// 请求体: 操作员编辑后的通知
#[derive(Debug, Deserialize)]
pub struct SendNoticeRequest {
    pub email_to: String,
    pub message_body: Option<String>,
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for NoticeError {
    fn into_response(self) -> Response {
        let status = match &self {
            NoticeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            NoticeError::InvoiceNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let response = ErrorResponse {
            success: false,
            message: self.to_string(),
        };
        (status, Json(response)).into_response()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 批量发送逾期提醒 (指定发票或全部)
pub async fn send_overdue_notices(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BulkNoticeRequest>,
) -> Response {
    let sender = state.acting_sender(&headers);
    let outcome = state
        .dispatcher
        .send_bulk(req.invoice_ids.as_deref(), today(), &sender)
        .await;

    let status = if outcome.status == BulkStatus::Error {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    let response = BulkNoticeResponse {
        success: outcome.status != BulkStatus::Error,
        sent: outcome.sent,
        failed: outcome.failed,
        notification: outcome.notification(),
    };
    (status, Json(response)).into_response()
}

/// 打开人工发送表单 (预填收件人和正文)
pub async fn open_notice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
) -> Result<Json<PendingNotice>, NoticeError> {
    Ok(Json(state.dispatcher.open_notice(invoice_id).await?))
}

/// 发送人工编辑的通知
pub async fn send_notice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<SendNoticeRequest>,
) -> Result<Json<Notification>, NoticeError> {
    let sender = state.acting_sender(&headers);
    let mut pending = state.dispatcher.open_notice(invoice_id).await?;
    pending.email_to = req.email_to;
    if let Some(body) = req.message_body {
        pending.message_body = body;
    }

    Ok(Json(state.dispatcher.send_notice(pending, &sender).await?))
}

/// 当前逾期发票列表
pub async fn list_overdue(
    State(state): State<AppState>,
) -> Result<Json<Vec<Invoice>>, NoticeError> {
    Ok(Json(state.dispatcher.overdue_invoices(today()).await?))
}

/// 逾期发票 CSV 报表
pub async fn export_overdue_csv(
    State(state): State<AppState>,
) -> Result<Response, NoticeError> {
    let today = today();
    let invoices = state.dispatcher.overdue_invoices(today).await?;

    let mut buf = Vec::new();
    queries::export_to_csv(&invoices, today, &mut buf)?;

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], buf).into_response())
}
