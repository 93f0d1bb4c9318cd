use crate::error::Result;
use crate::models::{AuditNote, Invoice, MailTemplate};
use async_trait::async_trait;
use chrono::NaiveDate;

/// 发票仓库 (账簿系统访问接口)
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// 按ID读取单张发票
    async fn get(&self, id: i64) -> Result<Option<Invoice>>;

    /// 按ID列表读取, 不存在的ID被忽略, 返回顺序与 ids 一致
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Invoice>>;

    /// 查询截至 today 的全部逾期且未通知发票
    async fn query_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>>;

    /// 标记已发送通知, 仅在此前未标记时生效; 返回是否本次完成了标记
    async fn mark_notice_sent(&self, id: i64) -> Result<bool>;
}

/// 发票审计日志
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append_note(&self, invoice_id: i64, note: &AuditNote) -> Result<()>;
}

/// 邮件模板仓库
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn find_template(&self, name: &str) -> Result<Option<MailTemplate>>;
}
