pub mod outbox;

pub use outbox::OutboxTransport;

use crate::error::Result;
use crate::models::OutgoingMail;
use async_trait::async_trait;

/// 邮件投递接口
///
/// 一次调用即一次阻塞投递, 返回成功或失败。
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// 仅记录日志的投递实现 (本地调试)
#[derive(Debug, Default, Clone)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        tracing::info!(
            to = %mail.email_to,
            from = %mail.email_from,
            source = %format!("{}:{}", mail.source.model, mail.source.id),
            "mail '{}' delivered to log transport",
            mail.subject
        );
        tracing::debug!("body: {}", mail.body_html);
        Ok(())
    }
}
