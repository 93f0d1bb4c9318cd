use super::MailTransport;
use crate::db::queries;
use crate::error::{NoticeError, Result};
use crate::models::OutgoingMail;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;

/// 发件箱投递: 写入 mail_outbox 表, 由投递进程发送
#[derive(Clone)]
pub struct OutboxTransport {
    pool: PgPool,
    timeout: Duration,
}

impl OutboxTransport {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait]
impl MailTransport for OutboxTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        // 添加超时控制
        match tokio::time::timeout(self.timeout, queries::insert_outbox_mail(&self.pool, mail)).await {
            Ok(Ok(id)) => {
                tracing::info!("✓ mail {} queued for {}", id, mail.email_to);
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!("✗ failed to queue mail for {}: {}", mail.email_to, e);
                Err(NoticeError::Transport(e.to_string()))
            }
            Err(_) => {
                tracing::error!("✗ outbox insert timed out (>{:?})", self.timeout);
                Err(NoticeError::Transport(format!(
                    "timed out after {:?} queueing mail for {}",
                    self.timeout, mail.email_to
                )))
            }
        }
    }
}
