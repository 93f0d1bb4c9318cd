use super::dispatcher::NoticeDispatcher;
use super::render::{self, NoticeContext};
use crate::error::{NoticeError, Result};
use crate::models::{
    Invoice, Notification, OutgoingMail, PendingNotice, Sender, Severity, SourceRef,
    DEFAULT_SUBJECT_PREFIX,
};

/// 由发票预填人工发送表单: 收件人取客户邮箱 (可为空), 正文为长版默认文案
pub fn prepare_notice(invoice: &Invoice) -> PendingNotice {
    PendingNotice {
        invoice_id: invoice.id,
        invoice_number: invoice.number.clone(),
        email_to: invoice.recipient().unwrap_or_default().to_string(),
        message_body: render::manual_body(&NoticeContext::from_invoice(invoice)),
    }
}

impl NoticeDispatcher {
    /// 打开单张发票的人工发送表单
    pub async fn open_notice(&self, invoice_id: i64) -> Result<PendingNotice> {
        let invoice = self
            .invoices
            .get(invoice_id)
            .await?
            .ok_or(NoticeError::InvoiceNotFound(invoice_id))?;

        Ok(prepare_notice(&invoice))
    }

    /// 发送操作员编辑后的通知
    ///
    /// 收件人为空时在任何投递之前返回校验错误; 投递失败包装为校验错误返回。
    /// `sender` 为发起操作的用户, 审计记录以其名义写入。
    pub async fn send_notice(&self, pending: PendingNotice, sender: &Sender) -> Result<Notification> {
        let email_to = pending.email_to.trim();
        if email_to.is_empty() {
            return Err(NoticeError::Validation("Email address is required".to_string()));
        }

        let mail = OutgoingMail {
            subject: format!("{} {}", DEFAULT_SUBJECT_PREFIX, pending.invoice_number),
            body_html: pending.message_body.clone(),
            email_to: email_to.to_string(),
            email_from: sender.address.clone(),
            source: SourceRef::invoice(pending.invoice_id),
        };

        let delivered = match self.claim(pending.invoice_id) {
            Ok(_claim) => self.deliver(&mail, sender).await,
            Err(e) => Err(e),
        };

        if let Err(e) = delivered {
            tracing::warn!("Manual notice for invoice {} failed: {}", pending.invoice_id, e);
            return Err(NoticeError::Validation(format!("Failed to send email: {}", e)));
        }

        tracing::info!("Manual notice for invoice {} sent to {}", pending.invoice_id, email_to);
        Ok(Notification::new(
            "Success",
            format!("Late payment notice sent successfully to {}", email_to),
            Severity::Success,
        ))
    }
}
