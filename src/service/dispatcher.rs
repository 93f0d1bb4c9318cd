use super::{classifier, render};
use crate::db::{AuditLog, InvoiceRepository, TemplateStore};
use crate::error::{NoticeError, Result};
use crate::mail::MailTransport;
use crate::models::{
    AuditNote, BulkOutcome, Invoice, MailTemplate, OutgoingMail, Sender, SourceRef,
    DEFAULT_TEMPLATE_NAME,
};
use chrono::NaiveDate;
use dashmap::DashSet;
use indexmap::IndexSet;
use std::sync::Arc;

/// 逾期通知发送服务 (批量路径 + 人工路径)
///
/// 发件人和操作人不保存在服务内, 由每次调用显式传入。
pub struct NoticeDispatcher {
    pub(super) invoices: Arc<dyn InvoiceRepository>,
    pub(super) audit: Arc<dyn AuditLog>,
    pub(super) templates: Arc<dyn TemplateStore>,
    pub(super) transport: Arc<dyn MailTransport>,
    template_name: String,
    // 正在发送中的发票, 防止并发触发重复发送
    in_flight: DashSet<i64>,
}

/// 发票发送占用, 离开作用域时释放
pub(super) struct Claim<'a> {
    set: &'a DashSet<i64>,
    invoice_id: i64,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.invoice_id);
    }
}

impl NoticeDispatcher {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        audit: Arc<dyn AuditLog>,
        templates: Arc<dyn TemplateStore>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            invoices,
            audit,
            templates,
            transport,
            template_name: DEFAULT_TEMPLATE_NAME.to_string(),
            in_flight: DashSet::new(),
        }
    }

    /// 使用指定模板名替代默认模板
    pub fn with_template(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = template_name.into();
        self
    }

    /// 当前逾期发票列表 (报表用)
    pub async fn overdue_invoices(&self, today: NaiveDate) -> Result<Vec<Invoice>> {
        let candidates = self.invoices.query_overdue(today).await?;
        Ok(classifier::select_overdue(candidates, today))
    }

    /// 批量发送逾期提醒
    ///
    /// `candidate_ids` 为空或 None 时扫描全部发票。单张发票失败只计数, 不中断批次;
    /// 外层错误统一转换为 Error 结果。
    pub async fn send_bulk(
        &self,
        candidate_ids: Option<&[i64]>,
        today: NaiveDate,
        sender: &Sender,
    ) -> BulkOutcome {
        match self.try_send_bulk(candidate_ids, today, sender).await {
            Ok(outcome) => {
                tracing::info!(
                    sent = outcome.sent,
                    failed = outcome.failed,
                    acting_user = %sender.acting_user,
                    "overdue notice run finished: {}",
                    outcome.message
                );
                outcome
            }
            Err(e) => {
                tracing::error!("overdue notice run failed: {}", e);
                BulkOutcome::error(format!("System error: {}", e))
            }
        }
    }

    async fn try_send_bulk(
        &self,
        candidate_ids: Option<&[i64]>,
        today: NaiveDate,
        sender: &Sender,
    ) -> Result<BulkOutcome> {
        let selection = candidate_ids.filter(|ids| !ids.is_empty());

        let overdue = match selection {
            Some(ids) => {
                // 去重且保持选择顺序
                let unique: IndexSet<i64> = ids.iter().copied().collect();
                let ids: Vec<i64> = unique.into_iter().collect();
                let selected = self.invoices.get_many(&ids).await?;
                classifier::select_overdue(selected, today)
            }
            None => {
                let candidates = self.invoices.query_overdue(today).await?;
                classifier::select_overdue(candidates, today)
            }
        };

        if overdue.is_empty() {
            let message = if selection.is_some() {
                "No overdue invoices found in selected records"
            } else {
                "No overdue invoices found"
            };
            return Ok(BulkOutcome::info(message));
        }

        let Some(template) = self.templates.find_template(&self.template_name).await? else {
            tracing::error!("Email template {} not found, no notices sent", self.template_name);
            return Ok(BulkOutcome::error(format!(
                "Email template {} not found",
                self.template_name
            )));
        };

        let total = overdue.len();
        let mut sent = 0;
        let mut failed = 0;
        tracing::info!("处理逾期发票: {} 张", total);

        for (idx, invoice) in overdue.iter().enumerate() {
            match self.send_reminder(invoice, &template, sender).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::warn!("Invoice {} ({}) notice not sent: {}", invoice.id, invoice.number, e);
                    failed += 1;
                }
            }

            let current_idx = idx + 1;
            if current_idx % 100 == 0 || current_idx == 1 {
                tracing::info!("发送进度: {}/{}, 成功: {}, 失败: {}", current_idx, total, sent, failed);
            }
        }

        Ok(BulkOutcome::from_counts(sent, failed))
    }

    async fn send_reminder(
        &self,
        invoice: &Invoice,
        template: &MailTemplate,
        sender: &Sender,
    ) -> Result<()> {
        let email_to = invoice
            .recipient()
            .ok_or_else(|| NoticeError::MissingRecipient(invoice.number.clone()))?;

        let _claim = self.claim(invoice.id)?;

        // 批次开始时读取的是快照, 占用后重新读取, 其他运行可能已发送
        let current = self
            .invoices
            .get(invoice.id)
            .await?
            .ok_or(NoticeError::InvoiceNotFound(invoice.id))?;
        if current.notice_sent {
            return Err(NoticeError::AlreadyNotified(invoice.id));
        }

        let mail = OutgoingMail {
            subject: template.subject_for(&current.number),
            body_html: render::bulk_body(&render::NoticeContext::from_invoice(&current)),
            email_to: email_to.to_string(),
            email_from: sender.address.clone(),
            source: SourceRef::invoice(current.id),
        };

        self.deliver(&mail, sender).await
    }

    /// 投递 -> 标记已通知 -> 写审计记录 (调用方须已持有占用)
    pub(super) async fn deliver(&self, mail: &OutgoingMail, sender: &Sender) -> Result<()> {
        let invoice_id = mail.source.id;

        tracing::debug!("sending '{}' to {}", mail.subject, mail.email_to);
        self.transport.send(mail).await?;

        if !self.invoices.mark_notice_sent(invoice_id).await? {
            tracing::warn!("Invoice {} was already marked as notified", invoice_id);
        }

        let note = AuditNote::notice_sent(&mail.email_to, &sender.acting_user);
        self.audit.append_note(invoice_id, &note).await
    }

    pub(super) fn claim(&self, invoice_id: i64) -> Result<Claim<'_>> {
        if !self.in_flight.insert(invoice_id) {
            return Err(NoticeError::AlreadyInFlight(invoice_id));
        }
        Ok(Claim {
            set: &self.in_flight,
            invoice_id,
        })
    }
}
