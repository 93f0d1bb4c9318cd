use super::repository::{AuditLog, InvoiceRepository, TemplateStore};
use crate::error::Result;
use crate::models::{AuditNote, Invoice, MailTemplate};
use crate::service::classifier;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

/// 内存实现 (本地运行与测试)
#[derive(Debug, Default)]
pub struct MemoryStore {
    invoices: DashMap<i64, Invoice>,
    notes: DashMap<i64, Vec<AuditNote>>,
    templates: DashMap<String, MailTemplate>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_invoice(&self, invoice: Invoice) {
        self.invoices.insert(invoice.id, invoice);
    }

    pub fn insert_template(&self, template: MailTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn invoice(&self, id: i64) -> Option<Invoice> {
        self.invoices.get(&id).map(|entry| entry.value().clone())
    }

    pub fn notes(&self, invoice_id: i64) -> Vec<AuditNote> {
        self.notes
            .get(&invoice_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn get(&self, id: i64) -> Result<Option<Invoice>> {
        Ok(self.invoice(id))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Invoice>> {
        Ok(ids.iter().filter_map(|id| self.invoice(*id)).collect())
    }

    async fn query_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>> {
        let mut overdue: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|entry| classifier::is_overdue(entry.value(), today))
            .map(|entry| entry.value().clone())
            .collect();
        overdue.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
        Ok(overdue)
    }

    async fn mark_notice_sent(&self, id: i64) -> Result<bool> {
        Ok(match self.invoices.get_mut(&id) {
            Some(mut entry) if !entry.notice_sent => {
                entry.notice_sent = true;
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn append_note(&self, invoice_id: i64, note: &AuditNote) -> Result<()> {
        self.notes.entry(invoice_id).or_default().push(note.clone());
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn find_template(&self, name: &str) -> Result<Option<MailTemplate>> {
        Ok(self.templates.get(name).map(|entry| entry.value().clone()))
    }
}
