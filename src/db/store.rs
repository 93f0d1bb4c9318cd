use super::queries;
use super::repository::{AuditLog, InvoiceRepository, TemplateStore};
use crate::error::Result;
use crate::models::{AuditNote, Invoice, MailTemplate};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;

/// PostgreSQL 实现的发票仓库 / 审计日志 / 模板仓库
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepository for PgStore {
    async fn get(&self, id: i64) -> Result<Option<Invoice>> {
        queries::get_invoice(&self.pool, id).await
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Invoice>> {
        let mut found: HashMap<i64, Invoice> = HashMap::new();
        // 分块查询, 避免超长参数数组
        for chunk in ids.chunks(1000) {
            for invoice in queries::list_invoices_by_ids(&self.pool, chunk).await? {
                found.insert(invoice.id, invoice);
            }
        }

        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    async fn query_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>> {
        queries::list_overdue_invoices(&self.pool, today).await
    }

    async fn mark_notice_sent(&self, id: i64) -> Result<bool> {
        queries::mark_notice_sent(&self.pool, id).await
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn append_note(&self, invoice_id: i64, note: &AuditNote) -> Result<()> {
        queries::insert_note(&self.pool, invoice_id, note).await
    }
}

#[async_trait]
impl TemplateStore for PgStore {
    async fn find_template(&self, name: &str) -> Result<Option<MailTemplate>> {
        queries::get_template(&self.pool, name).await
    }
}
