#![allow(dead_code)]

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use payment_notices::db::{AuditLog, InvoiceRepository, TemplateStore};
use payment_notices::error::{NoticeError, Result};
use payment_notices::mail::MailTransport;
use payment_notices::models::{
    AuditNote, Invoice, MailTemplate, MoveType, OutgoingMail, PaymentState, PostingState, Sender,
    DEFAULT_SUBJECT_PREFIX, DEFAULT_TEMPLATE_NAME,
};
use payment_notices::{MemoryStore, NoticeDispatcher};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 记录所有投递的邮件; 对 failing 中的收件人返回投递错误, 对 delays 中的收件人延迟投递
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub failing: Mutex<HashSet<String>>,
    pub delays: Mutex<HashMap<String, Duration>>,
}

impl RecordingTransport {
    pub fn fail_for(&self, email: &str) {
        self.failing.lock().unwrap().insert(email.to_string());
    }

    pub fn delay_for(&self, email: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(email.to_string(), delay);
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_for_invoice(&self, invoice_id: i64) -> usize {
        self.sent()
            .iter()
            .filter(|mail| mail.source.id == invoice_id)
            .count()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let delay = self.delays.lock().unwrap().get(&mail.email_to).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&mail.email_to) {
            return Err(NoticeError::Transport(format!(
                "SMTP 550 mailbox unavailable: {}",
                mail.email_to
            )));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// 包装 MemoryStore, 可按开关注入存储故障
pub struct FaultyStore {
    pub inner: Arc<MemoryStore>,
    pub fail_queries: AtomicBool,
    pub fail_templates: AtomicBool,
    pub fail_notes_for: Mutex<HashSet<i64>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_queries: AtomicBool::new(false),
            fail_templates: AtomicBool::new(false),
            fail_notes_for: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_notes_for(&self, invoice_id: i64) {
        self.fail_notes_for.lock().unwrap().insert(invoice_id);
    }

    fn check(flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(NoticeError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for FaultyStore {
    async fn get(&self, id: i64) -> Result<Option<Invoice>> {
        self.inner.get(id).await
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Invoice>> {
        Self::check(&self.fail_queries)?;
        self.inner.get_many(ids).await
    }

    async fn query_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>> {
        Self::check(&self.fail_queries)?;
        self.inner.query_overdue(today).await
    }

    async fn mark_notice_sent(&self, id: i64) -> Result<bool> {
        self.inner.mark_notice_sent(id).await
    }
}

#[async_trait]
impl AuditLog for FaultyStore {
    async fn append_note(&self, invoice_id: i64, note: &AuditNote) -> Result<()> {
        if self.fail_notes_for.lock().unwrap().contains(&invoice_id) {
            return Err(NoticeError::Database(sqlx::Error::PoolClosed));
        }
        self.inner.append_note(invoice_id, note).await
    }
}

#[async_trait]
impl TemplateStore for FaultyStore {
    async fn find_template(&self, name: &str) -> Result<Option<MailTemplate>> {
        Self::check(&self.fail_templates)?;
        self.inner.find_template(name).await
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub faults: Arc<FaultyStore>,
    pub transport: Arc<RecordingTransport>,
    pub dispatcher: Arc<NoticeDispatcher>,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2024, 3, 1)
}

/// 定时任务身份
pub fn system_sender() -> Sender {
    Sender {
        address: "ar@seller.test".to_string(),
        acting_user: "scheduler".to_string(),
    }
}

/// 操作员身份
pub fn operator() -> Sender {
    Sender {
        address: "alice@seller.test".to_string(),
        acting_user: "alice".to_string(),
    }
}

pub fn invoice(id: i64, email: Option<&str>) -> Invoice {
    Invoice {
        id,
        number: format!("INV/2024/{:04}", id),
        move_type: MoveType::OutInvoice,
        payment_state: PaymentState::NotPaid,
        state: PostingState::Posted,
        due_date: Some(date(2024, 1, 15)),
        amount_residual: BigDecimal::from_str("1234.5").unwrap(),
        currency: "USD".to_string(),
        partner_name: format!("Customer {}", id),
        partner_email: email.map(str::to_string),
        company_name: "Seller Ltd".to_string(),
        notice_sent: false,
    }
}

pub fn fixture() -> Fixture {
    fixture_with_template(true)
}

pub fn fixture_with_template(with_template: bool) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    if with_template {
        store.insert_template(MailTemplate {
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
        });
    }
    let faults = Arc::new(FaultyStore::new(store.clone()));
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = Arc::new(NoticeDispatcher::new(
        faults.clone(),
        faults.clone(),
        faults.clone(),
        transport.clone(),
    ));

    Fixture {
        store,
        faults,
        transport,
        dispatcher,
    }
}
