use crate::error::{NoticeError, Result};
use crate::models::{AuditNote, Invoice, InvoiceRow, MailTemplate, OutgoingMail};
use chrono::NaiveDate;
use sqlx::PgPool;
use std::io::Write;

const INVOICE_COLUMNS: &str = r#"
        id, number, move_type, payment_state, state, due_date,
        amount_residual, currency, partner_name, partner_email,
        company_name, notice_sent
"#;

fn into_invoices(rows: Vec<InvoiceRow>) -> Result<Vec<Invoice>> {
    rows.into_iter().map(Invoice::try_from).collect()
}

/// 查询单张发票
pub async fn get_invoice(pool: &PgPool, invoice_id: i64) -> Result<Option<Invoice>> {
    let sql = format!("SELECT {} FROM invoices WHERE id = $1", INVOICE_COLUMNS);
    let row = sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(invoice_id)
        .fetch_optional(pool)
        .await?;

    row.map(Invoice::try_from).transpose()
}

/// 按ID列表批量查询发票 (无序)
pub async fn list_invoices_by_ids(pool: &PgPool, invoice_ids: &[i64]) -> Result<Vec<Invoice>> {
    let sql = format!("SELECT {} FROM invoices WHERE id = ANY($1)", INVOICE_COLUMNS);
    let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(invoice_ids)
        .fetch_all(pool)
        .await?;

    into_invoices(rows)
}

/// 查询逾期未通知的客户发票 (按到期日升序)
pub async fn list_overdue_invoices(pool: &PgPool, today: NaiveDate) -> Result<Vec<Invoice>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM invoices
        WHERE move_type = 'out_invoice'
          AND payment_state <> 'paid'
          AND state = 'posted'
          AND due_date < $1
          AND notice_sent = FALSE
        ORDER BY due_date, id
        "#,
        INVOICE_COLUMNS
    );
    let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(today)
        .fetch_all(pool)
        .await?;

    into_invoices(rows)
}

/// 标记已发送通知 (条件更新, 并发触发时只有一方成功)
pub async fn mark_notice_sent(pool: &PgPool, invoice_id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE invoices
        SET notice_sent = TRUE
        WHERE id = $1
          AND notice_sent = FALSE
        "#,
    )
    .bind(invoice_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// 追加发票审计记录
pub async fn insert_note(pool: &PgPool, invoice_id: i64, note: &AuditNote) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO invoice_notes (invoice_id, subject, body, author, created_at)
        VALUES ($1, $2, $3, $4, now())
        "#,
    )
    .bind(invoice_id)
    .bind(&note.subject)
    .bind(&note.body)
    .bind(&note.author)
    .execute(pool)
    .await?;

    Ok(())
}

/// 查询邮件模板
pub async fn get_template(pool: &PgPool, name: &str) -> Result<Option<MailTemplate>> {
    let row = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT name, subject_prefix
        FROM mail_templates
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(name, subject_prefix)| MailTemplate { name, subject_prefix }))
}

/// 写入发件箱, 由投递进程异步发送
pub async fn insert_outbox_mail(pool: &PgPool, mail: &OutgoingMail) -> Result<i64> {
    let start_time = std::time::Instant::now();

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO mail_outbox (
            subject, body_html, email_to, email_from,
            res_model, res_id, state, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'outgoing', now())
        RETURNING id
        "#,
    )
    .bind(&mail.subject)
    .bind(&mail.body_html)
    .bind(&mail.email_to)
    .bind(&mail.email_from)
    .bind(&mail.source.model)
    .bind(mail.source.id)
    .fetch_one(pool)
    .await?;

    tracing::debug!("outbox mail {} queued, 耗时: {:?}", id, start_time.elapsed());
    Ok(id)
}

/// 导出逾期发票报表到 CSV
pub fn export_to_csv<W: Write>(invoices: &[Invoice], today: NaiveDate, output: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "id",
        "number",
        "partner",
        "email",
        "due_date",
        "days_overdue",
        "amount_residual",
        "currency",
    ])?;

    for invoice in invoices {
        let days_overdue = invoice
            .due_date
            .map(|due| (today - due).num_days().to_string())
            .unwrap_or_default();

        writer.write_record(&[
            invoice.id.to_string(),
            invoice.number.clone(),
            invoice.partner_name.clone(),
            invoice.partner_email.clone().unwrap_or_default(),
            invoice.due_date.map(|d| d.to_string()).unwrap_or_default(),
            days_overdue,
            invoice.amount_residual.to_string(),
            invoice.currency.clone(),
        ])?;
    }

    writer.flush().map_err(|e| NoticeError::Csv(e.into()))?;
    Ok(())
}
