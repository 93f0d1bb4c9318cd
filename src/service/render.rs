use crate::models::Invoice;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

/// 邮件正文所需数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeContext {
    pub customer_name: String,
    pub invoice_number: String,
    pub due_date: String,
    pub amount_due: String,
    pub company_name: String,
}

impl NoticeContext {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            customer_name: invoice.partner_name.clone(),
            invoice_number: invoice.number.clone(),
            due_date: format_due_date(invoice.due_date),
            amount_due: format_amount(&invoice.amount_residual, &invoice.currency),
            company_name: invoice.company_name.clone(),
        }
    }
}

/// 到期日格式 YYYY-MM-DD, 缺失时为 N/A
pub fn format_due_date(due_date: Option<NaiveDate>) -> String {
    due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// 金额格式: 千分位 + 两位小数 + 币种, 如 1,234.50 USD
pub fn format_amount(amount: &BigDecimal, currency: &str) -> String {
    let fixed = amount.round(2).with_scale(2).to_string();
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{} {}", sign, grouped, frac_part, currency)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 批量提醒正文
pub fn bulk_body(ctx: &NoticeContext) -> String {
    format!(
        r#"
<div style="font-family: Arial, sans-serif; margin: 20px;">
    <h2 style="color: #dc3545;">Payment Reminder</h2>
    <p>Dear {customer},</p>
    <p>This is a friendly reminder that your invoice <strong>{number}</strong>
    with a due date of <strong>{due}</strong> is now overdue.</p>
    <p><strong>Outstanding Amount:</strong> {amount}</p>
    <p>Please arrange payment at your earliest convenience.</p>
    <p>Best regards,<br/>
    {company}</p>
</div>
"#,
        customer = escape_html(&ctx.customer_name),
        number = escape_html(&ctx.invoice_number),
        due = ctx.due_date,
        amount = escape_html(&ctx.amount_due),
        company = escape_html(&ctx.company_name),
    )
}

/// 人工发送的默认正文 (可由操作员编辑)
pub fn manual_body(ctx: &NoticeContext) -> String {
    format!(
        r#"
<div style="font-family: Arial, sans-serif; margin: 20px;">
    <p>Dear {customer},</p>

    <p>We hope this message finds you well.</p>

    <p>This is a friendly reminder that your invoice <strong>{number}</strong>
    with a due date of <strong>{due}</strong> is now overdue.</p>

    <p><strong>Outstanding Amount:</strong> {amount}</p>

    <p>We kindly request that you arrange payment at your earliest convenience.
    If you have already made this payment, please disregard this notice.</p>

    <p>If you have any questions or concerns regarding this invoice,
    please don't hesitate to contact us.</p>

    <p>Thank you for your prompt attention to this matter.</p>

    <p>Best regards,<br/>
    Accounts Receivable Department</p>
</div>
"#,
        customer = escape_html(&ctx.customer_name),
        number = escape_html(&ctx.invoice_number),
        due = ctx.due_date,
        amount = escape_html(&ctx.amount_due),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn amount_gets_thousands_separators_and_two_decimals() {
        assert_eq!(format_amount(&dec("1234.5"), "USD"), "1,234.50 USD");
        assert_eq!(format_amount(&dec("1234567.891"), "EUR"), "1,234,567.89 EUR");
        assert_eq!(format_amount(&dec("999"), "USD"), "999.00 USD");
        assert_eq!(format_amount(&dec("0.5"), "USD"), "0.50 USD");
        assert_eq!(format_amount(&dec("-1500"), "USD"), "-1,500.00 USD");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(format_amount(&dec("0.125"), "USD"), "0.13 USD");
        assert_eq!(format_amount(&dec("2.675"), "USD"), "2.68 USD");
    }

    #[test]
    fn missing_due_date_renders_na() {
        assert_eq!(format_due_date(None), "N/A");
        assert_eq!(
            format_due_date(NaiveDate::from_ymd_opt(2024, 1, 5)),
            "2024-01-05"
        );
    }

    #[test]
    fn bodies_escape_customer_name() {
        let ctx = NoticeContext {
            customer_name: "Smith & <Sons>".to_string(),
            invoice_number: "INV/1".to_string(),
            due_date: "2024-01-15".to_string(),
            amount_due: "10.00 USD".to_string(),
            company_name: "Seller".to_string(),
        };

        let bulk = bulk_body(&ctx);
        assert!(bulk.contains("Dear Smith &amp; &lt;Sons&gt;,"));
        assert!(bulk.contains("Seller</p>"));

        let manual = manual_body(&ctx);
        assert!(manual.contains("please disregard this notice"));
        assert!(manual.contains("Accounts Receivable Department"));
        assert!(!manual.contains("Seller"));
    }
}
