use crate::error::NoticeError;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// 凭证类型 (仅 out_invoice 参与逾期提醒)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    OutInvoice,
    OutRefund,
    InInvoice,
    InRefund,
    Entry,
}

/// 付款状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    NotPaid,
    InPayment,
    Partial,
    Paid,
    Reversed,
}

/// 过账状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingState {
    Draft,
    Posted,
    Cancel,
}

impl FromStr for MoveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "out_invoice" => Ok(Self::OutInvoice),
            "out_refund" => Ok(Self::OutRefund),
            "in_invoice" => Ok(Self::InInvoice),
            "in_refund" => Ok(Self::InRefund),
            "entry" => Ok(Self::Entry),
            other => Err(format!("unknown move type '{}'", other)),
        }
    }
}

impl FromStr for PaymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_paid" => Ok(Self::NotPaid),
            "in_payment" => Ok(Self::InPayment),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            "reversed" => Ok(Self::Reversed),
            other => Err(format!("unknown payment state '{}'", other)),
        }
    }
}

impl FromStr for PostingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "posted" => Ok(Self::Posted),
            "cancel" => Ok(Self::Cancel),
            other => Err(format!("unknown posting state '{}'", other)),
        }
    }
}

/// 客户发票 (账簿系统所有, 本服务只写 notice_sent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub number: String,
    pub move_type: MoveType,
    pub payment_state: PaymentState,
    pub state: PostingState,
    pub due_date: Option<NaiveDate>,
    pub amount_residual: BigDecimal,
    pub currency: String,
    pub partner_name: String,
    pub partner_email: Option<String>,
    pub company_name: String,
    pub notice_sent: bool,
}

impl Invoice {
    /// 客户邮箱 (空白视为未配置)
    pub fn recipient(&self) -> Option<&str> {
        self.partner_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// 发票表行 (invoices)
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: i64,
    pub number: String,
    pub move_type: String,
    pub payment_state: String,
    pub state: String,
    pub due_date: Option<NaiveDate>,
    pub amount_residual: BigDecimal,
    pub currency: String,
    pub partner_name: String,
    pub partner_email: Option<String>,
    pub company_name: String,
    pub notice_sent: bool,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = NoticeError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = move |reason: String| NoticeError::InvalidRecord { id, reason };

        Ok(Invoice {
            move_type: row.move_type.parse().map_err(invalid)?,
            payment_state: row.payment_state.parse().map_err(invalid)?,
            state: row.state.parse().map_err(invalid)?,
            id,
            number: row.number,
            due_date: row.due_date,
            amount_residual: row.amount_residual,
            currency: row.currency,
            partner_name: row.partner_name,
            partner_email: row.partner_email,
            company_name: row.company_name,
            notice_sent: row.notice_sent,
        })
    }
}
