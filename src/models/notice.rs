use serde::{Deserialize, Serialize};

/// 默认逾期提醒邮件模板名
pub const DEFAULT_TEMPLATE_NAME: &str = "payment_management.overdue_payment_email_template";

/// 邮件主题前缀 (模板未覆盖时使用)
pub const DEFAULT_SUBJECT_PREFIX: &str = "Payment Reminder - Invoice";

pub const NOTICE_SENT_SUBJECT: &str = "Late Payment Notice Sent";

/// 邮件模板 (由模板仓库提供)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailTemplate {
    pub name: String,
    pub subject_prefix: String,
}

impl MailTemplate {
    pub fn subject_for(&self, invoice_number: &str) -> String {
        format!("{} {}", self.subject_prefix, invoice_number)
    }
}

/// 邮件来源对象引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub model: String,
    pub id: i64,
}

impl SourceRef {
    pub fn invoice(id: i64) -> Self {
        Self {
            model: "invoice".to_string(),
            id,
        }
    }
}

/// 待投递邮件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub subject: String,
    pub body_html: String,
    pub email_to: String,
    pub email_from: String,
    pub source: SourceRef,
}

/// 发票审计记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNote {
    pub subject: String,
    pub body: String,
    pub author: String,
}

impl AuditNote {
    /// 通知发送成功后追加到发票历史的记录
    pub fn notice_sent(email_to: &str, author: &str) -> Self {
        Self {
            subject: NOTICE_SENT_SUBJECT.to_string(),
            body: format!("Late payment notice sent to {}", email_to),
            author: author.to_string(),
        }
    }
}

/// 人工发送表单 (一次性, 不持久化)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotice {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub email_to: String,
    pub message_body: String,
}

/// 发件人身份 (显式传入, 不依赖全局环境)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub address: String,
    pub acting_user: String,
}

impl Sender {
    /// 发件地址: 公司邮箱优先, 否则操作用户邮箱; 都为空时返回 None
    pub fn resolve(
        company_email: Option<&str>,
        user_email: Option<&str>,
        acting_user: &str,
    ) -> Option<Self> {
        [company_email, user_email]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|email| !email.is_empty())
            .map(|address| Sender {
                address: address.to_string(),
                acting_user: acting_user.to_string(),
            })
    }
}
