use serde::{Deserialize, Serialize};

/// 通知级别 (前端展示类型)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

/// 返回给调用方的结构化通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// 批量发送结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkStatus {
    Info,
    Success,
    Warning,
    Error,
}

impl BulkStatus {
    pub fn title(self) -> &'static str {
        match self {
            BulkStatus::Info => "Info",
            BulkStatus::Success => "Success",
            BulkStatus::Warning => "Warning",
            BulkStatus::Error => "Error",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            BulkStatus::Info => Severity::Info,
            BulkStatus::Success => Severity::Success,
            BulkStatus::Warning => Severity::Warning,
            BulkStatus::Error => Severity::Danger,
        }
    }
}

/// 批量发送汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub sent: usize,
    pub failed: usize,
    pub status: BulkStatus,
    pub message: String,
}

impl BulkOutcome {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            sent: 0,
            failed: 0,
            status: BulkStatus::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            sent: 0,
            failed: 0,
            status: BulkStatus::Error,
            message: message.into(),
        }
    }

    /// 按成功/失败计数归类: 有成功即 Success, 否则 Warning
    pub fn from_counts(sent: usize, failed: usize) -> Self {
        if sent > 0 {
            let mut message = format!("Successfully sent {} overdue payment notices", sent);
            if failed > 0 {
                message.push_str(&format!(" ({} failed)", failed));
            }
            Self {
                sent,
                failed,
                status: BulkStatus::Success,
                message,
            }
        } else {
            Self {
                sent,
                failed,
                status: BulkStatus::Warning,
                message: format!("No emails sent. {} invoices had issues", failed),
            }
        }
    }

    pub fn notification(&self) -> Notification {
        Notification::new(self.status.title(), self.message.clone(), self.status.severity())
    }
}
