use thiserror::Error;

/// 逾期通知服务统一错误类型
#[derive(Debug, Error)]
pub enum NoticeError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invoice {0} not found")]
    InvoiceNotFound(i64),

    #[error("invalid invoice record {id}: {reason}")]
    InvalidRecord { id: i64, reason: String },

    #[error("invoice {0} has no recipient email")]
    MissingRecipient(String),

    #[error("invoice {0} is already being notified")]
    AlreadyInFlight(i64),

    #[error("invoice {0} was already notified")]
    AlreadyNotified(i64),

    /// 人工发送路径的校验错误，直接反馈给操作员
    #[error("{0}")]
    Validation(String),

    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, NoticeError>;
