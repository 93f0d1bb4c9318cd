use crate::error::{NoticeError, Result};
use crate::models::{Sender, DEFAULT_TEMPLATE_NAME};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 投递方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// 写入 mail_outbox 表
    Outbox,
    /// 仅写日志
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// 公司邮箱, 优先作为发件人
    pub company_email: Option<String>,
    /// 操作用户邮箱, 公司邮箱缺失时作为发件人
    pub user_email: Option<String>,
    /// 写入审计记录的操作人
    pub acting_user: String,
    pub template: String,
    pub transport: TransportKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl AppConfig {
    /// 加载配置: 默认值 -> payment-notices.toml (可选) -> NOTICES__* 环境变量
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "postgres://localhost/payment_notices")?
            .set_default("database.max_connections", 20)?
            .set_default("mail.acting_user", "scheduler")?
            .set_default("mail.template", DEFAULT_TEMPLATE_NAME)?
            .set_default("mail.transport", "outbox")?
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.interval_secs", 86_400)?
            .add_source(config::File::with_name("payment-notices").required(false))
            .add_source(config::Environment::with_prefix("NOTICES").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.sender()?;
        Ok(config)
    }

    /// 定时任务使用的发件人: 公司邮箱优先, 否则配置的用户邮箱
    pub fn sender(&self) -> Result<Sender> {
        Sender::resolve(
            self.mail.company_email.as_deref(),
            self.mail.user_email.as_deref(),
            &self.mail.acting_user,
        )
        .ok_or_else(|| {
            NoticeError::Config(config::ConfigError::Message(
                "mail.company_email or mail.user_email must be set".to_string(),
            ))
        })
    }
}
