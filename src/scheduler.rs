use crate::models::Sender;
use crate::service::NoticeDispatcher;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 定时逾期检查: 每个周期对全部发票执行一次批量发送, 以配置的发件人名义
pub fn spawn_overdue_check(
    dispatcher: Arc<NoticeDispatcher>,
    sender: Sender,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // 上一轮未结束时跳过错过的周期, 不补发
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let today = Local::now().date_naive();
            tracing::info!("Scheduled overdue check for {}", today);

            let outcome = dispatcher.send_bulk(None, today, &sender).await;
            tracing::info!(
                status = ?outcome.status,
                sent = outcome.sent,
                failed = outcome.failed,
                "Scheduled overdue check done: {}",
                outcome.message
            );
        }
    })
}
