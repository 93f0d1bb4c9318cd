use payment_notices::config::TransportKind;
use payment_notices::mail::{LogTransport, MailTransport, OutboxTransport};
use payment_notices::{api, create_pool, scheduler, AppConfig, NoticeDispatcher, PgStore};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database.url, config.database.max_connections).await?;
    info!("Database pool created");

    let store = Arc::new(PgStore::new(pool.clone()));
    let transport: Arc<dyn MailTransport> = match config.mail.transport {
        TransportKind::Outbox => Arc::new(OutboxTransport::new(pool)),
        TransportKind::Log => Arc::new(LogTransport),
    };

    let dispatcher = Arc::new(
        NoticeDispatcher::new(
            store.clone(),
            store.clone(),
            store,
            transport,
        )
        .with_template(config.mail.template.clone()),
    );

    let default_sender = config.sender()?;

    if config.scheduler.enabled {
        let every = Duration::from_secs(config.scheduler.interval_secs.max(1));
        scheduler::spawn_overdue_check(dispatcher.clone(), default_sender.clone(), every);
        info!("Scheduled overdue check every {:?}", every);
    }

    let state = api::AppState::new(dispatcher, config.mail.company_email.clone(), default_sender);
    let app = api::router(state).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/notices/overdue          - bulk overdue notices");
    info!("  GET  /api/invoices/overdue         - overdue invoice list");
    info!("  GET  /api/invoices/overdue.csv     - overdue invoice report");
    info!("  GET  /api/invoices/:id/notice      - open manual notice");
    info!("  POST /api/invoices/:id/notice      - send manual notice");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
