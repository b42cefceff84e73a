use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use geodrop_backend::{
    AppState,
    cache::CachedMessageSource,
    config::Config,
    database::{self, MemoryMessageSource, MemoryUserSource, MessageSource, PgMessageSource, PgUserSource, UserSource},
    geo::Quantizer,
    proximity::ProximityQueryEngine,
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置记录源：配置了数据库时使用 Postgres，否则使用内存
    let (messages, users): (Arc<dyn MessageSource>, Arc<dyn UserSource>) = match &config.database_url {
        Some(url) => {
            let pool = database::connect(url, config.database_max_connections)
                .await
                .expect("Failed to connect to Postgres");
            (
                Arc::new(PgMessageSource::new(pool.clone())),
                Arc::new(PgUserSource::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory record sources");
            (
                Arc::new(MemoryMessageSource::new()),
                Arc::new(MemoryUserSource::new()),
            )
        }
    };

    // 设置 Redis 消息缓存
    let messages: Arc<dyn MessageSource> = match &config.redis_url {
        Some(url) => {
            let redis_client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            tracing::info!("Bucket message cache enabled");
            Arc::new(CachedMessageSource::new(
                messages,
                Arc::new(redis_client),
                config.message_cache_ttl(),
            ))
        }
        None => messages,
    };

    let quantizer = Quantizer::new(config.broad_coordinate_decimals);
    tracing::info!("Broad coordinate precision: {} decimals", quantizer.decimals());

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        engine: ProximityQueryEngine::new(messages, users, quantizer),
    };

    let router = create_router(state.clone());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
