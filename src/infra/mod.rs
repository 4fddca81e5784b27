use crate::config::db::RedisConfig;
use crate::config::environment::AppConfig;
use redis::Client as RedisClient;

#[derive(Debug, Clone)]
pub struct InfraClients {
    pub redis: RedisClient,
}

pub const PARTICIPANTS_COLLECTION: &str = "participants";
pub const STEP_ENTRIES_COLLECTION: &str = "step_entries";
pub const SCREENSHOTS_COLLECTION: &str = "screenshots";

pub async fn init_infra(config: &AppConfig) -> Result<Option<InfraClients>, String> {
    if config.redis_url.is_none() {
        return Ok(None);
    }

    let redis_config = RedisConfig::from_app(config);
    let redis =
        RedisClient::open(redis_config.url).map_err(|e| format!("redis init failed: {e}"))?;
    Ok(Some(InfraClients { redis }))
}

pub async fn redis_available(infra: &Option<InfraClients>) -> bool {
    let Some(infra) = infra else {
        return false;
    };
    let Ok(mut conn) = infra.redis.get_multiplexed_async_connection().await else {
        return false;
    };
    let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
    pong.is_ok()
}
