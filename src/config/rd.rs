use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use std::ops::Deref;

pub type RedisPool = Pool<RedisConnectionManager>;

pub struct RD {
    pub pool: RedisPool,
}

impl RD {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = Pool::builder().build(manager).await?;

        Ok(RD { pool })
    }

    /// Builds the pool without opening a connection. Connections are
    /// established on first use.
    pub fn new_lazy(url: &str) -> anyhow::Result<Self> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = Pool::builder().build_unchecked(manager);

        Ok(RD { pool })
    }
}

impl Deref for RD {
    type Target = RedisPool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
