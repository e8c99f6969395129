//! Remote tier: best-effort Redis store.
//!
//! Every operation runs under a fixed per-call timeout so a slow or
//! unreachable Redis can never pin a request task. All failure modes
//! surface as `RemoteError`; the lookup path treats every one of them
//! as a tier miss and keeps serving.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;

use crate::domain::artifact::Artifact;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote tier call exceeded {0:?}")]
    Timeout(Duration),
    #[error("remote tier unavailable: {0}")]
    Unavailable(#[from] redis::RedisError),
    #[error("malformed remote entry: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("key not present in remote tier")]
    Missing,
}

/// Narrow seam over the remote tier so the lookup service can run
/// against a fake in tests and against Redis in production.
#[async_trait]
pub trait RemoteTier: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Artifact, RemoteError>;
    async fn store(&self, key: &str, artifact: &Artifact, ttl: Duration)
    -> Result<(), RemoteError>;
    /// Extend the remaining lifetime of an existing entry without
    /// resending the payload.
    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<(), RemoteError>;
    /// Reachability probe for the health endpoint.
    async fn ping(&self) -> bool;
}

/// Redis-backed remote tier.
#[derive(Clone)]
pub struct RemoteStore {
    connection: ConnectionManager,
    op_timeout: Duration,
}

impl RemoteStore {
    /// Connect to Redis, bounded by the per-operation timeout. A
    /// failure here is how startup decides to run with the remote
    /// tier disabled.
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, RemoteError> {
        let client = redis::Client::open(url)?;
        let connection = match tokio::time::timeout(op_timeout, ConnectionManager::new(client)).await
        {
            Ok(connection) => connection?,
            Err(_) => return Err(RemoteError::Timeout(op_timeout)),
        };
        Ok(Self {
            connection,
            op_timeout,
        })
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, RemoteError> {
        match tokio::time::timeout(self.op_timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RemoteError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl RemoteTier for RemoteStore {
    async fn fetch(&self, key: &str) -> Result<Artifact, RemoteError> {
        let mut connection = self.connection.clone();
        let payload: Option<String> = self.bounded(connection.get(key)).await?;
        let payload = payload.ok_or(RemoteError::Missing)?;
        Ok(serde_json::from_str(&payload)?)
    }

    async fn store(
        &self,
        key: &str,
        artifact: &Artifact,
        ttl: Duration,
    ) -> Result<(), RemoteError> {
        let payload = serde_json::to_string(artifact)?;
        let mut connection = self.connection.clone();
        self.bounded(connection.set_ex::<_, _, ()>(key, payload, ttl.as_secs()))
            .await
    }

    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<(), RemoteError> {
        let mut connection = self.connection.clone();
        self.bounded(connection.expire::<_, ()>(key, ttl.as_secs() as i64))
            .await
    }

    async fn ping(&self) -> bool {
        let mut connection = self.connection.clone();
        self.bounded(async move {
            redis::cmd("PING")
                .query_async::<String>(&mut connection)
                .await
        })
        .await
        .is_ok()
    }
}
