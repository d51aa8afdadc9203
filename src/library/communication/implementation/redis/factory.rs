use super::super::super::super::BoxedError;
use async_trait::async_trait;
use redis::aio::ConnectionLike;

/// Flavour of connection handed out by a [`RedisFactory`]
pub enum RedisConnectionVariant {
    /// Connection owned exclusively by the caller, suitable for blocking commands
    Owned,
    /// Connection from a pool, returned on drop
    Pooled,
    /// Handle to a connection multiplexing the requests of multiple callers
    Multiplexed,
}

/// Factory providing connections to a redis server
///
/// The concrete connection type is an associated type rather than a trait object so
/// that the [`AsyncCommands`](redis::AsyncCommands) extension trait stays usable on
/// whatever the factory hands out.
#[async_trait]
pub trait RedisFactory {
    /// Type of connection handed out by this factory
    type Connection: ConnectionLike + Send + Sync;

    /// Opens or retrieves a connection of the requested [`RedisConnectionVariant`]
    async fn connection(
        &self,
        variant: RedisConnectionVariant,
    ) -> Result<Self::Connection, BoxedError>;
}
