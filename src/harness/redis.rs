//! Monitored redis connection plumbing with [`jatsl`] interop
//!
//! Connections report their death to the owning job's [`TaskResourceHandle`] so the
//! scheduler can restart the job once the server becomes reachable again. The shared
//! multiplexed connection is tracked per factory instance — state is explicitly
//! constructed and injected, never process-global.

use crate::library::communication::implementation::redis::{
    RedisConnectionVariant, RedisFactory, RedisPublisher, RedisQueueProvider,
    RedisResponseCollector,
};
use crate::library::communication::request::CompositeRequestor;
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use async_trait::async_trait;
use futures::{
    future::{BoxFuture, FutureExt, Shared},
    lock::Mutex,
};
use jatsl::{TaskManager, TaskResourceHandle};
use log::{debug, warn};
use redis::{
    aio::{Connection, ConnectionLike, MultiplexedConnection},
    Client, Cmd, Pipeline, RedisError, RedisFuture, RedisResult, Value,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio::task::yield_now;
use tokio::time::{sleep, timeout};

type SharedMultiplexedConnectionFuture = Shared<BoxFuture<'static, MultiplexedConnection>>;

/// Book-keeping for one factory's shared multiplexed connection
///
/// Holds the lazily established connection future and the resource handles of every
/// job currently relying on it, so all of them can be notified when it dies.
#[derive(Default)]
pub struct SharedConnectionState {
    connection: Mutex<Option<Arc<SharedMultiplexedConnectionFuture>>>,
    handles: Mutex<HashSet<TaskResourceHandle>>,
}

/// Redis connection that monitors for connection errors
pub struct RedisResource<C: ConnectionLike> {
    con: C,
    handle: TaskResourceHandle,
    shared: Option<Arc<SharedConnectionState>>,
}

impl RedisResource<MultiplexedConnection> {
    /// Retrieves the factory's shared redis connection or establishes it
    pub async fn shared(
        handle: TaskResourceHandle,
        url: &str,
        state: Arc<SharedConnectionState>,
    ) -> RedisResult<Self> {
        let client = Client::open(url)?;

        let future = {
            let mut connection = state.connection.lock().await;

            match &*connection {
                Some(container_future) => container_future.clone(),
                None => {
                    let future = Arc::new(RedisResource::connect_shared(client).boxed().shared());
                    *connection = Some(future.clone());
                    future
                }
            }
        };

        let con = (*future).clone().await;

        state.handles.lock().await.insert(handle.clone());

        Ok(Self {
            con,
            handle,
            shared: Some(state),
        })
    }

    async fn connect_shared(client: Client) -> MultiplexedConnection {
        let retry_interval = Duration::from_secs(2);
        let request_timeout = Duration::from_secs(4);
        let mut warn = true;

        loop {
            let con_future = client.get_multiplexed_tokio_connection();
            let timed_con_future = timeout(request_timeout, con_future);

            match timed_con_future.await {
                Ok(con_result) => match con_result {
                    Ok(connection) => return connection,
                    Err(e) => {
                        if warn {
                            warn = false;
                            warn!("Unable to connect to redis server! ({})", e)
                        }
                    }
                },
                Err(e) => {
                    if warn {
                        warn = false;
                        warn!("Timed out while connecting to redis! ({})", e)
                    }
                }
            }

            sleep(retry_interval).await;
        }
    }
}

impl RedisResource<Connection> {
    /// Creates a new standalone redis connection
    pub async fn new(handle: TaskResourceHandle, url: &str) -> RedisResult<Self> {
        let client = Client::open(url)?;
        let con = RedisResource::connect_standalone(client).await;

        Ok(Self {
            con,
            handle,
            shared: None,
        })
    }

    async fn connect_standalone(client: Client) -> Connection {
        let retry_interval = Duration::from_secs(2);
        let request_timeout = Duration::from_secs(4);
        let mut warn = true;

        loop {
            let con_future = client.get_async_connection();
            let timed_con_future = timeout(request_timeout, con_future);

            match timed_con_future.await {
                Ok(con_result) => match con_result {
                    Ok(connection) => return connection,
                    Err(e) => {
                        if warn {
                            warn = false;
                            warn!("Unable to connect to redis server! ({})", e)
                        }
                    }
                },
                Err(e) => {
                    if warn {
                        warn = false;
                        warn!("Timed out while connecting to redis! ({})", e)
                    }
                }
            }

            sleep(retry_interval).await;
        }
    }
}

impl<C: ConnectionLike> RedisResource<C> {
    async fn notify(&mut self, error: &RedisError) {
        debug!("{:?}", error);
        self.handle.resource_died().await;

        if let Some(state) = &self.shared {
            // Invalidate the shared connection
            *(state.connection.lock().await) = None;

            // Notify all other task's handles that are using the shared connection
            let handles = state.handles.lock().await;
            debug!("Calling {} shared termination handles", handles.len());
            for handle in handles.iter() {
                handle.clone().resource_died().await;
            }
        }

        yield_now().await;
    }
}

impl<C: ConnectionLike> Drop for RedisResource<C> {
    fn drop(&mut self) {
        // Lazily remove the resource handle from the shared connection's subscriber list
        if let Some(state) = self.shared.take() {
            let handle = self.handle.clone();
            task::spawn(async move {
                state.handles.lock().await.remove(&handle);
            });
        }
    }
}

/// Handle a redis command result.
macro_rules! notify_if_disconnected {
    ($self:expr, $result:expr) => {
        if let Err(ref e) = $result {
            if e.is_connection_dropped()
                || e.is_io_error()
                || e.is_connection_refusal()
                || e.is_timeout()
            {
                $self.notify(e).await;
            }
        }
    };
}

impl<C: ConnectionLike + Send> ConnectionLike for RedisResource<C> {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        (async move {
            let result = self.con.req_packed_command(cmd).await;
            notify_if_disconnected!(self, result);
            result
        })
        .boxed()
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        cmd: &'a Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        (async move {
            let result = self.con.req_packed_commands(cmd, offset, count).await;
            notify_if_disconnected!(self, result);
            result
        })
        .boxed()
    }

    fn get_db(&self) -> i64 {
        self.con.get_db()
    }
}

/// Connection handed out by the [`MonitoredRedisFactory`]
pub enum MonitoredConnection {
    /// Standalone connection owned exclusively by the caller
    Standalone(RedisResource<Connection>),
    /// Handle to the factory's shared multiplexed connection
    Multiplexed(RedisResource<MultiplexedConnection>),
}

impl ConnectionLike for MonitoredConnection {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        match self {
            Self::Standalone(con) => con.req_packed_command(cmd),
            Self::Multiplexed(con) => con.req_packed_command(cmd),
        }
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        cmd: &'a Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        match self {
            Self::Standalone(con) => con.req_packed_commands(cmd, offset, count),
            Self::Multiplexed(con) => con.req_packed_commands(cmd, offset, count),
        }
    }

    fn get_db(&self) -> i64 {
        match self {
            Self::Standalone(con) => con.get_db(),
            Self::Multiplexed(con) => con.get_db(),
        }
    }
}

/// [`RedisFactory`] implementation providing [`jatsl`] interop
pub struct MonitoredRedisFactory {
    url: String,
    handle_provider: BoxedResourceHandleProvider,
    shared: Arc<SharedConnectionState>,
}

impl MonitoredRedisFactory {
    /// Creates a new factory opening connections to the given URL
    pub fn new(url: String, handle_provider: BoxedResourceHandleProvider) -> Self {
        Self {
            url,
            handle_provider,
            shared: Arc::new(SharedConnectionState::default()),
        }
    }

    fn with_shared_state(
        url: String,
        handle_provider: BoxedResourceHandleProvider,
        shared: Arc<SharedConnectionState>,
    ) -> Self {
        Self {
            url,
            handle_provider,
            shared,
        }
    }
}

#[async_trait]
impl RedisFactory for MonitoredRedisFactory {
    type Connection = MonitoredConnection;

    async fn connection(
        &self,
        variant: RedisConnectionVariant,
    ) -> Result<Self::Connection, BoxedError> {
        let handle = self.handle_provider.create_handle();

        match variant {
            // TODO Implement connection pooling
            RedisConnectionVariant::Owned | RedisConnectionVariant::Pooled => Ok(
                MonitoredConnection::Standalone(RedisResource::new(handle, &self.url).await?),
            ),
            RedisConnectionVariant::Multiplexed => Ok(MonitoredConnection::Multiplexed(
                RedisResource::shared(handle, &self.url, self.shared.clone()).await?,
            )),
        }
    }
}

/// Factory to provide [`TaskResourceHandle`] instances
pub trait ResourceHandleProvider {
    /// Instantiates a new [`TaskResourceHandle`]
    fn create_handle(&self) -> TaskResourceHandle;
}

/// Stub resource handle provider
///
/// Creates new instances using [`TaskResourceHandle::stub()`] for situations where you do not need redundancy or task management
pub struct DummyResourceHandleProvider {}

impl DummyResourceHandleProvider {
    /// Creates a new instance wrapped in an [`Arc`]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }
}

impl ResourceHandleProvider for DummyResourceHandleProvider {
    fn create_handle(&self) -> TaskResourceHandle {
        TaskResourceHandle::stub()
    }
}

impl<C> ResourceHandleProvider for TaskManager<C> {
    fn create_handle(&self) -> TaskResourceHandle {
        self.create_resource_handle()
    }
}

/// Dynamic dispatch version of [`ResourceHandleProvider`]
pub type BoxedResourceHandleProvider = Arc<dyn ResourceHandleProvider + Send + Sync>;

/// Communication factory based on [`MonitoredRedisFactory`]
pub struct RedisCommunicationFactory {
    url: String,
    handle_provider: BoxedResourceHandleProvider,
    shared: Arc<SharedConnectionState>,
}

impl RedisCommunicationFactory {
    /// Creates a new instance which connects to the given URL and reports status using the given handle factory
    pub fn new(url: String, handle_provider: BoxedResourceHandleProvider) -> Self {
        Self {
            url,
            handle_provider,
            shared: Arc::new(SharedConnectionState::default()),
        }
    }

    fn factory(&self) -> MonitoredRedisFactory {
        MonitoredRedisFactory::with_shared_state(
            self.url.clone(),
            self.handle_provider.clone(),
            self.shared.clone(),
        )
    }
}

impl CommunicationFactory for RedisCommunicationFactory {
    type QueueProvider = RedisQueueProvider<MonitoredRedisFactory>;
    type NotificationPublisher = RedisPublisher<MonitoredRedisFactory>;

    type Requestor = CompositeRequestor<
        RedisPublisher<MonitoredRedisFactory>,
        RedisResponseCollector<MonitoredRedisFactory>,
    >;

    type ResponseCollector = RedisResponseCollector<MonitoredRedisFactory>;
    type ResponsePublisher = RedisPublisher<MonitoredRedisFactory>;

    fn queue_provider(&self) -> Self::QueueProvider {
        Self::QueueProvider::new(self.factory())
    }

    fn notification_publisher(&self) -> Self::NotificationPublisher {
        Self::NotificationPublisher::new(self.factory())
    }

    fn requestor(&self) -> Self::Requestor {
        Self::Requestor::new(self.notification_publisher(), self.response_collector())
    }

    fn response_collector(&self) -> Self::ResponseCollector {
        Self::ResponseCollector::new(self.factory())
    }

    fn response_publisher(&self) -> Self::ResponsePublisher {
        Self::ResponsePublisher::new(self.factory())
    }
}
