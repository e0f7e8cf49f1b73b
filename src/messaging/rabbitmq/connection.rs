use std::sync::Arc;
use std::time::Duration;

use lapin::{Channel, Connection, ConnectionProperties, Error as LapinError};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::messaging::rabbitmq::error::MessagingError;

/// 單一長壽命的 broker 連接
///
/// 非預期關閉時由觀察者嘗試重連恰好一次；再失敗只記錄嚴重錯誤後
/// 放棄，沒有退避重試迴圈 (設計上的限制，不是缺漏)。
pub struct BrokerConnection {
    label: &'static str,
    url: String,
    inner: Arc<RwLock<Connection>>,
}

impl BrokerConnection {
    /// 建立連接並掛上關閉觀察者
    pub async fn connect(
        url: &str,
        label: &'static str,
        timeout: Duration,
    ) -> Result<Self, MessagingError> {
        info!(connection = label, "Connecting to RabbitMQ");

        let connection = tokio::time::timeout(timeout, Self::open(url))
            .await
            .map_err(|_| MessagingError::Timeout)??;

        let inner = Arc::new(RwLock::new(connection));
        install_recovery(label, url.to_string(), inner.clone(), &*inner.read().await);

        info!(connection = label, "Successfully connected to RabbitMQ");

        Ok(Self {
            label,
            url: url.to_string(),
            inner,
        })
    }

    async fn open(url: &str) -> Result<Connection, LapinError> {
        Connection::connect(
            url,
            ConnectionProperties::default()
                .with_executor(tokio_executor_trait::Tokio::current()),
        )
        .await
    }

    /// 在目前的連接上開啟一條通道
    pub async fn create_channel(&self) -> Result<Channel, LapinError> {
        self.inner.read().await.create_channel().await
    }

    pub async fn is_open(&self) -> bool {
        self.inner.read().await.status().connected()
    }

    pub async fn close(&self) -> Result<(), LapinError> {
        self.inner.read().await.close(200, "shutdown").await
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// 對指定連接掛上非預期關閉的觀察者
///
/// 每次關閉事件觸發一次重連嘗試；成功後替換共享的連接並對新連接
/// 重新掛上觀察者，失敗則記錄後不再重試。
fn install_recovery(
    label: &'static str,
    url: String,
    inner: Arc<RwLock<Connection>>,
    connection: &Connection,
) {
    let handle = tokio::runtime::Handle::current();

    connection.on_error(move |err| {
        error!(
            connection = label,
            error = %err,
            "Broker connection closed unexpectedly, attempting one reconnection"
        );

        let url = url.clone();
        let inner = inner.clone();

        handle.spawn(async move {
            match BrokerConnection::open(&url).await {
                Ok(fresh) => {
                    install_recovery(label, url, inner.clone(), &fresh);
                    *inner.write().await = fresh;
                    info!(connection = label, "Broker connection re-established");
                }
                Err(retry_err) => {
                    error!(
                        connection = label,
                        error = %retry_err,
                        "Reconnection attempt failed, giving up"
                    );
                }
            }
        });
    });
}
