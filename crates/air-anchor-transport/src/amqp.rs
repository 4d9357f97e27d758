//! AMQP 0-9-1 broker channel.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};

use crate::error::{Result, TransportError};
use crate::transport::{BrokerConfig, QueueChannel};

/// AMQP delivery mode that survives broker restarts.
const PERSISTENT: u8 = 2;

fn broker_err(e: lapin::Error) -> TransportError {
    TransportError::Broker(e.to_string())
}

/// A channel on an AMQP broker.
pub struct AmqpChannel {
    // Held so the channel stays open.
    _connection: Connection,
    channel: Channel,
}

impl AmqpChannel {
    /// Connect to the broker and open a channel.
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        let uri = config.amqp_uri();
        let connection = Connection::connect(&uri, ConnectionProperties::default())
            .await
            .map_err(|e| TransportError::Connection(format!("{uri}: {e}")))?;
        let channel = connection.create_channel().await.map_err(broker_err)?;

        tracing::debug!(host = %config.host, port = config.port, "connected to broker");
        Ok(Self {
            _connection: connection,
            channel,
        })
    }
}

#[async_trait]
impl QueueChannel for AmqpChannel {
    async fn declare_durable(&mut self, queue: &str) -> Result<()> {
        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(broker_err)?;
        Ok(())
    }

    async fn publish(&mut self, queue: &str, payload: &[u8], persistent: bool) -> Result<()> {
        let properties = if persistent {
            BasicProperties::default().with_delivery_mode(PERSISTENT)
        } else {
            BasicProperties::default()
        };

        self.channel
            .basic_publish("", queue, BasicPublishOptions::default(), payload, properties)
            .await
            .map_err(broker_err)?
            .await
            .map_err(broker_err)?;
        Ok(())
    }
}
