//! Driver-side client for the Brokerage House.
//!
//! One request out, one status back; the connection is reused for the
//! next call.

use brokerage_core::TxnInput;
use brokerage_protocol::{decode_reply, encode_request, ProtocolError, REPLY_SIZE, REQUEST_SIZE};
use thiserror::Error;
use tracing::debug;

use crate::transport::{Connection, TransportError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

pub struct BrokerageClient {
    conn: Connection,
}

impl BrokerageClient {
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        Ok(BrokerageClient {
            conn: Connection::connect(addr).await?,
        })
    }

    /// Run one transaction and return its status.
    pub async fn call(&mut self, input: &TxnInput) -> Result<i32, ClientError> {
        let mut buf = Vec::with_capacity(REQUEST_SIZE);
        encode_request(input, &mut buf)?;
        self.conn.send(&buf).await?;

        let reply = self.conn.receive(REPLY_SIZE).await?;
        let status = decode_reply(&reply)?;
        debug!(txn = %input.txn_type(), status, "reply");
        Ok(status)
    }

    pub async fn reconnect(&mut self) -> Result<(), ClientError> {
        self.conn.reconnect().await?;
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        self.conn.disconnect().await;
    }
}
