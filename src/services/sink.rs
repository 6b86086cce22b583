use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::UnboundedSender;

use crate::types::notice::Notice;

#[async_trait]
pub trait NoticeSink: Send + Sync + 'static {
    async fn publish(&self, notice: Notice) -> anyhow::Result<()>;
}

#[async_trait]
impl NoticeSink for UnboundedSender<Notice> {
    async fn publish(&self, notice: Notice) -> anyhow::Result<()> {
        self.send(notice)?;
        Ok(())
    }
}

/// Sends each notice as a datagram to the call panels.
#[derive(Debug, Clone)]
pub struct UdpNoticeSink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpNoticeSink {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        UdpNoticeSink { socket, peer }
    }
}

#[async_trait]
impl NoticeSink for UdpNoticeSink {
    async fn publish(&self, notice: Notice) -> anyhow::Result<()> {
        self.socket
            .send_to(notice.to_string().as_bytes(), self.peer)
            .await?;
        Ok(())
    }
}
