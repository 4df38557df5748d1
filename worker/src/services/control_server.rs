//! Control server: binds the worker's port and serves the control-plane router

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;

use shared::{process_info, ProcessId};

use crate::error::{WorkerError, WorkerResult};
use crate::state::WorkerContext;
use crate::web;

pub struct ControlServer {
    listener: TcpListener,
    context: Arc<WorkerContext>,
}

impl ControlServer {
    /// Bind on all interfaces at `port`; port 0 picks a free one
    pub async fn bind(port: u16, context: Arc<WorkerContext>) -> WorkerResult<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| WorkerError::ServerStartupFailed { addr, source })?;

        Ok(Self { listener, context })
    }

    pub fn local_addr(&self) -> WorkerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process ends
    pub async fn serve(self) -> WorkerResult<()> {
        let addr = self.local_addr()?;
        process_info!(
            ProcessId::current(),
            "🌐 [{}] Health server listening on port {}",
            self.context.name(),
            addr.port()
        );

        let router = web::router(self.context);
        axum::serve(self.listener, router).await?;
        Ok(())
    }
}
