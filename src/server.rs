use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{Config, SnapshotConfig};
use crate::encoding::snapshot;
use crate::protocol::{CommandFactory, Parser, Value};
use crate::store::{StoreError, WordStore};

/// Most unparsed bytes a connection may hold before it is dropped
const MAX_PENDING: usize = 16 * 1024 * 1024;

/// TCP server exposing the word store over RESP
pub struct Server {
  listener: TcpListener,
  local_addr: SocketAddr,
  cmd_factory: Arc<CommandFactory>,
  store: Arc<WordStore>,
  snapshot: SnapshotConfig,
  max_pending: usize,
}

impl Server {
  /// Bind the TCP listener on `config.server_addr` and serve `store`
  pub async fn bind(config: &Config, store: Arc<WordStore>) -> std::io::Result<Self> {
    let listener = TcpListener::bind(&config.server_addr).await?;
    let local_addr = listener.local_addr()?;
    info!("TCP server bound to {}", local_addr);

    let cmd_factory = Arc::new(CommandFactory::init(config.snapshot.path.clone()));

    Ok(Self {
      listener,
      local_addr,
      cmd_factory,
      store,
      snapshot: config.snapshot.clone(),
      max_pending: MAX_PENDING,
    })
  }

  /// Get local listening address
  pub fn local_addr(&self) -> SocketAddr {
    self.local_addr
  }

  /// The store served by this server
  pub fn store(&self) -> &Arc<WordStore> {
    &self.store
  }

  /// Process a RESP command and return the response
  async fn process_command(&self, value: Value) -> Value {
    self.cmd_factory.execute(value, &self.store).await
  }

  /// Handle a single client connection until the client disconnects or
  /// `closing` flips to true. A command already read is always answered.
  async fn handle_connection(
    self: Arc<Self>,
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    mut closing: watch::Receiver<bool>,
  ) -> std::io::Result<()> {
    // Holds bytes of frames that have not fully arrived yet
    let mut pending = BytesMut::with_capacity(8192);

    loop {
      let read = tokio::select! {
        read = stream.read_buf(&mut pending) => read?,
        _ = closing.changed() => {
          info!("Closing connection from {} for shutdown", peer_addr);
          break;
        }
      };
      if read == 0 {
        info!("Connection closed by client: {}", peer_addr);
        break;
      }

      loop {
        let (value, consumed) = match Parser::parse(&pending) {
          Ok(Some(frame)) => frame,
          Ok(None) => break,
          Err(e) => {
            warn!("Protocol error from {}: {}", peer_addr, e);
            let reply = Value::error(format!("ERR Protocol error: {}", e));
            stream.write_all(&reply.encode()).await?;
            return Ok(());
          }
        };
        pending.advance(consumed);

        debug!("Received command from {}: {:?}", peer_addr, value);
        let name = CommandFactory::command_name(&value).unwrap_or_else(|| "?".to_string());
        let started = Instant::now();

        let response = self.process_command(value).await;
        stream.write_all(&response.encode()).await?;

        let outcome = if let Value::Error(_) = response { " (error)" } else { "" };
        info!("[{}] {} {:?}{}", peer_addr, name, started.elapsed(), outcome);
      }

      if pending.len() > self.max_pending {
        warn!(
          "Dropping {}: {} unparsed bytes exceed limit of {}",
          peer_addr,
          pending.len(),
          self.max_pending
        );
        let reply = Value::error("ERR Protocol error: request too large");
        stream.write_all(&reply.encode()).await?;
        return Ok(());
      }
    }

    info!("Connection handler ended for {}", peer_addr);
    Ok(())
  }

  /// Accept and process connections until `shutdown` resolves.
  ///
  /// Returns once every open connection has been closed, so no command can
  /// touch the store after this future completes.
  pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
    info!("Server started, listening on {}", self.local_addr);
    tokio::pin!(shutdown);

    let (closing_tx, closing_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    loop {
      tokio::select! {
        _ = &mut shutdown => {
          info!("Shutdown requested, no longer accepting connections");
          break;
        }
        accepted = self.listener.accept() => match accepted {
          Ok((stream, peer_addr)) => {
            info!("New connection accepted from {}", peer_addr);

            let server = Arc::clone(&self);
            let closing = closing_rx.clone();

            // Spawn an independent task for each connection
            connections.spawn(async move {
              if let Err(e) = server.handle_connection(stream, peer_addr, closing).await {
                error!("Error handling connection from {}: {}", peer_addr, e);
              }
            });
          }
          Err(e) => {
            error!("Failed to accept connection: {}", e);
          }
        },
        Some(finished) = connections.join_next(), if !connections.is_empty() => {
          if let Err(e) = finished {
            error!("Connection task failed: {}", e);
          }
        }
      }
    }

    let _ = closing_tx.send(true);
    info!("Waiting for {} open connections to close", connections.len());
    while let Some(finished) = connections.join_next().await {
      if let Err(e) = finished {
        error!("Connection task failed: {}", e);
      }
    }
  }

  /// Flush the store to the snapshot file when configured to do so.
  ///
  /// Returns the number of entries written, `None` when nothing was saved.
  pub async fn shutdown(&self) -> Result<Option<usize>, StoreError> {
    let path = match (&self.snapshot.path, self.snapshot.save_on_exit) {
      (Some(path), true) => path.clone(),
      _ => return Ok(None),
    };

    let store = Arc::clone(&self.store);
    let count = tokio::task::spawn_blocking(move || snapshot::save(&store, &path)).await??;

    info!("Saved {} entries on shutdown", count);
    Ok(Some(count))
  }
}
