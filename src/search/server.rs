//! TCP search server.
//!
//! Accepts one query per connection, runs it against the on-disk index and
//! writes the formatted response back before closing the socket.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::error::SearchError;
use crate::index::Index;
use crate::search::protocol::{format_results, SearchQuery, INVALID_QUERY};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

const MAX_QUERY_BYTES: usize = 1024;

/// Serves search queries over TCP using a loaded index.
pub struct SearchServer {
    index: Arc<Index>,
}

impl SearchServer {
    pub fn new(index: Index) -> Self {
        Self {
            index: Arc::new(index),
        }
    }

    /// Accept connections on `listener` until the task is cancelled.
    pub async fn serve(self, listener: TcpListener) -> Result<(), SearchError> {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(error) => {
                    warn!(%error, "Failed to accept connection");
                    continue;
                }
            };
            let index = Arc::clone(&self.index);
            tokio::spawn(async move {
                if let Err(error) = handle_connection(stream, &index).await {
                    warn!(%peer, %error, "Connection handling failed");
                }
            });
        }
    }
}

async fn handle_connection(mut stream: TcpStream, index: &Index) -> Result<(), SearchError> {
    let peer = stream.peer_addr()?;
    let mut buffer = vec![0u8; MAX_QUERY_BYTES];
    let read = stream.read(&mut buffer).await?;
    let raw = String::from_utf8_lossy(&buffer[..read]);

    let response = match SearchQuery::parse(&raw) {
        None => INVALID_QUERY.to_string(),
        Some(query) => {
            info!(
                %peer,
                album = %query.album,
                artist = %query.artist,
                "Search query"
            );
            match index.lookup(&query.album, &query.artist, query.song.as_deref()) {
                Ok(hits) => format_results(&hits),
                Err(error) => format!("Error: {}", error),
            }
        }
    };

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
