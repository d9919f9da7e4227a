//! Minimal TCP client for the search service.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::SearchError;
use crate::search::protocol::SearchQuery;

/// Send a single query to `addr` and return the server's response text.
pub async fn send_query(addr: &str, query: &SearchQuery) -> Result<String, SearchError> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(query.to_wire().as_bytes()).await?;
    stream.shutdown().await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}
