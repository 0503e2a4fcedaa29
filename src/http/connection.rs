use std::sync::Arc;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::dispatcher::Dispatcher;
use crate::http::parser::{ParseError, parse_request};
use crate::http::reader::read_available;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Value of the `Keep-Alive` response header.
pub const KEEP_ALIVE_PARAMS: &str = "timeout=15, max=100";

/// Responses served on one connection before it is closed, matching the
/// advertised `max`.
pub const MAX_REQUESTS_PER_CONNECTION: usize = 100;

/// Default cap on the size of a request head.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 8192;

pub struct Connection<S> {
    stream: S,
    dispatcher: Arc<Dispatcher>,
    buffer: BytesMut,
    max_request_bytes: usize,
    served: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

/// Marks `response` as part of a persistent connection.
pub fn enrich_with_keep_alive(response: &mut Response) {
    response.set_header("Connection", "Keep-Alive");
    response.set_header("Keep-Alive", KEEP_ALIVE_PARAMS);
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            stream,
            dispatcher,
            buffer: BytesMut::with_capacity(4096),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            served: 0,
            state: ConnectionState::Reading,
        }
    }

    pub fn with_max_request_bytes(mut self, max_request_bytes: usize) -> Self {
        self.max_request_bytes = max_request_bytes;
        self
    }

    /// Serves requests until the connection is done, then closes the
    /// stream. The stream is shut down here and nowhere else, whether the
    /// exchange finished normally or failed.
    pub async fn run(mut self) -> anyhow::Result<usize> {
        let result = self.serve().await;

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after close failed");
        }

        result.map(|_| self.served)
    }

    async fn serve(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(req) => ConnectionState::Processing(req),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let keep_alive =
                        req.is_keep_alive() && self.served + 1 < MAX_REQUESTS_PER_CONNECTION;

                    match Self::handle_request(Arc::clone(&self.dispatcher), req).await? {
                        Some(mut response) => {
                            if keep_alive {
                                enrich_with_keep_alive(&mut response);
                            }
                            ConnectionState::Writing(ResponseWriter::new(&response), keep_alive)
                        }
                        None => {
                            tracing::debug!("Handler declined to respond, closing");
                            ConnectionState::Closed
                        }
                    }
                }

                ConnectionState::Writing(writer, keep_alive) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .context("failed to write response")?;
                    self.served += 1;
                    tracing::debug!(bytes = writer.len(), keep_alive, "Response written");

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Reads until a full request head is buffered.
    ///
    /// `None` covers every way the connection ends without a request: the
    /// peer closed cleanly, closed mid-request, or sent something that is
    /// not a request. Malformed input gets no response.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            let chunk = read_available(&mut self.stream)
                .await
                .context("failed to read request")?;

            if chunk.is_empty() {
                if !self.buffer.is_empty() {
                    tracing::debug!(buffered = self.buffer.len(), "Peer closed mid-request");
                }
                return Ok(None);
            }

            self.buffer.extend_from_slice(&chunk);

            match parse_request(&self.buffer) {
                Ok(Some(request)) => {
                    // No pipelining: anything after the head is dropped.
                    self.buffer.clear();
                    return Ok(Some(request));
                }

                Ok(None) | Err(ParseError::Incomplete)
                    if self.buffer.len() < self.max_request_bytes =>
                {
                    // Need more data → read again
                }

                Ok(None) | Err(ParseError::Incomplete) => {
                    tracing::warn!(
                        buffered = self.buffer.len(),
                        limit = self.max_request_bytes,
                        "Request head too large, closing"
                    );
                    return Ok(None);
                }

                Err(e) => {
                    tracing::debug!(error = %e, "Malformed request, closing");
                    return Ok(None);
                }
            }
        }
    }

    async fn handle_request(
        dispatcher: Arc<Dispatcher>,
        req: Request,
    ) -> anyhow::Result<Option<Response>> {
        tracing::info!(
            method = req.method.as_deref().unwrap_or(""),
            uri = req.request_uri.as_deref().unwrap_or(""),
            version = req.http_version.as_deref().unwrap_or(""),
            "Request received"
        );

        // Handlers may touch the filesystem; keep them off the async workers.
        let response = tokio::task::spawn_blocking(move || dispatcher.dispatch(&req))
            .await
            .context("request handler panicked")?;

        if let Some(response) = &response {
            tracing::info!(status = response.status.as_u16(), "Response ready");
        }

        Ok(response)
    }
}
