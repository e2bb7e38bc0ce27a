use std::future::Future;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::lottery::WinnerPredicate;
use crate::protocol::contestant::Contestant;
use crate::protocol::deserializer::{Deserialize, DeserializeError};
use crate::protocol::message::{request_type, BatchResponse, ResultsResponse};
use crate::protocol::serializer::{Serialize, SerializeError};
use crate::sink::SharedSink;
use crate::tally::Tally;

#[derive(thiserror::Error, Debug)]
pub enum ConnectionError {
    #[error("{0}")]
    Io(#[from] tokio::io::Error),

    #[error("client stalled past the timeout")]
    Timeout,

    #[error("unknown request type: {0:#04x}")]
    UnknownRequestType(u8),

    #[error("malformed request: {0}")]
    BadProtocol(DeserializeError),

    #[error("{0}")]
    Serialize(#[from] SerializeError),

    #[error("failed to persist winners: {0}")]
    Sink(std::io::Error),
}

impl From<DeserializeError> for ConnectionError {
    fn from(err: DeserializeError) -> Self {
        // Socket trouble mid-frame is a connection problem, not a client lying
        // about the protocol.
        match err {
            DeserializeError::Io(err) => Self::Io(err),
            err => Self::BadProtocol(err),
        }
    }
}

/// Per-connection protocol state machine. One worker owns one handler and
/// drives every connection it accepts through it, start to finish.
pub struct Handler {
    slot: usize,
    tally: Arc<Tally>,
    sink: SharedSink,
    predicate: WinnerPredicate,
    client_timeout: Duration,
}

impl Handler {
    pub fn new(
        slot: usize,
        tally: Arc<Tally>,
        sink: SharedSink,
        predicate: WinnerPredicate,
        client_timeout: Duration,
    ) -> Self {
        Self {
            slot,
            tally,
            sink,
            predicate,
            client_timeout,
        }
    }

    /// Serve requests on one connection until the client closes it or a
    /// request fails. The socket is dropped (closed) on return either way.
    pub async fn run(&self, mut stream: TcpStream) -> Result<(), ConnectionError> {
        let (reader, writer) = stream.split();
        let mut reader = BufReader::new(reader);
        let mut writer = BufWriter::new(writer);

        loop {
            let ty = match self.bounded(reader.read_u8()).await {
                Ok(ty) => ty,
                // EOF at a request boundary is the client hanging up normally
                Err(ConnectionError::Io(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(())
                }
                Err(err) => return Err(err),
            };

            match ty {
                request_type::BATCH => self.handle_batch(&mut reader, &mut writer).await?,
                request_type::RESULTS => self.handle_results(&mut writer).await?,
                other => return Err(ConnectionError::UnknownRequestType(other)),
            }
        }
    }

    /// BATCH flow: evaluate the submitted contestants, persist the winners,
    /// answer with them, then fold their count into the shared total. The
    /// slot's processing flag spans the whole flow and is cleared by the
    /// guard on every exit path, so a failed batch can never wedge the
    /// global waiting count.
    async fn handle_batch<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<(), ConnectionError>
    where
        R: AsyncReadExt + Unpin + Send,
        W: AsyncWriteExt + Unpin + Send,
    {
        let _guard = self.tally.begin_processing(self.slot);

        // One timeout window per frame, so a large batch from a slow agency
        // is fine as long as each record keeps arriving.
        let count = self.bounded(reader.read_u16()).await?;
        let mut contestants = Vec::with_capacity(count as usize);
        for _ in 0..count {
            contestants.push(self.bounded(Contestant::deserialize(reader)).await?);
        }
        let submitted = contestants.len();

        let winners: Vec<Contestant> = contestants
            .into_iter()
            .filter(|contestant| (self.predicate)(contestant))
            .collect();

        if !winners.is_empty() {
            let mut sink = self.sink.lock().unwrap();
            sink.append(&winners).map_err(ConnectionError::Sink)?;
        }

        let response = BatchResponse { winners };
        self.bounded(response.serialize(writer)).await?;
        self.bounded(writer.flush()).await?;

        // Counted only after the append above, so a RESULTS reader never sees
        // a total exceeding the persisted record set.
        self.tally.add_winners(response.winners.len() as u32);

        tracing::info!(
            worker = self.slot,
            submitted,
            winners = response.winners.len(),
            "processed batch"
        );

        Ok(())
    }

    /// RESULTS flow: read-only snapshot of the tally. Final only when no slot
    /// is mid-batch; otherwise the client gets the waiting count and a
    /// tentative total to poll against.
    async fn handle_results<W>(&self, writer: &mut W) -> Result<(), ConnectionError>
    where
        W: AsyncWriteExt + Unpin + Send,
    {
        let snapshot = self.tally.snapshot();

        let response = match snapshot.waiting {
            0 => ResultsResponse::Final {
                total_winners: snapshot.total_winners,
            },
            waiting => ResultsResponse::Pending {
                waiting,
                total_winners: snapshot.total_winners,
            },
        };

        self.bounded(response.serialize(writer)).await?;
        self.bounded(writer.flush()).await?;

        Ok(())
    }

    // Bound every socket operation, reads and writes alike, so a stalled
    // client cannot hold a worker (and its processing flag) forever.
    async fn bounded<F, T, E>(&self, operation: F) -> Result<T, ConnectionError>
    where
        F: Future<Output = Result<T, E>>,
        ConnectionError: From<E>,
    {
        match timeout(self.client_timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ConnectionError::Timeout),
        }
    }
}
