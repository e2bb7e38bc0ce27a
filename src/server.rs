use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::connection::Handler;
use crate::lottery::WinnerPredicate;
use crate::sink::SharedSink;
use crate::tally::Tally;

/// Listens for the pool-wide shutdown broadcast. Each worker holds its own
/// receiver and remembers once the signal has been seen.
#[derive(Debug)]
pub struct Shutdown {
    is_shutdown: bool,
    notify: broadcast::Receiver<()>,
}

impl Shutdown {
    pub fn new(notify: broadcast::Receiver<()>) -> Shutdown {
        Shutdown {
            is_shutdown: false,
            notify,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown
    }

    pub async fn recv(&mut self) {
        if self.is_shutdown {
            return;
        }
        let _ = self.notify.recv().await;
        self.is_shutdown = true;
    }
}

/// Worker pool manager: one shared listening socket, a fixed number of
/// equally-privileged accept loops, and the tally they coordinate through.
pub struct Server {
    listener: Arc<TcpListener>,
    workers: usize,
    tally: Arc<Tally>,
    sink: SharedSink,
    predicate: WinnerPredicate,
    client_timeout: Duration,
}

impl Server {
    pub async fn bind(
        addr: &str,
        workers: usize,
        client_timeout: Duration,
        sink: SharedSink,
        predicate: WinnerPredicate,
    ) -> tokio::io::Result<Server> {
        let listener = TcpListener::bind(addr).await?;

        Ok(Server {
            listener: Arc::new(listener),
            workers,
            tally: Arc::new(Tally::new(workers)),
            sink,
            predicate,
            client_timeout,
        })
    }

    pub fn local_addr(&self) -> tokio::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the pool until `shutdown_signal` completes, then stop every worker
    /// and wait for all of them to exit before returning.
    pub async fn run(self, shutdown_signal: impl Future) {
        let (notify_shutdown, _) = broadcast::channel(1);

        let mut workers = Vec::with_capacity(self.workers);
        for slot in 1..=self.workers {
            let worker = Worker {
                slot,
                listener: self.listener.clone(),
                handler: Handler::new(
                    slot,
                    self.tally.clone(),
                    self.sink.clone(),
                    self.predicate.clone(),
                    self.client_timeout,
                ),
                shutdown: Shutdown::new(notify_shutdown.subscribe()),
            };
            workers.push(tokio::spawn(worker.run()));
        }
        info!(workers = self.workers, "worker pool started");

        shutdown_signal.await;
        info!("shutdown requested, stopping workers");

        // Reaches every worker at its suspension point, whether it is parked
        // in accept or mid-connection. In-flight batches are dropped abruptly;
        // clients are expected to retry.
        let _ = notify_shutdown.send(());
        for worker in workers {
            let _ = worker.await;
        }
        info!("all workers stopped");
    }
}

struct Worker {
    slot: usize,
    listener: Arc<TcpListener>,
    handler: Handler,
    shutdown: Shutdown,
}

impl Worker {
    async fn run(mut self) {
        while !self.shutdown.is_shutdown() {
            let stream = tokio::select! {
                _ = self.shutdown.recv() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(worker = self.slot, %peer, "accepted connection");
                        stream
                    }
                    Err(err) => {
                        warn!(worker = self.slot, "accept failed: {err}");
                        continue;
                    }
                },
            };

            self.serve(stream).await;
        }

        info!(worker = self.slot, "worker stopped");
    }

    // Handle one connection to completion, unless shutdown cuts it short.
    // Dropping the stream on either path closes the socket.
    async fn serve(&mut self, stream: TcpStream) {
        tokio::select! {
            _ = self.shutdown.recv() => {}
            result = self.handler.run(stream) => match result {
                Ok(()) => info!(worker = self.slot, "connection closed"),
                Err(err) => warn!(worker = self.slot, "connection aborted: {err}"),
            }
        }
    }
}
