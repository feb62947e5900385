//! Catalog loader worker.
//!
//! Fetches run on a dedicated thread so the session loop never blocks on the
//! network. Requests are served in the order issued; each response carries
//! the sequence number of its request so the session can tell whether a
//! newer request has superseded it.

use crate::app::SessionEvent;
use crossbeam_channel::{Receiver, Sender};
use parcel_geo::{Catalog, CatalogSource, GeoError};
use parcel_ledger::NeighborhoodId;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A request for one neighborhood's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Monotonically increasing per session.
    pub seq: u64,
    pub neighborhood: NeighborhoodId,
}

/// Outcome of a [`FetchRequest`].
#[derive(Debug)]
pub struct CatalogResponse {
    pub seq: u64,
    pub neighborhood: NeighborhoodId,
    pub result: Result<Catalog, GeoError>,
    /// Time spent fetching and decoding.
    pub elapsed: Duration,
}

/// Commands sent to the loader thread.
#[derive(Debug)]
pub enum LoaderCommand {
    Fetch(FetchRequest),
    Shutdown,
}

/// Handle for the loader thread.
pub struct LoaderHandle {
    cmd_tx: Sender<LoaderCommand>,
    thread: JoinHandle<()>,
}

impl LoaderHandle {
    /// Queue a fetch. Returns `false` if the loader has exited.
    pub fn request(&self, request: FetchRequest) -> bool {
        self.cmd_tx.send(LoaderCommand::Fetch(request)).is_ok()
    }

    /// Stop the loader after the fetch in progress and wait for it.
    pub fn shutdown(self) {
        let _ = self.cmd_tx.send(LoaderCommand::Shutdown);
        let _ = self.thread.join();
    }
}

/// Spawn the loader thread. Responses are delivered on `event_tx`.
pub fn spawn_loader(
    source: Arc<dyn CatalogSource>,
    event_tx: Sender<SessionEvent>,
) -> std::io::Result<LoaderHandle> {
    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
    let thread = thread::Builder::new()
        .name("catalog-loader".to_string())
        .spawn(move || loader_main(source, cmd_rx, event_tx))?;
    Ok(LoaderHandle { cmd_tx, thread })
}

/// Serve fetch requests until shut down or the session goes away.
fn loader_main(
    source: Arc<dyn CatalogSource>,
    cmd_rx: Receiver<LoaderCommand>,
    event_tx: Sender<SessionEvent>,
) {
    debug!(source = %source.describe(), "catalog loader started");
    while let Ok(cmd) = cmd_rx.recv() {
        let request = match cmd {
            LoaderCommand::Fetch(request) => request,
            LoaderCommand::Shutdown => break,
        };

        trace!(seq = request.seq, neighborhood = %request.neighborhood, "fetching catalog");
        let start = Instant::now();
        let result = source.fetch(&request.neighborhood);
        let response = CatalogResponse {
            seq: request.seq,
            neighborhood: request.neighborhood,
            result,
            elapsed: start.elapsed(),
        };

        if event_tx.send(SessionEvent::CatalogArrived(response)).is_err() {
            break;
        }
    }
    debug!("catalog loader stopped");
}
