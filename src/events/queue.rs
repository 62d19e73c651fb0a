use tokio::sync::mpsc;

use crate::store::{StoreCommand, StoreSink};

/// Bounded channel carrying store writes from the engine to the store
/// worker. Emission is fire-and-forget: the engine never waits for the
/// store's round-trip.
#[derive(Clone)]
pub struct StoreBus {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreBus {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<StoreCommand>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

impl StoreSink for StoreBus {
    fn commit(&self, command: StoreCommand) -> Result<(), String> {
        self.tx
            .try_send(command)
            .map_err(|err| format!("store bus unavailable: {}", err))
    }
}
