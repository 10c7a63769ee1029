use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::mpsc,
    thread::JoinHandle,
    time::Duration,
};

use anyhow::Context;
use autopilot::{TelemetryError, TelemetrySink, TelemetrySnapshot};
use log::{error, info};
use serde::Serialize;

/// Snapshots the recorder buffers before drones start dropping them
const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Serialize)]
pub struct Record {
    pub drone: usize,
    #[serde(flatten)]
    pub snapshot: TelemetrySnapshot,
}

pub enum RecorderCommand {
    Stop,
}

/// Telemetry sink for one drone, feeding the shared recorder queue
pub struct DroneSink {
    drone: usize,
    tx: mpsc::SyncSender<Record>,
}

impl TelemetrySink for DroneSink {
    fn submit(&mut self, snapshot: TelemetrySnapshot) -> Result<(), TelemetryError> {
        let record = Record {
            drone: self.drone,
            snapshot,
        };
        self.tx.try_send(record).map_err(|e| match e {
            mpsc::TrySendError::Full(_) => TelemetryError::QueueFull,
            mpsc::TrySendError::Disconnected(_) => TelemetryError::Disconnected,
        })
    }
}

pub struct RecorderWorker<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> RecorderWorker<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn run(
        mut self,
        records: mpsc::Receiver<Record>,
        to_worker_rx: mpsc::Receiver<RecorderCommand>,
    ) -> usize {
        loop {
            match to_worker_rx.try_recv() {
                Ok(RecorderCommand::Stop) => break,
                Err(mpsc::TryRecvError::Disconnected) => break,
                Err(mpsc::TryRecvError::Empty) => {}
            }

            match records.recv_timeout(Duration::from_millis(50)) {
                Ok(record) => self.write(&record),
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        // Whatever was queued before the stop still gets written
        for record in records.try_iter() {
            self.write(&record);
        }
        if let Err(e) = self.writer.flush() {
            error!("Failed to flush telemetry: {:?}", e);
        }
        self.written
    }

    fn write(&mut self, record: &Record) {
        let result = serde_json::to_writer(&mut self.writer, record)
            .map_err(anyhow::Error::from)
            .and_then(|_| writeln!(self.writer).map_err(anyhow::Error::from));
        match result {
            Ok(()) => self.written += 1,
            Err(e) => error!("Failed to write telemetry record: {:?}", e),
        }
    }
}

/// Background thread that writes telemetry records as JSON lines
pub struct Recorder {
    tx: mpsc::SyncSender<Record>,
    to_worker_tx: Option<mpsc::Sender<RecorderCommand>>,
    worker_thread: Option<JoinHandle<usize>>,
}

impl Recorder {
    pub fn start(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create telemetry file {}", path.display()))?;
        info!("Recording telemetry to {}", path.display());
        Ok(Self::spawn(BufWriter::new(file)))
    }

    pub fn spawn<W: Write + Send + 'static>(writer: W) -> Self {
        let (tx, records) = mpsc::sync_channel(QUEUE_CAPACITY);
        let (to_worker_tx, to_worker_rx) = mpsc::channel();
        let worker = RecorderWorker::new(writer);
        let worker_thread = std::thread::spawn(move || worker.run(records, to_worker_rx));
        Self {
            tx,
            to_worker_tx: Some(to_worker_tx),
            worker_thread: Some(worker_thread),
        }
    }

    pub fn sink(&self, drone: usize) -> DroneSink {
        DroneSink {
            drone,
            tx: self.tx.clone(),
        }
    }

    /// Stop the worker and return how many records it wrote
    pub fn stop(&mut self) -> anyhow::Result<usize> {
        if let Some(tx) = self.to_worker_tx.take() {
            let _ = tx.send(RecorderCommand::Stop);
        }
        match self.worker_thread.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow::anyhow!("Telemetry recorder thread panicked")),
            None => Ok(0),
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("{:?}", e);
        }
    }
}
