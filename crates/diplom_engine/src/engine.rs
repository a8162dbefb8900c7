use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use diplom_logging::{diplom_debug, diplom_info, diplom_warn};
use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::GenerationService;
use crate::filename::document_filename;
use crate::persist::DocumentWriter;
use crate::{ClientError, DocumentRequest, EngineEvent, FailureKind, ItemKind, MutationOp, RunEpoch};

/// Runs service calls as tokio tasks and reports their outcome as [`EngineEvent`]s.
pub struct EngineHandle {
    service: Arc<dyn GenerationService>,
    writer: DocumentWriter,
    runtime: Handle,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    generation: Option<CancellationToken>,
    in_flight: Arc<AtomicUsize>,
}

/// Counts a spawned task as in flight until dropped.
struct TaskGuard(Arc<AtomicUsize>);

impl TaskGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl EngineHandle {
    pub fn new(service: Arc<dyn GenerationService>, download_dir: PathBuf, runtime: Handle) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            service,
            writer: DocumentWriter::new(download_dir),
            runtime,
            event_tx,
            event_rx,
            generation: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Starts streaming a run. Any previous generation loop is cancelled first.
    pub fn start_generation(&mut self, epoch: RunEpoch, topic: String) {
        self.cancel_generation();
        let token = CancellationToken::new();
        self.generation = Some(token.clone());

        let service = self.service.clone();
        let event_tx = self.event_tx.clone();
        let guard = TaskGuard::new(&self.in_flight);
        self.runtime.spawn(async move {
            let _guard = guard;
            let result = tokio::select! {
                _ = token.cancelled() => Err(ClientError::new(
                    FailureKind::Cancelled,
                    "superseded by a newer run",
                )),
                result = stream_records(service.as_ref(), epoch, &topic, &event_tx) => result,
            };
            let _ = event_tx.send(EngineEvent::GenerationFinished { epoch, result });
        });
    }

    pub fn cancel_generation(&mut self) {
        if let Some(token) = self.generation.take() {
            token.cancel();
        }
    }

    pub fn mutate(&self, epoch: RunEpoch, id: String, kind: ItemKind, op: MutationOp) {
        let service = self.service.clone();
        let event_tx = self.event_tx.clone();
        let guard = TaskGuard::new(&self.in_flight);
        self.runtime.spawn(async move {
            let _guard = guard;
            let result = service.mutate(op, &id, kind).await;
            if let Err(err) = &result {
                diplom_warn!("{:?} of {} failed: {}", op, id, err);
            }
            let _ = event_tx.send(EngineEvent::MutationFinished {
                epoch,
                id,
                op,
                result,
            });
        });
    }

    pub fn schedule_settle(&self, epoch: RunEpoch, delay: Duration) {
        let event_tx = self.event_tx.clone();
        let guard = TaskGuard::new(&self.in_flight);
        self.runtime.spawn(async move {
            let _guard = guard;
            tokio::time::sleep(delay).await;
            let _ = event_tx.send(EngineEvent::SettleElapsed { epoch });
        });
    }

    /// Requests the document and saves it into the download directory.
    pub fn build_document(&self, request: DocumentRequest) {
        let service = self.service.clone();
        let writer = self.writer.clone();
        let event_tx = self.event_tx.clone();
        let guard = TaskGuard::new(&self.in_flight);
        self.runtime.spawn(async move {
            let _guard = guard;
            let result = save_document(service.as_ref(), writer, &request).await;
            let _ = event_tx.send(EngineEvent::DocumentSaved { result });
        });
    }

    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits for the next event.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel_generation();
    }
}

async fn stream_records(
    service: &dyn GenerationService,
    epoch: RunEpoch,
    topic: &str,
    event_tx: &mpsc::UnboundedSender<EngineEvent>,
) -> Result<(), ClientError> {
    let mut records = service.generate(topic).await?;
    let mut count = 0usize;
    while let Some(record) = records.next().await {
        let record = record?;
        count += 1;
        diplom_debug!("run {} record {} kind={:?} id={}", epoch, count, record.kind, record.id);
        let _ = event_tx.send(EngineEvent::RecordReceived { epoch, record });
    }
    diplom_info!("run {} finished with {} records", epoch, count);
    Ok(())
}

async fn save_document(
    service: &dyn GenerationService,
    writer: DocumentWriter,
    request: &DocumentRequest,
) -> Result<PathBuf, ClientError> {
    let payload = service.build_document(request).await?;
    let filename = document_filename(payload.content_disposition.as_deref());
    let len = payload.bytes.len();

    let path = tokio::task::spawn_blocking(move || writer.save(&filename, &payload.bytes))
        .await
        .map_err(|err| ClientError::new(FailureKind::Persist, err.to_string()))?
        .map_err(|err| ClientError::new(FailureKind::Persist, err.to_string()))?;
    diplom_info!("document saved to {} ({} bytes)", path.display(), len);
    Ok(path)
}
