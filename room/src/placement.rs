//! Object placement: asynchronous model loads and the placed-object set.
//!
//! DESIGN
//! ======
//! Each selection becomes a Tokio task that resolves the reference through the
//! [`ModelRepository`] and loads it through the [`AssetLoader`]. Tasks never
//! touch scene state. They post a completion onto a channel, and the render
//! thread drains that channel in [`PlacementManager::poll`], which is the only
//! place objects are inserted.
//!
//! CANCELLATION
//! ============
//! Every completion carries the epoch it was started in. [`teardown`] aborts
//! all in-flight tasks and bumps the epoch, so a load that finishes after its
//! scene was torn down is dropped instead of inserted. Aborted tickets are also
//! removed from the in-flight table, which filters a completion that raced the
//! abort.
//!
//! [`teardown`]: PlacementManager::teardown

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::assets::{AssetLoader, ModelAsset, ModelRef, ModelRepository};
use crate::config::LoadPolicy;
use crate::error::AssetError;
use crate::objects::{ObjectId, ObjectStore, PlacedObject};

/// Handle for one model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

/// Outcome of a finished load, reported on the render thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementEvent {
    /// The model was added to the scene. `replaced` lists objects removed to make room.
    Placed { ticket: LoadTicket, id: ObjectId, reference: ModelRef, replaced: Vec<ObjectId> },
    /// The load failed; nothing was added.
    Failed { ticket: LoadTicket, reference: ModelRef, error: AssetError },
}

struct Completion {
    ticket: LoadTicket,
    epoch: u64,
    reference: ModelRef,
    result: Result<ModelAsset, AssetError>,
}

struct InFlight {
    reference: ModelRef,
    task: AbortHandle,
}

/// Scale that maps the model's vertical extent to `target_height`.
///
/// # Errors
///
/// Returns [`AssetError::DegenerateBounds`] when the model is flat or its bounds are not finite.
pub fn normalize_scale(asset: &ModelAsset, target_height: f64) -> Result<f64, AssetError> {
    let height = asset.height();
    if !(height.is_finite() && height > 0.0) {
        return Err(AssetError::DegenerateBounds { height });
    }
    Ok(target_height / height)
}

pub struct PlacementManager {
    repository: Arc<dyn ModelRepository>,
    loader: Arc<dyn AssetLoader>,
    policy: LoadPolicy,
    target_height: f64,
    objects: ObjectStore,
    in_flight: HashMap<LoadTicket, InFlight>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    /// Failures known at request time, reported by the next poll.
    rejected: Vec<PlacementEvent>,
    epoch: u64,
    next_ticket: u64,
}

impl PlacementManager {
    #[must_use]
    pub fn new(
        repository: Arc<dyn ModelRepository>,
        loader: Arc<dyn AssetLoader>,
        policy: LoadPolicy,
        target_height: f64,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            repository,
            loader,
            policy,
            target_height,
            objects: ObjectStore::new(),
            in_flight: HashMap::new(),
            tx,
            rx,
            rejected: Vec::new(),
            epoch: 0,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    #[must_use]
    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectStore {
        &mut self.objects
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start loading `reference` on the current Tokio runtime.
    ///
    /// Outside a runtime nothing is spawned; the next [`poll`](Self::poll)
    /// reports [`AssetError::NoRuntime`] for the returned ticket.
    pub fn request(&mut self, reference: ModelRef) -> LoadTicket {
        if self.policy == LoadPolicy::CancelPrevious {
            self.cancel_all();
        }

        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;

        let Ok(runtime) = Handle::try_current() else {
            warn!(ticket = ticket.0, reference = %reference, "model load requested outside a runtime");
            self.rejected.push(PlacementEvent::Failed { ticket, reference, error: AssetError::NoRuntime });
            return ticket;
        };

        let repository = Arc::clone(&self.repository);
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let epoch = self.epoch;
        let task_ref = reference.clone();

        let handle = runtime.spawn(async move {
            let result = fetch(repository.as_ref(), loader.as_ref(), &task_ref).await;
            let completion = Completion { ticket, epoch, reference: task_ref, result };
            if tx.send(completion).is_err() {
                debug!(ticket = ticket.0, "placement manager gone; load result dropped");
            }
        });

        info!(ticket = ticket.0, reference = %reference, "model load started");
        self.in_flight.insert(ticket, InFlight { reference, task: handle.abort_handle() });
        ticket
    }

    /// Abort one in-flight load. Returns whether it was still pending.
    pub fn cancel(&mut self, ticket: LoadTicket) -> bool {
        let Some(flight) = self.in_flight.remove(&ticket) else {
            return false;
        };
        flight.task.abort();
        debug!(ticket = ticket.0, reference = %flight.reference, "model load cancelled");
        true
    }

    fn cancel_all(&mut self) {
        for (ticket, flight) in self.in_flight.drain() {
            flight.task.abort();
            debug!(ticket = ticket.0, reference = %flight.reference, "model load cancelled");
        }
    }

    /// Apply every completion that has arrived. Call once per frame on the render thread.
    pub fn poll(&mut self) -> Vec<PlacementEvent> {
        let mut events = std::mem::take(&mut self.rejected);
        while let Ok(completion) = self.rx.try_recv() {
            events.extend(self.complete(completion));
        }
        events
    }

    /// Wait until no load is in flight, applying completions as they arrive.
    pub async fn settle(&mut self) -> Vec<PlacementEvent> {
        let mut events = self.poll();
        while self.is_loading() {
            let Some(completion) = self.rx.recv().await else {
                break;
            };
            events.extend(self.complete(completion));
        }
        events
    }

    fn complete(&mut self, completion: Completion) -> Option<PlacementEvent> {
        let Completion { ticket, epoch, reference, result } = completion;
        if epoch != self.epoch {
            debug!(ticket = ticket.0, epoch, current = self.epoch, "stale load dropped after teardown");
            return None;
        }
        if self.in_flight.remove(&ticket).is_none() {
            debug!(ticket = ticket.0, "cancelled load dropped");
            return None;
        }

        let placed = result.and_then(|asset| {
            let scale = normalize_scale(&asset, self.target_height)?;
            Ok((asset, scale))
        });

        match placed {
            Ok((asset, scale)) => {
                let replaced = if self.policy == LoadPolicy::SingleActive {
                    let ids = self.objects.ids();
                    self.objects.clear();
                    ids
                } else {
                    Vec::new()
                };
                let obj = PlacedObject::new(reference.clone(), Arc::new(asset), scale);
                let id = self.objects.insert(obj);
                info!(ticket = ticket.0, %id, reference = %reference, scale, "model placed");
                Some(PlacementEvent::Placed { ticket, id, reference, replaced })
            }
            Err(error) => {
                warn!(ticket = ticket.0, reference = %reference, error = %error, code = error.error_code(), "model load failed");
                Some(PlacementEvent::Failed { ticket, reference, error })
            }
        }
    }

    /// Remove a placed object.
    pub fn remove(&mut self, id: &ObjectId) -> Option<PlacedObject> {
        self.objects.remove(id)
    }

    /// Abort every load, forget every object, and invalidate late completions.
    pub fn teardown(&mut self) {
        let (loads, objects) = (self.in_flight.len(), self.objects.len());
        self.cancel_all();
        self.rejected.clear();
        self.objects.clear();
        self.epoch += 1;
        info!(loads, objects, epoch = self.epoch, "placement torn down");
    }
}

async fn fetch(
    repository: &dyn ModelRepository,
    loader: &dyn AssetLoader,
    reference: &ModelRef,
) -> Result<ModelAsset, AssetError> {
    let location = repository.resolve(reference).await?;
    loader.load(&location).await
}
