#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use async_trait::async_trait;
use glam::DVec3;
use tokio::sync::Notify;

use super::*;
use crate::geom::Aabb;

// =============================================================
// Mocks
// =============================================================

/// Resolves every reference to `mem://<ref>` except `missing`.
struct MockRepo;

#[async_trait]
impl ModelRepository for MockRepo {
    async fn resolve(&self, reference: &ModelRef) -> Result<String, AssetError> {
        if reference.as_str() == "missing" {
            return Err(AssetError::Resolve { reference: reference.0.clone(), reason: "404".into() });
        }
        Ok(format!("mem://{reference}"))
    }
}

/// Serves boxes of a fixed height per location; gated locations wait for a release.
#[derive(Default)]
struct MockLoader {
    heights: HashMap<String, f64>,
    gates: HashMap<String, Arc<Notify>>,
}

impl MockLoader {
    fn with(mut self, reference: &str, height: f64) -> Self {
        self.heights.insert(format!("mem://{reference}"), height);
        self
    }

    fn gated(mut self, reference: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(format!("mem://{reference}"), gate);
        self
    }
}

#[async_trait]
impl AssetLoader for MockLoader {
    async fn load(&self, location: &str) -> Result<ModelAsset, AssetError> {
        if let Some(gate) = self.gates.get(location) {
            gate.notified().await;
        }
        let height = self
            .heights
            .get(location)
            .copied()
            .ok_or_else(|| AssetError::Fetch { location: location.into(), reason: "no such blob".into() })?;
        Ok(box_asset(location, height))
    }
}

fn box_asset(source: &str, height: f64) -> ModelAsset {
    ModelAsset {
        source: source.into(),
        bounds: Aabb::new(DVec3::new(-1.0, 0.0, -1.0), DVec3::new(1.0, height, 1.0)),
        primitive_count: 1,
    }
}

fn manager(loader: MockLoader, policy: LoadPolicy) -> PlacementManager {
    PlacementManager::new(Arc::new(MockRepo), Arc::new(loader), policy, 100.0)
}

fn placed_ids(events: &[PlacementEvent]) -> Vec<ObjectId> {
    events
        .iter()
        .filter_map(|e| match e {
            PlacementEvent::Placed { id, .. } => Some(*id),
            PlacementEvent::Failed { .. } => None,
        })
        .collect()
}

// =============================================================
// normalize_scale
// =============================================================

#[test]
fn scale_maps_height_to_target() {
    assert_eq!(normalize_scale(&box_asset("a", 2.0), 100.0).unwrap(), 50.0);
    assert_eq!(normalize_scale(&box_asset("a", 400.0), 100.0).unwrap(), 0.25);
}

#[test]
fn flat_model_has_degenerate_bounds() {
    let err = normalize_scale(&box_asset("a", 0.0), 100.0).unwrap_err();
    assert_eq!(err, AssetError::DegenerateBounds { height: 0.0 });
}

#[test]
fn non_finite_height_has_degenerate_bounds() {
    let asset = ModelAsset { source: "a".into(), bounds: Aabb::empty(), primitive_count: 0 };
    assert!(matches!(normalize_scale(&asset, 100.0), Err(AssetError::DegenerateBounds { .. })));
}

// =============================================================
// Loading
// =============================================================

#[tokio::test]
async fn load_places_normalized_object_at_origin() {
    let mut pm = manager(MockLoader::default().with("chair", 4.0), LoadPolicy::Append);
    let ticket = pm.request(ModelRef::new("chair"));
    assert!(pm.is_loading());

    let events = pm.settle().await;
    let [PlacementEvent::Placed { ticket: t, id, reference, replaced }] = events.as_slice() else {
        panic!("expected one placement, got {events:?}");
    };
    assert_eq!(*t, ticket);
    assert_eq!(reference.as_str(), "chair");
    assert!(replaced.is_empty());

    let obj = pm.objects().get(id).unwrap();
    assert_eq!(obj.scale, 25.0);
    assert_eq!(obj.position, DVec3::ZERO);
    assert!((obj.world_box().size().y - 100.0).abs() < 1e-9);
    assert!(!pm.is_loading());
}

#[tokio::test]
async fn unresolvable_reference_reports_failure() {
    let mut pm = manager(MockLoader::default(), LoadPolicy::Append);
    pm.request(ModelRef::new("missing"));
    let events = pm.settle().await;
    let [PlacementEvent::Failed { error, .. }] = events.as_slice() else {
        panic!("expected a failure, got {events:?}");
    };
    assert_eq!(error.error_code(), "E_ASSET_RESOLVE");
    assert!(pm.objects().is_empty());
}

#[test]
fn request_outside_runtime_reports_failure_on_poll() {
    let mut pm = manager(MockLoader::default().with("chair", 1.0), LoadPolicy::Append);
    let ticket = pm.request(ModelRef::new("chair"));

    assert!(!pm.is_loading());
    let events = pm.poll();
    assert_eq!(
        events,
        vec![PlacementEvent::Failed { ticket, reference: ModelRef::new("chair"), error: AssetError::NoRuntime }]
    );
    assert!(pm.poll().is_empty());
    assert!(pm.objects().is_empty());
}

#[test]
fn teardown_discards_unreported_runtime_failures() {
    let mut pm = manager(MockLoader::default(), LoadPolicy::Append);
    pm.request(ModelRef::new("chair"));
    pm.teardown();
    assert!(pm.poll().is_empty());
}

#[tokio::test]
async fn fetch_failure_reports_failure() {
    let mut pm = manager(MockLoader::default(), LoadPolicy::Append);
    pm.request(ModelRef::new("ghost"));
    let events = pm.settle().await;
    assert!(matches!(events.as_slice(), [PlacementEvent::Failed { error: AssetError::Fetch { .. }, .. }]));
}

#[tokio::test]
async fn flat_model_is_not_placed() {
    let mut pm = manager(MockLoader::default().with("rug", 0.0), LoadPolicy::Append);
    pm.request(ModelRef::new("rug"));
    let events = pm.settle().await;
    assert!(matches!(events.as_slice(), [PlacementEvent::Failed { error: AssetError::DegenerateBounds { .. }, .. }]));
    assert!(pm.objects().is_empty());
}

#[tokio::test]
async fn poll_before_completion_is_empty() {
    let gate = Arc::new(Notify::new());
    let mut pm = manager(MockLoader::default().with("lamp", 1.0).gated("lamp", Arc::clone(&gate)), LoadPolicy::Append);
    pm.request(ModelRef::new("lamp"));
    assert!(pm.poll().is_empty());
    gate.notify_one();
    assert_eq!(placed_ids(&pm.settle().await).len(), 1);
}

// =============================================================
// Policies
// =============================================================

#[tokio::test]
async fn append_keeps_every_object() {
    let mut pm = manager(MockLoader::default().with("a", 1.0).with("b", 2.0), LoadPolicy::Append);
    pm.request(ModelRef::new("a"));
    pm.request(ModelRef::new("b"));
    let events = pm.settle().await;
    assert_eq!(placed_ids(&events).len(), 2);
    assert_eq!(pm.objects().len(), 2);
}

#[tokio::test]
async fn single_active_replaces_previous_object() {
    let mut pm = manager(MockLoader::default().with("a", 1.0).with("b", 2.0), LoadPolicy::SingleActive);
    pm.request(ModelRef::new("a"));
    let first = placed_ids(&pm.settle().await);
    pm.request(ModelRef::new("b"));
    let events = pm.settle().await;

    let [PlacementEvent::Placed { id, replaced, .. }] = events.as_slice() else {
        panic!("expected one placement, got {events:?}");
    };
    assert_eq!(replaced, &first);
    assert_eq!(pm.objects().ids(), vec![*id]);
}

#[tokio::test]
async fn cancel_previous_keeps_only_newest() {
    let gate = Arc::new(Notify::new());
    let loader = MockLoader::default().with("slow", 1.0).with("fast", 2.0).gated("slow", Arc::clone(&gate));
    let mut pm = manager(loader, LoadPolicy::CancelPrevious);

    pm.request(ModelRef::new("slow"));
    pm.request(ModelRef::new("fast"));
    assert_eq!(pm.in_flight(), 1);
    gate.notify_one();

    let events = pm.settle().await;
    let [PlacementEvent::Placed { reference, .. }] = events.as_slice() else {
        panic!("expected one placement, got {events:?}");
    };
    assert_eq!(reference.as_str(), "fast");
    assert_eq!(pm.objects().len(), 1);
}

// =============================================================
// Cancellation and teardown
// =============================================================

#[tokio::test]
async fn cancel_drops_pending_load() {
    let gate = Arc::new(Notify::new());
    let mut pm = manager(MockLoader::default().with("a", 1.0).gated("a", Arc::clone(&gate)), LoadPolicy::Append);
    let ticket = pm.request(ModelRef::new("a"));
    assert!(pm.cancel(ticket));
    assert!(!pm.cancel(ticket));
    gate.notify_one();
    assert!(pm.settle().await.is_empty());
    assert!(pm.objects().is_empty());
}

#[tokio::test]
async fn teardown_discards_objects_and_late_loads() {
    let gate = Arc::new(Notify::new());
    let loader = MockLoader::default().with("a", 1.0).with("b", 1.0).gated("b", Arc::clone(&gate));
    let mut pm = manager(loader, LoadPolicy::Append);

    pm.request(ModelRef::new("a"));
    pm.settle().await;
    pm.request(ModelRef::new("b"));
    pm.teardown();
    gate.notify_one();
    tokio::task::yield_now().await;

    assert!(pm.poll().is_empty());
    assert!(pm.objects().is_empty());
    assert!(!pm.is_loading());
}

#[tokio::test]
async fn remove_deletes_object() {
    let mut pm = manager(MockLoader::default().with("a", 1.0), LoadPolicy::Append);
    pm.request(ModelRef::new("a"));
    let ids = placed_ids(&pm.settle().await);
    assert!(pm.remove(&ids[0]).is_some());
    assert!(pm.remove(&ids[0]).is_none());
}
