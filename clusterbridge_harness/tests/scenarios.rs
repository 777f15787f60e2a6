// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of a clusterer driving the recording engine.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use clusterbridge_core::child::{ClusteredChild, Presence};
use clusterbridge_core::config::ClustererConfig;
use clusterbridge_core::engine::{ClusterEvent, ClusterEventKind, EventHandler};
use clusterbridge_core::error::SyncError;
use clusterbridge_core::geo::LatLng;
use clusterbridge_core::owner::EventHandlers;
use clusterbridge_core::props::{MarkerImage, MarkerProps, OverlayProps};
use clusterbridge_core::registry::UpdateOutcome;
use clusterbridge_core::{ChildId, ChildKind, Clusterer, Descriptor};
use clusterbridge_harness::{
    Call, ClusterId, EngineProbe, HarnessError, MapView, MarkerHandle, PortalOp,
    RecordingFactory, RecordingPortals,
};

type TestClusterer = Clusterer<RecordingFactory, &'static str, RecordingPortals<&'static str>>;

fn detached_with(config: ClustererConfig) -> (TestClusterer, EngineProbe) {
    let factory = RecordingFactory::new();
    let probe = factory.probe();
    let clusterer = Clusterer::new(factory, config, RecordingPortals::new());
    (clusterer, probe)
}

fn detached() -> (TestClusterer, EngineProbe) {
    detached_with(ClustererConfig::default())
}

fn attached_with(config: ClustererConfig) -> (TestClusterer, EngineProbe) {
    let (mut clusterer, probe) = detached_with(config);
    clusterer.attach(MapView(1)).unwrap();
    probe.take_calls();
    (clusterer, probe)
}

fn attached() -> (TestClusterer, EngineProbe) {
    attached_with(ClustererConfig::default())
}

fn clickable() -> ClustererConfig {
    ClustererConfig::default().with_clickable(true)
}

fn at(lat: f64) -> LatLng {
    LatLng::new(lat, 0.0)
}

fn marker(lat: f64) -> ChildKind<&'static str> {
    ChildKind::Marker(MarkerProps::new(at(lat)))
}

fn overlay(lat: f64, content: &'static str) -> ChildKind<&'static str> {
    ChildKind::overlay(OverlayProps::new(at(lat)), Some(content))
}

fn register(clusterer: &TestClusterer, kind: ChildKind<&'static str>) -> ChildId {
    let registry = clusterer.registry();
    let id = registry.allocate_id();
    registry.register(Descriptor::new(id, kind));
    id
}

fn is_create(call: &Call) -> bool {
    matches!(call, Call::CreateMarker { .. } | Call::CreateOverlay { .. })
}

fn index_of(calls: &[Call], pred: impl Fn(&Call) -> bool) -> Option<usize> {
    calls.iter().position(pred)
}

fn batches(calls: &[Call]) -> (Vec<&Vec<MarkerHandle>>, Vec<&Vec<MarkerHandle>>) {
    let adds = calls
        .iter()
        .filter_map(|c| match c {
            Call::AddMarkers { markers, .. } => Some(markers),
            _ => None,
        })
        .collect();
    let removes = calls
        .iter()
        .filter_map(|c| match c {
            Call::RemoveMarkers { markers, .. } => Some(markers),
            _ => None,
        })
        .collect();
    (adds, removes)
}

// ---------------------------------------------------------------------------
// Queue semantics
// ---------------------------------------------------------------------------

#[test]
fn register_then_unregister_before_flush_touches_nothing() {
    let (mut clusterer, probe) = attached();
    let registry = clusterer.registry();
    let id = register(&clusterer, marker(1.0));
    registry.unregister(id);

    let report = clusterer.commit().expect("a tombstone is pending");
    assert_eq!(report.summary.created, 0);
    assert_eq!(report.summary.removed, 0);
    assert_eq!(
        probe.calls(),
        [Call::Redraw],
        "only the redraw reaches the engine"
    );
    assert!(clusterer.instances().is_empty());
}

#[test]
fn repeated_writes_create_one_instance() {
    let (mut clusterer, probe) = attached();
    let registry = clusterer.registry();
    let id = register(&clusterer, marker(1.0));
    registry.update(id, marker(2.0));
    registry.update(id, marker(3.0));

    clusterer.commit().unwrap();
    let creates: Vec<Call> = probe.calls().into_iter().filter(is_create).collect();
    assert_eq!(creates.len(), 1);
    assert!(
        matches!(&creates[0], Call::CreateMarker { position, .. } if *position == at(3.0)),
        "last write wins: {creates:?}"
    );

    registry.update(id, marker(4.0));
    clusterer.commit().unwrap();
    assert_eq!(
        probe.count(is_create),
        1,
        "live id is updated, not recreated"
    );
    assert_eq!(clusterer.instances().len(), 1);
}

#[test]
fn update_of_unknown_id_behaves_like_register() {
    let (mut by_update, update_probe) = attached();
    let (mut by_register, register_probe) = attached();

    let registry = by_update.registry();
    let id = registry.allocate_id();
    assert_eq!(registry.update(id, marker(5.0)), UpdateOutcome::Registered);
    register(&by_register, marker(5.0));

    by_update.commit().unwrap();
    by_register.commit().unwrap();
    assert_eq!(update_probe.calls(), register_probe.calls());
    assert_eq!(by_update.instances().ids(), [id]);
}

#[test]
fn unregister_of_unknown_id_is_silent() {
    let (mut clusterer, probe) = attached();
    clusterer.registry().unregister(ChildId(999));

    let report = clusterer.commit().unwrap();
    assert!(report.is_clean());
    assert_eq!(probe.calls(), [Call::Redraw]);
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

#[test]
fn structural_changes_are_batched_with_one_redraw() {
    let (mut clusterer, probe) = attached();
    let registry = clusterer.registry();
    let first = register(&clusterer, marker(0.0));
    let second = register(&clusterer, marker(1.0));
    let old = [first, second];
    clusterer.commit().unwrap();
    let old_handles = probe.attached();
    probe.take_calls();

    for i in 0..3 {
        register(&clusterer, marker(10.0 + f64::from(i)));
    }
    for id in &old {
        registry.unregister(*id);
    }
    let report = clusterer.commit().unwrap();

    let calls = probe.calls();
    let (adds, removes) = batches(&calls);
    assert_eq!(adds.len(), 1, "one bulk add: {calls:?}");
    assert_eq!(adds[0].len(), 3);
    assert_eq!(removes.len(), 1, "one bulk remove: {calls:?}");
    assert_eq!(*removes[0], old_handles);
    assert_eq!(probe.count(|c| *c == Call::Redraw), 1);
    assert!(
        calls.iter().all(|c| !matches!(
            c,
            Call::AddMarkers { redraw: true, .. } | Call::RemoveMarkers { redraw: true, .. }
        )),
        "bulk calls never redraw on their own"
    );

    let remove_at = index_of(&calls, |c| matches!(c, Call::RemoveMarkers { .. }));
    let add_at = index_of(&calls, |c| matches!(c, Call::AddMarkers { .. }));
    assert!(remove_at < add_at, "removals go first");
    assert_eq!(calls.last(), Some(&Call::Redraw));

    assert_eq!(report.summary.created, 3);
    assert_eq!(report.summary.removed, 2);
}

#[test]
fn updates_only_skip_bulk_calls() {
    let (mut clusterer, probe) = attached();
    let id = register(&clusterer, marker(1.0));
    clusterer.commit().unwrap();
    probe.take_calls();

    clusterer.registry().update(id, marker(2.0));
    clusterer.commit().unwrap();
    let calls = probe.calls();
    let (adds, removes) = batches(&calls);
    assert!(adds.is_empty());
    assert!(removes.is_empty());
    assert_eq!(probe.count(|c| *c == Call::Redraw), 1);
}

#[test]
fn empty_commit_makes_no_engine_calls() {
    let (mut clusterer, probe) = attached();
    assert!(clusterer.commit().is_none());
    assert!(probe.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Full lifecycle
// ---------------------------------------------------------------------------

#[test]
fn register_update_unregister_round() {
    let (mut clusterer, probe) = attached();
    let registry = clusterer.registry();

    let id = register(&clusterer, marker(1.0));
    clusterer.commit().unwrap();
    assert_eq!(clusterer.instances().ids(), [id]);
    let live = registry.descriptor(id);
    assert_eq!(live, Some(Descriptor::new(id, marker(1.0))));
    let handle = probe.attached()[0];
    probe.take_calls();

    registry.update(id, marker(2.0));
    assert_eq!(
        registry.descriptor(id).map(|d| d.kind),
        Some(marker(1.0)),
        "bookkeeping changes only when flushed"
    );
    clusterer.commit().unwrap();
    let live = registry.descriptor(id).map(|d| d.kind);
    assert_eq!(live, Some(marker(2.0)));
    let moves: Vec<Call> = probe
        .take_calls()
        .into_iter()
        .filter(|c| matches!(c, Call::SetPosition { .. } | Call::AddMarkers { .. }))
        .collect();
    assert_eq!(
        moves,
        [Call::SetPosition {
            marker: handle,
            position: at(2.0)
        }]
    );

    registry.unregister(id);
    clusterer.commit().unwrap();
    let calls = probe.calls();
    let (_, removes) = batches(&calls);
    assert_eq!(removes, [&vec![handle]]);
    assert!(clusterer.instances().is_empty());
    assert!(probe.attached().is_empty());
    assert_eq!(registry.descriptor(id), None);
}

#[test]
fn icon_and_z_index_reach_live_marker() {
    let (mut clusterer, probe) = attached();
    let id = register(&clusterer, marker(1.0));
    clusterer.commit().unwrap();
    let handle = probe.attached()[0];
    probe.take_calls();

    let props = MarkerProps::new(at(1.0))
        .with_icon(MarkerImage::new("pin.png"))
        .with_z_index(7);
    clusterer.registry().update(id, ChildKind::Marker(props));
    clusterer.commit().unwrap();

    let calls = probe.calls();
    assert!(calls.contains(&Call::SetZIndex {
        marker: handle,
        z_index: Some(7)
    }));
    assert!(calls.contains(&Call::SetIcon {
        marker: handle,
        url: "pin.png".into()
    }));
}

#[test]
fn kind_change_replaces_native_object() {
    let (mut clusterer, probe) = attached();
    let id = register(&clusterer, marker(1.0));
    clusterer.commit().unwrap();
    let old = probe.attached()[0];
    probe.take_calls();

    clusterer.registry().update(id, overlay(1.0, "card"));
    let report = clusterer.commit().unwrap();

    let calls = probe.calls();
    let (adds, removes) = batches(&calls);
    assert_eq!(removes, [&vec![old]]);
    assert_eq!(adds.len(), 1);
    assert_ne!(adds[0][0], old);
    assert_eq!(clusterer.instances().len(), 1);
    assert!(clusterer.instances().get(id).unwrap().container.is_some());
    assert_eq!(clusterer.portals().len(), 1);
    assert_eq!((report.summary.created, report.summary.removed), (1, 1));
}

// ---------------------------------------------------------------------------
// Portals
// ---------------------------------------------------------------------------

#[test]
fn portal_follows_overlay_lifecycle() {
    let (mut clusterer, probe) = attached();
    let registry = clusterer.registry();
    let id = register(&clusterer, overlay(1.0, "hello"));

    let report = clusterer.commit().unwrap();
    assert!(report.portals_changed);
    assert_eq!(clusterer.portals().len(), 1);
    let container = clusterer.portals()[0].container;
    assert_eq!(
        clusterer.renderer().mounted(id),
        Some(&(container, "hello"))
    );

    registry.update(id, overlay(2.0, "bye"));
    clusterer.commit().unwrap();
    assert_eq!(clusterer.renderer().mounted(id), Some(&(container, "bye")));

    registry.unregister(id);
    clusterer.commit().unwrap();
    assert!(clusterer.portals().is_empty());
    assert!(clusterer.renderer().mounted_ids().is_empty());
    assert_eq!(
        clusterer.renderer().log(),
        [
            PortalOp::Mount(id),
            PortalOp::Remount(id),
            PortalOp::Unmount(id)
        ]
    );
    assert_eq!(probe.count(|c| *c == Call::ReleaseContainer(container)), 1);
}

#[test]
fn removing_one_portal_leaves_others_mounted() {
    let (mut clusterer, _probe) = attached();
    let first = register(&clusterer, overlay(1.0, "a"));
    let second = register(&clusterer, overlay(2.0, "b"));
    clusterer.commit().unwrap();

    clusterer.registry().unregister(first);
    clusterer.commit().unwrap();

    assert_eq!(clusterer.renderer().mounted_ids(), [second]);
    assert_eq!(
        clusterer.renderer().log(),
        [
            PortalOp::Mount(first),
            PortalOp::Mount(second),
            PortalOp::Unmount(first)
        ]
    );
}

#[test]
fn marker_only_flush_does_not_render_portals() {
    let (mut clusterer, _probe) = attached();
    register(&clusterer, marker(1.0));
    let report = clusterer.commit().unwrap();
    assert!(!report.portals_changed);
    assert_eq!(clusterer.renderer().renders(), 0);
}

#[test]
fn overlay_without_content_has_no_portal() {
    let (mut clusterer, probe) = attached();
    let registry = clusterer.registry();
    let id = registry.allocate_id();
    registry.register(Descriptor::overlay(id, OverlayProps::new(at(0.0)), None));
    clusterer.commit().unwrap();

    assert_eq!(clusterer.instances().len(), 1);
    assert!(clusterer.portals().is_empty());
    assert_eq!(probe.count(|c| matches!(c, Call::AllocateContainer(_))), 1);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn container_failure_spares_siblings() {
    let (mut clusterer, probe) = attached();
    probe.script(|f| f.containers = 1);
    let broken = register(&clusterer, overlay(1.0, "x"));
    let fine = register(&clusterer, marker(2.0));

    let report = clusterer.commit().unwrap();
    assert_eq!(
        report.failures,
        [SyncError::Container {
            id: broken,
            source: HarnessError::NoContainer
        }]
    );
    assert_eq!(report.summary.failed, 1);
    assert_eq!(clusterer.instances().ids(), [fine]);
    let calls = probe.calls();
    let (adds, _) = batches(&calls);
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].len(), 1);
    assert!(clusterer.portals().is_empty());

    assert!(clusterer.commit().is_none(), "failed entry is not retried");

    clusterer.registry().update(broken, overlay(1.0, "x"));
    let report = clusterer.commit().unwrap();
    assert!(report.is_clean());
    assert_eq!(clusterer.instances().ids(), [broken, fine]);
}

#[test]
fn failed_overlay_bind_releases_its_container() {
    let (mut clusterer, probe) = attached();
    probe.script(|f| f.overlays = 1);
    let id = register(&clusterer, overlay(1.0, "x"));

    let report = clusterer.commit().unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].child(), Some(id));

    let calls = probe.calls();
    let allocated = calls.iter().find_map(|c| match c {
        Call::AllocateContainer(k) => Some(*k),
        _ => None,
    });
    let container = allocated.expect("container was allocated before the bind");
    assert!(calls.contains(&Call::ReleaseContainer(container)));
    assert!(clusterer.instances().is_empty());
    assert!(clusterer.portals().is_empty());
}

#[test]
fn marker_creation_error_is_reported() {
    let (mut clusterer, probe) = attached();
    probe.script(|f| f.marker_titles.push("broken".into()));
    let registry = clusterer.registry();
    let id = registry.allocate_id();
    registry.register(Descriptor::marker(
        id,
        MarkerProps::new(at(0.0)).with_title("broken"),
    ));

    let report = clusterer.commit().unwrap();
    let failure = &report.failures[0];
    assert_eq!(
        failure.to_string(),
        format!("creating child {id} failed: marker \"broken\" rejected")
    );
    assert!(std::error::Error::source(failure).is_some());
    assert_eq!(probe.count(|c| *c == Call::Redraw), 1);
}

// ---------------------------------------------------------------------------
// Engine ownership
// ---------------------------------------------------------------------------

#[test]
fn commit_without_engine_keeps_queue() {
    let (mut clusterer, probe) = detached();
    register(&clusterer, marker(1.0));
    register(&clusterer, marker(2.0));

    assert!(clusterer.commit().is_none());
    assert!(!clusterer.is_active());
    assert!(probe.calls().is_empty());
    assert_eq!(clusterer.registry().pending(), 2);

    clusterer.attach(MapView(1)).unwrap();
    let report = clusterer.commit().unwrap();
    assert_eq!(report.summary.created, 2);
}

#[test]
fn construction_receives_full_config() {
    let (mut clusterer, probe) = detached();
    let config = ClustererConfig::default()
        .with_grid_size(80)
        .with_min_cluster_size(3)
        .with_texts(vec!["few".into(), "many".into()]);
    clusterer.set_config(config.clone()).unwrap();
    assert!(probe.calls().is_empty(), "no engine while detached");

    clusterer.attach(MapView(4)).unwrap();
    assert_eq!(
        probe.calls()[0],
        Call::Construct {
            view: MapView(4),
            config
        }
    );
}

#[test]
fn construction_failure_is_reported_and_queue_survives() {
    let (mut clusterer, probe) = detached();
    probe.script(|f| f.construct = true);
    register(&clusterer, marker(1.0));

    let err = clusterer.attach(MapView(1)).unwrap_err();
    assert_eq!(err, SyncError::Construct(HarnessError::ConstructRejected));
    assert!(!clusterer.is_active());
    assert!(clusterer.commit().is_none());
    assert_eq!(clusterer.registry().pending(), 1);
}

#[test]
fn teardown_requeues_live_children() {
    let (mut clusterer, probe) = attached();
    let a = register(&clusterer, marker(1.0));
    let b = register(&clusterer, overlay(2.0, "b"));
    clusterer.commit().unwrap();
    assert_eq!(clusterer.renderer().mounted_ids(), [b]);
    probe.take_calls();

    assert_eq!(clusterer.detach(), Some(MapView(1)));
    assert!(clusterer.instances().is_empty());
    assert!(clusterer.portals().is_empty());
    assert!(clusterer.renderer().mounted_ids().is_empty());
    assert_eq!(probe.live_engines(), 0);
    let calls = probe.take_calls();
    assert!(calls.contains(&Call::Clear));
    assert_eq!(calls.last(), Some(&Call::Dropped));
    let released = calls
        .iter()
        .filter(|c| matches!(c, Call::ReleaseContainer(_)))
        .count();
    assert_eq!(released, 1);

    clusterer.attach(MapView(2)).unwrap();
    let report = clusterer.commit().unwrap();
    assert_eq!(report.summary.created, 2, "both come back via create");
    assert_eq!(report.summary.updated, 0);
    assert_eq!(clusterer.instances().ids(), [a, b]);
    assert_eq!(clusterer.renderer().mounted_ids(), [b]);
    let calls = probe.calls();
    let (adds, _) = batches(&calls);
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].len(), 2);
}

#[test]
fn pending_removal_survives_teardown() {
    let (mut clusterer, _probe) = attached();
    let a = register(&clusterer, marker(1.0));
    let b = register(&clusterer, marker(2.0));
    clusterer.commit().unwrap();

    clusterer.registry().unregister(b);
    clusterer.detach();
    clusterer.attach(MapView(1)).unwrap();
    clusterer.commit().unwrap();

    assert_eq!(clusterer.instances().ids(), [a]);
}

#[test]
fn config_change_recreates_engine() {
    let (mut clusterer, probe) = attached();
    let id = register(&clusterer, marker(1.0));
    clusterer.commit().unwrap();
    probe.take_calls();

    clusterer.set_config(ClustererConfig::default()).unwrap();
    assert!(probe.calls().is_empty(), "equal config is a no-op");

    let config = ClustererConfig::default().with_min_level(3);
    clusterer.set_config(config.clone()).unwrap();
    let calls = probe.take_calls();
    let dropped = calls.iter().position(|c| *c == Call::Dropped);
    let constructed = calls
        .iter()
        .position(|c| matches!(c, Call::Construct { config: built, .. } if *built == config));
    assert!(dropped.is_some() && dropped < constructed, "{calls:?}");
    assert_eq!(probe.live_engines(), 1);
    assert!(clusterer.instances().is_empty());

    clusterer.commit().unwrap();
    assert_eq!(clusterer.instances().ids(), [id]);
}

#[test]
fn dropping_clusterer_tears_engine_down() {
    let (clusterer, probe) = attached();
    register(&clusterer, marker(1.0));
    drop(clusterer);
    assert_eq!(probe.live_engines(), 0);
    assert_eq!(probe.calls().last(), Some(&Call::Dropped));
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

fn recorder(log: &Rc<RefCell<Vec<ClusterId>>>) -> EventHandler<ClusterId> {
    let log = Rc::clone(log);
    Rc::new(move |event| {
        if let ClusterEvent::Click(cluster) = event {
            log.borrow_mut().push(*cluster);
        }
    })
}

fn on_click(log: &Rc<RefCell<Vec<ClusterId>>>) -> EventHandlers<ClusterId> {
    let mut handlers = EventHandlers::new();
    handlers.set(ClusterEventKind::Click, Some(recorder(log)));
    handlers
}

fn subscribed_kinds(probe: &EngineProbe) -> Vec<ClusterEventKind> {
    probe.subscriptions().into_iter().map(|(_, k)| k).collect()
}

#[test]
fn events_are_forwarded_verbatim() {
    let (mut clusterer, probe) = attached_with(clickable());
    let clicks = Rc::new(RefCell::new(Vec::new()));
    clusterer.set_handlers(on_click(&clicks));

    assert_eq!(probe.emit(&ClusterEvent::Click(ClusterId(5))), 1);
    assert_eq!(probe.emit(&ClusterEvent::Over(ClusterId(5))), 0);
    assert_eq!(*clicks.borrow(), [ClusterId(5)]);
}

#[test]
fn handlers_bound_before_attach_are_subscribed_on_construct() {
    let (mut clusterer, probe) = detached_with(clickable());
    let clicks = Rc::new(RefCell::new(Vec::new()));
    clusterer.set_handlers(on_click(&clicks));
    assert!(probe.subscriptions().is_empty());

    clusterer.attach(MapView(1)).unwrap();
    assert_eq!(subscribed_kinds(&probe), [ClusterEventKind::Click]);
}

#[test]
fn disabled_event_kinds_are_not_subscribed() {
    let (mut clusterer, probe) = attached();
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let hover: EventHandler<ClusterId> = Rc::new(|_| {});
    let mut handlers = on_click(&clicks);
    handlers.set(ClusterEventKind::Over, Some(hover));
    clusterer.set_handlers(handlers);

    assert_eq!(subscribed_kinds(&probe), [ClusterEventKind::Over]);
    assert_eq!(probe.emit(&ClusterEvent::Click(ClusterId(1))), 0);
    assert!(clicks.borrow().is_empty());

    clusterer.set_config(clickable()).unwrap();
    let mut kinds = subscribed_kinds(&probe);
    kinds.sort_by_key(|k| k.as_str());
    assert_eq!(kinds, [ClusterEventKind::Click, ClusterEventKind::Over]);
    probe.emit(&ClusterEvent::Click(ClusterId(2)));
    assert_eq!(*clicks.borrow(), [ClusterId(2)]);

    clusterer
        .set_config(clickable().with_hoverable(false))
        .unwrap();
    assert_eq!(subscribed_kinds(&probe), [ClusterEventKind::Click]);
}

#[test]
fn only_changed_handlers_are_rebound() {
    let (mut clusterer, probe) = attached_with(clickable());
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let click = recorder(&clicks);
    let hover: EventHandler<ClusterId> = Rc::new(|_| {});
    clusterer.set_handlers(
        EventHandlers::new()
            .on(ClusterEventKind::Click, Rc::clone(&click))
            .on(ClusterEventKind::Over, Rc::clone(&hover)),
    );
    probe.take_calls();

    // Same references: nothing to do.
    clusterer.set_handlers(
        EventHandlers::new()
            .on(ClusterEventKind::Click, Rc::clone(&click))
            .on(ClusterEventKind::Over, Rc::clone(&hover)),
    );
    assert!(probe.calls().is_empty());

    // New click closure, hover dropped.
    let other_clicks = Rc::new(RefCell::new(Vec::new()));
    clusterer.set_handlers(on_click(&other_clicks));
    let unsubscribed = probe.count(|c| matches!(c, Call::Unsubscribe(_)));
    let subscribed = probe.count(|c| matches!(c, Call::Subscribe { .. }));
    assert_eq!((unsubscribed, subscribed), (2, 1));

    probe.emit(&ClusterEvent::Click(ClusterId(1)));
    assert!(clicks.borrow().is_empty());
    assert_eq!(*other_clicks.borrow(), [ClusterId(1)]);
}

#[test]
fn recreated_engine_is_subscribed_again() {
    let (mut clusterer, probe) = attached_with(clickable());
    let clicks = Rc::new(RefCell::new(Vec::new()));
    clusterer.set_handlers(on_click(&clicks));

    clusterer
        .set_config(clickable().with_average_center(true))
        .unwrap();
    assert_eq!(probe.subscriptions().len(), 1);
    probe.emit(&ClusterEvent::Click(ClusterId(2)));
    assert_eq!(*clicks.borrow(), [ClusterId(2)]);
}

// ---------------------------------------------------------------------------
// Re-entrancy and leaf binding
// ---------------------------------------------------------------------------

#[test]
fn registry_calls_during_flush_land_in_next_pass() {
    let (mut clusterer, probe) = attached();
    let registry = clusterer.registry();
    let late = registry.allocate_id();
    let fired = Rc::new(Cell::new(false));
    {
        let registry = registry.clone();
        let fired = Rc::clone(&fired);
        probe.on_create(move |_| {
            if !fired.replace(true) {
                let outcome = registry.update(late, marker(9.0));
                assert_eq!(outcome, UpdateOutcome::Registered);
            }
        });
    }

    register(&clusterer, marker(1.0));
    let report = clusterer.commit().unwrap();
    assert_eq!(report.summary.created, 1);
    assert!(fired.get());
    assert_eq!(registry.pending(), 1, "late write waits for the next pass");

    clusterer.commit().unwrap();
    assert!(clusterer.instances().contains(late));
}

#[test]
fn clustered_child_drives_registry() {
    let (mut clusterer, probe) = attached();
    let mut child = ClusteredChild::new(Some(clusterer.registry()));
    assert_eq!(child.mount(marker(1.0)), Presence::Delegated);
    clusterer.commit().unwrap();
    let id = child.id().unwrap();
    assert!(clusterer.instances().contains(id));

    child.set(marker(2.0));
    clusterer.commit().unwrap();
    assert_eq!(probe.count(is_create), 1);

    drop(child);
    clusterer.commit().unwrap();
    assert!(clusterer.instances().is_empty());

    let mut standalone: ClusteredChild<&'static str> = ClusteredChild::new(None);
    assert_eq!(standalone.mount(marker(1.0)), Presence::Standalone);
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

#[test]
fn trace_records_flush_and_lifecycle() {
    use clusterbridge_core::trace::{ChildOp, Tracer, Transition};
    use clusterbridge_debug::recorder::{RecordedEvent, RecorderSink, decode};

    let (mut clusterer, _probe) = detached();
    let mut sink = RecorderSink::new();

    clusterer
        .attach_traced(MapView(1), &mut Tracer::new(&mut sink))
        .unwrap();
    let id = register(&clusterer, marker(1.0));
    clusterer.commit_traced(&mut Tracer::new(&mut sink));
    clusterer.detach_traced(&mut Tracer::new(&mut sink));

    let events: Vec<RecordedEvent> = decode(sink.as_bytes()).collect();
    assert!(matches!(
        events.first(),
        Some(RecordedEvent::Lifecycle(e)) if e.transition == Transition::Constructed
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        RecordedEvent::ChildChange(c) if c.id == id && c.op == ChildOp::Create
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        RecordedEvent::FlushEnd(s) if s.created == 1 && s.pass == 1
    )));
    assert!(matches!(
        events.last(),
        Some(RecordedEvent::Lifecycle(e)) if e.transition == Transition::TornDown && e.requeued == 1
    ));
}
