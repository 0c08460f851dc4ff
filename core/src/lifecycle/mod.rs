//! Lifecycle coordinator
//!
//! Drives one engine instance per document (each embedded frame gets its own):
//!
//! - **Activation:** load preferences (seeding defaults), paint the style
//!   variables, then arm the settling timer for a decoration pass.
//! - **Route change:** repaint from the in-memory snapshot and re-arm the timer.
//!   Earlier timers keep running under [`RearmPolicy::Overlap`]; decoration is
//!   idempotent so the extra pass is only wasted work.
//! - **Preference edit:** write storage and repaint immediately. Edits never
//!   arm a decoration pass.
//!
//! Painting always completes before a timer is armed, so a pass never reads
//! stale variables.

mod scheduler;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use gallery_wall_types::{
    EngineConfig, InboundMessage, Preference, PreferenceEdit, PreferenceSet, RearmPolicy,
};
use tracing::{debug, info};

use crate::config::EngineConfigExt;
use crate::decorate::{DecorationReport, DomDecorator};
use crate::dom::HostDom;
use crate::paint::{StyleHost, StyleVariableSet, VariableBinder};
use crate::preferences::{EditRejected, PreferenceStore};
use crate::routes::RouteCapabilityMatcher;
use crate::storage::KeyValueStorage;

pub use scheduler::{ManualScheduler, Scheduler, Task, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Uninitialized,
    /// At least one decoration pass is armed
    Scheduled,
    /// Every armed pass has run
    Settled,
}

struct Inner<S, H, D> {
    store: RefCell<PreferenceStore<S>>,
    binder: RefCell<VariableBinder<H>>,
    decorator: DomDecorator,
    dom: D,
    scheduler: Rc<dyn Scheduler>,
    settle_delay: Duration,
    rearm: RearmPolicy,
    route_changed_signal: String,
    phase: Cell<LifecyclePhase>,
    pending: RefCell<Option<TimerHandle>>,
    /// Armed passes that have not run or been cancelled
    outstanding: Cell<usize>,
    last_report: RefCell<Option<DecorationReport>>,
}

/// Handle to a running engine. Clones share the same instance.
pub struct LifecycleCoordinator<S, H, D> {
    inner: Rc<Inner<S, H, D>>,
}

impl<S, H, D> Clone for LifecycleCoordinator<S, H, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, H, D> LifecycleCoordinator<S, H, D>
where
    S: KeyValueStorage + 'static,
    H: StyleHost + 'static,
    D: HostDom + 'static,
{
    pub fn new(
        config: &EngineConfig,
        storage: S,
        host: H,
        dom: D,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let decorator = DomDecorator::new(
            config.anchors.clone(),
            RouteCapabilityMatcher::new(&config.routes),
        );
        Self {
            inner: Rc::new(Inner {
                store: RefCell::new(PreferenceStore::new(storage)),
                binder: RefCell::new(VariableBinder::new(host)),
                decorator,
                dom,
                scheduler,
                settle_delay: config.settle_delay(),
                rearm: config.rearm,
                route_changed_signal: config.route_changed_signal.clone(),
                phase: Cell::new(LifecyclePhase::Uninitialized),
                pending: RefCell::new(None),
                outstanding: Cell::new(0),
                last_report: RefCell::new(None),
            }),
        }
    }

    /// First activation of the content script.
    ///
    /// A second call behaves like a route change.
    pub fn activate(&self) {
        if self.phase() != LifecyclePhase::Uninitialized {
            debug!("already active, treating activation as route change");
            self.route_changed();
            return;
        }
        let snapshot = self.inner.store.borrow_mut().load().clone();
        info!(
            wall = %snapshot.wall_color,
            frame = %snapshot.frame_color,
            frame_width = snapshot.frame_width,
            count_per_row = snapshot.count_per_row,
            "gallery wall activated"
        );
        self.paint(&snapshot);
        self.arm();
    }

    /// Handle a message from the background process. Returns whether it was
    /// the route-changed signal.
    pub fn handle_message(&self, message: &InboundMessage) -> bool {
        if message.message != self.inner.route_changed_signal {
            debug!(message = %message.message, "ignoring message");
            return false;
        }
        self.route_changed();
        true
    }

    /// Re-arm decoration after an in-place navigation.
    pub fn route_changed(&self) {
        if self.phase() == LifecyclePhase::Uninitialized {
            self.activate();
            return;
        }
        let snapshot = self.preferences();
        self.paint(&snapshot);
        self.arm();
    }

    /// Apply a settings-panel edit and repaint. Never arms decoration.
    pub fn edit(&self, edit: &PreferenceEdit) -> Result<Preference, EditRejected> {
        let changed = self.inner.store.borrow_mut().apply(edit);
        match &changed {
            Ok(preference) => {
                debug!(%preference, "preference edited");
                let snapshot = self.preferences();
                self.paint(&snapshot);
            }
            Err(reason) => debug!(%reason, "preference edit rejected"),
        }
        changed
    }

    /// Run a decoration pass now, outside the timer.
    pub fn decorate_now(&self) -> DecorationReport {
        let variables = self.variables();
        let report = self.inner.decorator.decorate(&self.inner.dom, &variables);
        *self.inner.last_report.borrow_mut() = Some(report.clone());
        report
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.inner.phase.get()
    }

    pub fn preferences(&self) -> PreferenceSet {
        self.inner.store.borrow().snapshot().clone()
    }

    pub fn variables(&self) -> StyleVariableSet {
        self.inner.binder.borrow().variables().clone()
    }

    /// Report from the most recent decoration pass
    pub fn last_report(&self) -> Option<DecorationReport> {
        self.inner.last_report.borrow().clone()
    }

    pub fn dom(&self) -> &D {
        &self.inner.dom
    }

    fn paint(&self, fallback: &PreferenceSet) {
        let store = self.inner.store.borrow();
        self.inner.binder.borrow_mut().paint(&store, fallback);
    }

    fn arm(&self) {
        let inner = &self.inner;
        if inner.rearm == RearmPolicy::Debounce
            && let Some(stale) = inner.pending.borrow_mut().take()
        {
            debug!(timer = stale.id(), "cancelling pending decoration pass");
            stale.cancel();
            inner.outstanding.set(inner.outstanding.get().saturating_sub(1));
        }

        let weak: Weak<Inner<S, H, D>> = Rc::downgrade(inner);
        let handle = inner.scheduler.schedule(
            inner.settle_delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    LifecycleCoordinator { inner }.settle();
                }
            }),
        );
        debug!(
            timer = handle.id(),
            delay_ms = inner.settle_delay.as_millis() as u64,
            "decoration pass armed"
        );
        *inner.pending.borrow_mut() = Some(handle);
        inner.outstanding.set(inner.outstanding.get() + 1);
        inner.phase.set(LifecyclePhase::Scheduled);
    }

    fn settle(&self) {
        let inner = &self.inner;
        let remaining = inner.outstanding.get().saturating_sub(1);
        inner.outstanding.set(remaining);
        if remaining == 0 {
            inner.pending.borrow_mut().take();
            inner.phase.set(LifecyclePhase::Settled);
        }
        let report = self.decorate_now();
        info!(
            path = %report.path,
            outcome = ?report.outcome,
            styled = report.styled,
            "decoration pass ran"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::DecorationOutcome;
    use crate::dom::{MemoryDom, NodeId};
    use crate::paint::MemoryStyleHost;
    use crate::storage::MemoryStorage;

    type Engine = LifecycleCoordinator<MemoryStorage, MemoryStyleHost, MemoryDom>;

    struct Fixture {
        engine: Engine,
        scheduler: Rc<ManualScheduler>,
        storage: MemoryStorage,
        host: MemoryStyleHost,
        dom: MemoryDom,
    }

    fn fixture(config: EngineConfig, storage: MemoryStorage) -> Fixture {
        let scheduler = Rc::new(ManualScheduler::new());
        let host = MemoryStyleHost::new();
        let dom = MemoryDom::new();
        let engine = LifecycleCoordinator::new(
            &config,
            storage.clone(),
            host.clone(),
            dom.clone(),
            scheduler.clone(),
        );
        Fixture {
            engine,
            scheduler,
            storage,
            host,
            dom,
        }
    }

    fn settle_delay() -> Duration {
        Duration::from_millis(gallery_wall_types::DEFAULT_SETTLE_DELAY_MS)
    }

    /// main > ul > li > article > div.absolute > img, plus a grid
    fn carousel_page(dom: &MemoryDom, path: &str) -> (NodeId, NodeId) {
        dom.set_path(path);
        let main = dom.append(dom.body(), "main").unwrap();
        let overlay = dom
            .append_path(main, &["ul", "li", "article", "div.absolute"])
            .unwrap();
        dom.append(overlay, "img").unwrap();
        let grid = dom.append(main, "div.grid.w-full.gap-4").unwrap();
        (overlay, grid)
    }

    #[test]
    fn activation_paints_before_decorating() {
        let f = fixture(EngineConfig::default(), MemoryStorage::new());
        let (overlay, _) = carousel_page(&f.dom, "/new-in/");

        f.engine.activate();
        assert_eq!(f.engine.phase(), LifecyclePhase::Scheduled);
        assert_eq!(f.host.get("--gw-frame-width").as_deref(), Some("5px"));
        assert_eq!(f.dom.style(overlay), None);

        f.scheduler.advance(settle_delay());
        assert_eq!(f.engine.phase(), LifecyclePhase::Settled);
        assert!(f.dom.style(overlay).is_some());
        // defaults were mirrored into storage
        assert_eq!(f.storage.peek("countPerRow").as_deref(), Some("4"));
    }

    #[test]
    fn new_in_scenario_resolves_frame_values() {
        let storage = MemoryStorage::with_items([("frameColor", "#ff0000"), ("frameWidth", "8")]);
        let f = fixture(EngineConfig::default(), storage);
        let (overlay, grid) = carousel_page(&f.dom, "/new-in/");

        f.engine.activate();
        f.scheduler.advance(settle_delay());

        let variables = f.engine.variables();
        let overlay_style = variables.resolve(&f.dom.style(overlay).unwrap());
        assert!(overlay_style.contains("background-color: #ff0000 !important"));
        assert!(overlay_style.contains("padding: 8px !important"));
        assert!(overlay_style.contains("box-shadow: 4px 4px 5px 0px rgba(0,0,0,0.5)"));

        let grid_style = variables.resolve(&f.dom.style(grid).unwrap());
        assert_eq!(
            grid_style,
            "grid-template-columns: repeat(4, minmax(0, 1fr)) !important;"
        );
    }

    #[test]
    fn route_change_rearms_and_overlaps() {
        let f = fixture(EngineConfig::default(), MemoryStorage::new());
        carousel_page(&f.dom, "/checkout");
        f.engine.activate();

        f.scheduler.advance(Duration::from_millis(1000));
        f.dom.set_path("/posters-prints/");
        assert!(f.engine.handle_message(&InboundMessage {
            message: "changedTab".into()
        }));
        assert_eq!(f.scheduler.pending(), 2);

        // stale pass fires first and already sees the new path
        f.scheduler.advance(Duration::from_millis(2000));
        assert_eq!(f.engine.phase(), LifecyclePhase::Scheduled);
        assert_eq!(
            f.engine.last_report().unwrap().outcome,
            DecorationOutcome::Decorated
        );
        let after_first = f.dom.styled_nodes();

        f.scheduler.advance(Duration::from_millis(1000));
        assert_eq!(f.engine.phase(), LifecyclePhase::Settled);
        assert_eq!(f.dom.styled_nodes(), after_first);
    }

    #[test]
    fn debounce_cancels_pending_pass() {
        let config = EngineConfig {
            rearm: RearmPolicy::Debounce,
            ..EngineConfig::default()
        };
        let f = fixture(config, MemoryStorage::new());
        carousel_page(&f.dom, "/new-in/");
        f.engine.activate();
        f.engine.route_changed();

        assert_eq!(f.scheduler.pending(), 1);
        assert_eq!(f.scheduler.advance(settle_delay()), 1);
        assert_eq!(f.engine.phase(), LifecyclePhase::Settled);
    }

    #[test]
    fn unrelated_messages_are_ignored() {
        let f = fixture(EngineConfig::default(), MemoryStorage::new());
        f.engine.activate();
        let message: InboundMessage = serde_json::from_str(r#"{"message":"somethingElse"}"#).unwrap();
        assert!(!f.engine.handle_message(&message));
        assert_eq!(f.scheduler.pending(), 1);

        let empty: InboundMessage = serde_json::from_str("{}").unwrap();
        assert!(!f.engine.handle_message(&empty));
    }

    #[test]
    fn edits_repaint_without_rearming() {
        let f = fixture(EngineConfig::default(), MemoryStorage::new());
        carousel_page(&f.dom, "/new-in/");
        f.engine.activate();
        f.scheduler.advance(settle_delay());

        f.engine
            .edit(&PreferenceEdit::WallColor {
                value: "#123456".into(),
            })
            .unwrap();
        assert_eq!(f.host.get("--gw-wall-color").as_deref(), Some("#123456"));
        assert_eq!(f.storage.peek("wallColor").as_deref(), Some("#123456"));
        assert_eq!(f.scheduler.pending(), 0);
        assert_eq!(f.engine.phase(), LifecyclePhase::Settled);
    }

    #[test]
    fn edit_survives_full_quota() {
        let storage = MemoryStorage::with_items([("wallColor", "#111111")]);
        storage.set_writable(false);
        let f = fixture(EngineConfig::default(), storage);
        carousel_page(&f.dom, "/new-in/");
        f.engine.activate();
        assert_eq!(f.host.get("--gw-wall-color").as_deref(), Some("#111111"));

        f.engine
            .edit(&PreferenceEdit::WallColor {
                value: "#abcdef".into(),
            })
            .unwrap();
        assert_eq!(f.host.get("--gw-wall-color").as_deref(), Some("#abcdef"));
        assert_eq!(f.storage.peek("wallColor").as_deref(), Some("#111111"));

        f.engine.route_changed();
        f.scheduler.advance(settle_delay());
        assert_eq!(f.host.get("--gw-wall-color").as_deref(), Some("#abcdef"));
        assert_eq!(f.engine.variables().wall_color.as_str(), "#abcdef");
    }

    #[test]
    fn rejected_step_leaves_variables_alone() {
        let storage = MemoryStorage::with_items([("frameWidth", "20")]);
        let f = fixture(EngineConfig::default(), storage);
        f.engine.activate();

        let step = PreferenceEdit::Step {
            preference: Preference::FrameWidth,
            delta: 1,
        };
        assert!(f.engine.edit(&step).is_err());
        assert_eq!(f.host.get("--gw-frame-width").as_deref(), Some("20px"));
    }

    #[test]
    fn route_change_before_activation_activates() {
        let f = fixture(EngineConfig::default(), MemoryStorage::new());
        f.engine.route_changed();
        assert_eq!(f.engine.phase(), LifecyclePhase::Scheduled);
        assert_eq!(f.storage.len(), 4);
    }

    #[test]
    fn dropped_engine_timer_is_harmless() {
        let f = fixture(EngineConfig::default(), MemoryStorage::new());
        f.engine.activate();
        let Fixture {
            engine, scheduler, ..
        } = f;
        drop(engine);
        assert_eq!(scheduler.advance(settle_delay()), 1);
    }
}
