//! Scroll scene: the single owner of the viewport observer, the timeline registry
//! and the trigger bindings connecting them.

use std::time::Duration;

use slotmap::{SecondaryMap, SlotMap, new_key_type};
use tracing::trace;

use crate::lifecycle::LifecycleBinder;
use crate::model::{ElementId, PropertySet, ScrollSnapshot, Timing};
use crate::observer::{Crossing, ObserverEvent, SubscriptionId, ViewportObserver};
use crate::ports::Document;
use crate::registry::{TimelineId, TimelineRegistry};
use crate::trigger::{Scrub, TriggerMode, TriggerPolicy, TriggerSpec, TriggerState};

new_key_type! {
    /// Handle to a timeline bound to a scroll trigger.
    pub struct BindingId;
}

#[derive(Debug, Clone, PartialEq)]
/// Everything a page registers for one scroll-triggered animation.
pub struct AnimationSpec {
    /// Animated elements, in stagger order.
    pub targets: Vec<ElementId>,
    /// Starting values.
    pub from: PropertySet,
    /// Final values.
    pub to: PropertySet,
    /// Duration, delay, stagger and easing.
    pub timing: Timing,
    /// Activation rule.
    pub trigger: TriggerSpec,
}

impl AnimationSpec {
    /// Animation of `targets` with empty property sets and default timing and trigger.
    #[must_use]
    pub fn new(targets: impl Into<Vec<ElementId>>) -> Self {
        Self {
            targets: targets.into(),
            from: PropertySet::default(),
            to: PropertySet::default(),
            timing: Timing::default(),
            trigger: TriggerSpec::default(),
        }
    }

    /// Set the starting values.
    #[must_use]
    pub fn from(mut self, from: PropertySet) -> Self {
        self.from = from;
        self
    }

    /// Set the final values.
    #[must_use]
    pub fn to(mut self, to: PropertySet) -> Self {
        self.to = to;
        self
    }

    /// Set the timing.
    #[must_use]
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Set the trigger.
    #[must_use]
    pub fn trigger(mut self, trigger: TriggerSpec) -> Self {
        self.trigger = trigger;
        self
    }
}

#[derive(Debug)]
enum BindingMode {
    Toggle { policy: TriggerPolicy, once: bool },
    Scrub(Scrub),
}

#[derive(Debug)]
struct Binding {
    // `None` once a one-shot trigger has fired; the timeline stays owned by the binding.
    subscription: Option<SubscriptionId>,
    timeline: TimelineId,
    mode: BindingMode,
}

/// Scroll-driven animation scene for one host document.
///
/// All mutation happens through `&mut self` on the host's UI thread. Each
/// [`scroll_to`](Self::scroll_to) or [`resize`](Self::resize) captures one
/// [`ScrollSnapshot`] and evaluates every binding against it.
#[derive(Debug)]
pub struct ScrollScene<D> {
    document: D,
    observer: ViewportObserver,
    timelines: TimelineRegistry,
    bindings: SlotMap<BindingId, Binding>,
    by_subscription: SecondaryMap<SubscriptionId, BindingId>,
    pub(crate) scopes: LifecycleBinder,
}

impl<D: Document> ScrollScene<D> {
    /// Scene over `document`, scrolled to the top of a viewport of the given height.
    #[must_use]
    pub fn new(document: D, viewport_height: f32) -> Self {
        Self {
            document,
            observer: ViewportObserver::new(viewport_height),
            timelines: TimelineRegistry::new(),
            bindings: SlotMap::with_key(),
            by_subscription: SecondaryMap::new(),
            scopes: LifecycleBinder::new(),
        }
    }

    /// Host document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable host document. Call [`refresh`](Self::refresh) after moving elements.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Scroll metrics of the last evaluation.
    #[must_use]
    pub fn snapshot(&self) -> ScrollSnapshot {
        self.observer.snapshot()
    }

    /// Timeline registry, for inspecting playheads.
    #[must_use]
    pub fn timelines(&self) -> &TimelineRegistry {
        &self.timelines
    }

    /// Register a scroll-triggered animation.
    ///
    /// Returns `None` without side effects when the trigger element or every target
    /// is detached. The new binding is evaluated against the current scroll
    /// position right away, so a trigger that is already passed plays immediately.
    pub fn animate(&mut self, spec: AnimationSpec) -> Option<BindingId> {
        let trigger_element = spec
            .trigger
            .element
            .or_else(|| spec.targets.first().copied())?;
        self.document.bounds(trigger_element)?;
        let timeline = self.timelines.create(
            &mut self.document,
            &spec.targets,
            &spec.from,
            &spec.to,
            spec.timing,
        )?;
        let Some(subscription) = self.observer.observe(
            &self.document,
            trigger_element,
            spec.trigger.start,
            spec.trigger.end,
        ) else {
            self.timelines.cancel(timeline, &mut self.document);
            return None;
        };

        let mode = match spec.trigger.mode {
            TriggerMode::Toggle { actions, once } => BindingMode::Toggle {
                policy: TriggerPolicy::new(actions),
                once,
            },
            TriggerMode::Scrub(scrub) => BindingMode::Scrub(scrub),
        };
        let id = self.bindings.insert(Binding {
            subscription: Some(subscription),
            timeline,
            mode,
        });
        self.by_subscription.insert(subscription, id);
        trace!(?id, ?timeline, ?subscription, "binding registered");

        self.evaluate(self.observer.snapshot());
        Some(id)
    }

    /// Register a timeline without a scroll trigger, e.g. an entrance played on mount.
    pub fn timeline(
        &mut self,
        targets: &[ElementId],
        from: &PropertySet,
        to: &PropertySet,
        timing: Timing,
    ) -> Option<TimelineId> {
        self.timelines
            .create(&mut self.document, targets, from, to, timing)
    }

    /// Play an untriggered timeline forward.
    pub fn play(&mut self, id: TimelineId) -> bool {
        self.timelines.play(id)
    }

    /// Play an untriggered timeline backward.
    pub fn reverse(&mut self, id: TimelineId) -> bool {
        self.timelines.reverse(id)
    }

    /// Cancel a timeline, leaving its targets where they are.
    pub fn cancel(&mut self, id: TimelineId) -> bool {
        self.timelines.cancel(id, &mut self.document)
    }

    /// Release a binding: stop observing and cancel its timeline. Idempotent.
    pub fn unbind(&mut self, id: BindingId) -> bool {
        let Some(binding) = self.bindings.remove(id) else {
            return false;
        };
        if let Some(subscription) = binding.subscription {
            self.by_subscription.remove(subscription);
            self.observer.unobserve(subscription);
        }
        self.timelines.cancel(binding.timeline, &mut self.document);
        trace!(?id, "binding released");
        true
    }

    /// Scroll to an absolute offset (clamped at zero) and evaluate all bindings.
    pub fn scroll_to(&mut self, scroll_y: f32) {
        let snapshot = ScrollSnapshot::new(scroll_y.max(0.0), self.snapshot().viewport_height);
        self.evaluate(snapshot);
    }

    /// Scroll by a relative amount.
    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.snapshot().scroll_y + delta);
    }

    /// Change the viewport height, re-resolving every threshold.
    pub fn resize(&mut self, viewport_height: f32) {
        let events = self.observer.refresh(&self.document, viewport_height);
        self.dispatch(events);
        self.scrub_all();
    }

    /// Re-resolve thresholds after elements moved in the document.
    pub fn refresh(&mut self) {
        self.resize(self.snapshot().viewport_height);
    }

    /// Advance the animation clock and write every moving timeline.
    pub fn tick(&mut self, now: Duration) {
        self.timelines.tick(now, &mut self.document);
    }

    /// State of a toggle binding; `None` for scrubbed or unknown bindings.
    #[must_use]
    pub fn trigger_state(&self, id: BindingId) -> Option<TriggerState> {
        match &self.bindings.get(id)?.mode {
            BindingMode::Toggle { policy, .. } => Some(policy.state()),
            BindingMode::Scrub(_) => None,
        }
    }

    /// Scroll progress through the range of a scrubbed binding, in `[0, 1]`.
    ///
    /// This is the scroll-derived target, so a smoothed binding reports it before
    /// its timeline catches up. `None` for toggle bindings and unknown handles.
    #[must_use]
    pub fn scrub_progress(&self, id: BindingId) -> Option<f32> {
        let binding = self.bindings.get(id)?;
        let BindingMode::Scrub(_) = binding.mode else {
            return None;
        };
        let range = self.observer.range(binding.subscription?)?;
        Some(range.progress(self.observer.snapshot().pixel()))
    }

    /// Timeline driven by a binding.
    #[must_use]
    pub fn binding_timeline(&self, id: BindingId) -> Option<TimelineId> {
        self.bindings.get(id).map(|binding| binding.timeline)
    }

    /// Live viewport subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.observer.len()
    }

    /// Registered timelines, bound or not.
    #[must_use]
    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    /// Timelines currently playing or gliding.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.timelines.in_flight()
    }

    /// Registered bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    fn evaluate(&mut self, snapshot: ScrollSnapshot) {
        let events = self.observer.update(snapshot);
        self.dispatch(events);
        self.scrub_all();
    }

    fn dispatch(&mut self, events: Vec<ObserverEvent>) {
        for event in events {
            // A previous event in this batch may have released the binding.
            let Some(&id) = self.by_subscription.get(event.subscription) else {
                continue;
            };
            let Some(binding) = self.bindings.get_mut(id) else {
                continue;
            };
            let BindingMode::Toggle { policy, once } = &mut binding.mode else {
                continue;
            };
            let action = policy.on_crossing(event.crossing);
            let fire_once = *once && event.crossing == Crossing::Enter;
            let timeline = binding.timeline;
            if fire_once {
                binding.subscription = None;
            }

            self.timelines.perform(timeline, action, &mut self.document);

            if fire_once {
                self.by_subscription.remove(event.subscription);
                self.observer.unobserve(event.subscription);
                trace!(?id, "one-shot trigger released");
            }
        }
    }

    fn scrub_all(&mut self) {
        let scroll = self.observer.snapshot().pixel();
        for binding in self.bindings.values() {
            let BindingMode::Scrub(scrub) = binding.mode else {
                continue;
            };
            let Some(range) = binding
                .subscription
                .and_then(|subscription| self.observer.range(subscription))
            else {
                continue;
            };
            let progress = range.progress(scroll);
            match scrub {
                Scrub::Instant => {
                    self.timelines
                        .scrub(binding.timeline, progress, &mut self.document);
                }
                Scrub::Smoothed(lag) => {
                    self.timelines
                        .scrub_smoothed(binding.timeline, progress, lag);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::easing::Easing;
    use crate::model::Bounds;
    use crate::trigger::{EndThreshold, Offset, Threshold, ToggleAction, ToggleActions};

    const MS: Duration = Duration::from_millis(1);

    fn fade_up(element: ElementId) -> AnimationSpec {
        AnimationSpec::new([element])
            .from(PropertySet::new().opacity(0.0).y(50.0))
            .to(PropertySet::new().opacity(1.0).y(0.0))
            .timing(Timing::new(MS * 1000).with_easing(Easing::Linear))
            .trigger(TriggerSpec::at(Threshold::top_at(0.8)))
    }

    fn scene_with_element() -> (ScrollScene<MemoryDocument>, ElementId) {
        let mut document = MemoryDocument::new();
        // Viewport 500: start = 1000 - 400 = 600, end = 1200.
        let element = document.create(Bounds::new(1000.0, 200.0));
        (ScrollScene::new(document, 500.0), element)
    }

    fn opacity(scene: &ScrollScene<MemoryDocument>, element: ElementId) -> f32 {
        scene.document().style(element).expect("attached").opacity
    }

    #[test]
    fn default_policy_follows_scroll_direction() {
        let (mut scene, element) = scene_with_element();
        let binding = scene.animate(fade_up(element)).expect("attached");
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::Idle));

        scene.scroll_to(650.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::EnteredForward));
        scene.tick(MS * 2000);
        assert!((opacity(&scene, element) - 1.0).abs() < f32::EPSILON);

        // Scrolling on past the end through the top does not reverse.
        scene.scroll_to(3000.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::EnteredForward));
        scene.tick(MS * 3000);
        assert!((opacity(&scene, element) - 1.0).abs() < f32::EPSILON);

        // Back above the start rewinds.
        scene.scroll_to(0.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::ExitedReverse));
        scene.tick(MS * 5000);
        assert!(opacity(&scene, element).abs() < f32::EPSILON);

        scene.scroll_to(700.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::EnteredForward));
    }

    #[test]
    fn already_passed_trigger_plays_on_registration() {
        let (mut scene, element) = scene_with_element();
        scene.scroll_to(800.0);
        let binding = scene.animate(fade_up(element)).expect("attached");
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::EnteredForward));
        assert_eq!(scene.in_flight_count(), 1);
    }

    #[test]
    fn scrub_binding_tracks_scroll_progress() {
        let (mut scene, element) = scene_with_element();
        let spec = fade_up(element).trigger(
            TriggerSpec::at(Threshold::top_at(0.8))
                .until(EndThreshold::Relative(Offset::Pixels(400.0)))
                .scrub(Scrub::Instant),
        );
        let binding = scene.animate(spec).expect("attached");
        assert_eq!(scene.trigger_state(binding), None);
        assert_eq!(scene.scrub_progress(binding), Some(0.0));

        scene.scroll_to(800.0);
        assert!((opacity(&scene, element) - 0.5).abs() < 1e-4);
        let progress = scene.scrub_progress(binding).expect("scrubbed binding");
        assert!((progress - 0.5).abs() < 1e-4);
        scene.scroll_to(800.3);
        assert!((opacity(&scene, element) - 0.5).abs() < 1e-4);
        scene.scroll_to(2000.0);
        assert!((opacity(&scene, element) - 1.0).abs() < f32::EPSILON);
        scene.scroll_to(800.0);
        assert!((opacity(&scene, element) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn scrub_progress_is_only_reported_for_scrubbed_bindings() {
        let (mut scene, element) = scene_with_element();
        let binding = scene.animate(fade_up(element)).expect("attached");
        scene.scroll_to(800.0);
        assert_eq!(scene.scrub_progress(binding), None);
        scene.unbind(binding);
        assert_eq!(scene.scrub_progress(binding), None);
    }

    #[test]
    fn custom_toggle_actions_drive_the_timeline() {
        let (mut scene, element) = scene_with_element();
        let actions = "restart pause resume reset"
            .parse::<ToggleActions>()
            .expect("valid actions");
        let spec =
            fade_up(element).trigger(TriggerSpec::at(Threshold::top_at(0.8)).toggle(actions));
        let binding = scene.animate(spec).expect("attached");

        scene.scroll_to(650.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::EnteredForward));
        scene.tick(MS * 400);
        assert!((opacity(&scene, element) - 0.4).abs() < 1e-4);

        // Leaving through the top pauses in place.
        scene.scroll_to(1300.0);
        assert_eq!(scene.in_flight_count(), 0);
        scene.tick(MS * 900);
        assert!((opacity(&scene, element) - 0.4).abs() < 1e-4);

        // Coming back resumes from where it stopped.
        scene.scroll_to(900.0);
        scene.tick(MS * 1000);
        assert!((opacity(&scene, element) - 0.5).abs() < 1e-4);

        // Above the start everything snaps back.
        scene.scroll_to(0.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::ExitedReverse));
        assert!(opacity(&scene, element).abs() < f32::EPSILON);
        assert_eq!(scene.in_flight_count(), 0);

        let timeline = scene.binding_timeline(binding).expect("bound");
        assert!(!scene.timelines().is_in_flight(timeline));
        assert_eq!(
            TriggerPolicy::new(actions).actions().for_crossing(Crossing::Leave),
            ToggleAction::Pause
        );
    }

    #[test]
    fn once_trigger_releases_subscription_but_keeps_playing() {
        let (mut scene, element) = scene_with_element();
        let spec = fade_up(element).trigger(TriggerSpec::at(Threshold::top_at(0.8)).once());
        let binding = scene.animate(spec).expect("attached");
        assert_eq!(scene.subscription_count(), 1);

        scene.scroll_to(650.0);
        assert_eq!(scene.subscription_count(), 0);
        assert_eq!(scene.in_flight_count(), 1);

        scene.scroll_to(0.0);
        scene.tick(MS * 2000);
        assert!((opacity(&scene, element) - 1.0).abs() < f32::EPSILON);

        assert!(scene.unbind(binding));
        assert_eq!(scene.timeline_count(), 0);
    }

    #[test]
    fn unbinding_mid_animation_cancels_in_place() {
        let (mut scene, element) = scene_with_element();
        let binding = scene.animate(fade_up(element)).expect("attached");
        scene.scroll_to(650.0);
        scene.tick(MS * 300);

        assert!(scene.unbind(binding));
        assert!(!scene.unbind(binding));
        scene.tick(MS * 900);
        assert!((opacity(&scene, element) - 0.3).abs() < 1e-4);
        assert_eq!(scene.subscription_count(), 0);
        assert_eq!(scene.in_flight_count(), 0);
    }

    #[test]
    fn detached_trigger_element_skips_binding() {
        let (mut scene, element) = scene_with_element();
        let ghost = ElementId(9_999);
        let spec = fade_up(element).trigger(TriggerSpec::at(Threshold::top_at(0.8)).on(ghost));
        assert!(scene.animate(spec).is_none());
        assert_eq!(scene.timeline_count(), 0);
        assert_eq!(scene.subscription_count(), 0);
    }

    #[test]
    fn every_binding_sees_the_same_snapshot() {
        let mut document = MemoryDocument::new();
        let first = document.create(Bounds::new(600.0, 100.0));
        let second = document.create(Bounds::new(650.0, 100.0));
        let mut scene = ScrollScene::new(document, 500.0);
        let trigger = TriggerSpec::at(Threshold::top_at(0.8)).toggle(ToggleActions::PLAY_REVERSE);
        let a = scene.animate(fade_up(first).trigger(trigger)).expect("attached");
        let b = scene.animate(fade_up(second).trigger(trigger)).expect("attached");

        // Starts at 200 and 250; one scroll to 260 enters both.
        scene.scroll_to(260.0);
        assert_eq!(scene.trigger_state(a), Some(TriggerState::EnteredForward));
        assert_eq!(scene.trigger_state(b), Some(TriggerState::EnteredForward));
    }

    #[test]
    fn resize_moves_thresholds() {
        let (mut scene, element) = scene_with_element();
        let binding = scene.animate(fade_up(element)).expect("attached");
        scene.scroll_to(300.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::Idle));

        scene.resize(1000.0);
        assert_eq!(scene.trigger_state(binding), Some(TriggerState::EnteredForward));
    }
}
