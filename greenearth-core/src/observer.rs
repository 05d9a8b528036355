//! Viewport observer turning scroll snapshots into threshold crossings.

use slotmap::{SlotMap, new_key_type};
use tracing::{trace, warn};

use crate::model::{ElementId, ScrollSnapshot};
use crate::ports::Document;
use crate::trigger::{EndThreshold, Threshold};

new_key_type! {
    /// Handle to an observed element range.
    pub struct SubscriptionId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Direction-aware threshold crossing.
pub enum Crossing {
    /// Scrolled down past the start.
    Enter,
    /// Scrolled down past the end.
    Leave,
    /// Scrolled up past the end.
    EnterBack,
    /// Scrolled up past the start.
    LeaveBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Before,
    Active,
    After,
}

impl Region {
    fn crossings_to(self, next: Region) -> &'static [Crossing] {
        match (self, next) {
            (Region::Before, Region::Active) => &[Crossing::Enter],
            (Region::Before, Region::After) => &[Crossing::Enter, Crossing::Leave],
            (Region::Active, Region::After) => &[Crossing::Leave],
            (Region::Active, Region::Before) => &[Crossing::LeaveBack],
            (Region::After, Region::Active) => &[Crossing::EnterBack],
            (Region::After, Region::Before) => &[Crossing::EnterBack, Crossing::LeaveBack],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Resolved scroll offsets of a trigger range, in whole pixels.
pub struct ScrollRange {
    /// Offset where the range starts.
    pub start: f32,
    /// Offset where the range ends, never before `start`.
    pub end: f32,
}

impl ScrollRange {
    /// Progress of `scroll` through the range, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self, scroll: f32) -> f32 {
        let length = self.end - self.start;
        if length <= 0.0 {
            return if scroll >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll - self.start) / length).clamp(0.0, 1.0)
    }

    fn region(&self, scroll: f32) -> Region {
        if scroll < self.start {
            Region::Before
        } else if scroll >= self.end {
            Region::After
        } else {
            Region::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Crossing observed for one subscription.
pub struct ObserverEvent {
    /// Subscription whose range was crossed.
    pub subscription: SubscriptionId,
    /// Which boundary, in which direction.
    pub crossing: Crossing,
}

#[derive(Debug)]
struct Subscription {
    element: ElementId,
    start: Threshold,
    end: EndThreshold,
    range: Option<ScrollRange>,
    region: Region,
}

/// Process-wide set of observed trigger ranges.
///
/// Every evaluation reads one [`ScrollSnapshot`]; ranges are compared in
/// subscription order against the snapshot's whole-pixel scroll offset.
#[derive(Debug)]
pub struct ViewportObserver {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    order: Vec<SubscriptionId>,
    snapshot: ScrollSnapshot,
}

impl ViewportObserver {
    /// Observer for a viewport of the given height scrolled to the top.
    #[must_use]
    pub fn new(viewport_height: f32) -> Self {
        Self {
            subscriptions: SlotMap::with_key(),
            order: Vec::new(),
            snapshot: ScrollSnapshot::new(0.0, viewport_height),
        }
    }

    /// Start observing the range between `start` and `end` on `element`.
    ///
    /// Returns `None` when the element is not attached to the document.
    pub fn observe<D: Document + ?Sized>(
        &mut self,
        document: &D,
        element: ElementId,
        start: Threshold,
        end: EndThreshold,
    ) -> Option<SubscriptionId> {
        let Some(range) = resolve(document, element, start, end, self.snapshot.viewport_height)
        else {
            trace!(?element, "skipping observe of detached element");
            return None;
        };

        let id = self.subscriptions.insert(Subscription {
            element,
            start,
            end,
            range: Some(range),
            region: Region::Before,
        });
        self.order.push(id);
        trace!(?id, ?element, start = range.start, end = range.end, "observing");
        Some(id)
    }

    /// Stop observing. Unknown or already removed handles are ignored.
    pub fn unobserve(&mut self, id: SubscriptionId) -> bool {
        if self.subscriptions.remove(id).is_none() {
            return false;
        }
        self.order.retain(|candidate| *candidate != id);
        true
    }

    /// Whether the subscription is still registered.
    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.subscriptions.contains_key(id)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscription is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Resolved range of a subscription; `None` if unknown or its element went away.
    #[must_use]
    pub fn range(&self, id: SubscriptionId) -> Option<ScrollRange> {
        self.subscriptions.get(id).and_then(|sub| sub.range)
    }

    /// Snapshot used by the last evaluation.
    #[must_use]
    pub fn snapshot(&self) -> ScrollSnapshot {
        self.snapshot
    }

    /// Evaluate every range against `snapshot` and return the crossings, in subscription order.
    pub fn update(&mut self, snapshot: ScrollSnapshot) -> Vec<ObserverEvent> {
        self.snapshot = snapshot;
        let scroll = snapshot.pixel();
        let mut events = Vec::new();

        for &id in &self.order {
            let Some(sub) = self.subscriptions.get_mut(id) else {
                continue;
            };
            let Some(range) = sub.range else {
                continue;
            };
            let next = range.region(scroll);
            for &crossing in sub.region.crossings_to(next) {
                trace!(?id, ?crossing, scroll, "crossing");
                events.push(ObserverEvent {
                    subscription: id,
                    crossing,
                });
            }
            sub.region = next;
        }
        events
    }

    /// Re-resolve every range, e.g. after a resize or a layout change, then re-evaluate.
    pub fn refresh<D: Document + ?Sized>(
        &mut self,
        document: &D,
        viewport_height: f32,
    ) -> Vec<ObserverEvent> {
        for sub in self.subscriptions.values_mut() {
            sub.range = resolve(document, sub.element, sub.start, sub.end, viewport_height);
        }
        let snapshot = ScrollSnapshot::new(self.snapshot.scroll_y, viewport_height);
        self.update(snapshot)
    }
}

fn resolve<D: Document + ?Sized>(
    document: &D,
    element: ElementId,
    start: Threshold,
    end: EndThreshold,
    viewport_height: f32,
) -> Option<ScrollRange> {
    let bounds = document.bounds(element)?;
    let start_px = start.resolve(&bounds, viewport_height).round();
    let mut end_px = match end {
        EndThreshold::Absolute(threshold) => threshold.resolve(&bounds, viewport_height).round(),
        EndThreshold::Relative(distance) => {
            start_px + distance.to_pixels(viewport_height).round()
        }
    };
    if end_px < start_px {
        warn!(?element, start_px, end_px, "trigger end precedes start, clamping");
        end_px = start_px;
    }
    Some(ScrollRange {
        start: start_px,
        end: end_px,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::model::Bounds;
    use crate::trigger::Offset;

    fn crossings(events: &[ObserverEvent]) -> Vec<Crossing> {
        events.iter().map(|event| event.crossing).collect()
    }

    fn fixture() -> (MemoryDocument, ViewportObserver, SubscriptionId) {
        let mut document = MemoryDocument::new();
        let element = document.create(Bounds::new(1000.0, 200.0));
        let mut observer = ViewportObserver::new(500.0);
        // start = 1000 - 400 = 600, end = 1200
        let id = observer
            .observe(
                &document,
                element,
                Threshold::top_at(0.8),
                EndThreshold::default(),
            )
            .expect("element is attached");
        (document, observer, id)
    }

    #[test]
    fn emits_each_crossing_once_per_direction() {
        let (_document, mut observer, _id) = fixture();

        assert!(observer.update(ScrollSnapshot::new(100.0, 500.0)).is_empty());
        assert_eq!(
            crossings(&observer.update(ScrollSnapshot::new(650.0, 500.0))),
            vec![Crossing::Enter]
        );
        assert!(observer.update(ScrollSnapshot::new(700.0, 500.0)).is_empty());
        assert_eq!(
            crossings(&observer.update(ScrollSnapshot::new(1300.0, 500.0))),
            vec![Crossing::Leave]
        );
        assert_eq!(
            crossings(&observer.update(ScrollSnapshot::new(900.0, 500.0))),
            vec![Crossing::EnterBack]
        );
        assert_eq!(
            crossings(&observer.update(ScrollSnapshot::new(0.0, 500.0))),
            vec![Crossing::LeaveBack]
        );
    }

    #[test]
    fn jump_over_whole_range_emits_both_crossings() {
        let (_document, mut observer, _id) = fixture();
        assert_eq!(
            crossings(&observer.update(ScrollSnapshot::new(5000.0, 500.0))),
            vec![Crossing::Enter, Crossing::Leave]
        );
        assert_eq!(
            crossings(&observer.update(ScrollSnapshot::new(0.0, 500.0))),
            vec![Crossing::EnterBack, Crossing::LeaveBack]
        );
    }

    #[test]
    fn sub_pixel_jitter_does_not_refire() {
        let (_document, mut observer, _id) = fixture();
        assert_eq!(
            crossings(&observer.update(ScrollSnapshot::new(600.0, 500.0))),
            vec![Crossing::Enter]
        );
        for scroll in [599.7, 600.2, 599.6, 600.4] {
            assert!(
                observer.update(ScrollSnapshot::new(scroll, 500.0)).is_empty(),
                "jitter at {scroll} must not cross"
            );
        }
    }

    #[test]
    fn unobserve_is_idempotent() {
        let (_document, mut observer, id) = fixture();
        assert_eq!(observer.len(), 1);
        assert!(observer.unobserve(id));
        assert!(!observer.unobserve(id));
        assert!(observer.is_empty());
        assert!(observer.update(ScrollSnapshot::new(700.0, 500.0)).is_empty());
    }

    #[test]
    fn detached_elements_are_skipped() {
        let mut document = MemoryDocument::new();
        let element = document.create(Bounds::new(0.0, 10.0));
        document.detach(element);
        let mut observer = ViewportObserver::new(500.0);

        let id = observer.observe(
            &document,
            element,
            Threshold::default(),
            EndThreshold::default(),
        );
        assert!(id.is_none());
        assert!(observer.is_empty());
    }

    #[test]
    fn resize_recomputes_thresholds() {
        let (document, mut observer, id) = fixture();
        observer.update(ScrollSnapshot::new(550.0, 500.0));

        // Taller viewport: start = 1000 - 800 = 200, so 550 is now inside the range.
        let events = observer.refresh(&document, 1000.0);
        assert_eq!(crossings(&events), vec![Crossing::Enter]);
        let range = observer.range(id).expect("range resolved");
        assert!((range.start - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn relative_percent_end_scales_with_viewport() {
        let mut document = MemoryDocument::new();
        let element = document.create(Bounds::new(1000.0, 600.0));
        let mut observer = ViewportObserver::new(500.0);
        let end = "+=400%".parse::<EndThreshold>().expect("valid end");
        let id = observer
            .observe(&document, element, Threshold::new(Offset::TOP, Offset::TOP), end)
            .expect("element is attached");

        let range = observer.range(id).expect("range resolved");
        assert!((range.start - 1000.0).abs() < f32::EPSILON);
        assert!((range.end - 3000.0).abs() < f32::EPSILON);

        observer.refresh(&document, 250.0);
        let range = observer.range(id).expect("range resolved");
        assert!((range.end - 2000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn inverted_range_is_clamped() {
        let mut document = MemoryDocument::new();
        let element = document.create(Bounds::new(1000.0, 100.0));
        let mut observer = ViewportObserver::new(500.0);
        let id = observer
            .observe(
                &document,
                element,
                Threshold::new(Offset::BOTTOM, Offset::TOP),
                EndThreshold::Absolute(Threshold::TOP_BOTTOM),
            )
            .expect("element is attached");

        let range = observer.range(id).expect("range resolved");
        assert!((range.start - range.end).abs() < f32::EPSILON);
        assert!((range.progress(range.start - 1.0)).abs() < f32::EPSILON);
        assert!((range.progress(range.start) - 1.0).abs() < f32::EPSILON);
    }
}
