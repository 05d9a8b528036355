//! Timeline registry: from/to style pairs, timing and playheads for every animation.
//!
//! The playhead of a timeline runs over `[0, span]` seconds, where the span covers
//! every staggered element but not the base delay. Playheads are always derived
//! from an anchor (`since`, `from`) and the current clock, never accumulated per
//! tick, so repeated ticks and seeks cannot drift.
//!
//! A repeating timeline runs its playhead over every cycle back to back; each
//! sample folds the playhead back into one cycle, mirrored on odd cycles when
//! the timing asks for yoyo playback.

use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use tracing::trace;

use crate::easing::SCRUB_SMOOTHING;
use crate::model::{ElementId, PropertySet, Style, Timing};
use crate::ports::Document;
use crate::trigger::ToggleAction;

new_key_type! {
    /// Handle to a registered timeline.
    pub struct TimelineId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Idle,
    Running {
        since: Duration,
        from: f32,
        direction: Direction,
        wait: f32,
    },
    Paused {
        direction: Direction,
    },
    Seeking {
        since: Duration,
        from: f32,
        to: f32,
        lag: f32,
    },
}

#[derive(Debug, Clone, Copy)]
struct Target {
    element: ElementId,
    start: Style,
    end: Style,
}

#[derive(Debug)]
struct Timeline {
    targets: Vec<Target>,
    timing: Timing,
    head: f32,
    motion: Motion,
}

impl Timeline {
    fn duration(&self) -> f32 {
        self.timing.duration.as_secs_f32().max(f32::EPSILON)
    }

    /// Length of one cycle.
    fn span(&self) -> f32 {
        let last = self.targets.len().saturating_sub(1);
        self.timing.stagger_offset(last).as_secs_f32() + self.duration()
    }

    /// Length of every cycle together; infinite for endless loops.
    fn total(&self) -> f32 {
        match self.timing.repeat.cycles() {
            Some(cycles) => {
                let cycles = u16::try_from(cycles).map_or(f32::from(u16::MAX), f32::from);
                self.span() * cycles
            }
            None => f32::INFINITY,
        }
    }

    /// Seekable length: every cycle, or a single one for endless loops.
    fn extent(&self) -> f32 {
        let total = self.total();
        if total.is_finite() { total } else { self.span() }
    }

    /// Position inside the current cycle for a playhead over all cycles.
    fn cycle_head(&self, head: f32) -> f32 {
        let span = self.span();
        let (cycle, position) = if head >= self.total() {
            // Finished: hold the end of the last cycle.
            let last = self.total() / span - 1.0;
            (last.round(), span)
        } else {
            let cycle = (head / span).floor();
            (cycle, head - cycle * span)
        };
        if self.timing.yoyo && cycle.rem_euclid(2.0) >= 1.0 {
            span - position
        } else {
            position
        }
    }

    fn head_at(&self, clock: Duration) -> f32 {
        let total = self.total();
        match self.motion {
            Motion::Idle | Motion::Paused { .. } => self.head,
            Motion::Running {
                since,
                from,
                direction,
                wait,
            } => {
                let elapsed = (clock.saturating_sub(since).as_secs_f32() - wait).max(0.0);
                match direction {
                    Direction::Forward => (from + elapsed).min(total),
                    Direction::Backward => (from - elapsed).max(0.0),
                }
            }
            Motion::Seeking {
                since,
                from,
                to,
                lag,
            } => {
                let elapsed = clock.saturating_sub(since).as_secs_f32();
                let fraction = if lag > 0.0 { elapsed / lag } else { 1.0 };
                from + (to - from) * SCRUB_SMOOTHING.apply(fraction)
            }
        }
    }

    fn is_moving(&self) -> bool {
        matches!(
            self.motion,
            Motion::Running { .. } | Motion::Seeking { .. }
        )
    }

    fn has_settled(&self, clock: Duration, head: f32) -> bool {
        match self.motion {
            Motion::Running {
                direction: Direction::Forward,
                ..
            } => head >= self.total(),
            Motion::Running {
                direction: Direction::Backward,
                ..
            } => head <= 0.0,
            Motion::Seeking { since, lag, .. } => {
                clock.saturating_sub(since).as_secs_f32() >= lag
            }
            Motion::Idle | Motion::Paused { .. } => true,
        }
    }

    fn sample(&self, index: usize, head: f32) -> Option<Style> {
        let target = self.targets.get(index)?;
        let local = self.cycle_head(head) - self.timing.stagger_offset(index).as_secs_f32();
        let linear = (local / self.duration()).clamp(0.0, 1.0);
        Some(target.start.lerp(&target.end, self.timing.easing.apply(linear)))
    }

    fn render<D: Document + ?Sized>(&self, document: &mut D) {
        for (index, target) in self.targets.iter().enumerate() {
            if let Some(style) = self.sample(index, self.head) {
                document.apply(target.element, &style);
            }
        }
    }

    fn settle(&mut self, clock: Duration) {
        self.head = self.head_at(clock);
    }
}

/// Owner of every timeline and of the animation clock.
#[derive(Debug, Default)]
pub struct TimelineRegistry {
    timelines: SlotMap<TimelineId, Timeline>,
    clock: Duration,
}

impl TimelineRegistry {
    /// Empty registry with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a timeline animating `targets` from `from` to `to`.
    ///
    /// Detached targets are skipped; returns `None` when none is attached. The
    /// "from" values are written to the document immediately.
    pub fn create<D: Document + ?Sized>(
        &mut self,
        document: &mut D,
        targets: &[ElementId],
        from: &PropertySet,
        to: &PropertySet,
        timing: Timing,
    ) -> Option<TimelineId> {
        let targets = targets
            .iter()
            .filter_map(|&element| {
                let base = document.style(element)?;
                Some(Target {
                    element,
                    start: from.resolve(&base),
                    end: to.resolve(&base),
                })
            })
            .collect::<Vec<_>>();

        if targets.is_empty() {
            trace!("skipping timeline without attached targets");
            return None;
        }

        let timeline = Timeline {
            targets,
            timing,
            head: 0.0,
            motion: Motion::Idle,
        };
        timeline.render(document);
        let id = self.timelines.insert(timeline);
        trace!(?id, "timeline created");
        Some(id)
    }

    /// Play forward from the current position. The base delay applies when starting from zero.
    pub fn play(&mut self, id: TimelineId) -> bool {
        let clock = self.clock;
        let Some(timeline) = self.timelines.get_mut(id) else {
            return false;
        };
        if let Motion::Running {
            direction: Direction::Forward,
            ..
        } = timeline.motion
        {
            return true;
        }
        timeline.settle(clock);
        timeline.motion = if timeline.head >= timeline.total() {
            Motion::Idle
        } else {
            Motion::Running {
                since: clock,
                from: timeline.head,
                direction: Direction::Forward,
                wait: if timeline.head <= 0.0 {
                    timeline.timing.delay.as_secs_f32()
                } else {
                    0.0
                },
            }
        };
        true
    }

    /// Play back towards the "from" values, without delay.
    pub fn reverse(&mut self, id: TimelineId) -> bool {
        let clock = self.clock;
        let Some(timeline) = self.timelines.get_mut(id) else {
            return false;
        };
        if let Motion::Running {
            direction: Direction::Backward,
            ..
        } = timeline.motion
        {
            return true;
        }
        timeline.settle(clock);
        timeline.motion = if timeline.head <= 0.0 {
            Motion::Idle
        } else {
            Motion::Running {
                since: clock,
                from: timeline.head,
                direction: Direction::Backward,
                wait: 0.0,
            }
        };
        true
    }

    /// Freeze the playhead where it is.
    pub fn pause(&mut self, id: TimelineId) -> bool {
        let clock = self.clock;
        let Some(timeline) = self.timelines.get_mut(id) else {
            return false;
        };
        let direction = match timeline.motion {
            Motion::Running { direction, .. } | Motion::Paused { direction } => direction,
            Motion::Idle | Motion::Seeking { .. } => Direction::Forward,
        };
        timeline.settle(clock);
        timeline.motion = Motion::Paused { direction };
        true
    }

    /// Continue a paused timeline in its previous direction; plays an idle one.
    pub fn resume(&mut self, id: TimelineId) -> bool {
        let clock = self.clock;
        let Some(timeline) = self.timelines.get_mut(id) else {
            return false;
        };
        if let Motion::Paused { direction } = timeline.motion {
            timeline.motion = Motion::Running {
                since: clock,
                from: timeline.head,
                direction,
                wait: 0.0,
            };
            return true;
        }
        if matches!(timeline.motion, Motion::Idle) {
            return self.play(id);
        }
        true
    }

    /// Jump to the start and play forward.
    pub fn restart<D: Document + ?Sized>(&mut self, id: TimelineId, document: &mut D) -> bool {
        self.seek_to(id, 0.0, document) && self.play(id)
    }

    /// Jump to the start and stop.
    pub fn reset<D: Document + ?Sized>(&mut self, id: TimelineId, document: &mut D) -> bool {
        self.seek_to(id, 0.0, document)
    }

    /// Jump to the end and stop.
    pub fn complete<D: Document + ?Sized>(&mut self, id: TimelineId, document: &mut D) -> bool {
        self.seek_to(id, 1.0, document)
    }

    /// Absolute seek to `progress` of the span (clamped to `[0, 1]`), stopping playback.
    ///
    /// The written styles depend only on `progress`.
    pub fn scrub<D: Document + ?Sized>(
        &mut self,
        id: TimelineId,
        progress: f32,
        document: &mut D,
    ) -> bool {
        self.seek_to(id, progress, document)
    }

    /// Glide towards `progress` over `lag`; a newer target replaces the old one.
    pub fn scrub_smoothed(&mut self, id: TimelineId, progress: f32, lag: Duration) -> bool {
        let clock = self.clock;
        let Some(timeline) = self.timelines.get_mut(id) else {
            return false;
        };
        let to = timeline.extent() * progress.clamp(0.0, 1.0);
        if let Motion::Seeking { to: current, .. } = timeline.motion
            && (current - to).abs() < f32::EPSILON
        {
            return true;
        }
        timeline.settle(clock);
        timeline.motion = Motion::Seeking {
            since: clock,
            from: timeline.head,
            to,
            lag: lag.as_secs_f32(),
        };
        true
    }

    /// Run a toggle action against a timeline.
    pub fn perform<D: Document + ?Sized>(
        &mut self,
        id: TimelineId,
        action: ToggleAction,
        document: &mut D,
    ) -> bool {
        trace!(?id, ?action, "toggle action");
        match action {
            ToggleAction::Play => self.play(id),
            ToggleAction::Pause => self.pause(id),
            ToggleAction::Resume => self.resume(id),
            ToggleAction::Reverse => self.reverse(id),
            ToggleAction::Restart => self.restart(id, document),
            ToggleAction::Reset => self.reset(id, document),
            ToggleAction::Complete => self.complete(id, document),
            ToggleAction::None => self.contains(id),
        }
    }

    /// Stop immediately, leave targets at their current values and release the timeline.
    pub fn cancel<D: Document + ?Sized>(&mut self, id: TimelineId, document: &mut D) -> bool {
        let Some(mut timeline) = self.timelines.remove(id) else {
            return false;
        };
        if timeline.is_moving() {
            timeline.settle(self.clock);
            timeline.render(document);
        }
        trace!(?id, "timeline cancelled");
        true
    }

    /// Advance the clock to `now` and write the styles of every moving timeline.
    pub fn tick<D: Document + ?Sized>(&mut self, now: Duration, document: &mut D) {
        self.clock = self.clock.max(now);
        let clock = self.clock;
        for timeline in self.timelines.values_mut() {
            if !timeline.is_moving() {
                continue;
            }
            let head = timeline.head_at(clock);
            let settled = timeline.has_settled(clock, head);
            timeline.head = head;
            if settled {
                timeline.motion = Motion::Idle;
            }
            timeline.render(document);
        }
    }

    /// Current clock.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Playhead position as a fraction of every cycle together; endless loops
    /// report the position inside the current cycle.
    #[must_use]
    pub fn progress(&self, id: TimelineId) -> Option<f32> {
        let timeline = self.timelines.get(id)?;
        let head = timeline.head_at(self.clock);
        let progress = if timeline.total().is_finite() {
            head / timeline.total()
        } else {
            head.rem_euclid(timeline.span()) / timeline.span()
        };
        Some(progress)
    }

    /// Styles of every target at the current clock, in registration order.
    #[must_use]
    pub fn styles(&self, id: TimelineId) -> Option<Vec<(ElementId, Style)>> {
        let timeline = self.timelines.get(id)?;
        let head = timeline.head_at(self.clock);
        Some(
            timeline
                .targets
                .iter()
                .enumerate()
                .filter_map(|(index, target)| {
                    timeline.sample(index, head).map(|style| (target.element, style))
                })
                .collect(),
        )
    }

    /// Whether the timeline is registered.
    #[must_use]
    pub fn contains(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(id)
    }

    /// Whether the timeline is playing or gliding.
    #[must_use]
    pub fn is_in_flight(&self, id: TimelineId) -> bool {
        self.timelines.get(id).is_some_and(Timeline::is_moving)
    }

    /// Number of timelines currently playing or gliding.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.timelines
            .values()
            .filter(|timeline| timeline.is_moving())
            .count()
    }

    /// Number of registered timelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    /// Whether no timeline is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    fn seek_to<D: Document + ?Sized>(
        &mut self,
        id: TimelineId,
        progress: f32,
        document: &mut D,
    ) -> bool {
        let Some(timeline) = self.timelines.get_mut(id) else {
            return false;
        };
        timeline.head = timeline.extent() * progress.clamp(0.0, 1.0);
        timeline.motion = Motion::Idle;
        timeline.render(document);
        true
    }
}
