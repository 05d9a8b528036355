//! Trigger grammar and the per-binding toggle state machine.
//!
//! A trigger ties a timeline to a scroll range. Its start and end are written the
//! way page authors think about them (`"top 80%"`: the element's top edge meets the
//! line 80% down the viewport) and resolved to absolute scroll offsets by the
//! viewport observer.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{Bounds, ElementId};
use crate::observer::Crossing;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while parsing trigger, toggle-action or easing strings.
pub enum GrammarError {
    /// Threshold string is not `<element edge> <viewport anchor>`.
    #[error("Invalid threshold: {0}")]
    Threshold(String),
    /// Toggle action list is not four known action words.
    #[error("Invalid toggle actions: {0}")]
    ToggleActions(String),
    /// Easing name is unknown or malformed.
    #[error("Invalid easing: {0}")]
    Easing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Position along an element or the viewport.
pub enum Offset {
    /// Fraction of the height, `0.0` is the top edge.
    Fraction(f32),
    /// Absolute pixels from the top edge.
    Pixels(f32),
}

impl Offset {
    /// Top edge.
    pub const TOP: Offset = Offset::Fraction(0.0);
    /// Vertical centre.
    pub const CENTER: Offset = Offset::Fraction(0.5);
    /// Bottom edge.
    pub const BOTTOM: Offset = Offset::Fraction(1.0);

    /// Convert to pixels against a box of the given height.
    #[must_use]
    pub fn to_pixels(self, height: f32) -> f32 {
        match self {
            Offset::Fraction(fraction) => height * fraction,
            Offset::Pixels(pixels) => pixels,
        }
    }
}

impl FromStr for Offset {
    type Err = ();

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        match word {
            "top" => Ok(Offset::TOP),
            "center" => Ok(Offset::CENTER),
            "bottom" => Ok(Offset::BOTTOM),
            _ => {
                if let Some(percent) = word.strip_suffix('%') {
                    percent
                        .parse::<f32>()
                        .map(|value| Offset::Fraction(value / 100.0))
                        .map_err(drop)
                } else if let Some(pixels) = word.strip_suffix("px") {
                    pixels.parse::<f32>().map(Offset::Pixels).map_err(drop)
                } else {
                    word.parse::<f32>().map(Offset::Pixels).map_err(drop)
                }
            }
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Offset::Fraction(fraction) => write!(formatter, "{}%", fraction * 100.0),
            Offset::Pixels(pixels) => write!(formatter, "{pixels}px"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Point where an element edge meets a viewport line.
pub struct Threshold {
    /// Position on the element.
    pub element: Offset,
    /// Position on the viewport.
    pub viewport: Offset,
}

impl Threshold {
    /// Default start: element top meets viewport bottom.
    pub const TOP_BOTTOM: Threshold = Threshold::new(Offset::TOP, Offset::BOTTOM);
    /// Default end: element bottom meets viewport top.
    pub const BOTTOM_TOP: Threshold = Threshold::new(Offset::BOTTOM, Offset::TOP);

    /// Threshold from explicit offsets.
    #[must_use]
    pub const fn new(element: Offset, viewport: Offset) -> Self {
        Self { element, viewport }
    }

    /// Element top meets the line `fraction` of the way down the viewport.
    #[must_use]
    pub const fn top_at(fraction: f32) -> Self {
        Self::new(Offset::TOP, Offset::Fraction(fraction))
    }

    /// Scroll offset at which this threshold is met.
    #[must_use]
    pub fn resolve(&self, bounds: &Bounds, viewport_height: f32) -> f32 {
        bounds.top + self.element.to_pixels(bounds.height)
            - self.viewport.to_pixels(viewport_height)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::TOP_BOTTOM
    }
}

impl FromStr for Threshold {
    type Err = GrammarError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || GrammarError::Threshold(raw.to_owned());
        let mut words = raw.split_whitespace();
        let element = words.next().ok_or_else(invalid)?;
        let viewport = words.next().ok_or_else(invalid)?;
        if words.next().is_some() {
            return Err(invalid());
        }
        Ok(Threshold {
            element: element.parse().map_err(|()| invalid())?,
            viewport: viewport.parse().map_err(|()| invalid())?,
        })
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.element, self.viewport)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// End of a trigger range.
pub enum EndThreshold {
    /// Resolved on its own, like the start.
    Absolute(Threshold),
    /// Distance past the resolved start: pixels (`"+=300"`) or a share of the
    /// viewport height (`"+=400%"`).
    Relative(Offset),
}

impl Default for EndThreshold {
    fn default() -> Self {
        EndThreshold::Absolute(Threshold::BOTTOM_TOP)
    }
}

impl FromStr for EndThreshold {
    type Err = GrammarError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().strip_prefix("+=") {
            Some(distance) => distance
                .trim()
                .parse::<Offset>()
                .map(EndThreshold::Relative)
                .map_err(|()| GrammarError::Threshold(raw.to_owned())),
            None => raw.parse().map(EndThreshold::Absolute),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// What a timeline does when its trigger is crossed.
pub enum ToggleAction {
    /// Play towards the end.
    Play,
    /// Freeze in place.
    Pause,
    /// Continue in the direction it was going before a pause.
    Resume,
    /// Play back towards the start.
    Reverse,
    /// Jump to the start and play forward.
    Restart,
    /// Jump to the start and stop.
    Reset,
    /// Jump to the end and stop.
    Complete,
    /// Do nothing.
    None,
}

impl FromStr for ToggleAction {
    type Err = GrammarError;

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        match word {
            "play" => Ok(ToggleAction::Play),
            "pause" => Ok(ToggleAction::Pause),
            "resume" => Ok(ToggleAction::Resume),
            "reverse" => Ok(ToggleAction::Reverse),
            "restart" => Ok(ToggleAction::Restart),
            "reset" => Ok(ToggleAction::Reset),
            "complete" => Ok(ToggleAction::Complete),
            "none" => Ok(ToggleAction::None),
            _ => Err(GrammarError::ToggleActions(word.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Actions for the four crossings of a trigger range.
pub struct ToggleActions {
    /// Scrolling down past the start.
    pub on_enter: ToggleAction,
    /// Scrolling down past the end.
    pub on_leave: ToggleAction,
    /// Scrolling up past the end.
    pub on_enter_back: ToggleAction,
    /// Scrolling up past the start.
    pub on_leave_back: ToggleAction,
}

impl ToggleActions {
    /// `play none none reverse`: replay on every entry, rewind when scrolled back above.
    pub const PLAY_REVERSE: ToggleActions = ToggleActions {
        on_enter: ToggleAction::Play,
        on_leave: ToggleAction::None,
        on_enter_back: ToggleAction::None,
        on_leave_back: ToggleAction::Reverse,
    };

    /// `play none none none`: play once and stay there.
    pub const PLAY_ONLY: ToggleActions = ToggleActions {
        on_enter: ToggleAction::Play,
        on_leave: ToggleAction::None,
        on_enter_back: ToggleAction::None,
        on_leave_back: ToggleAction::None,
    };

    /// Action configured for a crossing.
    #[must_use]
    pub fn for_crossing(&self, crossing: Crossing) -> ToggleAction {
        match crossing {
            Crossing::Enter => self.on_enter,
            Crossing::Leave => self.on_leave,
            Crossing::EnterBack => self.on_enter_back,
            Crossing::LeaveBack => self.on_leave_back,
        }
    }
}

impl Default for ToggleActions {
    fn default() -> Self {
        ToggleActions::PLAY_REVERSE
    }
}

impl FromStr for ToggleActions {
    type Err = GrammarError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let words = raw.split_whitespace().collect::<Vec<_>>();
        let [enter, leave, enter_back, leave_back] = words.as_slice() else {
            return Err(GrammarError::ToggleActions(raw.to_owned()));
        };
        let parse = |word: &str| {
            word.parse::<ToggleAction>()
                .map_err(|_word| GrammarError::ToggleActions(raw.to_owned()))
        };
        Ok(ToggleActions {
            on_enter: parse(enter)?,
            on_leave: parse(leave)?,
            on_enter_back: parse(enter_back)?,
            on_leave_back: parse(leave_back)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Playback state of a toggle binding.
pub enum TriggerState {
    /// Never triggered.
    Idle,
    /// Played forward, at or heading to the "to" values.
    EnteredForward,
    /// Played back, at or heading to the "from" values.
    ExitedReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// State machine deciding the timeline action for each observed crossing.
pub struct TriggerPolicy {
    actions: ToggleActions,
    state: TriggerState,
}

impl TriggerPolicy {
    /// Fresh policy in [`TriggerState::Idle`].
    #[must_use]
    pub fn new(actions: ToggleActions) -> Self {
        Self {
            actions,
            state: TriggerState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Configured actions.
    #[must_use]
    pub fn actions(&self) -> ToggleActions {
        self.actions
    }

    /// Advance the state machine and return the action the timeline must perform.
    pub fn on_crossing(&mut self, crossing: Crossing) -> ToggleAction {
        let action = self.actions.for_crossing(crossing);
        self.state = match action {
            ToggleAction::Play | ToggleAction::Restart | ToggleAction::Complete => {
                TriggerState::EnteredForward
            }
            ToggleAction::Reverse | ToggleAction::Reset => TriggerState::ExitedReverse,
            ToggleAction::Resume if self.state == TriggerState::Idle => {
                TriggerState::EnteredForward
            }
            ToggleAction::Resume | ToggleAction::Pause | ToggleAction::None => self.state,
        };
        action
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// How a scrubbed timeline follows the scroll position.
pub enum Scrub {
    /// Seek straight to the scroll-derived progress.
    Instant,
    /// Catch up to the scroll-derived progress over the given lag.
    Smoothed(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Whether a binding fires discrete actions or tracks scroll continuously.
pub enum TriggerMode {
    /// Run [`ToggleActions`] on crossings.
    Toggle {
        /// Crossing actions.
        actions: ToggleActions,
        /// Unregister after the first enter.
        once: bool,
    },
    /// Bind progress to the scroll position between start and end.
    Scrub(Scrub),
}

impl Default for TriggerMode {
    fn default() -> Self {
        TriggerMode::Toggle {
            actions: ToggleActions::default(),
            once: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Viewport-relative activation rule for a timeline.
pub struct TriggerSpec {
    /// Reference element; `None` uses the first animated target.
    pub element: Option<ElementId>,
    /// Start of the range.
    pub start: Threshold,
    /// End of the range.
    pub end: EndThreshold,
    /// Discrete or scrubbed.
    pub mode: TriggerMode,
}

impl TriggerSpec {
    /// Toggle trigger starting at `start` with default actions.
    #[must_use]
    pub fn at(start: Threshold) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// Use a different reference element than the first target.
    #[must_use]
    pub fn on(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }

    /// Set the end of the range.
    #[must_use]
    pub fn until(mut self, end: EndThreshold) -> Self {
        self.end = end;
        self
    }

    /// Use the given crossing actions.
    #[must_use]
    pub fn toggle(mut self, actions: ToggleActions) -> Self {
        self.mode = TriggerMode::Toggle {
            actions,
            once: false,
        };
        self
    }

    /// Play once on first entry, then release the trigger.
    #[must_use]
    pub fn once(mut self) -> Self {
        let actions = match self.mode {
            TriggerMode::Toggle { actions, .. } => actions,
            TriggerMode::Scrub(_) => ToggleActions::PLAY_ONLY,
        };
        self.mode = TriggerMode::Toggle {
            actions,
            once: true,
        };
        self
    }

    /// Bind progress to scroll position.
    #[must_use]
    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.mode = TriggerMode::Scrub(scrub);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source_thresholds() {
        let threshold: Threshold = "top 80%".parse().expect("valid threshold");
        assert_eq!(threshold, Threshold::top_at(0.8));

        let threshold: Threshold = "top bottom".parse().expect("valid threshold");
        assert_eq!(threshold, Threshold::TOP_BOTTOM);

        let threshold: Threshold = "bottom 20%".parse().expect("valid threshold");
        assert_eq!(
            threshold,
            Threshold::new(Offset::BOTTOM, Offset::Fraction(0.2))
        );

        let threshold: Threshold = "center 120px".parse().expect("valid threshold");
        assert_eq!(
            threshold,
            Threshold::new(Offset::CENTER, Offset::Pixels(120.0))
        );
    }

    #[test]
    fn rejects_malformed_thresholds() {
        assert!("top".parse::<Threshold>().is_err(), "missing viewport anchor");
        assert!("top 80% extra".parse::<Threshold>().is_err(), "trailing word");
        assert!("left center".parse::<Threshold>().is_err(), "horizontal edges");
    }

    #[test]
    fn parses_relative_end() {
        assert_eq!(
            "+=300".parse::<EndThreshold>().ok(),
            Some(EndThreshold::Relative(Offset::Pixels(300.0)))
        );
        assert_eq!(
            "+=400%".parse::<EndThreshold>().ok(),
            Some(EndThreshold::Relative(Offset::Fraction(4.0)))
        );
        assert!("+=far".parse::<EndThreshold>().is_err());
        assert_eq!(
            "bottom top".parse::<EndThreshold>().ok(),
            Some(EndThreshold::default())
        );
    }

    #[test]
    fn resolves_against_element_and_viewport() {
        let bounds = Bounds::new(1000.0, 200.0);
        let start = Threshold::top_at(0.8).resolve(&bounds, 500.0);
        assert!((start - 600.0).abs() < f32::EPSILON);

        let end = Threshold::BOTTOM_TOP.resolve(&bounds, 500.0);
        assert!((end - 1200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_toggle_actions() {
        let actions: ToggleActions = "play none none reverse".parse().expect("valid actions");
        assert_eq!(actions, ToggleActions::PLAY_REVERSE);

        let actions: ToggleActions = "restart pause resume reset".parse().expect("valid actions");
        assert_eq!(actions.on_leave, ToggleAction::Pause);
        assert_eq!(actions.on_leave_back, ToggleAction::Reset);

        assert!("play none none".parse::<ToggleActions>().is_err());
        assert!("play none none rewind".parse::<ToggleActions>().is_err());
    }

    #[test]
    fn default_policy_plays_then_reverses_only_on_leave_back() {
        let mut policy = TriggerPolicy::new(ToggleActions::PLAY_REVERSE);
        assert_eq!(policy.state(), TriggerState::Idle);

        assert_eq!(policy.on_crossing(Crossing::Enter), ToggleAction::Play);
        assert_eq!(policy.state(), TriggerState::EnteredForward);

        // Leaving through the top keeps the forward state.
        assert_eq!(policy.on_crossing(Crossing::Leave), ToggleAction::None);
        assert_eq!(policy.state(), TriggerState::EnteredForward);
        assert_eq!(policy.on_crossing(Crossing::EnterBack), ToggleAction::None);
        assert_eq!(policy.state(), TriggerState::EnteredForward);

        assert_eq!(policy.on_crossing(Crossing::LeaveBack), ToggleAction::Reverse);
        assert_eq!(policy.state(), TriggerState::ExitedReverse);

        assert_eq!(policy.on_crossing(Crossing::Enter), ToggleAction::Play);
        assert_eq!(policy.state(), TriggerState::EnteredForward);
    }

    #[test]
    fn play_only_policy_never_reverses() {
        let mut policy = TriggerPolicy::new(ToggleActions::PLAY_ONLY);
        policy.on_crossing(Crossing::Enter);
        assert_eq!(policy.on_crossing(Crossing::LeaveBack), ToggleAction::None);
        assert_eq!(policy.state(), TriggerState::EnteredForward);
    }

    #[test]
    fn enter_without_action_stays_idle() {
        let actions: ToggleActions = "none none none reverse".parse().expect("valid actions");
        let mut policy = TriggerPolicy::new(actions);
        assert_eq!(policy.on_crossing(Crossing::Enter), ToggleAction::None);
        assert_eq!(policy.state(), TriggerState::Idle);
    }

    #[test]
    fn once_keeps_configured_actions() {
        let spec = TriggerSpec::at(Threshold::top_at(0.8)).once();
        assert_eq!(
            spec.mode,
            TriggerMode::Toggle {
                actions: ToggleActions::PLAY_REVERSE,
                once: true
            }
        );
    }
}
