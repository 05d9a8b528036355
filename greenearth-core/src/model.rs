//! Visual data model shared by the observer, the timeline registry and the host document.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier for an element living in the host document.
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Vertical extent of an element in document coordinates (pixels from the document top).
pub struct Bounds {
    /// Offset of the top edge.
    pub top: f32,
    /// Height of the element.
    pub height: f32,
}

impl Bounds {
    /// Construct bounds from a top offset and a height.
    #[must_use]
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Offset of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Visual properties a timeline can drive.
pub enum Property {
    /// Opacity, 0 is invisible.
    Opacity,
    /// Horizontal offset in pixels.
    X,
    /// Vertical offset in pixels.
    Y,
    /// Uniform scale factor.
    Scale,
    /// Rotation in degrees.
    Rotation,
    /// Free scalar with no visual meaning of its own, e.g. a number counted up on screen.
    Value,
}

impl Property {
    /// Every animatable property.
    pub const ALL: [Property; 6] = [
        Property::Opacity,
        Property::X,
        Property::Y,
        Property::Scale,
        Property::Rotation,
        Property::Value,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Resolved visual state of one element.
pub struct Style {
    /// Opacity.
    pub opacity: f32,
    /// Horizontal offset.
    pub x: f32,
    /// Vertical offset.
    pub y: f32,
    /// Scale factor.
    pub scale: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Free scalar track.
    pub value: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            value: 0.0,
        }
    }
}

impl Style {
    /// Read a single property.
    #[must_use]
    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::Opacity => self.opacity,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Scale => self.scale,
            Property::Rotation => self.rotation,
            Property::Value => self.value,
        }
    }

    /// Overwrite a single property.
    pub fn set(&mut self, property: Property, value: f32) {
        let slot = match property {
            Property::Opacity => &mut self.opacity,
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Scale => &mut self.scale,
            Property::Rotation => &mut self.rotation,
            Property::Value => &mut self.value,
        };
        *slot = value;
    }

    /// Interpolate every property towards `other` by the (possibly overshooting) fraction.
    #[must_use]
    pub fn lerp(&self, other: &Style, fraction: f32) -> Style {
        let mut out = *self;
        for property in Property::ALL {
            let start = self.get(property);
            let end = other.get(property);
            out.set(property, start + (end - start) * fraction);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Partial property set used for the "from" and "to" side of an animation.
///
/// Properties left unset keep the element's current value.
pub struct PropertySet {
    /// Opacity.
    pub opacity: Option<f32>,
    /// Horizontal offset.
    pub x: Option<f32>,
    /// Vertical offset.
    pub y: Option<f32>,
    /// Scale factor.
    pub scale: Option<f32>,
    /// Rotation in degrees.
    pub rotation: Option<f32>,
    /// Free scalar track.
    pub value: Option<f32>,
}

impl PropertySet {
    /// Empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set opacity.
    #[must_use]
    pub fn opacity(mut self, value: f32) -> Self {
        self.opacity = Some(value);
        self
    }

    /// Set horizontal offset.
    #[must_use]
    pub fn x(mut self, value: f32) -> Self {
        self.x = Some(value);
        self
    }

    /// Set vertical offset.
    #[must_use]
    pub fn y(mut self, value: f32) -> Self {
        self.y = Some(value);
        self
    }

    /// Set scale.
    #[must_use]
    pub fn scale(mut self, value: f32) -> Self {
        self.scale = Some(value);
        self
    }

    /// Set rotation.
    #[must_use]
    pub fn rotation(mut self, value: f32) -> Self {
        self.rotation = Some(value);
        self
    }

    /// Set the free scalar track.
    #[must_use]
    pub fn value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    /// Read a single property if set.
    #[must_use]
    pub fn get(&self, property: Property) -> Option<f32> {
        match property {
            Property::Opacity => self.opacity,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Scale => self.scale,
            Property::Rotation => self.rotation,
            Property::Value => self.value,
        }
    }

    /// Check whether no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Property::ALL
            .into_iter()
            .all(|property| self.get(property).is_none())
    }

    /// Overlay the set properties on top of `base`.
    #[must_use]
    pub fn resolve(&self, base: &Style) -> Style {
        let mut style = *base;
        for property in Property::ALL {
            if let Some(value) = self.get(property) {
                style.set(property, value);
            }
        }
        style
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// How many extra cycles a timeline plays after the first one.
pub enum Repeat {
    /// Play once.
    #[default]
    Never,
    /// Play the given number of extra cycles.
    Times(u32),
    /// Loop until cancelled.
    Forever,
}

impl Repeat {
    /// Total number of cycles, `None` when unbounded.
    #[must_use]
    pub fn cycles(self) -> Option<u32> {
        match self {
            Repeat::Never => Some(1),
            Repeat::Times(extra) => Some(extra.saturating_add(1)),
            Repeat::Forever => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Timing parameters of a (possibly grouped) animation.
pub struct Timing {
    /// Length of one element's transition.
    pub duration: Duration,
    /// Wait before the first element starts when played forward from the beginning.
    pub delay: Duration,
    /// Extra start offset applied to each successive element of a group.
    pub stagger: Duration,
    /// Easing curve applied to every element.
    pub easing: Easing,
    /// Extra cycles after the first.
    pub repeat: Repeat,
    /// Play every other cycle backwards.
    pub yoyo: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(500),
            delay: Duration::ZERO,
            stagger: Duration::ZERO,
            easing: Easing::default(),
            repeat: Repeat::Never,
            yoyo: false,
        }
    }
}

impl Timing {
    /// Timing with the given duration and default everything else.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Set the base delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the per-element stagger interval.
    #[must_use]
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Set the easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the number of extra cycles.
    #[must_use]
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Alternate direction on every cycle.
    #[must_use]
    pub fn with_yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Stagger offset of the element at `index`, relative to the group's own start.
    #[must_use]
    pub fn stagger_offset(&self, index: usize) -> Duration {
        self.stagger
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Start time of the element at `index` when played forward from the beginning.
    #[must_use]
    pub fn start_offset(&self, index: usize) -> Duration {
        self.delay.saturating_add(self.stagger_offset(index))
    }

    /// Playhead span of a group of `count` elements, excluding the base delay.
    #[must_use]
    pub fn span(&self, count: usize) -> Duration {
        self.stagger_offset(count.saturating_sub(1))
            .saturating_add(self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Scroll metrics captured once per evaluation pass.
pub struct ScrollSnapshot {
    /// Current scroll offset of the viewport top.
    pub scroll_y: f32,
    /// Height of the visible viewport.
    pub viewport_height: f32,
}

impl ScrollSnapshot {
    /// Snapshot at the given offset and viewport height.
    #[must_use]
    pub fn new(scroll_y: f32, viewport_height: f32) -> Self {
        Self {
            scroll_y,
            viewport_height,
        }
    }

    /// Scroll offset rounded to whole pixels.
    #[must_use]
    pub fn pixel(&self) -> f32 {
        self.scroll_y.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_set_overlays_only_set_properties() {
        let base = Style {
            x: 12.0,
            ..Style::default()
        };
        let style = PropertySet::new().opacity(0.0).y(50.0).resolve(&base);

        assert!((style.opacity - 0.0).abs() < f32::EPSILON, "opacity overridden");
        assert!((style.y - 50.0).abs() < f32::EPSILON, "y overridden");
        assert!((style.x - 12.0).abs() < f32::EPSILON, "x kept from base");
        assert!((style.scale - 1.0).abs() < f32::EPSILON, "scale kept from base");
    }

    #[test]
    fn stagger_offsets_follow_index() {
        let timing = Timing::new(Duration::from_millis(800))
            .with_delay(Duration::from_millis(200))
            .with_stagger(Duration::from_millis(100));

        assert_eq!(timing.start_offset(0), Duration::from_millis(200));
        assert_eq!(timing.start_offset(3), Duration::from_millis(500));
        assert_eq!(timing.span(4), Duration::from_millis(1100));
        assert_eq!(timing.span(0), Duration::from_millis(800));
    }

    #[test]
    fn repeat_counts_cycles() {
        assert_eq!(Repeat::Never.cycles(), Some(1));
        assert_eq!(Repeat::Times(2).cycles(), Some(3));
        assert_eq!(Repeat::Forever.cycles(), None);
    }

    #[test]
    fn value_track_interpolates_like_any_property() {
        let start = PropertySet::new().value(0.0).resolve(&Style::default());
        let end = PropertySet::new().value(1.0).resolve(&Style::default());
        let middle = start.lerp(&end, 0.25);
        assert!((middle.value - 0.25).abs() < f32::EPSILON);
        assert!((middle.opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn snapshot_rounds_sub_pixel_scroll() {
        assert!((ScrollSnapshot::new(99.6, 600.0).pixel() - 100.0).abs() < f32::EPSILON);
        assert!((ScrollSnapshot::new(100.4, 600.0).pixel() - 100.0).abs() < f32::EPSILON);
    }
}
