//! Lifecycle binding: every handle created while a page mounts is collected into a
//! scope, and tearing the scope down releases all of them before the page's
//! elements go away.

use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::model::{ElementId, PropertySet, ScrollSnapshot, Timing};
use crate::ports::Document;
use crate::registry::TimelineId;
use crate::scene::{AnimationSpec, BindingId, ScrollScene};

new_key_type! {
    /// Handle returned by [`ScrollScene::bind`], consumed by [`ScrollScene::teardown`].
    pub struct TeardownHandle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopedHandle {
    Binding(BindingId),
    Timeline(TimelineId),
}

/// Book-keeping of live scopes.
#[derive(Debug, Default)]
pub struct LifecycleBinder {
    scopes: SlotMap<TeardownHandle, Vec<ScopedHandle>>,
}

impl LifecycleBinder {
    /// No live scopes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scopes bound and not yet torn down.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Whether the handle still refers to a live scope.
    #[must_use]
    pub fn contains(&self, handle: TeardownHandle) -> bool {
        self.scopes.contains_key(handle)
    }

    fn insert(&mut self, handles: Vec<ScopedHandle>) -> TeardownHandle {
        self.scopes.insert(handles)
    }

    fn take(&mut self, handle: TeardownHandle) -> Option<Vec<ScopedHandle>> {
        self.scopes.remove(handle)
    }
}

/// Registration surface handed to a page's setup function.
///
/// Everything registered through a scope is released by the matching teardown.
pub struct Scope<'scene, D: Document> {
    scene: &'scene mut ScrollScene<D>,
    handles: Vec<ScopedHandle>,
}

impl<D: Document> Scope<'_, D> {
    /// Register a scroll-triggered animation. Detached elements yield `None`.
    pub fn animate(&mut self, spec: AnimationSpec) -> Option<BindingId> {
        let id = self.scene.animate(spec)?;
        self.handles.push(ScopedHandle::Binding(id));
        Some(id)
    }

    /// Register an untriggered timeline.
    pub fn timeline(
        &mut self,
        targets: &[ElementId],
        from: &PropertySet,
        to: &PropertySet,
        timing: Timing,
    ) -> Option<TimelineId> {
        let id = self.scene.timeline(targets, from, to, timing)?;
        self.handles.push(ScopedHandle::Timeline(id));
        Some(id)
    }

    /// Play a timeline registered in this scope.
    pub fn play(&mut self, id: TimelineId) -> bool {
        self.scene.play(id)
    }

    /// Host document, for reading layout.
    #[must_use]
    pub fn document(&self) -> &D {
        self.scene.document()
    }

    /// Mutable host document, for creating the page's elements before animating them.
    pub fn document_mut(&mut self) -> &mut D {
        self.scene.document_mut()
    }

    /// Current scroll metrics.
    #[must_use]
    pub fn snapshot(&self) -> ScrollSnapshot {
        self.scene.snapshot()
    }

    /// Number of handles collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<D: Document> ScrollScene<D> {
    /// Run `setup` and collect every binding and timeline it registers.
    pub fn bind<F>(&mut self, setup: F) -> TeardownHandle
    where
        F: FnOnce(&mut Scope<'_, D>),
    {
        let mut scope = Scope {
            scene: self,
            handles: Vec::new(),
        };
        setup(&mut scope);
        let handles = scope.handles;
        debug!(handles = handles.len(), "scope bound");
        self.scopes.insert(handles)
    }

    /// Release everything registered by the matching [`bind`](Self::bind).
    ///
    /// Completes before returning. Unknown handles, repeated calls and elements
    /// that already left the document are all no-ops. Returns whether a scope
    /// was actually torn down.
    pub fn teardown(&mut self, handle: TeardownHandle) -> bool {
        let Some(handles) = self.scopes.take(handle) else {
            return false;
        };
        let count = handles.len();
        for scoped in handles {
            match scoped {
                ScopedHandle::Binding(id) => {
                    self.unbind(id);
                }
                ScopedHandle::Timeline(id) => {
                    self.cancel(id);
                }
            }
        }
        debug!(handles = count, "scope torn down");
        true
    }

    /// Scopes bound and not yet torn down.
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::document::MemoryDocument;
    use crate::model::Bounds;
    use crate::trigger::{Threshold, TriggerSpec};

    fn mount_page(scope: &mut Scope<'_, MemoryDocument>) -> Vec<ElementId> {
        let elements = (0..4)
            .map(|index| {
                scope
                    .document_mut()
                    .create(Bounds::new(400.0 + index as f32 * 300.0, 200.0))
            })
            .collect::<Vec<_>>();

        for &element in &elements {
            scope.animate(
                AnimationSpec::new([element])
                    .from(PropertySet::new().opacity(0.0).y(40.0))
                    .to(PropertySet::new().opacity(1.0).y(0.0))
                    .trigger(TriggerSpec::at(Threshold::top_at(0.8))),
            );
        }
        if let Some(hero) = scope.timeline(
            &elements,
            &PropertySet::new().scale(0.9),
            &PropertySet::new().scale(1.0),
            Timing::default().with_stagger(Duration::from_millis(100)),
        ) {
            scope.play(hero);
        }
        elements
    }

    #[test]
    fn teardown_releases_everything_bound() {
        let mut scene = ScrollScene::new(MemoryDocument::new(), 600.0);
        let mut elements = Vec::new();
        let handle = scene.bind(|scope| elements = mount_page(scope));

        scene.scroll_to(500.0);
        assert_eq!(scene.subscription_count(), 4);
        assert_eq!(scene.timeline_count(), 5);
        assert!(scene.in_flight_count() > 0);

        assert!(scene.teardown(handle));
        assert_eq!(scene.subscription_count(), 0);
        assert_eq!(scene.timeline_count(), 0);
        assert_eq!(scene.in_flight_count(), 0);
        assert_eq!(scene.scope_count(), 0);
    }

    #[test]
    fn teardown_twice_is_a_no_op() {
        let mut scene = ScrollScene::new(MemoryDocument::new(), 600.0);
        let handle = scene.bind(|scope| {
            mount_page(scope);
        });
        assert!(scene.teardown(handle));
        assert!(!scene.teardown(handle));
    }

    #[test]
    fn teardown_after_elements_were_removed() {
        let mut scene = ScrollScene::new(MemoryDocument::new(), 600.0);
        let mut elements = Vec::new();
        let handle = scene.bind(|scope| elements = mount_page(scope));
        scene.scroll_to(2000.0);

        for element in elements {
            scene.document_mut().detach(element);
        }
        scene.tick(Duration::from_millis(100));
        assert!(scene.teardown(handle));
        assert_eq!(scene.subscription_count(), 0);
        assert_eq!(scene.timeline_count(), 0);
    }

    #[test]
    fn repeated_mounts_do_not_leak() {
        let mut scene = ScrollScene::new(MemoryDocument::new(), 600.0);
        let baseline = scene.subscription_count();

        for round in 0_u64..25 {
            let mut elements = Vec::new();
            let handle = scene.bind(|scope| elements = mount_page(scope));
            scene.scroll_to(f32::from(u16::try_from(round).unwrap_or(0)) * 80.0);
            scene.tick(Duration::from_millis(round * 40));
            scene.teardown(handle);
            for element in elements {
                scene.document_mut().detach(element);
            }
            scene.scroll_to(0.0);
        }

        assert_eq!(scene.subscription_count(), baseline);
        assert_eq!(scene.in_flight_count(), 0);
        assert_eq!(scene.timeline_count(), 0);
        assert_eq!(scene.binding_count(), 0);
        assert!(scene.document().is_empty());
    }

    #[test]
    fn scopes_are_independent() {
        let mut scene = ScrollScene::new(MemoryDocument::new(), 600.0);
        let header = scene.bind(|scope| {
            mount_page(scope);
        });
        let page = scene.bind(|scope| {
            mount_page(scope);
        });
        assert_eq!(scene.subscription_count(), 8);

        scene.teardown(page);
        assert_eq!(scene.subscription_count(), 4);
        assert_eq!(scene.scope_count(), 1);
        scene.teardown(header);
        assert_eq!(scene.subscription_count(), 0);
    }
}
