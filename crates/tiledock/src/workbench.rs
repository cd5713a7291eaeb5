//! The workbench front.
//!
//! [`Workbench`] ties the pieces together: it mounts built config trees
//! into a [`LayoutEngine`], resolves component names through the
//! [`ComponentRegistry`], routes programmatic panel adds through the
//! placement proposer, re-dispatches engine events on a suppressible bus,
//! and implements [`WorkbenchSurface`] so a perspective bar can capture
//! and restore its state.

use tiledock_core::event::{EventBus, ListenerId};
use tiledock_layout::config::{self, ConfigError, ConfigNode, PropBag};
use tiledock_layout::placement::{Placement, PlacementError, propose_place_for_new_panel};
use tiledock_persist::WorkbenchSnapshot;

use crate::bar::WorkbenchSurface;
use crate::engine::{EngineError, LayoutEngine, StructuralEvent};
use crate::registry::{ComponentRegistry, ResolutionError};

/// Workbench-level failures.
#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    /// A placement or state operation was requested with no mounted
    /// layout. A precondition violation, not retried.
    #[error(transparent)]
    NoLayout(#[from] PlacementError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Assembled workbench front over one docking engine.
pub struct Workbench<E: LayoutEngine> {
    engine: Option<E>,
    registry: ComponentRegistry,
    events: EventBus<StructuralEvent>,
}

impl<E: LayoutEngine> Default for Workbench<E> {
    fn default() -> Self {
        Self::new(ComponentRegistry::new())
    }
}

impl<E: LayoutEngine> std::fmt::Debug for Workbench<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("mounted", &self.engine.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

impl<E: LayoutEngine> Workbench<E> {
    /// Create an unmounted workbench with a component registry.
    #[must_use]
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            engine: None,
            registry,
            events: EventBus::new(),
        }
    }

    /// The component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The component registry, mutably.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Whether an engine is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    /// The mounted engine.
    #[must_use]
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Validate `content` and mount it into `engine`.
    pub fn mount(&mut self, mut engine: E, content: Vec<ConfigNode>) -> Result<(), WorkbenchError> {
        config::validate(&content)?;
        engine.restore(content)?;
        self.engine = Some(engine);
        Ok(())
    }

    /// Propose a placement for a new panel and insert it.
    ///
    /// The component name must be resolvable (registered, or a fallback
    /// renderer configured) before anything touches the engine. Returns
    /// the placement that was used.
    pub fn add_panel(
        &mut self,
        component: &str,
        props: Option<PropBag>,
    ) -> Result<Placement, WorkbenchError> {
        if !self.registry.can_resolve(component) {
            return Err(ResolutionError::Unregistered {
                name: component.to_string(),
            }
            .into());
        }
        let engine = self.engine.as_mut().ok_or(PlacementError::NoLayout)?;
        let roots = engine.live_view();
        let placement = propose_place_for_new_panel(&roots, &engine.settings().placement());
        let node = match props {
            Some(props) => ConfigNode::panel_with_props(component, props),
            None => ConfigNode::panel(component),
        };
        engine.add_panel(&placement, node)?;
        Ok(placement)
    }

    // ---------------------------------------------------------------------
    // Event plumbing
    // ---------------------------------------------------------------------

    /// Register a listener for engine events surviving suppression.
    pub fn subscribe(&mut self, listener: impl Fn(&StructuralEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.events.unsubscribe(id)
    }

    /// Swallow the next engine event of `kind`.
    pub fn suppress_next_event(&mut self, kind: &'static str) {
        self.events.suppress_next(kind);
    }

    /// Re-dispatch an engine event through the suppressible bus. Returns
    /// whether it was delivered.
    pub fn handle_engine_event(&mut self, event: &StructuralEvent) -> bool {
        self.events.emit(event)
    }
}

impl<E: LayoutEngine> WorkbenchSurface for Workbench<E> {
    fn capture_state(&self) -> WorkbenchSnapshot {
        match &self.engine {
            Some(engine) => WorkbenchSnapshot::new(engine.to_config()),
            None => WorkbenchSnapshot::default(),
        }
    }

    fn restore_state(&mut self, snapshot: WorkbenchSnapshot) -> Result<(), EngineError> {
        match &mut self.engine {
            Some(engine) => engine.restore(snapshot.content),
            None => Err(EngineError::Rejected {
                message: "no layout engine is mounted".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DragSourceId, EngineSettings, LiveItemView};
    use std::sync::Arc;
    use tiledock_core::geometry::Bounds;
    use tiledock_layout::placement::{DropSegment, ItemKind, PlacementTarget};
    use tiledock_layout::tree::NodePath;

    /// Minimal engine: holds a config tree and fakes uniform panel sizes.
    #[derive(Default)]
    struct MockEngine {
        content: Vec<ConfigNode>,
        added: Vec<(Placement, ConfigNode)>,
    }

    impl MockEngine {
        fn view_of(node: &ConfigNode) -> LiveItemView {
            match node.children() {
                Some(children) => LiveItemView::container(
                    match node.kind_name() {
                        "row" => ItemKind::Row,
                        "column" => ItemKind::Column,
                        _ => ItemKind::Stack,
                    },
                    Bounds::new(400, 300),
                    children.iter().map(Self::view_of).collect(),
                ),
                None => LiveItemView::panel(Bounds::new(400, 300)),
            }
        }
    }

    impl LayoutEngine for MockEngine {
        fn settings(&self) -> EngineSettings {
            EngineSettings::default()
        }

        fn live_view(&self) -> Vec<LiveItemView> {
            self.content.iter().map(Self::view_of).collect()
        }

        fn to_config(&self) -> Vec<ConfigNode> {
            self.content.clone()
        }

        fn restore(&mut self, content: Vec<ConfigNode>) -> Result<(), EngineError> {
            self.content = content;
            Ok(())
        }

        fn add_panel(
            &mut self,
            placement: &Placement,
            config: ConfigNode,
        ) -> Result<(), EngineError> {
            self.added.push((placement.clone(), config));
            Ok(())
        }

        fn drop_at_segment(
            &mut self,
            _parent: &NodePath,
            _segment: DropSegment,
            _config: ConfigNode,
        ) -> Result<(), EngineError> {
            Ok(())
        }

        fn create_drag_source(&mut self, _config: ConfigNode) -> DragSourceId {
            DragSourceId(0)
        }

        fn remove_drag_source(&mut self, _id: DragSourceId) {}
    }

    fn registry_with_editor() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register_renderable(
            "editor",
            Arc::new(|name, _| {
                struct W(String);
                impl crate::registry::PanelWidget for W {
                    fn component_type(&self) -> &str {
                        &self.0
                    }
                }
                Box::new(W(name.to_string()))
            }),
        );
        registry
    }

    #[test]
    fn add_panel_requires_a_mounted_layout() {
        let mut workbench: Workbench<MockEngine> = Workbench::new(registry_with_editor());
        let err = workbench.add_panel("editor", None).expect_err("unmounted");
        assert!(matches!(err, WorkbenchError::NoLayout(_)));
    }

    #[test]
    fn add_panel_requires_a_resolvable_component() {
        let mut workbench = Workbench::new(registry_with_editor());
        workbench
            .mount(MockEngine::default(), vec![ConfigNode::stack(vec![])])
            .expect("mount");
        let err = workbench.add_panel("ghost", None).expect_err("unknown");
        assert!(matches!(err, WorkbenchError::Resolution(_)));
    }

    #[test]
    fn add_panel_places_through_the_proposer() {
        let mut workbench = Workbench::new(registry_with_editor());
        workbench
            .mount(
                MockEngine::default(),
                vec![ConfigNode::stack(vec![ConfigNode::panel("editor")])],
            )
            .expect("mount");
        let placement = workbench.add_panel("editor", None).expect("placed");
        // 400x300 stack: wider than tall, split right.
        assert_eq!(
            placement.target,
            PlacementTarget::Segment(DropSegment::Right)
        );
        let engine = workbench.engine().expect("mounted");
        assert_eq!(engine.added.len(), 1);
    }

    #[test]
    fn mount_rejects_invalid_content() {
        let mut workbench = Workbench::new(registry_with_editor());
        let err = workbench
            .mount(MockEngine::default(), vec![ConfigNode::panel("")])
            .expect_err("empty component name");
        assert!(matches!(err, WorkbenchError::Config(_)));
        assert!(!workbench.is_mounted());
    }

    #[test]
    fn suppressed_engine_events_are_swallowed_once() {
        let mut workbench = Workbench::new(registry_with_editor());
        workbench
            .mount(MockEngine::default(), vec![ConfigNode::stack(vec![])])
            .expect("mount");
        workbench.suppress_next_event("state_changed");
        assert!(!workbench.handle_engine_event(&StructuralEvent::StateChanged));
        assert!(workbench.handle_engine_event(&StructuralEvent::StateChanged));
    }

    #[test]
    fn capture_and_restore_round_trip_through_the_engine() {
        let mut workbench = Workbench::new(registry_with_editor());
        let content = vec![ConfigNode::stack(vec![ConfigNode::panel("editor")])];
        workbench
            .mount(MockEngine::default(), content.clone())
            .expect("mount");
        assert_eq!(workbench.capture_state().content, content);

        let replacement = vec![ConfigNode::row(vec![ConfigNode::panel("editor")])];
        workbench
            .restore_state(WorkbenchSnapshot::new(replacement.clone()))
            .expect("restore");
        assert_eq!(workbench.capture_state().content, replacement);
    }
}
