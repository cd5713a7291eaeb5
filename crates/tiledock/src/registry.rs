//! Component registration and resolution.
//!
//! Panels name their content by string; the registry maps those names to
//! something renderable. Whether a name was registered as a full renderable
//! factory or a plain widget constructor is decided once, at registration
//! time, via the [`ComponentEntry`] tag — resolution never probes.
//!
//! An unregistered name is a [`ResolutionError`] unless a fallback renderer
//! is configured, in which case the fallback receives the unresolved name
//! together with the original props and takes the panel's place.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tiledock_layout::config::PropBag;

/// A mounted panel's renderable content. Rendering itself happens in the
/// host; the workbench only carries the instance around.
pub trait PanelWidget: Send {
    /// The component name this widget was instantiated for.
    fn component_type(&self) -> &str;
}

/// Factory invoked with the component name and panel props.
pub type RenderFactory = Arc<dyn Fn(&str, &PropBag) -> Box<dyn PanelWidget> + Send + Sync>;

/// Constructor invoked with panel props only.
pub type WidgetCtor = Arc<dyn Fn(&PropBag) -> Box<dyn PanelWidget> + Send + Sync>;

/// How a name was registered.
#[derive(Clone)]
pub enum ComponentEntry {
    /// A renderable factory that also receives the component name.
    Renderable(RenderFactory),
    /// A plain widget constructor.
    Widget(WidgetCtor),
}

impl std::fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Renderable(_) => f.write_str("ComponentEntry::Renderable"),
            Self::Widget(_) => f.write_str("ComponentEntry::Widget"),
        }
    }
}

/// Resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("no component registered under `{name}` and no fallback configured")]
    Unregistered { name: String },
}

/// Name → renderable mapping with an optional fallback renderer.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: FxHashMap<String, ComponentEntry>,
    fallback: Option<RenderFactory>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("entries", &self.entries.len())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderable factory under `name`, replacing any previous
    /// entry.
    pub fn register_renderable(&mut self, name: impl Into<String>, factory: RenderFactory) {
        self.entries
            .insert(name.into(), ComponentEntry::Renderable(factory));
    }

    /// Register a widget constructor under `name`, replacing any previous
    /// entry.
    pub fn register_widget(&mut self, name: impl Into<String>, ctor: WidgetCtor) {
        self.entries.insert(name.into(), ComponentEntry::Widget(ctor));
    }

    /// Configure the renderer used for unresolved names.
    pub fn set_fallback(&mut self, fallback: RenderFactory) {
        self.fallback = Some(fallback);
    }

    /// Whether `name` has a registered entry.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether instantiating `name` can succeed (registered, or a fallback
    /// is configured).
    #[must_use]
    pub fn can_resolve(&self, name: &str) -> bool {
        self.entries.contains_key(name) || self.fallback.is_some()
    }

    /// The registered entry for `name`, ignoring the fallback.
    pub fn resolve(&self, name: &str) -> Result<&ComponentEntry, ResolutionError> {
        self.entries
            .get(name)
            .ok_or_else(|| ResolutionError::Unregistered {
                name: name.to_string(),
            })
    }

    /// Instantiate the widget for `name`, substituting the fallback
    /// renderer for unresolved names when one is configured.
    pub fn instantiate(
        &self,
        name: &str,
        props: &PropBag,
    ) -> Result<Box<dyn PanelWidget>, ResolutionError> {
        match self.entries.get(name) {
            Some(ComponentEntry::Renderable(factory)) => Ok(factory(name, props)),
            Some(ComponentEntry::Widget(ctor)) => Ok(ctor(props)),
            None => match &self.fallback {
                Some(fallback) => Ok(fallback(name, props)),
                None => Err(ResolutionError::Unregistered {
                    name: name.to_string(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        component: String,
    }

    impl PanelWidget for Probe {
        fn component_type(&self) -> &str {
            &self.component
        }
    }

    fn probe_factory() -> RenderFactory {
        Arc::new(|name, _| {
            Box::new(Probe {
                component: name.to_string(),
            })
        })
    }

    #[test]
    fn entries_are_tagged_at_registration_time() {
        let mut registry = ComponentRegistry::new();
        registry.register_renderable("editor", probe_factory());
        registry.register_widget(
            "clock",
            Arc::new(|_| {
                Box::new(Probe {
                    component: "clock".to_string(),
                })
            }),
        );
        assert!(matches!(
            registry.resolve("editor"),
            Ok(ComponentEntry::Renderable(_))
        ));
        assert!(matches!(
            registry.resolve("clock"),
            Ok(ComponentEntry::Widget(_))
        ));
    }

    #[test]
    fn unregistered_name_without_fallback_is_an_error() {
        let registry = ComponentRegistry::new();
        let err = registry
            .instantiate("ghost", &PropBag::new())
            .map(|_| ())
            .expect_err("unregistered");
        assert_eq!(
            err,
            ResolutionError::Unregistered {
                name: "ghost".to_string()
            }
        );
    }

    #[test]
    fn fallback_receives_the_unresolved_name_and_props() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let seen_props = Arc::new(AtomicUsize::new(0));
        let recorded = Arc::clone(&seen_props);
        let mut registry = ComponentRegistry::new();
        registry.set_fallback(Arc::new(move |name, props| {
            recorded.store(props.len(), Ordering::SeqCst);
            Box::new(Probe {
                component: name.to_string(),
            })
        }));

        let mut props = PropBag::new();
        props.insert("a".to_string(), serde_json::json!(1));
        props.insert("b".to_string(), serde_json::json!(2));
        let widget = registry.instantiate("ghost", &props).expect("fallback");
        assert_eq!(widget.component_type(), "ghost");
        assert_eq!(seen_props.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn registered_names_bypass_the_fallback() {
        let mut registry = ComponentRegistry::new();
        registry.set_fallback(Arc::new(|_, _| {
            Box::new(Probe {
                component: "fallback".to_string(),
            })
        }));
        registry.register_renderable("editor", probe_factory());
        let widget = registry
            .instantiate("editor", &PropBag::new())
            .expect("registered");
        assert_eq!(widget.component_type(), "editor");
    }
}
