//! Component construction, type preferences and the shared-instance cache

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use tracing::{debug, info};

use crate::errors::{PageprobeError, Result};
use crate::namespace::normalize_identifier;
use crate::themes::ThemeConfiguration;

/// A constructed component, shared between everyone who asks for it
pub type Component = Arc<dyn Any + Send + Sync>;

/// Builds a component; may fetch its own dependencies from the registry
pub type Factory = Arc<dyn Fn(&ComponentRegistry) -> anyhow::Result<Component> + Send + Sync>;

/// What role a registered component plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Locator set for one application skin
    Theme,
    /// Theme that can also stand in as the base theme
    BaseTheme,
    Action,
    Navigator,
    Assertion,
    Extractor,
    Identity,
    Service,
}

impl ComponentKind {
    pub fn is_theme(&self) -> bool {
        matches!(self, ComponentKind::Theme | ComponentKind::BaseTheme)
    }
}

/// Recovers the theme trait object from a cached theme component
type ThemeView = fn(&Component) -> Option<Arc<dyn ThemeConfiguration>>;

fn theme_view<T: ThemeConfiguration>(component: &Component) -> Option<Arc<dyn ThemeConfiguration>> {
    Arc::clone(component)
        .downcast::<T>()
        .ok()
        .map(|theme| theme as Arc<dyn ThemeConfiguration>)
}

struct Registration {
    kind: ComponentKind,
    factory: Factory,
    theme: Option<ThemeView>,
}

/// Factory table plus type preferences
#[derive(Default)]
pub struct Container {
    registrations: HashMap<String, Registration>,
    preferences: HashMap<String, String>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, identifier: &str, kind: ComponentKind, factory: F)
    where
        F: Fn(&ComponentRegistry) -> anyhow::Result<Component> + Send + Sync + 'static,
    {
        let identifier = normalize_identifier(identifier);
        debug!("Registering {:?} component {}", kind, identifier);
        self.registrations.insert(
            identifier,
            Registration {
                kind,
                factory: Arc::new(factory),
                theme: None,
            },
        );
    }

    /// Register a theme configuration; `kind` is `Theme` or `BaseTheme`
    pub fn register_theme<T, F>(&mut self, identifier: &str, kind: ComponentKind, factory: F)
    where
        T: ThemeConfiguration,
        F: Fn(&ComponentRegistry) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let identifier = normalize_identifier(identifier);
        debug!("Registering theme {}", identifier);
        self.registrations.insert(
            identifier,
            Registration {
                kind,
                factory: Arc::new(move |registry: &ComponentRegistry| -> anyhow::Result<Component> {
                    Ok(Arc::new(factory(registry)?))
                }),
                theme: Some(theme_view::<T>),
            },
        );
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.registrations.contains_key(identifier)
    }

    pub fn kind(&self, identifier: &str) -> Option<ComponentKind> {
        self.registrations.get(identifier).map(|r| r.kind)
    }

    fn theme_view(&self, identifier: &str) -> Option<ThemeView> {
        self.registrations.get(identifier).and_then(|r| r.theme)
    }

    fn factory(&self, identifier: &str) -> anyhow::Result<Factory> {
        self.registrations
            .get(identifier)
            .map(|r| Arc::clone(&r.factory))
            .ok_or_else(|| anyhow!("no component is registered under '{}'", identifier))
    }

    pub fn set_type_preference(&mut self, abstract_id: &str, concrete_id: &str) {
        self.preferences
            .insert(normalize_identifier(abstract_id), normalize_identifier(concrete_id));
    }

    pub fn unset_type_preferences(&mut self, abstract_id: &str) {
        self.preferences.remove(&normalize_identifier(abstract_id));
    }

    pub fn type_preference(&self, abstract_id: &str) -> Option<&str> {
        self.preferences.get(abstract_id).map(String::as_str)
    }
}

/// Service locator over a [`Container`], caching one instance per identifier
pub struct ComponentRegistry {
    container: Mutex<Container>,
    instances: Mutex<HashMap<String, Component>>,
}

impl ComponentRegistry {
    pub fn new(container: Container) -> Self {
        Self {
            container: Mutex::new(container),
            instances: Mutex::new(HashMap::new()),
        }
    }

    fn container(&self) -> MutexGuard<'_, Container> {
        self.container.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn instances(&self) -> MutexGuard<'_, HashMap<String, Component>> {
        self.instances.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a factory after construction of the registry
    pub fn register<F>(&self, identifier: &str, kind: ComponentKind, factory: F)
    where
        F: Fn(&ComponentRegistry) -> anyhow::Result<Component> + Send + Sync + 'static,
    {
        self.container().register(identifier, kind, factory);
    }

    pub fn register_theme<T, F>(&self, identifier: &str, kind: ComponentKind, factory: F)
    where
        T: ThemeConfiguration,
        F: Fn(&ComponentRegistry) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.container().register_theme(identifier, kind, factory);
    }

    /// Identifier a request for `identifier` is served from, after preferences
    pub fn preferred(&self, identifier: &str) -> String {
        let identifier = normalize_identifier(identifier);
        match self.container().type_preference(&identifier) {
            Some(preferred) => preferred.to_string(),
            None => identifier,
        }
    }

    /// Whether `identifier` can be served: cached, constructible or preferred away
    pub fn exists(&self, identifier: &str) -> bool {
        let identifier = normalize_identifier(identifier);
        {
            let container = self.container();
            if container.contains(&identifier) || container.type_preference(&identifier).is_some() {
                return true;
            }
        }
        self.instances().contains_key(&identifier)
    }

    pub fn kind(&self, identifier: &str) -> Option<ComponentKind> {
        self.container().kind(&normalize_identifier(identifier))
    }

    /// Fetch the shared instance for `identifier`, constructing it on first use
    pub fn get(&self, identifier: &str) -> Result<Component> {
        let identifier = self.preferred(identifier);

        if let Some(instance) = self.instances().get(&identifier) {
            return Ok(Arc::clone(instance));
        }

        let factory = self
            .container()
            .factory(&identifier)
            .map_err(|e| PageprobeError::resolution(&identifier, e))?;

        // Neither lock is held here so factories can fetch their dependencies
        let instance = factory(self).map_err(|e| PageprobeError::resolution(&identifier, e))?;

        info!("Constructed component {}", identifier);
        let mut instances = self.instances();
        let instance = instances.entry(identifier).or_insert(instance);
        Ok(Arc::clone(instance))
    }

    /// Fetch `identifier` as a concrete type
    pub fn get_as<T: Any + Send + Sync>(&self, identifier: &str) -> Result<Arc<T>> {
        let resolved = self.preferred(identifier);
        self.get(identifier)?.downcast::<T>().map_err(|_| {
            PageprobeError::resolution(
                resolved,
                anyhow!("component is not a {}", std::any::type_name::<T>()),
            )
        })
    }

    /// Fetch `identifier` as a theme configuration
    pub fn get_theme(&self, identifier: &str) -> Result<Arc<dyn ThemeConfiguration>> {
        let resolved = self.preferred(identifier);
        let component = self.get(identifier)?;
        let view = self.container().theme_view(&resolved);
        view.and_then(|view| view(&component)).ok_or_else(|| {
            PageprobeError::resolution(resolved, anyhow!("component is not a theme configuration"))
        })
    }

    /// Replace any preference for `abstract_id` with `concrete_id`
    pub fn set_preference(&self, abstract_id: &str, concrete_id: &str) {
        let mut container = self.container();
        container.unset_type_preferences(abstract_id);
        container.set_type_preference(abstract_id, concrete_id);
        debug!("Preferring {} for {}", concrete_id, abstract_id);
    }

    pub fn unset_preference(&self, abstract_id: &str) {
        self.container().unset_type_preferences(abstract_id);
    }

    pub fn preference(&self, abstract_id: &str) -> Option<String> {
        self.container()
            .type_preference(&normalize_identifier(abstract_id))
            .map(str::to_string)
    }

    /// Make `instance` the shared instance for `identifier`
    pub fn add_shared_instance(&self, identifier: &str, instance: Component) {
        self.instances().insert(normalize_identifier(identifier), instance);
    }

    /// Drop the cached instance so the next `get` constructs a fresh one
    pub fn invalidate(&self, identifier: &str) {
        self.instances().remove(&normalize_identifier(identifier));
    }

    pub fn clear(&self) {
        self.instances().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.instances().len()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
