#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use steady_engine::driver::{Driver, DriverError};
use steady_engine::protocol::{Locator, NavigationResult};
use tracing::Level;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    pub key: String,
    /// Handles from an older generation are stale.
    pub generation: u32,
}

/// Scripted behaviour of one element in the fake DOM.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    pub visible: bool,
    pub enabled: bool,
    pub covered: bool,
    pub text: String,
    pub value: String,
    /// Lookups that find nothing before the element shows up.
    pub appears_after: u32,
    /// Visibility checks that report hidden before it turns visible.
    pub visible_after: u32,
    /// Clicks that fail before one succeeds.
    pub click_failures: u32,
    /// Lookups whose handle is detached from the DOM right after it is returned.
    pub stale_lookups: u32,
}

impl ElementSpec {
    pub fn visible() -> Self {
        Self {
            visible: true,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn covered(mut self) -> Self {
        self.covered = true;
        self
    }

    pub fn appears_after(mut self, lookups: u32) -> Self {
        self.appears_after = lookups;
        self
    }

    pub fn visible_after(mut self, checks: u32) -> Self {
        self.visible_after = checks;
        self
    }

    pub fn click_failures(mut self, failures: u32) -> Self {
        self.click_failures = failures;
        self
    }

    pub fn stale_lookups(mut self, lookups: u32) -> Self {
        self.stale_lookups = lookups;
        self
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub elements: HashMap<String, ElementSpec>,
    pub lookups: HashMap<String, u32>,
    pub visibility_checks: HashMap<String, u32>,
    pub generations: HashMap<String, u32>,
    pub click_calls: u32,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub navigations: Vec<String>,
    pub scripts: Vec<String>,
    pub screenshots: u32,
}

#[derive(Debug, Default, Clone)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, locator: &str, spec: ElementSpec) -> Self {
        self.state()
            .elements
            .insert(key(&locator.parse().unwrap()), spec);
        self
    }

    pub fn remove(&self, locator: &str) {
        self.state().elements.remove(&key(&locator.parse().unwrap()));
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn lookups(&self, locator: &str) -> u32 {
        let key = key(&locator.parse().unwrap());
        self.state().lookups.get(&key).copied().unwrap_or(0)
    }

    pub fn value(&self, locator: &str) -> String {
        let key = key(&locator.parse().unwrap());
        self.state()
            .elements
            .get(&key)
            .map(|spec| spec.value.clone())
            .unwrap_or_default()
    }
}

fn key(locator: &Locator) -> String {
    locator.to_string()
}

fn stale(element: &MockElement) -> DriverError {
    DriverError::StaleElement {
        locator: element.key.clone(),
    }
}

impl MockState {
    fn is_live(&self, element: &MockElement) -> bool {
        self.elements.contains_key(&element.key)
            && self.generations.get(&element.key).copied().unwrap_or(0) == element.generation
    }

    fn live(&self, element: &MockElement) -> Result<&ElementSpec, DriverError> {
        if !self.is_live(element) {
            return Err(stale(element));
        }
        self.elements.get(&element.key).ok_or_else(|| stale(element))
    }

    fn live_mut(&mut self, element: &MockElement) -> Result<&mut ElementSpec, DriverError> {
        if !self.is_live(element) {
            return Err(stale(element));
        }
        self.elements.get_mut(&element.key).ok_or_else(|| stale(element))
    }
}

#[async_trait]
impl Driver for MockDriver {
    type Element = MockElement;

    async fn launch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, DriverError> {
        self.state().navigations.push(url.to_string());
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Mock Page".into(),
            status: 200,
        })
    }

    async fn find(&self, locator: &Locator) -> Result<Option<MockElement>, DriverError> {
        let key = key(locator);
        let mut state = self.state();
        let lookups = {
            let count = state.lookups.entry(key.clone()).or_default();
            *count += 1;
            *count
        };
        let generation = state.generations.get(&key).copied().unwrap_or(0);
        let detach = match state.elements.get_mut(&key) {
            Some(spec) if lookups > spec.appears_after => {
                let detach = spec.stale_lookups > 0;
                spec.stale_lookups = spec.stale_lookups.saturating_sub(1);
                detach
            }
            _ => return Ok(None),
        };
        if detach {
            *state.generations.entry(key.clone()).or_default() += 1;
        }
        Ok(Some(MockElement { key, generation }))
    }

    async fn is_visible(&self, element: &MockElement) -> Result<bool, DriverError> {
        let mut state = self.state();
        let checks = {
            let count = state
                .visibility_checks
                .entry(element.key.clone())
                .or_default();
            *count += 1;
            *count
        };
        let spec = state.live(element)?;
        Ok(spec.visible && checks > spec.visible_after)
    }

    async fn is_clickable(&self, element: &MockElement) -> Result<bool, DriverError> {
        let visible = self.is_visible(element).await?;
        let state = self.state();
        let spec = state.live(element)?;
        Ok(visible && spec.enabled && !spec.covered)
    }

    async fn click(&self, element: &MockElement) -> Result<(), DriverError> {
        let mut state = self.state();
        state.click_calls += 1;
        let call = state.click_calls;
        let spec = state.live_mut(element)?;
        if spec.click_failures > 0 {
            spec.click_failures -= 1;
            return Err(DriverError::NotInteractable {
                locator: element.key.clone(),
                reason: format!("click #{} intercepted", call),
            });
        }
        state.clicks.push(element.key.clone());
        Ok(())
    }

    async fn set_value(&self, element: &MockElement, text: &str) -> Result<(), DriverError> {
        let mut state = self.state();
        let spec = state.live_mut(element)?;
        spec.value = text.to_string();
        state.typed.push((element.key.clone(), text.to_string()));
        Ok(())
    }

    async fn clear_value(&self, element: &MockElement) -> Result<(), DriverError> {
        let mut state = self.state();
        let spec = state.live_mut(element)?;
        spec.value.clear();
        Ok(())
    }

    async fn text(&self, element: &MockElement) -> Result<String, DriverError> {
        let state = self.state();
        let spec = state.live(element)?;
        Ok(spec.text.clone())
    }

    async fn execute_script(
        &self,
        script: &str,
        _args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, DriverError> {
        self.state().scripts.push(script.to_string());
        Ok(serde_json::json!({ "length": script.len() }))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.state().screenshots += 1;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

/// Counts events by level for targets starting with a prefix.
#[derive(Clone)]
pub struct LevelCounter {
    target: &'static str,
    info: Arc<AtomicUsize>,
    warn: Arc<AtomicUsize>,
    error: Arc<AtomicUsize>,
}

impl LevelCounter {
    pub fn info(&self) -> usize {
        self.info.load(Ordering::SeqCst)
    }

    pub fn warn(&self) -> usize {
        self.warn.load(Ordering::SeqCst)
    }

    pub fn error(&self) -> usize {
        self.error.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if !meta.target().starts_with(self.target) {
            return;
        }
        let counter = match *meta.level() {
            Level::INFO => &self.info,
            Level::WARN => &self.warn,
            Level::ERROR => &self.error,
            _ => return,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Install a thread-local subscriber counting events under `target`.
pub fn capture_levels(target: &'static str) -> (LevelCounter, DefaultGuard) {
    let counter = LevelCounter {
        target,
        info: Arc::default(),
        warn: Arc::default(),
        error: Arc::default(),
    };
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (counter, guard)
}
