use anyhow::{anyhow, Result};
use std::borrow::Cow;

/// Handle for a registered popup. Indexes into the registry in registration
/// order; the first four registrations back the carousel slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(pub usize);

/// What a mounted popup exposes to its callbacks: static content plus a
/// mutable note line the callbacks may rewrite while the popup is up.
#[derive(Debug, Clone)]
pub struct PopupView {
    pub name: Cow<'static, str>,
    pub title: Cow<'static, str>,
    pub body: Vec<Cow<'static, str>>,
    pub note: String,
}

type PopupCallback = Box<dyn FnMut(&mut PopupView) + Send>;

pub struct PopupSpec {
    pub name: Cow<'static, str>,
    pub title: Cow<'static, str>,
    pub body: Vec<Cow<'static, str>>,
    pub on_open: Option<PopupCallback>,
    pub on_close: Option<PopupCallback>,
}

impl PopupSpec {
    pub fn new(name: impl Into<Cow<'static, str>>, title: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), title: title.into(), body: Vec::new(), on_open: None, on_close: None }
    }

    pub fn with_body(mut self, lines: Vec<Cow<'static, str>>) -> Self {
        self.body = lines;
        self
    }

    pub fn on_open(mut self, callback: impl FnMut(&mut PopupView) + Send + 'static) -> Self {
        self.on_open = Some(Box::new(callback));
        self
    }

    pub fn on_close(mut self, callback: impl FnMut(&mut PopupView) + Send + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }
}

/// Owns popup definitions and the at-most-one mounted popup. Lifecycle
/// callbacks run exactly once per mount: open after the reveal finishes,
/// close before the dismissal starts.
#[derive(Default)]
pub struct PopupHost {
    specs: Vec<PopupSpec>,
    mounted: Option<Mounted>,
}

struct Mounted {
    id: PopupId,
    view: PopupView,
    opened: bool,
}

impl PopupHost {
    pub fn register(&mut self, spec: PopupSpec) -> PopupId {
        self.specs.push(spec);
        PopupId(self.specs.len() - 1)
    }

    pub fn id_by_name(&self, name: &str) -> Option<PopupId> {
        self.specs.iter().position(|spec| spec.name == name).map(PopupId)
    }

    pub fn name(&self, id: PopupId) -> Option<&str> {
        self.specs.get(id.0).map(|spec| spec.name.as_ref())
    }

    pub fn contains(&self, id: PopupId) -> bool {
        id.0 < self.specs.len()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn current(&self) -> Option<PopupId> {
        self.mounted.as_ref().map(|mounted| mounted.id)
    }

    pub fn view(&self) -> Option<&PopupView> {
        self.mounted.as_ref().map(|mounted| &mounted.view)
    }

    /// Builds the view for `id`. Fails if another popup is still mounted;
    /// the orchestrator must unmount first.
    pub fn mount(&mut self, id: PopupId) -> Result<()> {
        if self.mounted.is_some() {
            return Err(anyhow!("popup already mounted"));
        }
        let spec = self
            .specs
            .get(id.0)
            .ok_or_else(|| anyhow!("unknown popup id {}", id.0))?;
        let view = PopupView {
            name: spec.name.clone(),
            title: spec.title.clone(),
            body: spec.body.clone(),
            note: String::new(),
        };
        self.mounted = Some(Mounted { id, view, opened: false });
        Ok(())
    }

    /// Runs the open callback if it has not run for this mount yet.
    pub fn fire_on_open(&mut self) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        if mounted.opened {
            return;
        }
        mounted.opened = true;
        if let Some(callback) = self.specs[mounted.id.0].on_open.as_mut() {
            callback(&mut mounted.view);
        }
    }

    /// Runs the close callback, once, and only if open already fired.
    pub fn fire_on_close(&mut self) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        if !mounted.opened {
            return;
        }
        mounted.opened = false;
        if let Some(callback) = self.specs[mounted.id.0].on_close.as_mut() {
            callback(&mut mounted.view);
        }
    }

    pub fn unmount(&mut self) -> Option<PopupId> {
        self.mounted.take().map(|mounted| mounted.id)
    }
}
