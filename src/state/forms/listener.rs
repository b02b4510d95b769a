//! Form-level event hooks

/// Receives form-level events after the control operation has finished
#[cfg_attr(test, mockall::automock)]
pub trait FormListener {
    /// Called once after every known field was cleared
    fn on_clear(&self) {}

    /// Called once after every known field was reset
    fn on_reset(&self) {}
}

/// Listener that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl FormListener for NoopListener {}

/// Listener backed by optional closures
#[derive(Default)]
pub struct CallbackListener {
    pub(crate) on_clear: Option<Box<dyn Fn()>>,
    pub(crate) on_reset: Option<Box<dyn Fn()>>,
}

impl CallbackListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_clear(mut self, f: impl Fn() + 'static) -> Self {
        self.on_clear = Some(Box::new(f));
        self
    }

    pub fn on_reset(mut self, f: impl Fn() + 'static) -> Self {
        self.on_reset = Some(Box::new(f));
        self
    }
}

impl FormListener for CallbackListener {
    fn on_clear(&self) {
        if let Some(f) = &self.on_clear {
            f();
        }
    }

    fn on_reset(&self) {
        if let Some(f) = &self.on_reset {
            f();
        }
    }
}

impl std::fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackListener")
            .field("on_clear", &self.on_clear.is_some())
            .field("on_reset", &self.on_reset.is_some())
            .finish()
    }
}
