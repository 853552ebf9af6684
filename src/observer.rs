//! Single-slot reactive container.
//!
//! `ValueObserver` holds a current value and notifies registered callbacks
//! synchronously on every write. Subscribing does not replay the current
//! value; only subsequent writes notify. The container is not internally
//! synchronized; the engine owns each instance and drives it from one
//! logical execution context.

type Callback<T> = Box<dyn FnMut(&T) + Send>;

pub struct ValueObserver<T> {
    value: Option<T>,
    observers: Vec<(String, Callback<T>)>,
}

impl<T> ValueObserver<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            observers: Vec::new(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Store a new value and notify every observer, in registration order.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
        if let Some(current) = self.value.as_ref() {
            for (_, callback) in self.observers.iter_mut() {
                callback(current);
            }
        }
    }

    /// Register a callback keyed by an opaque owner identity. One owner may
    /// hold several callbacks; `remove_observer` drops them all at once.
    pub fn add_observer(
        &mut self,
        owner: impl Into<String>,
        callback: impl FnMut(&T) + Send + 'static,
    ) {
        self.observers.push((owner.into(), Box::new(callback)));
    }

    /// Unregister every callback added under the given owner.
    pub fn remove_observer(&mut self, owner: &str) {
        self.observers.retain(|(key, _)| key != owner);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl<T> Default for ValueObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValueObserver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueObserver")
            .field("value", &self.value)
            .field("observers", &self.observers.len())
            .finish()
    }
}
