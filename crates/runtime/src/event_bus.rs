use foundation::time::Millis;

/// A recorded trace event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub at: Millis,
    pub payload: E,
}

/// Append-only trace of what the runtime did, in emission order.
///
/// The payload type is owned by the emitting layer so the trace stays typed.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, at: Millis, payload: E) {
        self.events.push(Event { at, payload });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn payloads(&self) -> impl Iterator<Item = &E> + '_ {
        self.events.iter().map(|e| &e.payload)
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}
