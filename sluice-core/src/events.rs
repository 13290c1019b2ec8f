use crate::{BoundParameter, Error};

/// What listeners receive about a command.
#[derive(Debug, Clone, Copy)]
pub struct CommandEvent<'a> {
    pub sql: &'a str,
    pub parameters: &'a [BoundParameter],
    /// Only set for on-error notifications.
    pub error: Option<&'a Error>,
}

pub type Listener = Box<dyn Fn(&CommandEvent<'_>) + Send + Sync>;

/// Lifecycle listeners of a unit of work.
#[derive(Default)]
pub struct Events {
    executing: Vec<Listener>,
    executed: Vec<Listener>,
    error: Vec<Listener>,
}

impl Events {
    pub fn on_executing(&mut self, listener: Listener) {
        self.executing.push(listener);
    }
    pub fn on_executed(&mut self, listener: Listener) {
        self.executed.push(listener);
    }
    pub fn on_error(&mut self, listener: Listener) {
        self.error.push(listener);
    }
    pub(crate) fn executing(&self, event: &CommandEvent<'_>) {
        self.executing.iter().for_each(|f| f(event));
    }
    pub(crate) fn executed(&self, event: &CommandEvent<'_>) {
        self.executed.iter().for_each(|f| f(event));
    }
    pub(crate) fn error(&self, event: &CommandEvent<'_>) {
        self.error.iter().for_each(|f| f(event));
    }
}
