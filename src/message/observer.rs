use super::{MessageKind, PipelineMessage};
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use std::fmt;

/// Everything an observer can be told about a pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineEvent {
    /// A filter or the pipeline emitted a message
    Message(PipelineMessage),
    /// A filter's data check is about to run
    PreflightAboutToExecute {
        index: Option<usize>,
        filter: String,
    },
    /// A filter's data check finished with `error_condition`
    PreflightExecuted {
        index: Option<usize>,
        filter: String,
        error_condition: i32,
    },
    /// A filter's execute finished with `error_condition`
    FilterExecuted {
        index: Option<usize>,
        filter: String,
        error_condition: i32,
    },
    /// The pipeline stopped, successfully or not
    PipelineFinished { error_condition: i32 },
}

impl PipelineEvent {
    pub fn as_message(&self) -> Option<&PipelineMessage> {
        match self {
            PipelineEvent::Message(m) => Some(m),
            _ => None,
        }
    }
}

/// Receives pipeline events synchronously, on the thread that runs the pipeline
pub trait PipelineObserver: Send {
    fn on_event(&mut self, event: &PipelineEvent);
}

impl<F> PipelineObserver for F
where
    F: FnMut(&PipelineEvent) + Send,
{
    fn on_event(&mut self, event: &PipelineEvent) {
        self(event)
    }
}

/// Ordered list of observers; every event goes to each observer in turn
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn PipelineObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: impl PipelineObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn add_boxed(&mut self, observer: Box<dyn PipelineObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn notify(&mut self, event: &PipelineEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    pub fn notify_message(&mut self, message: PipelineMessage) {
        self.notify(&PipelineEvent::Message(message));
    }
}

impl fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Forwards events into a crossbeam channel, for consumers on other threads
pub struct ChannelObserver {
    tx: Sender<PipelineEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<PipelineEvent>) -> Self {
        Self { tx }
    }

    /// Create an observer together with the receiving end of its channel
    pub fn unbounded() -> (Self, Receiver<PipelineEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }
}

impl PipelineObserver for ChannelObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!("Observer channel closed, dropping event");
        }
    }
}

/// Logs messages through `tracing` at a level matching their kind
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Message(m) => match m.kind {
                MessageKind::Error => tracing::error!(code = m.code, "{}", m),
                MessageKind::Warning => tracing::warn!(code = m.code, "{}", m),
                MessageKind::Status => tracing::info!("{}", m),
                MessageKind::Progress => tracing::debug!("{}", m),
            },
            PipelineEvent::PreflightAboutToExecute { index, filter } => {
                tracing::trace!("Preflighting {} at {:?}", filter, index)
            }
            PipelineEvent::PreflightExecuted {
                index,
                filter,
                error_condition,
            }
            | PipelineEvent::FilterExecuted {
                index,
                filter,
                error_condition,
            } => tracing::trace!("{} at {:?} finished with {}", filter, index, error_condition),
            PipelineEvent::PipelineFinished { error_condition } => {
                tracing::debug!("Pipeline finished with {}", error_condition)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_observer_receives_events_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut set = ObserverSet::new();
        set.add(move |event: &PipelineEvent| {
            if let Some(m) = event.as_message() {
                sink.lock().unwrap().push(m.text.clone());
            }
        });

        set.notify_message(PipelineMessage::status("A", "A", "first"));
        set.notify(&PipelineEvent::PipelineFinished { error_condition: 0 });
        set.notify_message(PipelineMessage::status("A", "A", "second"));

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_channel_observer() {
        let (observer, rx) = ChannelObserver::unbounded();
        let mut set = ObserverSet::new();
        set.add(observer);
        set.add(TracingObserver);
        assert_eq!(set.len(), 2);

        set.notify(&PipelineEvent::PipelineFinished {
            error_condition: -1,
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            PipelineEvent::PipelineFinished {
                error_condition: -1
            }
        );
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (mut observer, rx) = ChannelObserver::unbounded();
        drop(rx);
        observer.on_event(&PipelineEvent::PipelineFinished { error_condition: 0 });
    }
}
