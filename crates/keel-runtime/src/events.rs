//! Well-known runtime events published on the event bus.

use crate::PhaseTransition;
use serde::{Deserialize, Serialize};

/// Published exactly once per successful `start()`, after the runtime
/// reaches the ready state.
///
/// Carries the accumulated phase transition log so any collaborator can
/// react to full readiness exactly once and inspect how startup went.
///
/// # Example
///
/// ```
/// use keel_event::EventBus;
/// use keel_runtime::SystemReady;
///
/// let bus = EventBus::new();
/// bus.subscribe::<SystemReady>(0, |ready| {
///     println!("system ready after {} phase transitions", ready.log.len());
/// });
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemReady {
    /// The phase transitions recorded during startup, oldest first.
    pub log: Vec<PhaseTransition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeState;

    #[test]
    fn ready_event_carries_the_log() {
        let event = SystemReady {
            log: vec![PhaseTransition::new(
                RuntimeState::PostInitializing,
                RuntimeState::Ready,
                "startup complete",
            )],
        };
        assert_eq!(event.log.len(), 1);
        assert_eq!(event.log[0].to, RuntimeState::Ready);
    }
}
