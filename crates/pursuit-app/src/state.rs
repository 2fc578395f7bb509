//! State shared between the host and the control loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use pursuit_core::enums::TargetPolicy;
use pursuit_sim::engine::AimCommand;

/// Commands sent from the host to the control loop thread.
#[derive(Debug)]
pub enum ControlCommand {
    /// Switch the target selection policy.
    SetPolicy(TargetPolicy),
    /// Bring the angle controllers to rest.
    ResetControllers,
    /// Shut down the control loop thread gracefully.
    Shutdown,
}

/// Shared application state.
///
/// - `command_tx` sits behind a `Mutex` (Sender is Send but not Sync)
/// - the latest aim command is an `Arc<Mutex<Option<_>>>` written by the loop thread
pub struct AppState {
    /// `None` until the control loop is spawned.
    pub command_tx: Mutex<Option<mpsc::Sender<ControlCommand>>>,
    /// Updated by the control loop after each tick.
    pub latest_command: Arc<Mutex<Option<AimCommand>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_command: Arc::new(Mutex::new(None)),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a command to the control loop. Returns false when no loop is listening.
    pub fn send(&self, command: ControlCommand) -> bool {
        match self.command_tx.lock() {
            Ok(lock) => lock.as_ref().is_some_and(|tx| tx.send(command).is_ok()),
            Err(_) => false,
        }
    }

    /// Copy of the newest aim command.
    pub fn latest(&self) -> Option<AimCommand> {
        self.latest_command.lock().ok().and_then(|lock| lock.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert!(state.command_tx.lock().unwrap().is_none());
        assert!(state.latest().is_none());
        assert!(!state.send(ControlCommand::Shutdown));
    }

    #[test]
    fn test_send_reaches_receiver() {
        let state = AppState::new();
        let (tx, rx) = mpsc::channel();
        *state.command_tx.lock().unwrap() = Some(tx);
        assert!(state.send(ControlCommand::SetPolicy(TargetPolicy::Priority)));
        assert!(state.send(ControlCommand::Shutdown));
        assert!(matches!(rx.try_recv(), Ok(ControlCommand::SetPolicy(TargetPolicy::Priority))));
        assert!(matches!(rx.try_recv(), Ok(ControlCommand::Shutdown)));
    }
}
