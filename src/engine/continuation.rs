//! Pending-jump register and continuation handles
//!
//! The register is the engine's only suspension point: the run loop parks
//! until a jump is pending. Each activated command is issued a fresh ticket;
//! a completion signal only lands if its ticket is still armed, so handles
//! kept by stopped commands or earlier runs cannot disturb a newer run.

use crate::types::Jump;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Debug, Default)]
struct RegisterState {
    next_ticket: u64,
    armed: Option<u64>,
    pending: Option<Jump>,
}

/* ===================== Jump Register ===================== */

#[derive(Debug, Clone, Default)]
pub(crate) struct JumpRegister {
    inner: Arc<Mutex<RegisterState>>,
}

impl JumpRegister {
    fn lock(&self) -> MutexGuard<'_, RegisterState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a fresh ticket for a newly activated command
    pub(crate) fn arm(&self) -> u64 {
        let mut state = self.lock();
        state.next_ticket += 1;
        state.armed = Some(state.next_ticket);
        state.pending = None;
        state.next_ticket
    }

    pub(crate) fn armed(&self) -> Option<u64> {
        self.lock().armed
    }

    /// Set the pending jump from the engine side, disarming any ticket
    pub(crate) fn set(&self, jump: Jump) {
        let mut state = self.lock();
        state.armed = None;
        state.pending = Some(jump);
    }

    pub(crate) fn abort(&self) {
        self.set(Jump::Abort);
    }

    pub(crate) fn disarm(&self) {
        self.lock().armed = None;
    }

    pub(crate) fn take(&self) -> Option<Jump> {
        self.lock().pending.take()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Signal completion for `ticket`; only the first signal per ticket lands
    pub(crate) fn signal(&self, ticket: u64, jump: Jump) -> bool {
        signal(&self.inner, ticket, jump)
    }

    pub(crate) fn continuation(&self, ticket: u64, index: usize) -> Continuation {
        Continuation {
            register: Arc::downgrade(&self.inner),
            ticket,
            index,
        }
    }
}

fn signal(inner: &Mutex<RegisterState>, ticket: u64, jump: Jump) -> bool {
    let mut state = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if state.armed != Some(ticket) {
        return false;
    }
    state.armed = None;
    state.pending = Some(jump);
    true
}

/* ===================== Continuation ===================== */

/// Handle a command keeps to signal completion after its hook returned.
///
/// Cloneable and `Send`, so it can be fired from a UI callback, a timer or
/// another thread. The engine picks the signal up on its next `tick()`.
#[derive(Debug, Clone)]
pub struct Continuation {
    register: Weak<Mutex<RegisterState>>,
    ticket: u64,
    index: usize,
}

impl Continuation {
    /// Complete the command and continue with the next one
    pub fn resume(&self) -> bool {
        self.jump_to(self.index + 1)
    }

    /// Complete the command and resume the run at `index`.
    ///
    /// Returns false if the command already completed, was stopped, or the
    /// engine has been dropped.
    pub fn jump_to(&self, index: usize) -> bool {
        match self.register.upgrade() {
            Some(inner) => signal(&inner, self.ticket, Jump::To(index)),
            None => false,
        }
    }

    /// Whether a signal sent now would still land
    pub fn is_armed(&self) -> bool {
        self.register.upgrade().is_some_and(|inner| {
            inner.lock().unwrap_or_else(PoisonError::into_inner).armed == Some(self.ticket)
        })
    }

    /// Position of the command this handle was issued to
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_lands_once() {
        let register = JumpRegister::default();
        let ticket = register.arm();

        assert!(register.signal(ticket, Jump::To(3)));
        assert!(!register.signal(ticket, Jump::To(7)));
        assert_eq!(register.take(), Some(Jump::To(3)));
        assert_eq!(register.take(), None);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let register = JumpRegister::default();
        let old = register.continuation(register.arm(), 0);
        let _current = register.arm();

        assert!(!old.is_armed());
        assert!(!old.resume());
        assert!(!register.is_pending());
    }

    #[test]
    fn test_abort_disarms_outstanding_handles() {
        let register = JumpRegister::default();
        let handle = register.continuation(register.arm(), 2);
        register.abort();

        assert!(!handle.resume());
        assert_eq!(register.take(), Some(Jump::Abort));
    }

    #[test]
    fn test_continuation_resumes_next_index() {
        let register = JumpRegister::default();
        let handle = register.continuation(register.arm(), 4);

        assert_eq!(handle.index(), 4);
        assert!(handle.is_armed());
        assert!(handle.resume());
        assert_eq!(register.take(), Some(Jump::To(5)));
    }

    #[test]
    fn test_continuation_outliving_register() {
        let handle = {
            let register = JumpRegister::default();
            register.continuation(register.arm(), 0)
        };
        assert!(!handle.resume());
    }

    #[test]
    fn test_continuation_from_another_thread() {
        let register = JumpRegister::default();
        let handle = register.continuation(register.arm(), 1);

        std::thread::spawn(move || handle.jump_to(9))
            .join()
            .unwrap();

        assert_eq!(register.take(), Some(Jump::To(9)));
    }
}
