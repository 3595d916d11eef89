//! Observable screen state with stale-response protection

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::DisplayState;

/// Identifies one load started through [`ScreenState::begin_load`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A `watch` channel of [`DisplayState`] plus a generation counter
///
/// Every load takes a ticket. A result is published only while its ticket
/// is the latest one, so a slow response never overwrites a newer load.
pub struct ScreenState<T> {
    sender: watch::Sender<DisplayState<T>>,
    generation: Mutex<u64>,
}

impl<T: Clone> Default for ScreenState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ScreenState<T> {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(DisplayState::Loading);
        Self {
            sender,
            generation: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState<T>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> DisplayState<T> {
        self.sender.borrow().clone()
    }

    /// Ticket of the most recent load
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket(*self.lock())
    }

    /// Publish `Loading` and hand out a fresh ticket
    pub fn begin_load(&self) -> LoadTicket {
        let mut generation = self.lock();
        *generation += 1;
        self.sender.send_replace(DisplayState::Loading);
        LoadTicket(*generation)
    }

    /// Publish `state` if `ticket` is still current. Returns whether it was.
    pub fn finish(&self, ticket: LoadTicket, state: DisplayState<T>) -> bool {
        let generation = self.lock();
        if *generation != ticket.0 {
            tracing::debug!(ticket = ticket.0, current = *generation, "Discarding stale result");
            return false;
        }
        self.sender.send_replace(state);
        true
    }

    /// Edit the loaded value in place. Does nothing outside `Success` or when
    /// a newer load has started since `ticket`.
    pub fn modify(&self, ticket: LoadTicket, edit: impl FnOnce(&mut T)) -> bool {
        let generation = self.lock();
        if *generation != ticket.0 {
            return false;
        }
        self.sender.send_if_modified(|state| match state {
            DisplayState::Success(value) => {
                edit(value);
                true
            }
            _ => false,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tasks spawned on behalf of one screen; aborted when the screen goes away
#[derive(Default)]
pub struct ScreenTasks {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ScreenTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
    }

    pub fn abort_all(&self) {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for ScreenTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_ticket_is_discarded() {
        let state: ScreenState<u32> = ScreenState::new();
        let first = state.begin_load();
        let second = state.begin_load();

        assert!(!state.finish(first, DisplayState::Success(1)));
        assert!(state.current().is_loading());

        assert!(state.finish(second, DisplayState::Success(2)));
        assert_eq!(state.current(), DisplayState::Success(2));
    }

    #[test]
    fn test_modify_only_in_success() {
        let state: ScreenState<u32> = ScreenState::new();
        let ticket = state.begin_load();
        assert!(!state.modify(ticket, |v| *v += 1));

        state.finish(ticket, DisplayState::Success(1));
        assert!(state.modify(ticket, |v| *v += 1));
        assert_eq!(state.current(), DisplayState::Success(2));

        let newer = state.begin_load();
        state.finish(newer, DisplayState::Success(10));
        assert!(!state.modify(ticket, |v| *v += 1));
        assert_eq!(state.current(), DisplayState::Success(10));
    }

    #[tokio::test]
    async fn test_tasks_abort_on_drop() {
        let tasks = ScreenTasks::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tasks.spawn(async move {
            let _keep = tx;
            std::future::pending::<()>().await;
        });
        drop(tasks);
        // the sender is dropped with the aborted task
        assert!(rx.await.is_err());
    }
}
