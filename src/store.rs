use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::{
    model::{AppState, StatePatch},
    render::{render, Dom},
};

pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct StoreInner {
    state: AppState,
    dom: Dom,
}

/// The single owner of [`AppState`] and the element tree it renders into.
///
/// Every write goes through [`StateStore::commit`], which applies the change
/// and re-renders before releasing the lock. The lock is never held across an
/// `.await`, so callers must re-read state after suspending.
pub struct StateStore {
    inner: Mutex<StoreInner>,
    clock: Clock,
    renders: watch::Sender<u64>,
}

impl StateStore {
    pub fn new(state: AppState, dom: Dom) -> Self {
        Self::with_clock(state, dom, Box::new(Utc::now))
    }

    pub fn with_clock(state: AppState, dom: Dom, clock: Clock) -> Self {
        let (renders, _) = watch::channel(0);
        Self {
            inner: Mutex::new(StoreInner { state, dom }),
            clock,
            renders,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` and render.
    pub fn commit<R>(&self, change: impl FnOnce(&mut AppState) -> R) -> R {
        let mut inner = self.lock();
        let result = change(&mut inner.state);
        let StoreInner { state, dom } = &mut *inner;
        render(state, dom, (self.clock)());
        drop(inner);
        self.renders.send_modify(|generation| *generation = generation.wrapping_add(1));
        result
    }

    /// Merge only the provided flag fields, then render.
    pub fn update(&self, patch: StatePatch) {
        self.commit(|state| state.merge(patch));
    }

    /// Re-render the current state without changing it.
    pub fn render(&self) {
        self.commit(|_| ());
    }

    pub fn read<R>(&self, view: impl FnOnce(&AppState) -> R) -> R {
        view(&self.lock().state)
    }

    pub fn snapshot(&self) -> AppState {
        self.lock().state.clone()
    }

    pub fn dom(&self) -> Dom {
        self.lock().dom.clone()
    }

    /// Receives the render generation after each commit.
    pub fn subscribe_renders(&self) -> watch::Receiver<u64> {
        self.renders.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ERROR_MESSAGE, STATUS_TEXT};

    #[test]
    fn commit_renders_synchronously() {
        let store = StateStore::new(AppState::default(), Dom::with_structure());
        store.commit(|state| {
            state.connection.connected = true;
            state.connection.server_url = "https://push.example.com".to_string();
        });
        assert_eq!(
            store.dom().get(STATUS_TEXT).unwrap().text.as_deref(),
            Some("Connected")
        );
    }

    #[test]
    fn update_merges_partial_patch() {
        let store = StateStore::new(AppState::default(), Dom::with_structure());
        store.update(StatePatch::new().error("Token rejected"));
        store.update(StatePatch::new().loading(true));

        let state = store.snapshot();
        assert!(state.flags.loading);
        assert_eq!(state.flags.error.as_deref(), Some("Token rejected"));
        assert_eq!(
            store.dom().get(ERROR_MESSAGE).unwrap().display(),
            Some("block")
        );
    }

    #[test]
    fn each_commit_publishes_a_render_generation() {
        let store = StateStore::new(AppState::default(), Dom::with_structure());
        let mut renders = store.subscribe_renders();
        assert_eq!(*renders.borrow_and_update(), 0);

        store.render();
        store.update(StatePatch::new().loading(false));
        assert!(renders.has_changed().unwrap());
        assert_eq!(*renders.borrow_and_update(), 2);
    }

    #[test]
    fn redundant_render_keeps_dom_identical() {
        let store = StateStore::new(AppState::default(), Dom::with_structure());
        store.render();
        let before = store.dom();
        store.render();
        assert_eq!(before, store.dom());
    }
}
