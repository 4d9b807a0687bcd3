use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::channel::ChannelEvent;
use crate::locale::LocaleTable;
use crate::ui::Theme;
use crate::view::{self, ResolvedStep};
use crate::workflow::{StepStore, WorkflowSnapshot};

/// State of the backend connection, shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// The transport failed; the last good snapshot stays on screen.
    Lost(String),
    Closed,
}

/// Main dashboard state.
///
/// Pure plumbing: channel events go into the store, the draw function reads
/// the derived step list back out. All mutation happens on the one event
/// loop, so nothing here needs a lock.
pub struct DashboardApp {
    pub theme: Theme,
    pub locale: LocaleTable,
    pub connection: ConnectionState,
    pub should_exit: bool,

    store: StepStore,
    snapshot: WorkflowSnapshot,
    spinner_frame: usize,
}

impl DashboardApp {
    pub fn new(locale: LocaleTable) -> Self {
        let store = StepStore::new();
        let snapshot = store.snapshot();
        Self {
            theme: Theme::default(),
            locale,
            connection: ConnectionState::Connecting,
            should_exit: false,
            store,
            snapshot,
            spinner_frame: 0,
        }
    }

    /// Feed one channel event into the app.
    ///
    /// Only `Update` touches the store; lifecycle events are observational
    /// and never reset or corrupt the snapshot.
    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => {
                self.connection = ConnectionState::Open;
            }
            ChannelEvent::Update(update) => {
                self.snapshot = self.store.apply(update);
            }
            ChannelEvent::TransportError(message) => {
                self.connection = ConnectionState::Lost(message);
            }
            ChannelEvent::Closed => {
                self.connection = ConnectionState::Closed;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_exit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_exit = true;
            }
            _ => {}
        }
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 4;
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
        SPINNER[self.spinner_frame]
    }

    /// The latest snapshot, for consumers that want the raw states.
    pub fn snapshot(&self) -> &WorkflowSnapshot {
        &self.snapshot
    }

    /// The full ordered step list, resolved for rendering.
    pub fn resolved_steps(&self) -> Vec<ResolvedStep> {
        view::derive(&self.snapshot, &self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{StepId, StepStatus, StepUpdate};

    fn app() -> DashboardApp {
        DashboardApp::new(LocaleTable::english())
    }

    #[test]
    fn updates_flow_into_the_snapshot() {
        let mut app = app();
        app.handle_channel_event(ChannelEvent::Update(StepUpdate::single(
            StepId::Init,
            StepStatus::Active,
            None,
        )));
        assert_eq!(
            app.snapshot().step(StepId::Init).status,
            StepStatus::Active
        );
    }

    #[test]
    fn lifecycle_events_leave_the_snapshot_alone() {
        let mut app = app();
        app.handle_channel_event(ChannelEvent::Update(StepUpdate::single(
            StepId::Up,
            StepStatus::Finished,
            None,
        )));
        let before = app.snapshot().clone();

        app.handle_channel_event(ChannelEvent::TransportError("reset by peer".to_string()));
        app.handle_channel_event(ChannelEvent::Closed);

        assert!(app.snapshot().same_as(&before));
        assert_eq!(app.connection, ConnectionState::Closed);
    }

    #[test]
    fn quit_keys_request_exit() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_exit);
    }
}
