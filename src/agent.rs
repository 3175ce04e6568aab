//! Client side of draft saving.
//!
//! One [`DraftAgent`] lives for one editing session. It runs as a single task
//! draining an event queue, so every transition happens one at a time. Timers
//! and in-flight saves run as their own tasks and report back through the same
//! queue; they only hold weak senders, so dropping every [`AgentHandle`] ends
//! the session.

mod state;
mod transport;

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use secrecy::Secret;
use tokio::{
    sync::{
        mpsc::{self, Receiver, WeakSender},
        watch,
    },
    task::JoinHandle,
};
use tracing::{instrument, Instrument};

use crate::{
    draft::DraftId,
    editor::{EditorConfig, Labels},
    protocol::{SaveOutcome, SaveRequest},
};

pub use state::{AgentState, ControlView, Status};
pub use transport::{DraftTransport, HttpTransport};

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Delay between edit activity and the automatic save. `None` disables
    /// auto-save.
    pub auto_save_wait: Option<Duration>,
    /// How long a save may stay unanswered before the control unlocks.
    pub auto_save_timeout: Duration,
    /// Restart the auto-save countdown on every edit.
    pub auto_save_input_based: bool,
    pub labels: Labels,
}

impl From<&EditorConfig> for AgentConfig {
    fn from(config: &EditorConfig) -> Self {
        Self {
            auto_save_wait: config.auto_save_wait.map(Duration::from_secs),
            auto_save_timeout: Duration::from_secs(config.auto_save_timeout),
            auto_save_input_based: config.auto_save_input_based,
            labels: config.messages.clone(),
        }
    }
}

/// The edit form as the agent sees it.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub edit_token: Secret<String>,
    pub draft_token: String,
    pub draft_id: Option<DraftId>,
    pub title: String,
    pub section: Option<String>,
    pub start_time: String,
    pub edit_time: String,
    pub scroll_top: i64,
    pub text: String,
    pub summary: String,
    pub minor_edit: bool,
}

impl EditSession {
    /// Starts a session from the page-render handoff, resuming its draft if
    /// it carries one.
    pub fn from_editor(
        config: &EditorConfig,
        edit_token: Secret<String>,
        title: &str,
        start_time: &str,
        edit_time: &str,
    ) -> Self {
        let mut session = Self {
            edit_token,
            draft_token: config.draft_token.clone(),
            draft_id: None,
            title: title.to_string(),
            section: None,
            start_time: start_time.to_string(),
            edit_time: edit_time.to_string(),
            scroll_top: 0,
            text: String::new(),
            summary: String::new(),
            minor_edit: false,
        };
        if let Some(draft) = &config.draft {
            session.draft_id = Some(draft.id);
            session.title = draft.title.clone();
            session.section = draft.section.clone();
            session.scroll_top = draft.scroll_top;
            session.text = draft.text.clone();
            session.summary = draft.summary.clone();
            session.minor_edit = draft.minor_edit;
        }
        session
    }

    fn save_request(&self) -> SaveRequest {
        SaveRequest {
            auth_token: self.edit_token.clone(),
            correlation_token: self.draft_token.clone(),
            id: self.draft_id,
            title: self.title.clone(),
            section: self.section.clone(),
            start_time: self.start_time.clone(),
            edit_time: self.edit_time.clone(),
            scroll_top: self.scroll_top,
            text: self.text.clone(),
            summary: self.summary.clone(),
            minor_edit: self.minor_edit,
        }
    }
}

/// An edit that makes the draft out of date.
#[derive(Debug, Clone)]
pub enum Edit {
    Text(String),
    Summary(String),
    MinorEdit(bool),
}

#[derive(Debug)]
enum Event {
    Edited(Edit),
    Scrolled(i64),
    SaveRequested,
    AutoSaveElapsed(u64),
    WatchdogElapsed(u64),
    SaveCompleted(SaveOutcome),
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
#[error("draft agent has shut down")]
pub struct AgentClosed;

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct DraftAgent {
    config: AgentConfig,
    session: EditSession,
    status: Status,
    transport: Arc<dyn DraftTransport>,
    events: WeakSender<Event>,
    state: watch::Sender<AgentState>,
    auto_save: Option<Timer>,
    watchdog: Option<Timer>,
    generation: u64,
}

impl DraftAgent {
    pub fn spawn(
        config: AgentConfig,
        session: EditSession,
        transport: Arc<dyn DraftTransport>,
    ) -> AgentHandle {
        let (tx, rx) = mpsc::channel(128);
        let (state_tx, state_rx) = watch::channel(AgentState {
            control: ControlView::render(Status::Unchanged, &config.labels),
            draft_id: session.draft_id,
        });

        let agent = Self {
            config,
            session,
            status: Status::Unchanged,
            transport,
            events: tx.downgrade(),
            state: state_tx,
            auto_save: None,
            watchdog: None,
            generation: 0,
        };
        agent.run(rx);

        AgentHandle {
            events: tx,
            state: state_rx,
        }
    }

    #[instrument(name = "DraftAgent", parent = None, skip_all, fields(title = %self.session.title))]
    fn run(mut self, mut rx: Receiver<Event>) {
        tokio::spawn(
            async move {
                tracing::debug!("starting draft agent");
                while let Some(event) = rx.recv().await {
                    if self.process_event(event).is_break() {
                        break;
                    }
                }
                self.cancel_auto_save();
                self.cancel_watchdog();
                tracing::debug!("stopping draft agent");
            }
            .instrument(tracing::Span::current()),
        );
    }

    fn process_event(&mut self, event: Event) -> ControlFlow<(), ()> {
        match event {
            Event::Edited(edit) => {
                match edit {
                    Edit::Text(text) => self.session.text = text,
                    Edit::Summary(summary) => self.session.summary = summary,
                    Edit::MinorEdit(minor) => self.session.minor_edit = minor,
                }
                self.change();
            }
            Event::Scrolled(top) => self.session.scroll_top = top,
            Event::SaveRequested => self.save(),
            Event::AutoSaveElapsed(generation) => {
                if is_current(&self.auto_save, generation) {
                    self.auto_save = None;
                    self.save();
                }
            }
            Event::WatchdogElapsed(generation) => {
                if is_current(&self.watchdog, generation) {
                    self.watchdog = None;
                    tracing::warn!(
                        timeout = ?self.config.auto_save_timeout,
                        "save unanswered, unlocking save control"
                    );
                    self.transition(Status::Changed);
                }
            }
            Event::SaveCompleted(outcome) => self.complete(outcome),
            Event::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn change(&mut self) {
        self.transition(Status::Changed);

        let Some(wait) = self.config.auto_save_wait else {
            return;
        };
        if self.config.auto_save_input_based {
            self.cancel_auto_save();
        } else if self.auto_save.is_some() {
            return;
        }
        self.auto_save = Some(self.arm(wait, Event::AutoSaveElapsed));
    }

    fn save(&mut self) {
        if self.status == Status::Saving {
            tracing::debug!("save already in flight, ignoring");
            return;
        }
        self.transition(Status::Saving);

        let request = self.session.save_request();
        let transport = self.transport.clone();
        let events = self.events.clone();
        tokio::spawn(
            async move {
                let outcome = transport.save(request).await;
                if let Some(events) = events.upgrade() {
                    let _ = events.send(Event::SaveCompleted(outcome)).await;
                }
            }
            .in_current_span(),
        );

        // The watchdog only unlocks the control; the request above keeps
        // running and may still complete afterwards.
        self.cancel_watchdog();
        self.watchdog = Some(self.arm(self.config.auto_save_timeout, Event::WatchdogElapsed));
        self.cancel_auto_save();
    }

    fn complete(&mut self, outcome: SaveOutcome) {
        self.cancel_watchdog();
        match outcome {
            SaveOutcome::Success { id } => {
                tracing::debug!(draft_id = %id, "draft saved");
                self.session.draft_id = Some(id);
                self.transition(Status::Saved);
            }
            outcome => {
                tracing::warn!(?outcome, "draft save failed");
                self.transition(Status::Error);
            }
        }
    }

    fn transition(&mut self, status: Status) {
        if self.status != status {
            tracing::trace!(from = ?self.status, to = ?status, "draft status changed");
            self.status = status;
        }
        let next = AgentState {
            control: ControlView::render(self.status, &self.config.labels),
            draft_id: self.session.draft_id,
        };
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn arm(&mut self, after: Duration, fire: fn(u64) -> Event) -> Timer {
        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(events) = events.upgrade() {
                let _ = events.send(fire(generation)).await;
            }
        });
        Timer { generation, handle }
    }

    fn cancel_auto_save(&mut self) {
        if let Some(timer) = self.auto_save.take() {
            timer.handle.abort();
        }
    }

    fn cancel_watchdog(&mut self) {
        if let Some(timer) = self.watchdog.take() {
            timer.handle.abort();
        }
    }
}

fn is_current(timer: &Option<Timer>, generation: u64) -> bool {
    timer
        .as_ref()
        .is_some_and(|timer| timer.generation == generation)
}

/// The editor view's grip on its agent.
#[derive(Clone)]
pub struct AgentHandle {
    events: mpsc::Sender<Event>,
    state: watch::Receiver<AgentState>,
}

impl AgentHandle {
    pub async fn edit(&self, edit: Edit) -> Result<(), AgentClosed> {
        self.send(Event::Edited(edit)).await
    }

    /// Records the textarea scroll position. Does not mark the draft changed.
    pub async fn scrolled(&self, scroll_top: i64) -> Result<(), AgentClosed> {
        self.send(Event::Scrolled(scroll_top)).await
    }

    /// The save button.
    pub async fn save(&self) -> Result<(), AgentClosed> {
        self.send(Event::SaveRequested).await
    }

    pub fn state(&self) -> AgentState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> Status {
        self.state.borrow().control.status
    }

    pub fn draft_id(&self) -> Option<DraftId> {
        self.state.borrow().draft_id
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentState> {
        self.state.clone()
    }

    /// Waits until the agent reaches `status`.
    pub async fn wait_for(&self, status: Status) -> Result<AgentState, AgentClosed> {
        let mut state = self.state.clone();
        let reached = state
            .wait_for(|state| state.control.status == status)
            .await
            .map_err(|_| AgentClosed)?;
        Ok(reached.clone())
    }

    /// Ends the editing session, cancelling pending timers.
    pub async fn shutdown(self) {
        let _ = self.events.send(Event::Shutdown).await;
    }

    async fn send(&self, event: Event) -> Result<(), AgentClosed> {
        self.events.send(event).await.map_err(|_| AgentClosed)
    }
}
