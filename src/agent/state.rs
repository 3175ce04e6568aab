use crate::{draft::DraftId, editor::Labels};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unchanged,
    Changed,
    Saving,
    Saved,
    Error,
}

/// What the save control shows. Depends on nothing but the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub status: Status,
    pub enabled: bool,
    pub label: String,
}

impl ControlView {
    pub fn render(status: Status, labels: &Labels) -> Self {
        let label = match status {
            Status::Unchanged => &labels.unchanged,
            Status::Changed => &labels.changed,
            Status::Saving => &labels.saving,
            Status::Saved => &labels.saved,
            Status::Error => &labels.error,
        };
        Self {
            status,
            enabled: status == Status::Changed,
            label: label.clone(),
        }
    }
}

/// Everything an agent publishes to the editor view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    pub control: ControlView,
    /// Identity the next save will carry.
    pub draft_id: Option<DraftId>,
}
