use crate::models::Post;

/// An action parked behind the confirmation dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PendingAction {
    Delete { id: u64, title: String },
    Update(Post),
}

impl PendingAction {
    pub fn post_id(&self) -> u64 {
        match self {
            PendingAction::Delete { id, .. } => *id,
            PendingAction::Update(post) => post.id,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            PendingAction::Delete { .. } => "Delete post?",
            PendingAction::Update(_) => "Save changes?",
        }
    }

    pub fn description(&self) -> String {
        match self {
            PendingAction::Delete { title, .. } => {
                format!("\"{title}\" will be removed. This cannot be undone.")
            }
            PendingAction::Update(post) => format!("Post #{} will be overwritten.", post.id),
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, PendingAction::Delete { .. })
    }
}

/// Closed, or open with exactly one pending action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfirmGate {
    pending: Option<PendingAction>,
}

impl ConfirmGate {
    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Opening over an unconfirmed action replaces it.
    pub fn open(&mut self, action: PendingAction) {
        if let Some(prev) = self.pending.replace(action) {
            log::debug!("confirm gate: replaced pending action for post #{}", prev.post_id());
        }
    }

    /// Closes the gate and hands back the action to dispatch.
    pub fn confirm(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    pub fn dismiss(&mut self) {
        self.pending = None;
    }
}
