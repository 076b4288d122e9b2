//! # FrontHandle: posting side of the front queue.
//!
//! Clonable, non-blocking, callable from any context. The typed helpers
//! mirror the UI surface one-to-one; each is fire-and-forget from the
//! caller's perspective.

use tokio::sync::mpsc;

use crate::modal::ModalResponder;

use super::FrontAction;

/// Posting side of the front context's action queue.
///
/// If the front runner is gone, posts are silently dropped; the worker must
/// not fail because the UI went away first.
#[derive(Clone)]
pub struct FrontHandle {
    tx: mpsc::UnboundedSender<FrontAction>,
}

impl FrontHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<FrontAction>) -> Self {
        Self { tx }
    }

    /// Enqueues one action (non-blocking).
    pub fn post(&self, action: FrontAction) {
        let _ = self.tx.send(action);
    }

    /// Shows the busy indicator with `message`.
    pub fn show_busy(&self, message: impl Into<String>) {
        self.post(FrontAction::ShowBusy {
            message: message.into(),
        });
    }

    /// Dismisses the busy indicator.
    pub fn hide_busy(&self) {
        self.post(FrontAction::HideBusy);
    }

    /// Replaces the question area content.
    pub fn set_question(&self, html: impl Into<String>) {
        self.post(FrontAction::SetQuestion { html: html.into() });
    }

    /// Replaces the answer area content.
    pub fn set_answer(&self, html: impl Into<String>, process_audio: bool) {
        self.post(FrontAction::SetAnswer {
            html: html.into(),
            process_audio,
        });
    }

    /// Shows or hides the main review controls.
    pub fn set_controls_visible(&self, question: bool, answer: bool, grades: bool) {
        self.post(FrontAction::SetControlsVisible {
            question,
            answer,
            grades,
        });
    }

    /// Replaces the status bar text.
    pub fn set_status(&self, text: impl Into<String>) {
        self.post(FrontAction::SetStatus { text: text.into() });
    }

    /// Shows a non-blocking informational notice.
    pub fn show_notice(&self, text: impl Into<String>) {
        self.post(FrontAction::ShowNotice { text: text.into() });
    }

    /// Creates or updates the progress indicator.
    pub fn set_progress(&self, label: Option<String>, max: Option<u32>, value: Option<u32>) {
        self.post(FrontAction::SetProgress { label, max, value });
    }

    /// Dismisses the progress indicator.
    pub fn clear_progress(&self) {
        self.post(FrontAction::ClearProgress);
    }

    /// Opens the sync dialog prefilled with stored credentials.
    pub fn open_sync_dialog(
        &self,
        server: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) {
        self.post(FrontAction::OpenSyncDialog {
            server: server.into(),
            port,
            username: username.into(),
            password: password.into(),
        });
    }

    /// Opens the saved-set selection dialog.
    pub fn open_set_selection(&self, saved_sets: Vec<String>, active_set: impl Into<String>) {
        self.post(FrontAction::OpenSetSelection {
            saved_sets,
            active_set: active_set.into(),
        });
    }

    /// Posts a modal question carrying its answer handle.
    pub(crate) fn present_modal(&self, prompt: &str, choices: &[&str], responder: ModalResponder) {
        self.post(FrontAction::PresentModal {
            prompt: prompt.to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            responder,
        });
    }
}
