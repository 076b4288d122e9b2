//! # Frontend: the host's UI implementation.
//!
//! One async method per front action. All methods default to no-ops so a
//! host (or a test) implements only what it renders.

use async_trait::async_trait;

use crate::modal::ModalResponder;

/// Host-implemented UI surface driven by the front runner.
///
/// Methods are invoked one at a time, in posting order, from the front
/// runner task. Implementations must not block the async runtime; slow UI
/// work should be dispatched onward (the widget toolkit's own thread,
/// a render channel).
#[async_trait]
pub trait Frontend: Send + Sync + 'static {
    /// Shows the busy indicator.
    async fn show_busy(&self, message: &str) {
        let _ = message;
    }

    /// Dismisses the busy indicator.
    async fn hide_busy(&self) {}

    /// Replaces the question area content.
    async fn set_question(&self, html: &str) {
        let _ = html;
    }

    /// Replaces the answer area content.
    async fn set_answer(&self, html: &str, process_audio: bool) {
        let _ = (html, process_audio);
    }

    /// Shows or hides the main review controls.
    async fn set_controls_visible(&self, question: bool, answer: bool, grades: bool) {
        let _ = (question, answer, grades);
    }

    /// Replaces the status bar text.
    async fn set_status(&self, text: &str) {
        let _ = text;
    }

    /// Shows a non-blocking informational notice.
    async fn show_notice(&self, text: &str) {
        let _ = text;
    }

    /// Presents a modal question.
    ///
    /// The implementation hands `responder` to whatever UI element collects
    /// the answer and calls [`ModalResponder::answer`] with the selected
    /// index. The default drops the responder, which cancels the query —
    /// override this for any host that issues modal questions.
    async fn present_modal(&self, prompt: &str, choices: &[String], responder: ModalResponder) {
        let _ = (prompt, choices);
        drop(responder);
    }

    /// Creates or updates the progress indicator.
    async fn set_progress(&self, label: Option<&str>, max: Option<u32>, value: Option<u32>) {
        let _ = (label, max, value);
    }

    /// Dismisses the progress indicator.
    async fn clear_progress(&self) {}

    /// Opens the sync dialog prefilled with stored credentials.
    async fn open_sync_dialog(&self, server: &str, port: u16, username: &str, password: &str) {
        let _ = (server, port, username, password);
    }

    /// Opens the saved-set selection dialog.
    async fn open_set_selection(&self, saved_sets: &[String], active_set: &str) {
        let _ = (saved_sets, active_set);
    }
}
