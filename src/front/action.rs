//! # Actions posted to the front context.
//!
//! One variant per UI operation the worker may request. Immutable once
//! posted; applied FIFO by the front runner.

use crate::modal::ModalResponder;

/// A unit of deferred UI work posted to the front queue.
pub enum FrontAction {
    /// Show a modal busy indicator (engine bring-up, long operations).
    ShowBusy {
        /// Message displayed next to the indicator.
        message: String,
    },

    /// Dismiss the busy indicator.
    HideBusy,

    /// Replace the question area content.
    SetQuestion {
        /// HTML fragment to render.
        html: String,
    },

    /// Replace the answer area content.
    SetAnswer {
        /// HTML fragment to render.
        html: String,
        /// Whether embedded audio should be processed.
        process_audio: bool,
    },

    /// Show or hide the main review controls.
    SetControlsVisible {
        /// Question area visibility.
        question: bool,
        /// Answer area visibility.
        answer: bool,
        /// Grade buttons visibility (hides the show-answer button when set).
        grades: bool,
    },

    /// Replace the status bar text.
    SetStatus {
        /// Plain text to display.
        text: String,
    },

    /// Show a non-blocking informational notice.
    ShowNotice {
        /// Plain text to display.
        text: String,
    },

    /// Present a modal question; the answer is delivered through the
    /// responder, not through the queue.
    PresentModal {
        /// Prompt text.
        prompt: String,
        /// 1–3 labeled choices.
        choices: Vec<String>,
        /// Single-use answer handle.
        responder: ModalResponder,
    },

    /// Create or update the progress indicator.
    ///
    /// `label` restarts the indicator with a new message; `max` switches it
    /// to a bounded bar; `value` advances it.
    SetProgress {
        /// New progress label, if changing.
        label: Option<String>,
        /// New maximum, if switching to a bounded bar.
        max: Option<u32>,
        /// Current value, if advancing.
        value: Option<u32>,
    },

    /// Dismiss the progress indicator.
    ClearProgress,

    /// Open the sync dialog prefilled with stored credentials.
    OpenSyncDialog {
        /// Sync server host.
        server: String,
        /// Sync server port.
        port: u16,
        /// Stored username.
        username: String,
        /// Stored password.
        password: String,
    },

    /// Open the saved-set selection dialog.
    OpenSetSelection {
        /// Saved set names.
        saved_sets: Vec<String>,
        /// Currently active set.
        active_set: String,
    },
}
