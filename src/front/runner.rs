//! # Front runner: drains the front queue into the Frontend.
//!
//! One tokio task per bridge. Removes the head action and applies it to the
//! host's [`Frontend`] to completion before removing the next, preserving
//! the one-action-at-a-time invariant on the front context.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{FrontAction, Frontend};

/// Spawns the front runner task. Ends when the queue closes (bridge
/// dropped).
pub(crate) fn spawn_front_runner(
    frontend: Arc<dyn Frontend>,
    mut rx: mpsc::UnboundedReceiver<FrontAction>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(action) = rx.recv().await {
            apply(frontend.as_ref(), action).await;
        }
    })
}

/// Applies one action to the frontend.
async fn apply(frontend: &dyn Frontend, action: FrontAction) {
    match action {
        FrontAction::ShowBusy { message } => frontend.show_busy(&message).await,
        FrontAction::HideBusy => frontend.hide_busy().await,
        FrontAction::SetQuestion { html } => frontend.set_question(&html).await,
        FrontAction::SetAnswer {
            html,
            process_audio,
        } => frontend.set_answer(&html, process_audio).await,
        FrontAction::SetControlsVisible {
            question,
            answer,
            grades,
        } => {
            frontend
                .set_controls_visible(question, answer, grades)
                .await
        }
        FrontAction::SetStatus { text } => frontend.set_status(&text).await,
        FrontAction::ShowNotice { text } => frontend.show_notice(&text).await,
        FrontAction::PresentModal {
            prompt,
            choices,
            responder,
        } => frontend.present_modal(&prompt, &choices, responder).await,
        FrontAction::SetProgress { label, max, value } => {
            frontend
                .set_progress(label.as_deref(), max, value)
                .await
        }
        FrontAction::ClearProgress => frontend.clear_progress().await,
        FrontAction::OpenSyncDialog {
            server,
            port,
            username,
            password,
        } => {
            frontend
                .open_sync_dialog(&server, port, &username, &password)
                .await
        }
        FrontAction::OpenSetSelection {
            saved_sets,
            active_set,
        } => frontend.open_set_selection(&saved_sets, &active_set).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFrontend {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Frontend for RecordingFrontend {
        async fn show_busy(&self, message: &str) {
            self.calls.lock().unwrap().push(format!("busy:{message}"));
        }

        async fn hide_busy(&self) {
            self.calls.lock().unwrap().push("hide-busy".into());
        }

        async fn set_question(&self, html: &str) {
            self.calls.lock().unwrap().push(format!("question:{html}"));
        }

        async fn set_status(&self, text: &str) {
            self.calls.lock().unwrap().push(format!("status:{text}"));
        }
    }

    #[tokio::test]
    async fn actions_apply_in_posting_order() {
        let frontend = Arc::new(RecordingFrontend::default());
        let (handle, rx) = super::super::channel();
        let runner = spawn_front_runner(frontend.clone(), rx);

        handle.show_busy("init");
        handle.set_question("<b>Q</b>");
        handle.set_status("5 cards left");
        handle.hide_busy();
        drop(handle);
        runner.await.unwrap();

        assert_eq!(
            *frontend.calls.lock().unwrap(),
            vec!["busy:init", "question:<b>Q</b>", "status:5 cards left", "hide-busy"]
        );
    }
}
