//! Interaction presenter seam
//!
//! The scheduling core never renders anything. It hands messages, menus and
//! navigation requests to an [`InteractionPresenter`] and gets the user's
//! choice back.

use async_trait::async_trait;

use crate::models::{AppointmentDraft, Destination, SlotAction};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionPresenter: Send + Sync {
    /// Blocking, titled message
    async fn show_message(&self, title: &str, message: &str);

    /// Small fixed action menu. `None` when the user dismisses it.
    async fn choose_action(&self, title: &str, message: &str, actions: &[SlotAction]) -> Option<SlotAction>;

    /// Yes/no confirmation for destructive actions
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Open a screen that needs nothing back
    async fn navigate(&self, destination: Destination);

    /// Open the appointment creation sub-flow and wait for it to complete.
    /// `None` when the user backs out.
    async fn request_appointment_draft(&self, destination: Destination) -> Option<AppointmentDraft>;
}

/// Non-interactive presenter writing to stdout. Menus and confirmations are
/// always declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter;

#[async_trait]
impl InteractionPresenter for ConsolePresenter {
    async fn show_message(&self, title: &str, message: &str) {
        println!("[{}] {}", title, message);
    }

    async fn choose_action(&self, title: &str, message: &str, actions: &[SlotAction]) -> Option<SlotAction> {
        let labels: Vec<&str> = actions.iter().map(SlotAction::label).collect();
        println!("[{}] {} ({})", title, message, labels.join(" / "));
        None
    }

    async fn confirm(&self, title: &str, message: &str) -> bool {
        println!("[{}] {} -> declined", title, message);
        false
    }

    async fn navigate(&self, destination: Destination) {
        tracing::info!(?destination, "Navigation requested");
    }

    async fn request_appointment_draft(&self, destination: Destination) -> Option<AppointmentDraft> {
        tracing::info!(?destination, "Appointment creation is not available on the console");
        None
    }
}
