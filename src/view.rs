//! Console rendering of the capture session
//!
//! The view only reads snapshots; every change of state goes through the session.

use tokio::sync::watch;
use tracing::debug;

use crate::session::SessionSnapshot;

/// One-line rendering of a snapshot
pub fn render(snapshot: &SessionSnapshot) -> String {
    let indicator = if snapshot.is_capturing() { "●" } else { "○" };
    format!(
        "{} {}  [{}]",
        indicator,
        snapshot.display_text(),
        snapshot.toggle_label()
    )
}

/// Prints the session line whenever the state or prediction changes
pub struct ConsoleView {
    updates: watch::Receiver<SessionSnapshot>,
}

impl ConsoleView {
    pub fn new(updates: watch::Receiver<SessionSnapshot>) -> Self {
        Self { updates }
    }

    /// Render until the session goes away
    pub async fn run(mut self) {
        let mut last = String::new();

        loop {
            let line = render(&self.updates.borrow_and_update());
            if line != last {
                println!("{}", line);
                last = line;
            }

            if self.updates.changed().await.is_err() {
                debug!("Session closed, console view exiting");
                break;
            }
        }
    }
}
