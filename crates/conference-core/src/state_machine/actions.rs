use tracing::{debug, warn};

use crate::action_queue::DeferredAction;
use crate::adapters::events::{dispatch, ConferenceEventSink};
use crate::adapters::media::MediaController;
use crate::errors::Result;

/// Outcome of running a drained action queue
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ActionReport {
    pub executed: usize,
    pub failed: usize,
}

/// Execute a deferred action. Must not be called with a conference lock held.
pub async fn execute_action(
    conference: &str,
    action: &DeferredAction,
    media: &dyn MediaController,
    events: &dyn ConferenceEventSink,
) -> Result<()> {
    debug!("Executing action: {:?}", action);

    match action {
        DeferredAction::Wait { participant } => media.notify_wait(conference, participant).await?,
        DeferredAction::Admit { participant } => media.notify_admit(conference, participant).await?,
        DeferredAction::SecondActive { participant } => {
            media.notify_second_active(conference, participant).await?
        }
        DeferredAction::ReleaseAll { participants } => {
            media.notify_release_all(conference, participants).await?
        }
        DeferredAction::Kick { participant } => media.notify_kick(conference, participant).await?,
        DeferredAction::PlayPrompt { participant, prompt } => {
            media.play_prompt(conference, participant, *prompt).await?
        }
        DeferredAction::Announce { prompt } => media.announce(conference, *prompt).await?,
        DeferredAction::Publish(notification) => dispatch(events, notification),
    }

    Ok(())
}

/// Execute drained actions in FIFO order. A failing action is logged and
/// counted; the remaining actions still run.
pub async fn execute_actions(
    conference: &str,
    actions: Vec<DeferredAction>,
    media: &dyn MediaController,
    events: &dyn ConferenceEventSink,
) -> ActionReport {
    let mut report = ActionReport::default();

    for action in &actions {
        match execute_action(conference, action, media, events).await {
            Ok(()) => report.executed += 1,
            Err(e) => {
                warn!("Deferred action {:?} failed in conference '{}': {}", action, conference, e);
                report.failed += 1;
            }
        }
    }

    report
}
