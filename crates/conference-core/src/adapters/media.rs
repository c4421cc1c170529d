//! Media collaborator interface

use async_trait::async_trait;
use tracing::info;

use crate::errors::Result;
use crate::types::{ParticipantId, ParticipantInfo, Prompt};

/// Channel/media side of the bridge. Called only from deferred actions,
/// never while a conference lock is held.
#[async_trait]
pub trait MediaController: Send + Sync {
    /// Place a participant into non-mixed waiting treatment
    async fn notify_wait(&self, conference: &str, participant: &ParticipantInfo) -> Result<()>;

    /// Mix a participant into the live audio
    async fn notify_admit(&self, conference: &str, participant: &ParticipantInfo) -> Result<()>;

    /// `participant` was alone in the live mix and now has company. Stops any
    /// only-person treatment it was given.
    async fn notify_second_active(&self, _conference: &str, _participant: &ParticipantInfo) -> Result<()> {
        Ok(())
    }

    /// Mix a released waiting set into the live audio, in the given order
    async fn notify_release_all(&self, conference: &str, participants: &[ParticipantInfo]) -> Result<()> {
        for participant in participants {
            self.notify_admit(conference, participant).await?;
        }
        Ok(())
    }

    /// Remove an end-marked participant from the bridge. Its worker is
    /// expected to raise its own LEAVE afterwards.
    async fn notify_kick(&self, conference: &str, participant: &ParticipantInfo) -> Result<()>;

    async fn play_prompt(&self, conference: &str, participant: &ParticipantId, prompt: Prompt) -> Result<()>;

    /// Play a prompt to everyone in the conference
    async fn announce(&self, conference: &str, prompt: Prompt) -> Result<()>;
}

/// Media controller that only logs what it is asked to do
#[derive(Debug, Default, Clone)]
pub struct LoggingMediaController;

#[async_trait]
impl MediaController for LoggingMediaController {
    async fn notify_wait(&self, conference: &str, participant: &ParticipantInfo) -> Result<()> {
        info!(
            "Participant {} waiting in conference '{}' (music on hold: {})",
            participant.id, conference, participant.profile.music_on_hold
        );
        Ok(())
    }

    async fn notify_admit(&self, conference: &str, participant: &ParticipantInfo) -> Result<()> {
        info!("Participant {} mixed into conference '{}'", participant.id, conference);
        Ok(())
    }

    async fn notify_second_active(&self, conference: &str, participant: &ParticipantInfo) -> Result<()> {
        info!("Participant {} no longer alone in conference '{}'", participant.id, conference);
        Ok(())
    }

    async fn notify_kick(&self, conference: &str, participant: &ParticipantInfo) -> Result<()> {
        info!("Participant {} kicked from conference '{}'", participant.id, conference);
        Ok(())
    }

    async fn play_prompt(&self, conference: &str, participant: &ParticipantId, prompt: Prompt) -> Result<()> {
        info!("Playing {:?} to {} in conference '{}'", prompt, participant, conference);
        Ok(())
    }

    async fn announce(&self, conference: &str, prompt: Prompt) -> Result<()> {
        info!("Announcing {:?} to conference '{}'", prompt, conference);
        Ok(())
    }
}
