use crate::action_queue::{ConferenceNotification, DeferredAction};
use crate::errors::Result;
use crate::state_table::{ConferenceStateId, TransitionContext};
use crate::types::{Membership, ParticipantInfo, Prompt};

/// Admit the raising participant and request the recomputed state
pub fn handle_join(ctx: &mut TransitionContext<'_>) -> Result<Option<ConferenceStateId>> {
    let participant = ctx.participant();
    let conference = ctx.conference();
    let previous = ctx.state();

    let admission = ctx.registry_mut().admit(conference, participant.clone())?;

    match admission.membership {
        Membership::Waiting => {
            if let Some(info) = ctx.registry_mut().hold(&participant.id) {
                ctx.enqueue(DeferredAction::Wait { participant: info });
            }
            play_prompt(ctx, participant, Prompt::WaitForLeader);
        }
        _ => {
            ctx.enqueue(DeferredAction::Admit { participant: participant.clone() });
            if let Some(peer) = ctx.registry().second_active_peer(&participant.id) {
                ctx.enqueue(DeferredAction::SecondActive { participant: peer });
            }
            if !participant.is_marked()
                && matches!(previous, ConferenceStateId::Empty | ConferenceStateId::Inactive)
            {
                play_prompt(ctx, participant, Prompt::OnlyPerson);
            }
        }
    }

    ctx.enqueue(DeferredAction::Publish(ConferenceNotification::ParticipantJoined {
        conference: conference.to_string(),
        participant: participant.id.clone(),
        membership: admission.membership,
    }));

    Ok(Some(admission.target))
}

/// Remove the raising participant and request the recomputed state
pub fn handle_leave(ctx: &mut TransitionContext<'_>) -> Result<Option<ConferenceStateId>> {
    let participant = ctx.participant();
    let conference = ctx.conference();

    let departure = ctx.registry_mut().depart(conference, &participant.id)?;

    for info in departure.kicked {
        ctx.enqueue(DeferredAction::Kick { participant: info });
    }
    for info in departure.demoted {
        if let Some(info) = ctx.registry_mut().hold(&info.id) {
            ctx.enqueue(DeferredAction::Wait { participant: info });
        }
    }
    if departure.last_marked_left && !participant.profile.quiet {
        ctx.enqueue(DeferredAction::Announce { prompt: Prompt::LeaderHasLeft });
    }

    ctx.enqueue(DeferredAction::Publish(ConferenceNotification::ParticipantLeft {
        conference: conference.to_string(),
        participant: participant.id.clone(),
    }));

    Ok(Some(departure.target))
}

/// Start waiting treatment for everyone parked and not yet treated
pub fn wait_all(ctx: &mut TransitionContext<'_>) {
    for info in ctx.registry_mut().hold_all() {
        ctx.enqueue(DeferredAction::Wait { participant: info });
    }
}

/// Release the waiting set into the live mix and greet the first marked
/// participant
pub fn release_waiting(ctx: &mut TransitionContext<'_>) {
    let released = ctx.registry_mut().release_waiting();
    if !released.is_empty() {
        ctx.enqueue(DeferredAction::ReleaseAll { participants: released });
    }

    let participant = ctx.participant();
    if ctx.event().is_join() && participant.is_marked() && ctx.registry().marked_count() == 1 {
        play_prompt(ctx, participant, Prompt::PlacedIntoConference);
    }
}

pub fn publish(ctx: &mut TransitionContext<'_>, notification: ConferenceNotification) {
    ctx.enqueue(DeferredAction::Publish(notification));
}

fn play_prompt(ctx: &mut TransitionContext<'_>, participant: &ParticipantInfo, prompt: Prompt) {
    if participant.profile.quiet {
        return;
    }
    ctx.enqueue(DeferredAction::PlayPrompt { participant: participant.id.clone(), prompt });
}
