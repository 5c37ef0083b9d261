use poise::serenity_prelude::{
    self as serenity, ActionRowComponent, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditMessage,
};
use tracing::{debug, error, info};

use crate::gateway::SerenityGateway;
use crate::messages;
use crate::verification::{ControlId, Reply, Submitter, REASON_INPUT_ID, VERIFICATION_MODAL_ID};
use crate::{Data, Error};

fn reply_response(reply: Reply) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(reply.content)
            .ephemeral(reply.ephemeral),
    )
}

/// Route button clicks and modal submissions belonging to the verification flow
pub async fn handle_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::Interaction,
    data: &Data,
) -> Result<(), Error> {
    match interaction {
        serenity::Interaction::Component(component) => {
            handle_component(ctx, component, data).await
        }
        serenity::Interaction::Modal(modal) => handle_modal(ctx, modal, data).await,
        _ => Ok(()),
    }
}

async fn handle_component(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(control) = ControlId::parse(&component.data.custom_id) else {
        debug!("Ignoring unknown component '{}'", component.data.custom_id);
        return Ok(());
    };

    match control {
        ControlId::VerifyButton => {
            debug!("Opening verification form for {}", component.user.name);
            component
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Modal(messages::verification_modal()),
                )
                .await?;
        }
        ControlId::Decision { action, token } => {
            info!(
                "{:?} on verification {} by moderator {} ({})",
                action, token, component.user.name, component.user.id
            );

            let gateway = SerenityGateway::from_context(ctx);
            let outcome = data
                .verification_manager
                .decide(&gateway, component.guild_id, token, action)
                .await;

            if let Err(e) = component
                .create_response(&ctx.http, reply_response(outcome.reply))
                .await
            {
                error!("Failed to answer decision on {}: {}", token, e);
            }

            if outcome.disable_controls {
                if let Err(e) = component
                    .message
                    .channel_id
                    .edit_message(
                        &ctx.http,
                        component.message.id,
                        EditMessage::new()
                            .components(vec![messages::decision_buttons(token, true)]),
                    )
                    .await
                {
                    error!("Failed to disable decision buttons for {}: {}", token, e);
                }
            }
        }
    }

    Ok(())
}

async fn handle_modal(
    ctx: &serenity::Context,
    modal: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    if modal.data.custom_id != VERIFICATION_MODAL_ID {
        debug!("Ignoring unknown modal '{}'", modal.data.custom_id);
        return Ok(());
    }

    let justification = modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == REASON_INPUT_ID => {
                input.value.clone()
            }
            _ => None,
        })
        .unwrap_or_default();

    let submitter = Submitter {
        user_id: modal.user.id,
        username: modal.user.name.clone(),
    };

    let gateway = SerenityGateway::from_context(ctx);
    let reply = data
        .verification_manager
        .submit_justification(&gateway, submitter, &justification)
        .await;

    modal
        .create_response(&ctx.http, reply_response(reply))
        .await?;

    Ok(())
}
