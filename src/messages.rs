// src/messages.rs
use poise::serenity_prelude::{
    self as serenity, ChannelId, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter,
    CreateInputText, CreateMessage, CreateModal, InputTextStyle, Mentionable, UserId,
};
use uuid::Uuid;

use crate::config::{Directory, DIRECTORY_ENV_KEYS};
use crate::gateway::Outgoing;
use crate::verification::{
    decision_custom_id, DecisionAction, PendingVerification, MAX_JUSTIFICATION_CHARS,
    REASON_INPUT_ID, VERIFICATION_MODAL_ID, VERIFY_BUTTON_ID,
};

const GREEN: u32 = 0x2ecc71;
const BLUE: u32 = 0x3498db;

pub const SUBMISSION_CONFIRMED: &str =
    "Your verification request has been submitted! Please wait for moderator approval.";

pub const KICK_REASON: &str = "Verification denied by moderator";

pub const ADMIN_REQUIRED: &str = "You need administrator permissions to use this command.";

/// Build the Discord message for something the workflow wants to post
pub fn render(message: Outgoing) -> CreateMessage {
    match message {
        Outgoing::VerificationPrompt => verification_prompt(),
        Outgoing::ReviewRequest { pending, token } => review_request(&pending, token),
        Outgoing::ArrivalWelcome {
            member_id,
            channel_id,
        } => arrival_welcome(member_id, channel_id),
    }
}

fn verification_prompt() -> CreateMessage {
    let embed = CreateEmbed::new()
        .title("Server Verification")
        .description("Welcome! To gain access to this server, please click the button below to start the verification process.")
        .field(
            "What happens next?",
            "1. Click the 'Verify Yourself' button\n\
             2. Fill out the verification form\n\
             3. Wait for moderator approval\n\
             4. Get access to the server!",
            false,
        )
        .color(GREEN);

    let button = CreateButton::new(VERIFY_BUTTON_ID)
        .label("Verify Yourself")
        .style(serenity::ButtonStyle::Primary);

    CreateMessage::new()
        .embed(embed)
        .components(vec![CreateActionRow::Buttons(vec![button])])
}

fn review_request(pending: &PendingVerification, token: Uuid) -> CreateMessage {
    let submitter = &pending.submitter;
    let mut embed = CreateEmbed::new()
        .title("New Verification Request")
        .description(format!("User: {} ({})", submitter.mention(), submitter.username))
        .field("Reason", pending.justification.as_str(), false)
        .footer(CreateEmbedFooter::new(format!("User ID: {}", submitter.user_id)))
        .color(BLUE);

    if let Ok(timestamp) = serenity::Timestamp::from_unix_timestamp(pending.submitted_at.timestamp()) {
        embed = embed.timestamp(timestamp);
    }

    CreateMessage::new()
        .embed(embed)
        .components(vec![decision_buttons(token, false)])
}

fn arrival_welcome(member_id: UserId, channel_id: ChannelId) -> CreateMessage {
    let embed = CreateEmbed::new()
        .title("Welcome!")
        .description(format!(
            "Welcome {} to the server! Please head over to {} and click the verification button to get started.",
            member_id.mention(),
            channel_id.mention()
        ))
        .color(BLUE);

    CreateMessage::new().embed(embed)
}

/// Approve/Deny row for a review request
pub fn decision_buttons(token: Uuid, disabled: bool) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(decision_custom_id(DecisionAction::Approve, token))
            .label("Approve")
            .style(serenity::ButtonStyle::Success)
            .disabled(disabled),
        CreateButton::new(decision_custom_id(DecisionAction::Deny, token))
            .label("Deny")
            .style(serenity::ButtonStyle::Danger)
            .disabled(disabled),
    ])
}

pub fn verification_modal() -> CreateModal {
    let reason = CreateInputText::new(
        InputTextStyle::Paragraph,
        "Why do you want to join the W4C Community?",
        REASON_INPUT_ID,
    )
    .placeholder(format!(
        "Enter your reason here (max {} characters)",
        MAX_JUSTIFICATION_CHARS
    ))
    .min_length(1)
    .max_length(MAX_JUSTIFICATION_CHARS as u16)
    .required(true);

    CreateModal::new(VERIFICATION_MODAL_ID, "Server Verification")
        .components(vec![CreateActionRow::InputText(reason)])
}

/// Public summary of an approval, listing the role changes that happened
pub fn approval_summary(mention: &str, actions: &[&str]) -> String {
    match actions {
        [first, second] => format!(
            "✅ {} has been approved, {}, and {}!",
            mention, first, second
        ),
        [first] => format!("✅ {} has been approved and {}!", mention, first),
        _ => format!("✅ {} has been approved!", mention),
    }
}

pub fn denial_announcement(mention: &str) -> String {
    format!("❌ {} has been denied and kicked from the server.", mention)
}

pub fn setup_instructions(prefix: &str, directory: &Directory) -> String {
    let mut text = String::from(
        "Set the following values in the environment (or the `directory` section of the config file):\n",
    );
    for key in DIRECTORY_ENV_KEYS {
        text.push_str(&format!("- {}\n", key));
    }
    text.push_str("\nCurrent configuration:\n");
    for line in directory.describe() {
        text.push_str(&line);
        text.push('\n');
    }
    text.push_str(&format!(
        "\nThen restart the bot for changes to take effect. Use `{}hello` to check that it responds.",
        prefix
    ));
    text
}
