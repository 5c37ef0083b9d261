use poise::serenity_prelude::Mentionable;
use tracing::info;

use crate::messages;
use crate::{Context, Error};

/// Show how to configure the verification channels and roles (Admin only)
#[poise::command(prefix_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn setup(ctx: Context<'_>) -> Result<(), Error> {
    info!("Setup command called by {}", ctx.author().name);
    let directory = ctx.data().verification_manager.directory();
    ctx.say(messages::setup_instructions(&ctx.data().settings.prefix, directory))
        .await?;
    Ok(())
}

/// Say hello
#[poise::command(prefix_command)]
pub async fn hello(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("Hello, {}!", ctx.author().mention())).await?;
    Ok(())
}
