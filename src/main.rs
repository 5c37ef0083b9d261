use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Discord bot that routes new members through moderator-approved verification
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file (channel/role ids, prefix, liveness port)
    /// Falls back to the CONFIG_PATH environment variable
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Do not start the HTTP liveness endpoint
    #[arg(long)]
    no_liveness: bool,
}

mod commands;
mod config;
mod error;
mod events;
mod gateway;
mod logging;
mod managers;
mod messages;
mod verification;
mod web;

use commands::{hello, setup};
use config::BotSettings;
use events::{handle_interaction, handle_member_add, handle_ready};
use managers::{create_shared_verification_manager, SharedVerificationManager};

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared application state
pub struct Data {
    pub settings: Arc<BotSettings>,
    pub verification_manager: SharedVerificationManager,
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = handle_member_add(ctx, new_member, data).await {
                error!("Failed to handle new member: {}", e);
            }
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            if let Err(e) = handle_interaction(ctx, interaction, data).await {
                error!("Failed to handle interaction: {}", e);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Log the application id encoded in the first segment of the token
fn log_bot_id(token: &str) {
    use base64::Engine;

    let Some(bot_id_b64) = token.split('.').next() else {
        return;
    };
    // Discord tokens use base64 without padding, sometimes the URL-safe alphabet
    let decoded = base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(bot_id_b64)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(bot_id_b64));
    if let Ok(Ok(id_str)) = decoded.map(String::from_utf8) {
        info!(
            "Bot ID: {} (enable the Server Members and Message Content intents at https://discord.com/developers/applications/{}/bot)",
            id_str, id_str
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("CONFIG_PATH").ok());
    let settings = BotSettings::load(config_path.as_deref())?;
    let level = logging::parse_level(std::env::var("LOG_LEVEL").ok().as_deref());
    logging::init(level, settings.log_file.as_deref())?;

    if let Some(path) = &config_path {
        info!("Loaded settings from {}", path);
    }
    for line in settings.directory.describe() {
        info!("Directory {}", line.trim_start_matches("- "));
    }

    let token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| anyhow::anyhow!("Missing DISCORD_TOKEN environment variable"))?;
    log_bot_id(&token);

    let settings = Arc::new(settings);
    let verification_manager = create_shared_verification_manager(settings.directory.clone());

    if args.no_liveness {
        info!("--no-liveness: liveness endpoint disabled");
    } else {
        let liveness = web::LivenessConfig {
            port: settings.liveness_port,
        };
        tokio::spawn(async move {
            if let Err(e) = web::start_liveness_server(liveness).await {
                error!("Liveness server error: {}", e);
            }
        });
    }

    let prefix = settings.prefix.clone();

    // Build framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![setup(), hello()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' invoked by {} (ID: {}) in {}",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.author().id,
                        ctx.guild_id().map(|g| g.to_string()).unwrap_or_else(|| "DM".to_string())
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' completed for {}",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Error in command '{}': {}", ctx.command().qualified_name, error);
                            let _ = ctx.say(format!("An error occurred: {}", error)).await;
                        }
                        poise::FrameworkError::MissingUserPermissions { missing_permissions, ctx, .. } => {
                            warn!("User {} missing permissions for '{}': {:?}", ctx.author().name, ctx.command().qualified_name, missing_permissions);
                            let _ = ctx.say(messages::ADMIN_REQUIRED).await;
                        }
                        poise::FrameworkError::MissingBotPermissions { missing_permissions, ctx, .. } => {
                            error!("Bot missing permissions for '{}': {:?}", ctx.command().qualified_name, missing_permissions);
                        }
                        poise::FrameworkError::GuildOnly { ctx, .. } => {
                            warn!("Command '{}' is guild-only, used in DM by {}", ctx.command().qualified_name, ctx.author().name);
                        }
                        other => {
                            error!("Other framework error: {}", other);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            let settings = settings.clone();
            let verification_manager = verification_manager.clone();

            Box::pin(async move {
                info!("Bot logged in as: {}", ready.user.name);
                if ready.guilds.is_empty() {
                    warn!("Bot is not in any guilds");
                }

                let data = Data {
                    settings,
                    verification_manager,
                };

                if let Err(e) = handle_ready(ctx, &data).await {
                    error!("Failed to set up verification prompt: {}", e);
                }

                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    if let Err(e) = client.start().await {
        let err_str = e.to_string();
        if err_str.contains("Disallowed") || err_str.contains("intents") {
            error!("Failed to start bot: {}", e);
            error!("Enable MESSAGE_CONTENT and GUILD_MEMBERS under Privileged Gateway Intents in the Discord Developer Portal");
            return Err(anyhow::anyhow!(
                "Disallowed gateway intents: MESSAGE_CONTENT, GUILD_MEMBERS"
            ));
        }
        return Err(e.into());
    }
    warn!("Bot ended.");

    Ok(())
}
