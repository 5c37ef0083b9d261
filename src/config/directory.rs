use poise::serenity_prelude::{ChannelId, RoleId};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// Channel and role identifiers the verification workflow works with.
///
/// A missing or zero id disables the branch that depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Directory {
    /// Channel holding the persistent "Verify Yourself" prompt
    #[serde(default)]
    pub verify_channel_id: Option<u64>,

    /// Channel where review requests are posted for moderators
    #[serde(default)]
    pub moderator_channel_id: Option<u64>,

    /// Channel where new members are welcomed
    #[serde(default)]
    pub new_arrivals_channel_id: Option<u64>,

    /// Role granted on approval
    #[serde(default)]
    pub verified_role_id: Option<u64>,

    /// Pending role removed on approval (optional)
    #[serde(default)]
    pub unverified_role_id: Option<u64>,
}

/// Environment variable names, in the order they are listed to operators
pub const DIRECTORY_ENV_KEYS: [&str; 5] = [
    "VERIFY_CHANNEL_ID",
    "MODERATOR_CHANNEL_ID",
    "NEW_ARRIVALS_CHANNEL_ID",
    "VERIFIED_ROLE_ID",
    "UNVERIFIED_ROLE_ID",
];

impl Directory {
    pub fn verify_channel(&self) -> Option<ChannelId> {
        self.verify_channel_id.filter(|id| *id != 0).map(ChannelId::new)
    }

    pub fn moderator_channel(&self) -> Option<ChannelId> {
        self.moderator_channel_id.filter(|id| *id != 0).map(ChannelId::new)
    }

    pub fn new_arrivals_channel(&self) -> Option<ChannelId> {
        self.new_arrivals_channel_id.filter(|id| *id != 0).map(ChannelId::new)
    }

    pub fn verified_role(&self) -> Option<RoleId> {
        self.verified_role_id.filter(|id| *id != 0).map(RoleId::new)
    }

    pub fn unverified_role(&self) -> Option<RoleId> {
        self.unverified_role_id.filter(|id| *id != 0).map(RoleId::new)
    }

    /// Override ids from the environment. Empty values and `0` clear the id.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in DIRECTORY_ENV_KEYS {
            let Some(raw) = lookup(key) else {
                continue;
            };
            let value = parse_id(key, &raw)?;
            match key {
                "VERIFY_CHANNEL_ID" => self.verify_channel_id = value,
                "MODERATOR_CHANNEL_ID" => self.moderator_channel_id = value,
                "NEW_ARRIVALS_CHANNEL_ID" => self.new_arrivals_channel_id = value,
                "VERIFIED_ROLE_ID" => self.verified_role_id = value,
                "UNVERIFIED_ROLE_ID" => self.unverified_role_id = value,
                _ => {}
            }
        }
        Ok(())
    }

    /// Lines describing the current values, for the `setup` command
    pub fn describe(&self) -> Vec<String> {
        let fmt = |id: Option<u64>| match id.filter(|id| *id != 0) {
            Some(id) => id.to_string(),
            None => "not set".to_string(),
        };
        vec![
            format!("- VERIFY_CHANNEL_ID: {}", fmt(self.verify_channel_id)),
            format!("- MODERATOR_CHANNEL_ID: {}", fmt(self.moderator_channel_id)),
            format!("- NEW_ARRIVALS_CHANNEL_ID: {}", fmt(self.new_arrivals_channel_id)),
            format!("- VERIFIED_ROLE_ID: {}", fmt(self.verified_role_id)),
            format!("- UNVERIFIED_ROLE_ID: {} (optional)", fmt(self.unverified_role_id)),
        ]
    }
}

fn parse_id(key: &str, raw: &str) -> Result<Option<u64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(|id| if id == 0 { None } else { Some(id) })
        .map_err(|e| BotError::ConfigValidation {
            message: format!("{} must be a numeric Discord id, got '{}': {}", key, trimmed, e),
        })
}
