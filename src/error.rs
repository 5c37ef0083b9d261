use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    // Configuration errors
    #[error("Failed to load config file '{path}': {source}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {message}")]
    ConfigValidation { message: String },

    #[error("Error: {what} not configured.")]
    NotConfigured { what: String },

    #[error("Error: {what} not found.")]
    NotFound { what: String },

    // Resolution errors
    #[error("Error: User not found in server.")]
    MemberNotFound,

    #[error("This verification request is no longer pending. It may have been submitted before the bot restarted.")]
    UnknownRequest,

    // Decision state errors
    #[error("This verification request has already been decided.")]
    AlreadyDecided,

    #[error("This verification request is already being processed by another moderator.")]
    DecisionInProgress,

    #[error("This control can only be used inside a server.")]
    OutsideGuild,

    // Intake errors
    #[error("Invalid verification reason: {message}")]
    InvalidJustification { message: String },

    // Permission errors
    #[error("Error: Bot doesn't have permission to {action}.")]
    PermissionDenied { action: String },

    // Discord errors
    #[error("Discord API error: {message}")]
    Discord { message: String },
}

impl BotError {
    pub fn not_configured(what: &str) -> Self {
        BotError::NotConfigured {
            what: what.to_string(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        BotError::NotFound {
            what: what.to_string(),
        }
    }

    pub fn permission_denied(action: &str) -> Self {
        BotError::PermissionDenied {
            action: action.to_string(),
        }
    }

    /// Re-label a generic 403 with the action that was attempted
    pub fn for_action(self, action: &str) -> Self {
        match self {
            BotError::PermissionDenied { .. } => BotError::permission_denied(action),
            other => other,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, BotError::PermissionDenied { .. })
    }
}

/// HTTP status code carried by an unsuccessful Discord request, if any
pub fn http_status(err: &serenity::Error) -> Option<u16> {
    match err {
        serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(response)) => {
            Some(response.status_code.as_u16())
        }
        _ => None,
    }
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        match http_status(&err) {
            Some(403) => BotError::permission_denied("perform this action"),
            _ => BotError::Discord {
                message: err.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            BotError::not_configured("Moderator channel").to_string(),
            "Error: Moderator channel not configured."
        );
        assert_eq!(
            BotError::not_found("Verified role").to_string(),
            "Error: Verified role not found."
        );
        assert_eq!(
            BotError::permission_denied("kick users").to_string(),
            "Error: Bot doesn't have permission to kick users."
        );
    }

    #[test]
    fn test_for_action_only_relabels_permission_errors() {
        let relabeled = BotError::permission_denied("perform this action").for_action("manage roles");
        assert_eq!(
            relabeled.to_string(),
            "Error: Bot doesn't have permission to manage roles."
        );

        let untouched = BotError::MemberNotFound.for_action("manage roles");
        assert!(matches!(untouched, BotError::MemberNotFound));
    }
}
