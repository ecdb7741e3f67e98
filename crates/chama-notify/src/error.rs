/// Errors that can occur within the notification subsystem.
///
/// # Examples
///
/// ```rust
/// use chama_notify::error::NotifyError;
///
/// let err = NotifyError::InvalidConfig("missing gateway_url".to_string());
/// assert!(err.to_string().contains("gateway_url"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Channel configuration is missing a required field or contains an invalid value.
    #[error("Notify: invalid channel configuration: {0}")]
    InvalidConfig(String),

    /// The channel type is not registered in the plugin registry.
    #[error("Notify: unknown channel type '{0}'")]
    UnknownChannelType(String),

    /// A configured channel could not be built.
    #[error("Notify: channel '{channel_type}' could not be created: {source}")]
    ChannelSetup {
        channel_type: String,
        #[source]
        source: Box<NotifyError>,
    },

    /// The member has no contact detail the channel can deliver to.
    #[error("Notify: member {member_id} has no {contact} for channel {channel}")]
    MissingContact {
        member_id: String,
        channel: String,
        contact: &'static str,
    },

    /// No channel is configured, so nothing can be delivered.
    #[error("Notify: no notification channels configured")]
    NoChannels,

    /// Every configured channel failed for this member.
    #[error("Notify: delivery to {member_id} failed on all channels: {reasons}")]
    Undelivered { member_id: String, reasons: String },

    /// An HTTP request to an external notification endpoint failed.
    #[error("Notify: HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed (e.g. channel config parsing).
    #[error("Notify: JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The external API returned a non-success response.
    #[error("Notify: API error from {service}: status={status}, body={body}")]
    ApiError {
        service: String,
        status: u16,
        body: String,
    },

    /// Generic notification error for cases not covered by other variants.
    #[error("Notify: {0}")]
    Other(String),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
