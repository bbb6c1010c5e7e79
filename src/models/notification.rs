//! Process-wide notification settings and the message template.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing a message template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageTemplateError {
    /// The template has no `%d` placeholder.
    #[error("message template must contain one %d placeholder")]
    MissingPlaceholder,

    /// The template has more than one `%d` placeholder.
    #[error("message template must contain exactly one %d placeholder, found {0}")]
    TooManyPlaceholders(usize),
}

/// A message with exactly one integer placeholder (`%d`).
///
/// `%%` renders as a literal percent sign. Any other `%` sequence is kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageTemplate {
    raw: String,
    prefix: String,
    suffix: String,
}

impl MessageTemplate {
    /// Parses a template, requiring exactly one `%d`.
    pub fn parse(raw: &str) -> Result<Self, MessageTemplateError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholders = 0usize;
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            let out = if placeholders == 0 { &mut prefix } else { &mut suffix };
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                Some('d') => {
                    chars.next();
                    placeholders += 1;
                }
                _ => out.push('%'),
            }
        }

        match placeholders {
            0 => Err(MessageTemplateError::MissingPlaceholder),
            1 => Ok(Self { raw: raw.to_string(), prefix, suffix }),
            n => Err(MessageTemplateError::TooManyPlaceholders(n)),
        }
    }

    /// Substitutes `count` for the placeholder.
    pub fn render(&self, count: usize) -> String {
        format!("{}{count}{}", self.prefix, self.suffix)
    }

    /// The template as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            raw: "New %d rows".to_string(),
            prefix: "New ".to_string(),
            suffix: " rows".to_string(),
        }
    }
}

impl TryFrom<String> for MessageTemplate {
    type Error = MessageTemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MessageTemplate::parse(&value)
    }
}

impl From<MessageTemplate> for String {
    fn from(value: MessageTemplate) -> Self {
        value.raw
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Settings shared by every query in the monitoring loop.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSettings {
    /// Endpoint used when a query has no override.
    pub base_url: String,

    /// Message sent for each detection, before the `"<name>: "` prefix.
    pub message_template: MessageTemplate,

    /// Time between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
}
