//! Topic naming: maps logical command/status roles to broker topic names.
//!
//! All topics live below a configurable base:
//! `<base>/command/<suffix>` and `<base>/status/<suffix>`.

use fancontrol_domain::command::CommandTopic;
use fancontrol_domain::status::StatusTopic;

/// Resolved topic names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    command_prefix: String,
    status_prefix: String,
}

impl Topics {
    /// Build topic names below `base`.
    #[must_use]
    pub fn new(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            command_prefix: format!("{base}/command/"),
            status_prefix: format!("{base}/status/"),
        }
    }

    /// Resolve an inbound topic to its command role.
    #[must_use]
    pub fn command(&self, topic: &str) -> Option<CommandTopic> {
        let suffix = topic.strip_prefix(&self.command_prefix)?;
        CommandTopic::ALL
            .into_iter()
            .find(|candidate| candidate.suffix() == suffix)
    }

    /// Full name of a command topic.
    #[must_use]
    pub fn command_topic(&self, topic: CommandTopic) -> String {
        format!("{}{}", self.command_prefix, topic.suffix())
    }

    /// Full name of a status topic.
    #[must_use]
    pub fn status(&self, topic: StatusTopic) -> String {
        format!("{}{}", self.status_prefix, topic.suffix())
    }

    /// Every command topic the transport must subscribe to.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        CommandTopic::ALL
            .into_iter()
            .map(|topic| self.command_topic(topic))
            .collect()
    }
}
