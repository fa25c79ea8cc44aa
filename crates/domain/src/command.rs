//! Commands: operator requests decoded from inbound messages.
//!
//! Decoding happens once at the boundary: a [`CommandTopic`] (resolved by
//! the caller from the raw topic string) plus the payload text produce a
//! [`Command`], which is then matched exhaustively.

use crate::error::CommandError;

/// Logical command topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTopic {
    /// `ON | OFF | TOGGLE | STATUS | RESET | EXIT`
    Fan,
    /// Numeric percentage of the maximum temperature for switching on.
    PercentOn,
    /// Numeric percentage of the maximum temperature for switching off.
    PercentOff,
    /// Numeric absolute temperature for switching on.
    TempOn,
    /// Numeric absolute temperature for switching off.
    TempOff,
    /// Process-level commands (`EXIT`).
    Script,
}

impl CommandTopic {
    pub const ALL: [Self; 6] = [
        Self::Fan,
        Self::PercentOn,
        Self::PercentOff,
        Self::TempOn,
        Self::TempOff,
        Self::Script,
    ];

    /// Topic suffix below the command prefix.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::PercentOn => "percent-on",
            Self::PercentOff => "percent-off",
            Self::TempOn => "temp-on",
            Self::TempOff => "temp-off",
            Self::Script => "script",
        }
    }
}

/// A decoded operator command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetOn,
    SetOff,
    Toggle,
    SetPercentOn(f64),
    SetPercentOff(f64),
    SetTempOn(f64),
    SetTempOff(f64),
    Status,
    Reset,
    Exit,
}

impl Command {
    /// Decode a UTF-8 `payload` received on `topic`.
    ///
    /// Command words are case-insensitive. Numeric payloads are taken by
    /// absolute value.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for an unexpected word and
    /// [`CommandError::InvalidNumber`] for a non-numeric or non-finite value.
    pub fn parse(topic: CommandTopic, payload: &str) -> Result<Self, CommandError> {
        let payload = payload.trim();
        match topic {
            CommandTopic::Fan => parse_fan_word(payload),
            CommandTopic::Script => {
                if payload.eq_ignore_ascii_case("EXIT") {
                    Ok(Self::Exit)
                } else {
                    Err(CommandError::UnknownCommand(payload.to_string()))
                }
            }
            CommandTopic::PercentOn => parse_number(payload).map(Self::SetPercentOn),
            CommandTopic::PercentOff => parse_number(payload).map(Self::SetPercentOff),
            CommandTopic::TempOn => parse_number(payload).map(Self::SetTempOn),
            CommandTopic::TempOff => parse_number(payload).map(Self::SetTempOff),
        }
    }

    /// Decode raw payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotUtf8`] if the bytes are not UTF-8, or any
    /// error from [`Command::parse`].
    pub fn decode(topic: CommandTopic, payload: &[u8]) -> Result<Self, CommandError> {
        let text = std::str::from_utf8(payload).map_err(|_| CommandError::NotUtf8)?;
        Self::parse(topic, text)
    }
}

fn parse_fan_word(word: &str) -> Result<Command, CommandError> {
    match word.to_ascii_uppercase().as_str() {
        "ON" => Ok(Command::SetOn),
        "OFF" => Ok(Command::SetOff),
        "TOGGLE" => Ok(Command::Toggle),
        "STATUS" => Ok(Command::Status),
        "RESET" => Ok(Command::Reset),
        "EXIT" => Ok(Command::Exit),
        _ => Err(CommandError::UnknownCommand(word.to_string())),
    }
}

fn parse_number(payload: &str) -> Result<f64, CommandError> {
    let value: f64 = payload.parse().map_err(|err| CommandError::InvalidNumber {
        payload: payload.to_string(),
        source: Some(err),
    })?;
    if !value.is_finite() {
        return Err(CommandError::InvalidNumber {
            payload: payload.to_string(),
            source: None,
        });
    }
    Ok(value.abs())
}
