//! Action tokens: structured navigation and command intent.
//!
//! Every inline button carries one encoded token. The wire form is a
//! compact `kind:id[:parent]` string that stays well inside Telegram's
//! 64-byte `callback_data` limit. Tokens are decoded once at the update
//! boundary; everything past that point dispatches by exhaustive `match`,
//! never by prefix checks.

use std::fmt;

use thiserror::Error;

/// A decoded button action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionToken {
    /// Navigate to the HOME screen (module list).
    Home,
    /// Show the help screen.
    Help,
    /// Enter a top-level module (e.g. `gates`).
    Module {
        /// Module key as reported by the backend menu.
        key: String,
    },
    /// Navigate to the gate-group list.
    Groups,
    /// Navigate to the gate list of one group.
    Gates {
        /// Group being listed.
        group_id: i64,
    },
    /// Show the detail screen of one gate.
    ///
    /// The parent group rides along so Back can target the gate list
    /// without re-resolving parent context.
    Gate {
        /// Gate being shown.
        gate_id: i64,
        /// Group the gate was reached through.
        group_id: i64,
    },
    /// Issue the open command for a gate. Transient: not a screen.
    Open {
        /// Gate to open.
        gate_id: i64,
        /// Group the gate was reached through.
        group_id: i64,
    },
}

/// Errors produced when decoding callback data into an [`ActionToken`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionTokenError {
    /// The callback data was empty.
    #[error("empty action token")]
    Empty,
    /// The leading `kind` segment is not one we emit.
    #[error("unknown action kind: {0}")]
    UnknownKind(String),
    /// A numeric id segment failed to parse.
    #[error("invalid id in action token: {0}")]
    InvalidId(String),
    /// A module key segment was empty or carried unexpected characters.
    #[error("invalid module key: {0}")]
    InvalidKey(String),
}

impl ActionToken {
    /// Encode into the `callback_data` wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Home => "nav:home".to_owned(),
            Self::Help => "nav:help".to_owned(),
            Self::Groups => "nav:groups".to_owned(),
            Self::Module { key } => format!("mod:{key}"),
            Self::Gates { group_id } => format!("grp:{group_id}"),
            Self::Gate { gate_id, group_id } => format!("gate:{gate_id}:{group_id}"),
            Self::Open { gate_id, group_id } => format!("open:{gate_id}:{group_id}"),
        }
    }

    /// Decode callback data back into a token.
    pub fn decode(data: &str) -> Result<Self, ActionTokenError> {
        if data.is_empty() {
            return Err(ActionTokenError::Empty);
        }

        let mut segments = data.splitn(3, ':');
        let kind = segments.next().unwrap_or_default();
        let first = segments.next();
        let second = segments.next();

        match (kind, first, second) {
            ("nav", Some("home"), None) => Ok(Self::Home),
            ("nav", Some("help"), None) => Ok(Self::Help),
            ("nav", Some("groups"), None) => Ok(Self::Groups),
            ("mod", Some(key), None) => {
                if key.is_empty()
                    || !key
                        .bytes()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
                {
                    return Err(ActionTokenError::InvalidKey(key.to_owned()));
                }
                Ok(Self::Module {
                    key: key.to_owned(),
                })
            },
            ("grp", Some(id), None) => Ok(Self::Gates {
                group_id: parse_id(id)?,
            }),
            ("gate", Some(gate), Some(group)) => Ok(Self::Gate {
                gate_id: parse_id(gate)?,
                group_id: parse_id(group)?,
            }),
            ("open", Some(gate), Some(group)) => Ok(Self::Open {
                gate_id: parse_id(gate)?,
                group_id: parse_id(group)?,
            }),
            _ => Err(ActionTokenError::UnknownKind(data.to_owned())),
        }
    }
}

fn parse_id(segment: &str) -> Result<i64, ActionTokenError> {
    segment
        .parse::<i64>()
        .map_err(|_| ActionTokenError::InvalidId(segment.to_owned()))
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
