//! Envelopes: the JSON payloads carried inside message content.
//!
//! Every non-system message holds exactly one envelope, discriminated by its
//! `type` field. Model replies are parsed strictly: the whole reply must be a
//! single JSON object with a known `type` and the fields that type requires.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminants accepted by [`Envelope::parse`].
pub const ENVELOPE_TYPES: [&str; 5] = ["user", "plan", "action", "observation", "output"];

/// A typed message payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    /// A line typed by the user.
    User { user: String },

    /// The model's stated intention. Advisory only.
    Plan { plan: String },

    /// The model asks for a tool call.
    Action {
        function: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    /// The result of a tool call.
    Observation { observation: serde_json::Value },

    /// The model's final answer for the current user line.
    Output { output: String },
}

/// Why a model reply could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("reply has no string `type` field")]
    MissingType,

    #[error("unknown envelope type `{0}`")]
    UnknownType(String),

    #[error("malformed `{kind}` envelope: {reason}")]
    InvalidShape { kind: String, reason: String },
}

impl Envelope {
    /// Parse a raw model reply.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

        let kind = match value.as_object() {
            None => return Err(ParseError::NotAnObject),
            Some(obj) => match obj.get("type").and_then(|t| t.as_str()) {
                Some(kind) => kind.to_string(),
                None => return Err(ParseError::MissingType),
            },
        };

        if !ENVELOPE_TYPES.contains(&kind.as_str()) {
            return Err(ParseError::UnknownType(kind));
        }

        serde_json::from_value(value).map_err(|e| ParseError::InvalidShape {
            kind,
            reason: e.to_string(),
        })
    }

    /// The `type` discriminant of this envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Plan { .. } => "plan",
            Self::Action { .. } => "action",
            Self::Observation { .. } => "observation",
            Self::Output { .. } => "output",
        }
    }

    /// Serialize to the compact JSON stored in message content.
    pub fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
