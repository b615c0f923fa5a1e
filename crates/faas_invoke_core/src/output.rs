use serde::{Deserialize, Serialize};

use crate::request::Headers;

/// The body of an [`Output`], shaped by the factory method that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputBody {
    Empty,
    Text(String),
    Binary(Vec<u8>),
}

impl OutputBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Final result value of one invocation. A plain data record; equality is
/// structural, so two outputs with identical fields are interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Output {
    pub body: OutputBody,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Headers,
}
