use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::DecodeError;

pub type RunEpoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Goal,
    Task,
}

/// One line of the generation stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub id: String,
    pub text: String,
}

/// Response body of the rephrase and replace endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Rephrase,
    Replace,
}

impl MutationOp {
    pub(crate) fn path_segment(self) -> &'static str {
        match self {
            MutationOp::Rephrase => "rephrase",
            MutationOp::Replace => "replace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentProfile {
    Gost,
    Msu,
    Hse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlePage {
    pub university: String,
    pub faculty: String,
    pub department: String,
    pub work_title: String,
    pub student_name: String,
    pub supervisor_name: String,
    pub city: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRequest {
    pub profile: DocumentProfile,
    pub title: TitlePage,
    pub goals: Vec<String>,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    pub bytes: Vec<u8>,
    /// Raw `Content-Disposition` header, if the server sent one.
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RecordReceived {
        epoch: RunEpoch,
        record: StreamRecord,
    },
    GenerationFinished {
        epoch: RunEpoch,
        result: Result<(), ClientError>,
    },
    SettleElapsed {
        epoch: RunEpoch,
    },
    MutationFinished {
        epoch: RunEpoch,
        id: String,
        op: MutationOp,
        result: Result<ItemUpdate, ClientError>,
    },
    DocumentSaved {
        result: Result<PathBuf, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ClientError {}

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        let kind = match err {
            DecodeError::MalformedRecord { .. } => FailureKind::MalformedRecord,
            DecodeError::Transport(_) => FailureKind::Network,
        };
        ClientError::new(kind, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedRecord,
    Persist,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedRecord => write!(f, "malformed record"),
            FailureKind::Persist => write!(f, "could not save file"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
