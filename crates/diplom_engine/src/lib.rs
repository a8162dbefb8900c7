//! DiplomAI engine: stream decoding, remote service client and effect execution.
mod client;
mod decode;
mod engine;
mod filename;
mod persist;
mod types;

pub use client::{ClientSettings, GenerationService, RecordStream, ReqwestClient, DEFAULT_BASE_URL};
pub use decode::{decode_records, DecodeError, RecordDecoder};
pub use engine::EngineHandle;
pub use filename::{document_filename, DEFAULT_DOCUMENT_FILENAME};
pub use persist::{DocumentWriter, PersistError};
pub use types::{
    ClientError, DocumentPayload, DocumentProfile, DocumentRequest, EngineEvent, FailureKind,
    ItemKind, ItemUpdate, MutationOp, RunEpoch, StreamRecord, TitlePage,
};
