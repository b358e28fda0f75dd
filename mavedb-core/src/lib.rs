pub mod alphabets;
pub mod config;
pub mod dataset;
pub mod error;
pub mod hgvs;
pub mod io;
pub mod job;
pub mod report;
pub mod seq;
pub mod validate;

pub use config::IngestConfig;
pub use dataset::{reconcile, DataRow, DataTable, ReconciledDataset, TableKind, VariantRecord};
pub use error::{MaveError, MaveResult};
pub use hgvs::{parse, CoordinateSpace, VariantNotation};
pub use io::csv::{ingest, TableSpec};
pub use job::{Coordinator, JobId, JobState, JobStatus, Submission};
pub use report::{Issue, IssueCode};
pub use seq::{SequenceType, TargetSequence};
pub use validate::{check_variant, validate, ValidatedTarget};
