// src/services/mod.rs

pub mod audit;
pub mod briefing; // read-only merge of ranked feed views
pub mod cursor; // the processed/new boundary, persisted between runs
pub mod ranker; // named rank tables, stable sort
pub mod reasoner; // external reasoning service client + defensive decode
pub mod registry; // open-problem registry (read-only YAML)
pub mod store; // bounded time-windowed feed reads
pub mod sync; // git push-back of local artifacts
pub mod synthesizer; // idea x problem matching via the reasoner
pub mod writer; // append-only proposal artifact

// Public API
pub use briefing::{BriefingComposer, BriefingMode};
pub use cursor::RunCursor;
pub use reasoner::{HttpReasoner, Reasoner};
pub use registry::{Problem, ProblemRegistry, ProblemStatus};
pub use store::FeedStore;
pub use synthesizer::{MatchSynthesizer, MatchVerdict, Proposal};
pub use writer::ProposalWriter;
