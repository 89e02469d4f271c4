//! Application layer
//!
//! Orchestrates the services over the studio ports:
//! - Concurrency-bounded batch execution
//! - Candidate construction from collaborators
//! - The pipeline that owns portfolio and standards
//! - The sequential autonomous loop

pub mod autonomous_loop;
pub mod batch_executor;
pub mod candidate_factory;
pub mod generation_pipeline;

pub use autonomous_loop::{AutonomousLoop, LoopSummary};
pub use batch_executor::{
    AttemptRunner, BatchExecutor, BatchPlanner, FixedModePlanner, RunPlan, StopHandle,
};
pub use candidate_factory::CandidateFactory;
pub use generation_pipeline::{AttemptOutcome, GenerationPipeline};
