// Rewrite pipeline for the translator.
// Collection passes fill the shared registries; transformation passes turn
// source-shaped IR into target-shaped IR one file at a time.

pub mod calls;
pub mod collection;
pub mod control_flow;
pub mod declarations;
pub mod manager;
pub mod standard_library;
pub mod switches;
pub mod syntax;
pub mod warnings;

pub use manager::{
    OrderError, PassManager, PassManagerConfig, PassMetadata, PassPhase, PassStatistics,
    TraceHook, dump_trace_hook,
};
