//! Analyses over an indexed corpus and its manifest
//!
//! Redundancy clustering, dependency impact, capability inference and
//! complexity scoring, tied together by [`Engine`].

pub mod capabilities;
pub mod complexity;
pub mod engine;
pub mod impact;
pub mod redundancy;

#[cfg(test)]
pub mod tests;

pub use capabilities::{CapabilityInferencer, CapabilityRule};
pub use complexity::{complexity_score, ComplexityScorer};
pub use engine::{Analysis, Engine, EngineError, Inputs};
pub use impact::ImpactAnalyzer;
pub use redundancy::RedundancyClusterer;
