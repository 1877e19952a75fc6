//! Scoring heuristics.
//!
//! Everything here is pure arithmetic over already-fetched observations;
//! fetching lives in the services.

pub mod eligibility;
pub mod security;
pub mod url;

pub use eligibility::{
    score_eligibility, Criterion, EligibilityRequirements, EligibilityScore, MinBalance,
    OnChainObservations, ELIGIBILITY_THRESHOLD,
};
pub use security::{risk_level, score_security, Finding, RiskLevel, SecurityScore, SecuritySignals, Severity};
pub use url::{assess_url, extract_host, levenshtein, UrlAssessment};
