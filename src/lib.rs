//! Natural-language task orchestrator: a user query becomes a structured
//! multi-step plan, each step invokes one of a closed set of data tools
//! (weather, news, jokes), and the raw results are verified and formatted
//! into a single human-readable answer.

pub mod agent;
pub mod assistant;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod tools;
pub mod utils;

pub use agent::{Executor, Planner, Verifier};
pub use assistant::{Assistant, QueryOutcome};
pub use config::Config;
pub use error::{Error, Result};
