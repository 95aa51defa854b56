pub mod plan;
pub mod result;

pub use plan::{Plan, Step};
pub use result::{ExecutionResult, FailedStep, StepResult, VerificationResult};
