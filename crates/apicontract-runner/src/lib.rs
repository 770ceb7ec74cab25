//! apicontract-runner: Live contract validation
//!
//! Sends one example request built from the canonical model and checks the
//! reply's status, content type, headers and body structure against it.

pub mod error;
pub mod report;
pub mod runner;
pub mod security;
pub mod transport;
pub mod typetest;
pub mod validate;

pub use error::RunError;
pub use report::{Event, Reporter, ResourceSummary, RunReport};
pub use runner::{Runner, TestPlan};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use validate::{Diagnostic, ResponseShape};
