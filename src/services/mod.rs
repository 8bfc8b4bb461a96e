/// End-to-end scheduling actions: store mutation, re-read, reconciliation,
/// and best-effort convergence.
pub mod schedule_service;
