//! Request middleware shared by the API scope and the health probes.

pub mod trace;

pub use trace::Trace;
