//! Core building blocks for the JustiChain petition service.
//!
//! Two modules make up the crate:
//!
//! * [`ledger`] — the append-only, hash-chained submission log. Every
//!   petition submission becomes an immutable block linked to its
//!   predecessor by SHA-256 digest, and the whole chain can be re-audited
//!   at any time.
//! * [`petition`] — the mutable petition records themselves: triage
//!   status, admin feedback, and the submission metadata the log attests
//!   to.
//!
//! The modules are intentionally small and focused so that front ends
//! (CLI, dashboards, …) can drive them without bespoke plumbing: submit a
//! record to the [`petition::PetitionStore`], then append it to the
//! [`ledger::Ledger`].

pub mod ledger;
pub mod petition;
