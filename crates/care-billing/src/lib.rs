//! Commission and subscription billing engine for the care marketplace.
//!
//! The [`billing`] module owns the deterministic money math: resolving
//! platform rates from an expert's tier and plan, splitting captured booking
//! amounts among platform, organization, and payee, enforcing the expert
//! protection rules, and assessing subscription upgrade offers. Everything in
//! it is pure computation over injected configuration; persistence and fund
//! transfer sit behind the repository and payout traits so callers decide how
//! settlements are stored and paid out.

pub mod billing;
pub mod config;
pub mod error;
pub mod telemetry;
