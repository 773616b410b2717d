//! Pipeline stages from picked files to a model request.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ ingest ──▶ request ──▶ (backend) ──▶ postprocess
//! (picked)  (text/b64)  (parts)      (model)       (cleanup)
//! ```
//!
//! 1. [`input`]   — what the user picked: a path, in-memory bytes or a data URL
//! 2. [`ingest`]  — read each file once, as UTF-8 text or base64 + mime type
//! 3. [`request`] — order the guide, the data photos and the instruction block
//! 4. [`postprocess`] — optional cleanup of the returned LaTeX

pub mod ingest;
pub mod input;
pub mod postprocess;
pub mod request;
