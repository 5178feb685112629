//! Patching of a reference genesis document so that a handful of freshly generated
//! nodes control enough voting power to produce blocks on their own.
//!
//! The document is never re-serialized: every change is a literal substitution of a
//! token (hex address, base64 public key, consensus address) and every other byte is
//! kept as is, so that all nodes end up with byte-identical genesis files.

mod builder;
mod document;
mod error;
mod patch;
mod quorum;


pub use builder::{build, plan};
pub use document::{parse_validators, GenesisDocument};
pub use error::GenesisError;
pub use patch::{Patch, PatchList};
pub use quorum::{quorum_threshold, Quorum};
