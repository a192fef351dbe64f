//! Decoder and runtime for Nima 2D actor files (unofficial).
//!
//! Actor files come in a binary (`.nma`) and a JSON (`.nmj`) encoding of the same
//! block schema. Both decode into an [`Actor`]: a flat component arena wired into a
//! hierarchy, per-property keyframe timelines, and the declared atlas and nested
//! actor assets. Rendering and image decoding are left to the host.

#![forbid(unsafe_code)]

mod animation;
mod assets;
mod block;
mod decode;
mod error;
mod loader;
mod model;
mod resolve;
mod runtime;
mod stream;
mod version;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "binary")]
pub mod binary;

pub use animation::*;
pub use assets::*;
pub use block::*;
pub use error::*;
pub use loader::*;
pub use model::*;
pub use runtime::*;
pub use stream::*;
pub use version::*;

#[cfg(test)]
mod test_support;



#[cfg(all(test, feature = "binary", feature = "json"))]
mod parity_tests;

#[cfg(all(test, feature = "binary"))]
mod version_gate_tests;
