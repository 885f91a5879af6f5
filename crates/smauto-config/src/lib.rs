// crates/smauto-config/src/lib.rs
// ============================================================================
// Crate: smauto-config
// Description: On-disk model schema (TOML/JSON) and model-build
//              validation. **(added)** — not named in `spec.md`, which
//              treats the textual grammar/parser as an external
//              collaborator; this crate is the structured equivalent the
//              engine actually consumes.
// Purpose: Turn a model file into validated `smauto-core` types before
//          `smauto-engine::Engine::bootstrap` runs (`spec.md` §7 kind 1).
// Dependencies: smauto-core, serde, serde_json, toml
// ============================================================================

mod error;
mod model;

pub use error::LoadError;
pub use model::Model;
