//! Pipeline step implementations.
//!
//! Each step handles one phase of turning text into a narrated file.

mod assemble;
mod finalize;
mod gap;
mod playlist;
mod render;
mod split;

pub use assemble::AssembleStep;
pub use finalize::FinalizeStep;
pub use gap::GapStep;
pub use playlist::PlaylistStep;
pub use render::RenderStep;
pub use split::SplitStep;
