// Storyboard pipeline: query → classified card → rendered widget.
// Responses are produced by a pluggable responder and land in an append-only
// per-session log after a pacing delay.

pub mod classifier;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod profile;
pub mod renderer;
pub mod responder;
pub mod session;
