pub mod booth_flow;
pub mod session;
pub mod session_ctx;

pub use booth_flow::BoothFlow;
pub use session::{CaptureOutcome, Session};
pub use session_ctx::SessionCtx;
