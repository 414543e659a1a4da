pub mod types;
pub use types::{ErrorCode, MirrorError};
