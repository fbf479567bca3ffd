//! Node Graph Operations
//!
//! Behavior layered onto [`Node`](crate::models::Node):
//!
//! - `children` - `add_child` / `remove_child` on collection fields
//! - `lowering` - `prepare_for_transmission`, the upload payload
//! - `remote_state` - `apply_remote_state`, the server's record applied back

mod children;
mod lowering;
mod remote_state;

pub use children::ChildSelector;
