//! Text storage for the editable view.

mod buffer;
mod rope;

pub use buffer::{ViewBuffer, classify_view_line};
pub use rope::RopeWrapper;
