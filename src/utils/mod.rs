//! Utility modules for post metadata.

pub mod category;
pub mod date;
pub mod excerpt;
pub mod html;
pub mod slug;
