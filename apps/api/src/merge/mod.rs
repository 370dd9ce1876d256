// Document mail-merge: data context resolution, value formatting, placeholder substitution.
// Formatting and substitution are pure; only context resolution touches the stores.

pub mod context;
pub mod engine;
pub mod format;
pub mod handlers;

pub use engine::merge_document;
