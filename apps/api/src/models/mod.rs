pub mod document;
pub mod placement;
pub mod template;
pub mod variable;
