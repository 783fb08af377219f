//! CLI command implementations

pub mod funcs;
pub mod inspect;
pub mod strings;
