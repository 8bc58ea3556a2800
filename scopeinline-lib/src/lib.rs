//! Scopes inline `<style>` blocks to the element that contains them.
//!
//! Inside a style element, `me`, `this` and `self` become a generated class
//! (`.me__1`, `.me__2`, ...) that is also added to the style's parent, and
//! `@media md` style shorthands expand to real media conditions.

pub mod dom;
pub mod error;
pub mod observer;
pub mod parser;
pub mod scope;
pub mod scope_generate;

pub use error::ScopeError;
pub use scope::{ScopeConfig, ScopeRewriter, ScopeSession};
