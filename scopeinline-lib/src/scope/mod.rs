pub mod config;
pub mod counter;
pub mod diagnostics;
pub mod rewrite;
pub mod rewriter;
pub mod session;

pub use config::ScopeConfig;
pub use counter::{ScopeCounter, ScopeId};
pub use diagnostics::{check_stylesheet, CssDiagnostic};
pub use rewrite::{Breakpoint, CssRewriter};
pub use rewriter::ScopeRewriter;
pub use session::ScopeSession;
