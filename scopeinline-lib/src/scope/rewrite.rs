//! Pattern-based rewriting of inline stylesheet text.
//!
//! There is no CSS parser here. Keywords inside strings, comments or custom
//! property values are rewritten just like selectors are.

use crate::error::ScopeError;
use regex::{Captures, Regex};

/// `me`, `this` or `self`, preceded by start of text, a dot, or any
/// character that cannot continue an identifier. Only the character class
/// alternative is captured, so a leading dot is dropped on replacement.
const KEYWORD_PATTERN: &str = r"(?:^|\.|(\s|[^a-zA-Z0-9\-_]))(me|this|self)";

/// A keyframes / animation context, up to the next block or declaration
/// boundary.
const ANIMATION_PATTERN: &str = r"(?:@keyframes|animation:|animation-name:)[^{};]*";

/// Dash forms come first so `sm-` is not read as `sm`.
const MEDIA_PATTERN: &str = r"@media\s(xs-|sm-|md-|lg-|xl-|sm|md|lg|xl|xx)";

/// Shorthand responsive breakpoints accepted right after `@media`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Sm,
    Md,
    Lg,
    Xl,
    Xx,
    XsDown,
    SmDown,
    MdDown,
    LgDown,
    XlDown,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 10] = [
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
        Breakpoint::Xx,
        Breakpoint::XsDown,
        Breakpoint::SmDown,
        Breakpoint::MdDown,
        Breakpoint::LgDown,
        Breakpoint::XlDown,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bp| bp.token() == token)
    }

    pub fn token(self) -> &'static str {
        match self {
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
            Breakpoint::Xx => "xx",
            Breakpoint::XsDown => "xs-",
            Breakpoint::SmDown => "sm-",
            Breakpoint::MdDown => "md-",
            Breakpoint::LgDown => "lg-",
            Breakpoint::XlDown => "xl-",
        }
    }

    pub fn media_condition(self) -> &'static str {
        match self {
            Breakpoint::Sm => "(min-width: 640px)",
            Breakpoint::Md => "(min-width: 768px)",
            Breakpoint::Lg => "(min-width: 1024px)",
            Breakpoint::Xl => "(min-width: 1280px)",
            Breakpoint::Xx => "(min-width: 1536px)",
            Breakpoint::XsDown => "(max-width: 639px)",
            Breakpoint::SmDown => "(max-width: 767px)",
            Breakpoint::MdDown => "(max-width: 1023px)",
            Breakpoint::LgDown => "(max-width: 1279px)",
            Breakpoint::XlDown => "(max-width: 1535px)",
        }
    }
}

/// Compiled rewrite patterns for one scope prefix.
#[derive(Debug, Clone)]
pub struct CssRewriter {
    prefix: String,
    keyword: Regex,
    animation: Regex,
    media: Regex,
}

impl CssRewriter {
    /// Compiles the rewrite patterns.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Class prefix the scoped names start with, e.g. `me__`.
    ///
    /// # Returns
    ///
    /// A rewriter usable for any number of scopes, or `ScopeError::Pattern`
    /// if a pattern fails to compile.
    pub fn new(prefix: &str) -> Result<Self, ScopeError> {
        Ok(CssRewriter {
            prefix: prefix.to_string(),
            keyword: Regex::new(KEYWORD_PATTERN)?,
            animation: Regex::new(ANIMATION_PATTERN)?,
            media: Regex::new(MEDIA_PATTERN)?,
        })
    }

    /// Scopes keywords to `.{scope}`, keeps animation names unscoped, then
    /// expands breakpoint shorthands.
    pub fn rewrite(&self, css: &str, scope: &str) -> String {
        let scoped = self.scope_keywords(css, scope);
        let unscoped = self.unscope_animation_names(&scoped);
        self.expand_breakpoints(&unscoped)
    }

    fn scope_keywords(&self, css: &str, scope: &str) -> String {
        let mut out = String::with_capacity(css.len() + scope.len() * 2);
        let mut last = 0;
        for caps in self.keyword.captures_iter(css) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            // `meter`, `thistle`, `selfish`: the keyword must not run on
            // into more letters.
            if css[whole.end()..]
                .chars()
                .next()
                .is_some_and(|next| next.is_ascii_alphabetic())
            {
                continue;
            }
            out.push_str(&css[last..whole.start()]);
            if let Some(lead) = caps.get(1) {
                out.push_str(lead.as_str());
            }
            out.push('.');
            out.push_str(scope);
            last = whole.end();
        }
        out.push_str(&css[last..]);
        out
    }

    /// Turns `.<prefix>N` back into `<prefix>N` inside keyframe and
    /// animation declarations. Every occurrence in a segment is collapsed,
    /// not only the last one before the closing `{`, `}` or `;`, so a
    /// comma-separated `animation` list keeps all of its names unscoped.
    fn unscope_animation_names(&self, css: &str) -> String {
        let dotted = format!(".{}", self.prefix);
        self.animation
            .replace_all(css, |caps: &Captures| caps[0].replace(&dotted, &self.prefix))
            .into_owned()
    }

    fn expand_breakpoints(&self, css: &str) -> String {
        self.media
            .replace_all(css, |caps: &Captures| match Breakpoint::from_token(&caps[1]) {
                Some(bp) => format!("@media {}", bp.media_condition()),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
