use super::counter::{ScopeCounter, ScopeId};
use super::diagnostics::check_stylesheet;
use super::rewrite::CssRewriter;
use super::ScopeConfig;
use crate::dom::dom_tree::Document;
use crate::error::ScopeError;
use log::{debug, warn};

/// Scopes unprocessed `<style>` elements to their parent elements.
///
/// Owns the scope counter, so every id it hands out is unique for its
/// lifetime. Use one rewriter per document.
#[derive(Debug)]
pub struct ScopeRewriter {
    config: ScopeConfig,
    css: CssRewriter,
    counter: ScopeCounter,
}

impl ScopeRewriter {
    pub fn new(config: ScopeConfig) -> Result<Self, ScopeError> {
        config.validate()?;
        let css = CssRewriter::new(&config.prefix)?;
        let counter = ScopeCounter::starting_at(config.first_id);
        Ok(ScopeRewriter {
            config,
            css,
            counter,
        })
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn next_id(&self) -> ScopeId {
        self.counter.peek()
    }

    /// Rewrites every style element lacking the marker, in document order,
    /// and returns the ids allocated. Already marked styles are skipped, so
    /// calling this again is a no-op until new styles show up.
    pub fn process(&mut self, document: &Document) -> Vec<ScopeId> {
        let styles = document.unprocessed_styles(&self.config.marker);
        let mut scoped = Vec::with_capacity(styles.len());

        for style in styles {
            let id = self.counter.allocate();
            let scope = id.class_name(&self.config.prefix);

            match document.parent_element(&style) {
                Some(parent) => {
                    document.add_class(&parent, &scope);
                }
                None => warn!("style element has no parent element, {scope} is not applied"),
            }

            let rewritten = self.css.rewrite(&document.text_content(&style), &scope);
            if self.config.check_css {
                if let Err(diagnostic) = check_stylesheet(&rewritten) {
                    warn!(
                        "{scope}: stylesheet does not parse ({} at {:?}:{:?})",
                        diagnostic.message, diagnostic.line, diagnostic.column
                    );
                }
            }
            document.set_text_content(&style, rewritten);
            document.set_attribute(&style, &self.config.marker, "");

            debug!("scoped style element as {scope}");
            scoped.push(id);
        }
        scoped
    }
}
