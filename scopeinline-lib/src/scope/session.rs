use super::counter::ScopeId;
use super::rewriter::ScopeRewriter;
use super::ScopeConfig;
use crate::dom::dom_tree::{Document, ReadyState};
use crate::error::ScopeError;
use crate::observer::{MutationObserver, ObserveOptions};
use log::{debug, trace};

/// Keeps a document's inline styles scoped while it is alive.
///
/// Starting a session registers a child list / subtree observer on the
/// document root. The first pass runs right away unless the document is
/// still loading, in which case it waits for the first [`pump`](Self::pump)
/// after the document leaves `Loading`. Stopping or dropping the session
/// disconnects the observer.
#[derive(Debug)]
pub struct ScopeSession<'d> {
    document: &'d Document,
    observer: MutationObserver,
    rewriter: ScopeRewriter,
    awaiting_content_loaded: bool,
}

impl<'d> ScopeSession<'d> {
    pub fn start(document: &'d Document, config: ScopeConfig) -> Result<Self, ScopeError> {
        let rewriter = ScopeRewriter::new(config)?;
        let observer = MutationObserver::new(document);
        observer.observe(document, &document.root, ObserveOptions::child_list_subtree());
        debug!("scope session started with observer {:?}", observer.id());

        let mut session = ScopeSession {
            document,
            observer,
            rewriter,
            awaiting_content_loaded: true,
        };
        if document.ready_state() != ReadyState::Loading {
            session.content_loaded();
        }
        Ok(session)
    }

    /// Delivers pending work: the deferred first pass once the document is
    /// no longer loading, then one `process()` per batch of queued mutation
    /// records until none are left. Returns the ids allocated.
    pub fn pump(&mut self) -> Vec<ScopeId> {
        let mut scoped = Vec::new();
        if self.awaiting_content_loaded && self.document.ready_state() != ReadyState::Loading {
            scoped.extend(self.content_loaded());
        }

        // Processing rewrites style text, which queues records of its own.
        // The next round finds every style marked and changes nothing.
        loop {
            let records = self.observer.take_records(self.document);
            if records.is_empty() {
                break;
            }
            trace!("delivering {} mutation records", records.len());
            scoped.extend(self.rewriter.process(self.document));
        }
        scoped
    }

    pub fn rewriter(&self) -> &ScopeRewriter {
        &self.rewriter
    }

    pub fn is_active(&self) -> bool {
        self.observer.is_observing(self.document)
    }

    /// Ends the session. Same as dropping it.
    pub fn stop(self) {
        drop(self);
    }

    fn content_loaded(&mut self) -> Vec<ScopeId> {
        self.awaiting_content_loaded = false;
        self.rewriter.process(self.document)
    }
}

impl Drop for ScopeSession<'_> {
    fn drop(&mut self) {
        self.observer.disconnect(self.document);
        debug!("scope session stopped, observer {:?}", self.observer.id());
    }
}
