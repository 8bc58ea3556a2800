//! A small model of DOM mutation observers.
//!
//! Registrations and queued records live on the [`Document`]; a
//! [`MutationObserver`] is only a handle (its id). The host decides when to
//! deliver, by calling [`MutationObserver::take_records`]. Dropping the
//! handle disconnects it.

use crate::dom::dom_tree::{is_inclusive_ancestor, Document, Node, NodeRef};
use log::trace;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Which mutations a registration is interested in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub subtree: bool,
    pub attributes: bool,
}

impl ObserveOptions {
    /// `{ childList: true, subtree: true }`
    pub fn child_list_subtree() -> Self {
        ObserveOptions {
            child_list: true,
            subtree: true,
            attributes: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum MutationRecord {
    ChildList {
        target: NodeRef,
        added: Vec<NodeRef>,
        removed: Vec<NodeRef>,
    },
    Attributes {
        target: NodeRef,
        name: String,
    },
}

impl MutationRecord {
    pub fn target(&self) -> &NodeRef {
        match self {
            MutationRecord::ChildList { target, .. } | MutationRecord::Attributes { target, .. } => {
                target
            }
        }
    }

    pub fn added_nodes(&self) -> &[NodeRef] {
        match self {
            MutationRecord::ChildList { added, .. } => added,
            MutationRecord::Attributes { .. } => &[],
        }
    }
}

#[derive(Debug)]
struct Registration {
    observer: ObserverId,
    target: Weak<RefCell<Node>>,
    options: ObserveOptions,
}

/// Observer registrations and their undelivered records.
#[derive(Debug, Default)]
pub(crate) struct PendingRecords {
    next_id: Cell<u64>,
    registrations: RefCell<Vec<Registration>>,
    queue: RefCell<Vec<(ObserverId, MutationRecord)>>,
}

impl PendingRecords {
    fn allocate(&self) -> ObserverId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ObserverId(id)
    }

    fn remove(&self, observer: ObserverId) {
        self.registrations
            .borrow_mut()
            .retain(|registration| registration.observer != observer);
        self.queue
            .borrow_mut()
            .retain(|(queued_for, _)| *queued_for != observer);
    }

    /// Observers with a registration covering a mutation of `target`,
    /// each listed once.
    fn interested(&self, target: &NodeRef, wants: impl Fn(&ObserveOptions) -> bool) -> Vec<ObserverId> {
        let mut observers = Vec::new();
        for registration in self.registrations.borrow().iter() {
            if !wants(&registration.options) || observers.contains(&registration.observer) {
                continue;
            }
            let Some(observed) = registration.target.upgrade() else {
                continue;
            };
            let covers = if registration.options.subtree {
                is_inclusive_ancestor(&observed, target)
            } else {
                Rc::ptr_eq(&observed, target)
            };
            if covers {
                observers.push(registration.observer);
            }
        }
        observers
    }
}

impl Document {
    /// Number of observers with at least one registration.
    pub fn observer_count(&self) -> usize {
        let mut observers: Vec<ObserverId> = Vec::new();
        for registration in self.observers.registrations.borrow().iter() {
            if !observers.contains(&registration.observer) {
                observers.push(registration.observer);
            }
        }
        observers.len()
    }

    /// Records queued but not yet taken, across all observers.
    pub fn pending_record_count(&self) -> usize {
        self.observers.queue.borrow().len()
    }

    pub(crate) fn queue_child_list(&self, target: &NodeRef, added: Vec<NodeRef>, removed: Vec<NodeRef>) {
        let observers = self
            .observers
            .interested(target, |options| options.child_list);
        if observers.is_empty() {
            return;
        }
        let mut queue = self.observers.queue.borrow_mut();
        for observer in observers {
            queue.push((
                observer,
                MutationRecord::ChildList {
                    target: Rc::clone(target),
                    added: added.clone(),
                    removed: removed.clone(),
                },
            ));
        }
    }

    pub(crate) fn queue_attribute(&self, target: &NodeRef, name: &str) {
        let observers = self
            .observers
            .interested(target, |options| options.attributes);
        let mut queue = self.observers.queue.borrow_mut();
        for observer in observers {
            queue.push((
                observer,
                MutationRecord::Attributes {
                    target: Rc::clone(target),
                    name: name.to_string(),
                },
            ));
        }
    }
}

/// Handle to an observer registered on a [`Document`].
///
/// The handle owns its registrations: once it is dropped nothing is queued
/// for it any more.
#[derive(Debug)]
pub struct MutationObserver {
    id: ObserverId,
    pending: Weak<PendingRecords>,
}

impl MutationObserver {
    pub fn new(document: &Document) -> Self {
        MutationObserver {
            id: document.observers.allocate(),
            pending: Rc::downgrade(&document.observers),
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Starts observing `target`. Observing the same target again replaces
    /// the previous options.
    pub fn observe(&self, document: &Document, target: &NodeRef, options: ObserveOptions) {
        let mut registrations = document.observers.registrations.borrow_mut();
        let existing = registrations.iter_mut().find(|registration| {
            registration.observer == self.id
                && registration
                    .target
                    .upgrade()
                    .is_some_and(|observed| Rc::ptr_eq(&observed, target))
        });
        match existing {
            Some(registration) => registration.options = options,
            None => registrations.push(Registration {
                observer: self.id,
                target: Rc::downgrade(target),
                options,
            }),
        }
    }

    pub fn is_observing(&self, document: &Document) -> bool {
        document
            .observers
            .registrations
            .borrow()
            .iter()
            .any(|registration| registration.observer == self.id)
    }

    /// Removes and returns this observer's queued records, oldest first.
    pub fn take_records(&self, document: &Document) -> Vec<MutationRecord> {
        let mut queue = document.observers.queue.borrow_mut();
        let (mine, others): (Vec<_>, Vec<_>) = queue
            .drain(..)
            .partition(|(observer, _)| *observer == self.id);
        *queue = others;
        if !mine.is_empty() {
            trace!("observer {:?} took {} records", self.id, mine.len());
        }
        mine.into_iter().map(|(_, record)| record).collect()
    }

    /// Drops every registration and queued record of this observer.
    pub fn disconnect(&self, document: &Document) {
        document.observers.remove(self.id);
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.upgrade() {
            pending.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, NodeRef) {
        let document = Document::new();
        let html = document.create_element("html");
        let body = document.create_element("body");
        document.append_child(&document.root, html.clone());
        document.append_child(&html, body.clone());
        (document, body)
    }

    #[test]
    fn test_subtree_observer_sees_deep_additions() {
        let (document, body) = page();
        let observer = MutationObserver::new(&document);
        observer.observe(&document, &document.root, ObserveOptions::child_list_subtree());

        let div = document.create_element("div");
        document.append_child(&body, div.clone());
        document.append_child(&div, document.create_element("style"));

        let records = observer.take_records(&document);
        assert_eq!(records.len(), 2);
        assert!(Rc::ptr_eq(records[0].target(), &body));
        assert!(Rc::ptr_eq(&records[0].added_nodes()[0], &div));
        assert!(observer.take_records(&document).is_empty());
    }

    #[test]
    fn test_child_list_without_subtree_ignores_descendants() {
        let (document, body) = page();
        let observer = MutationObserver::new(&document);
        let options = ObserveOptions {
            child_list: true,
            ..ObserveOptions::default()
        };
        observer.observe(&document, &body, options);

        let div = document.create_element("div");
        document.append_child(&body, div.clone());
        document.append_child(&div, document.create_text("deep"));

        assert_eq!(observer.take_records(&document).len(), 1);
    }

    #[test]
    fn test_attribute_records_need_attributes_option() {
        let (document, body) = page();
        let quiet = MutationObserver::new(&document);
        let loud = MutationObserver::new(&document);
        quiet.observe(&document, &document.root, ObserveOptions::child_list_subtree());
        loud.observe(
            &document,
            &document.root,
            ObserveOptions {
                attributes: true,
                subtree: true,
                ..ObserveOptions::default()
            },
        );

        document.set_attribute(&body, "ready", "");

        assert!(quiet.take_records(&document).is_empty());
        let records = loud.take_records(&document);
        assert!(matches!(
            &records[..],
            [MutationRecord::Attributes { name, .. }] if name == "ready"
        ));
    }

    #[test]
    fn test_disconnect_drops_registration_and_queue() {
        let (document, body) = page();
        let observer = MutationObserver::new(&document);
        observer.observe(&document, &document.root, ObserveOptions::child_list_subtree());
        document.append_child(&body, document.create_element("p"));

        observer.disconnect(&document);
        document.append_child(&body, document.create_element("p"));

        assert!(!observer.is_observing(&document));
        assert!(observer.take_records(&document).is_empty());
    }

    #[test]
    fn test_dropped_observer_stops_queueing() {
        let (document, body) = page();
        {
            let observer = MutationObserver::new(&document);
            observer.observe(&document, &document.root, ObserveOptions::child_list_subtree());
            document.append_child(&body, document.create_element("p"));
            assert_eq!(document.pending_record_count(), 1);
        }

        for _ in 0..1000 {
            document.append_child(&body, document.create_element("p"));
        }

        assert_eq!(document.observer_count(), 0);
        assert_eq!(document.pending_record_count(), 0);
        assert!(document.observers.registrations.borrow().is_empty());
    }

    #[test]
    fn test_observer_outliving_document_drops_quietly() {
        let observer = {
            let (document, _body) = page();
            let observer = MutationObserver::new(&document);
            observer.observe(&document, &document.root, ObserveOptions::child_list_subtree());
            observer
        };
        drop(observer);
    }

    #[test]
    fn test_duplicate_registrations_queue_once() {
        let (document, body) = page();
        let observer = MutationObserver::new(&document);
        observer.observe(&document, &document.root, ObserveOptions::child_list_subtree());
        observer.observe(&document, &body, ObserveOptions::child_list_subtree());

        document.append_child(&body, document.create_element("p"));

        assert_eq!(observer.take_records(&document).len(), 1);
    }
}
