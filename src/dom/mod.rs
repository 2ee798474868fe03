//! Minimal document model the field-fill engine drives.
//!
//! A host bridges [`Document`] to a live page; [`MemoryDocument`] is a
//! self-contained element list for tests and offline snapshots.

mod memory;
mod selector;

pub use memory::{Element, ElementId, MemoryDocument};
pub use selector::{AttrMatcher, AttrOp, ParseError, Selector};

use serde::{Deserialize, Serialize};

/// One `<option>` of a selection control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// What kind of control an element is, as far as filling goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Select { options: Vec<SelectOption> },
    Text,
}

/// Change notifications fired after a value is assigned.
///
/// Hosts dispatch each as a bubbling DOM event named by its serialized form
/// (`change`, `input`, `blur`, `onchange`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notification {
    Change,
    Input,
    Blur,
    /// Legacy name some server-rendered forms listen for.
    OnChange,
}

/// Dispatch order after every assignment.
pub const NOTIFICATION_ORDER: [Notification; 4] = [
    Notification::Change,
    Notification::Input,
    Notification::Blur,
    Notification::OnChange,
];

/// A page the engine can search and mutate.
///
/// Lookups return handles rather than borrows so a caller can try several
/// strategies before committing to a mutation.
pub trait Document {
    type Handle: Copy + Eq + std::fmt::Debug;

    /// First element, in document order, matched by the XPath expression.
    fn evaluate_xpath(&self, expression: &str) -> Option<Self::Handle>;

    /// First element, in document order, matched by the CSS selector.
    fn query_selector(&self, selector: &str) -> Option<Self::Handle>;

    fn control(&self, element: Self::Handle) -> Control;

    /// Assigns the raw value. For selection controls the document decides
    /// whether an unknown value is accepted.
    fn set_value(&mut self, element: Self::Handle, value: &str);

    /// Selects the option at `index` of a selection control.
    fn select_option(&mut self, element: Self::Handle, index: usize);

    fn dispatch(&mut self, element: Self::Handle, notification: Notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_serialize_as_event_names() {
        let names = serde_json::to_value(NOTIFICATION_ORDER).unwrap();
        assert_eq!(names, serde_json::json!(["change", "input", "blur", "onchange"]));
    }
}
