use std::collections::BTreeMap;

use super::selector::Selector;
use super::{Control, Document, Notification, SelectOption};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    options: Vec<SelectOption>,
    selected: Option<usize>,
    value: String,
    notifications: Vec<Notification>,
}

impl Element {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            options: Vec::new(),
            selected: None,
            value: String::new(),
            notifications: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, value: impl Into<String>, text: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, text));
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.tag == "select"
    }

    /// Current value: the selected option's value for selects.
    #[must_use]
    pub fn value(&self) -> &str {
        if self.is_select() {
            self.selected
                .and_then(|i| self.options.get(i))
                .map_or("", |o| o.value.as_str())
        } else {
            &self.value
        }
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Notifications received, in dispatch order.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    fn matches(&self, selector: &Selector) -> bool {
        selector.matches(&self.tag, |name| self.attr(name))
    }
}

/// Flat, document-ordered element list.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    elements: Vec<Element>,
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.push(element);
        self
    }

    pub fn push(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// Element whose `id` attribute equals `id`.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.attr("id") == Some(id))
    }

    fn first_match(&self, selector: &Selector) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.matches(selector))
            .map(ElementId)
    }
}

impl Document for MemoryDocument {
    type Handle = ElementId;

    fn evaluate_xpath(&self, expression: &str) -> Option<ElementId> {
        match Selector::parse_xpath(expression) {
            Ok(selector) => self.first_match(&selector),
            Err(e) => {
                tracing::debug!(error = %e, "Unsupported XPath");
                None
            }
        }
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        match Selector::parse_css(selector) {
            Ok(selector) => self.first_match(&selector),
            Err(e) => {
                tracing::debug!(error = %e, "Unsupported selector");
                None
            }
        }
    }

    fn control(&self, element: ElementId) -> Control {
        match self.elements.get(element.0) {
            Some(e) if e.is_select() => Control::Select {
                options: e.options.clone(),
            },
            _ => Control::Text,
        }
    }

    fn set_value(&mut self, element: ElementId, value: &str) {
        let Some(e) = self.elements.get_mut(element.0) else {
            return;
        };
        if e.is_select() {
            // Like a browser: an unknown value leaves nothing selected.
            e.selected = e.options.iter().position(|o| o.value == value);
        } else {
            e.value = value.to_owned();
        }
    }

    fn select_option(&mut self, element: ElementId, index: usize) {
        if let Some(e) = self.elements.get_mut(element.0) {
            if index < e.options.len() {
                e.selected = Some(index);
            }
        }
    }

    fn dispatch(&mut self, element: ElementId, notification: Notification) {
        if let Some(e) = self.elements.get_mut(element.0) {
            e.notifications.push(notification);
        }
    }
}
