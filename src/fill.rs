//! Locate form controls and assign values to them.
//!
//! Each field is located by trying its XPath strategies, then its CSS
//! selectors, in order. A missing element is reported and skipped; it never
//! aborts the rest of the fill. After every assignment the element receives
//! [`NOTIFICATION_ORDER`] so page scripts observe the change.

use serde::Serialize;

use crate::dom::{Control, Document, NOTIFICATION_ORDER, SelectOption};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    XPath,
    Css,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationStrategy {
    XPath(String),
    Css(String),
}

impl LocationStrategy {
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::XPath(_) => StrategyKind::XPath,
            Self::Css(_) => StrategyKind::Css,
        }
    }

    fn locate<D: Document>(&self, doc: &D) -> Option<D::Handle> {
        match self {
            Self::XPath(expr) => doc.evaluate_xpath(expr),
            Self::Css(selector) => doc.query_selector(selector),
        }
    }
}

/// A value to place and where to look for its control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field_name: String,
    pub value: String,
    strategies: Vec<LocationStrategy>,
}

impl FieldSpec {
    #[must_use]
    pub fn new(field_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into(),
            strategies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_xpath(mut self, expression: impl Into<String>) -> Self {
        self.strategies.push(LocationStrategy::XPath(expression.into()));
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.strategies.push(LocationStrategy::Css(selector.into()));
        self
    }

    #[must_use]
    pub fn with_selectors<I, S>(self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        selectors
            .into_iter()
            .fold(self, |spec, selector| spec.with_selector(selector))
    }

    /// Strategies in evaluation order: every XPath, then every CSS selector.
    pub fn strategies(&self) -> impl Iterator<Item = &LocationStrategy> {
        let xpath = self.strategies.iter().filter(|s| s.kind() == StrategyKind::XPath);
        let css = self.strategies.iter().filter(|s| s.kind() == StrategyKind::Css);
        xpath.chain(css)
    }
}

/// How a selection control's option was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "tier", content = "index")]
pub enum OptionMatch {
    /// An option's value equals the desired value.
    ExactValue(usize),
    /// An option's text contains the desired value.
    TextContains(usize),
    /// Nothing matched; the raw value was assigned to the control.
    RawAssign,
}

/// First option whose value equals `value`.
#[must_use]
pub fn match_exact_value(options: &[SelectOption], value: &str) -> Option<usize> {
    options.iter().position(|o| o.value == value)
}

/// First option whose text contains `value`.
#[must_use]
pub fn match_text_contains(options: &[SelectOption], value: &str) -> Option<usize> {
    options.iter().position(|o| o.text.contains(value))
}

/// Runs the three tiers in order: exact value, text substring, raw assign.
#[must_use]
pub fn resolve_option(options: &[SelectOption], value: &str) -> OptionMatch {
    if let Some(i) = match_exact_value(options, value) {
        return OptionMatch::ExactValue(i);
    }
    if let Some(i) = match_text_contains(options, value) {
        return OptionMatch::TextContains(i);
    }
    OptionMatch::RawAssign
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum FieldOutcome {
    Filled {
        via: StrategyKind,
        selection: Option<OptionMatch>,
    },
    NotFound,
    /// No value was supplied for the field.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub field_name: String,
    #[serde(flatten)]
    pub outcome: FieldOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub fields: Vec<FieldReport>,
}

impl FillReport {
    #[must_use]
    pub fn filled(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f.outcome, FieldOutcome::Filled { .. }))
            .count()
    }

    pub fn not_found(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.outcome == FieldOutcome::NotFound)
            .map(|f| f.field_name.as_str())
    }

    #[must_use]
    pub fn outcome(&self, field_name: &str) -> Option<FieldOutcome> {
        self.fields
            .iter()
            .find(|f| f.field_name == field_name)
            .map(|f| f.outcome)
    }
}

/// Fills every field and returns how many were filled.
pub fn fill<D: Document>(doc: &mut D, specs: &[FieldSpec]) -> usize {
    fill_with_report(doc, specs).filled()
}

/// Fills every field in the given order, reporting each outcome.
pub fn fill_with_report<D: Document>(doc: &mut D, specs: &[FieldSpec]) -> FillReport {
    let fields = specs
        .iter()
        .map(|spec| FieldReport {
            field_name: spec.field_name.clone(),
            outcome: fill_field(doc, spec),
        })
        .collect();
    FillReport { fields }
}

fn fill_field<D: Document>(doc: &mut D, spec: &FieldSpec) -> FieldOutcome {
    if spec.value.is_empty() {
        tracing::debug!(field = %spec.field_name, "Skipping field, no value provided");
        return FieldOutcome::Skipped;
    }

    let Some((element, via)) = locate(doc, spec) else {
        tracing::warn!(field = %spec.field_name, "Field element not found");
        return FieldOutcome::NotFound;
    };

    let selection = assign(doc, element, &spec.value);
    for notification in NOTIFICATION_ORDER {
        doc.dispatch(element, notification);
    }

    tracing::info!(field = %spec.field_name, via = ?via, selection = ?selection, "Field filled");
    FieldOutcome::Filled { via, selection }
}

fn locate<D: Document>(doc: &D, spec: &FieldSpec) -> Option<(D::Handle, StrategyKind)> {
    spec.strategies().find_map(|strategy| {
        let found = strategy.locate(doc);
        tracing::debug!(field = %spec.field_name, ?strategy, found = found.is_some(), "Tried strategy");
        found.map(|handle| (handle, strategy.kind()))
    })
}

fn assign<D: Document>(doc: &mut D, element: D::Handle, value: &str) -> Option<OptionMatch> {
    match doc.control(element) {
        Control::Select { options } => {
            let tier = resolve_option(&options, value);
            match tier {
                OptionMatch::ExactValue(i) | OptionMatch::TextContains(i) => {
                    doc.select_option(element, i);
                }
                OptionMatch::RawAssign => {
                    tracing::warn!(value, options = options.len(), "No option matched, assigning raw value");
                    doc.set_value(element, value);
                }
            }
            Some(tier)
        }
        Control::Text => {
            doc.set_value(element, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, MemoryDocument, Notification};

    fn country_page() -> MemoryDocument {
        MemoryDocument::new().with_element(
            Element::new("select")
                .with_attr("id", "ddlLocation")
                .with_option("", "- SELECT ONE -")
                .with_option("DEU", "GERMANY"),
        )
    }

    fn options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("ALG", "ALGERIA, ALGIERS"),
            SelectOption::new("DEU", "GERMANY"),
            SelectOption::new("GERMANY", "Legacy entry"),
        ]
    }

    #[test]
    fn exact_value_tier() {
        assert_eq!(match_exact_value(&options(), "DEU"), Some(1));
        assert_eq!(match_exact_value(&options(), "deu"), None);
    }

    #[test]
    fn text_contains_tier() {
        assert_eq!(match_text_contains(&options(), "ALGIERS"), Some(0));
        assert_eq!(match_text_contains(&options(), "PARIS"), None);
    }

    #[test]
    fn exact_value_beats_text_match() {
        assert_eq!(resolve_option(&options(), "GERMANY"), OptionMatch::ExactValue(2));
        assert_eq!(resolve_option(&options()[..2], "GERMANY"), OptionMatch::TextContains(1));
        assert_eq!(resolve_option(&options(), "PARIS"), OptionMatch::RawAssign);
    }

    #[test]
    fn select_by_text_fires_all_notifications_once_in_order() {
        let mut doc = country_page();
        let specs = [FieldSpec::new("country", "GERMANY").with_selector("select[id*=\"ddlLocation\"]")];
        let report = fill_with_report(&mut doc, &specs);

        assert_eq!(report.filled(), 1);
        assert_eq!(
            report.outcome("country"),
            Some(FieldOutcome::Filled {
                via: StrategyKind::Css,
                selection: Some(OptionMatch::TextContains(1)),
            })
        );
        let select = doc.by_id("ddlLocation").unwrap();
        assert_eq!(select.value(), "DEU");
        assert_eq!(
            select.notifications(),
            [
                Notification::Change,
                Notification::Input,
                Notification::Blur,
                Notification::OnChange
            ]
        );
    }

    #[test]
    fn xpath_is_tried_before_css() {
        let mut doc = MemoryDocument::new()
            .with_element(Element::new("input").with_attr("id", "code"))
            .with_element(Element::new("input").with_attr("id", "txtCaptchaCode"));
        let specs = [FieldSpec::new("captcha", "AB12")
            .with_selector("input[id*=\"code\"]")
            .with_xpath("//*[@id=\"txtCaptchaCode\"]")];

        assert_eq!(fill(&mut doc, &specs), 1);
        assert_eq!(doc.by_id("txtCaptchaCode").unwrap().value(), "AB12");
        assert_eq!(doc.by_id("code").unwrap().value(), "");
    }

    #[test]
    fn css_fallback_runs_in_order_when_xpath_misses() {
        let mut doc = MemoryDocument::new()
            .with_element(Element::new("input").with_attr("name", "captcha_b"))
            .with_element(Element::new("input").with_attr("id", "captcha_a"));
        let specs = [FieldSpec::new("captcha", "XY9")
            .with_xpath("//*[@id=\"missing\"]")
            .with_selectors(["input[id*=\"captcha\"]", "input[name*=\"captcha\"]"])];

        let report = fill_with_report(&mut doc, &specs);
        assert_eq!(
            report.outcome("captcha"),
            Some(FieldOutcome::Filled { via: StrategyKind::Css, selection: None })
        );
        assert_eq!(doc.by_id("captcha_a").unwrap().value(), "XY9");
    }

    #[test]
    fn missing_field_does_not_stop_others() {
        let mut doc = country_page();
        let specs = [
            FieldSpec::new("captcha", "AB12").with_selector("input"),
            FieldSpec::new("country", "DEU").with_selector("select"),
        ];
        let report = fill_with_report(&mut doc, &specs);
        assert_eq!(report.filled(), 1);
        assert_eq!(report.not_found().collect::<Vec<_>>(), ["captcha"]);
        assert_eq!(
            report.outcome("country"),
            Some(FieldOutcome::Filled {
                via: StrategyKind::Css,
                selection: Some(OptionMatch::ExactValue(1)),
            })
        );
    }

    #[test]
    fn unmatched_option_falls_back_to_raw_assign() {
        let mut doc = country_page();
        let specs = [FieldSpec::new("country", "ATLANTIS").with_selector("select")];
        let report = fill_with_report(&mut doc, &specs);
        assert_eq!(
            report.outcome("country"),
            Some(FieldOutcome::Filled {
                via: StrategyKind::Css,
                selection: Some(OptionMatch::RawAssign),
            })
        );
        let select = doc.by_id("ddlLocation").unwrap();
        assert_eq!(select.value(), "");
        assert_eq!(select.notifications().len(), 4);
    }

    #[test]
    fn empty_value_is_skipped_untouched() {
        let mut doc = country_page();
        let specs = [FieldSpec::new("country", "").with_selector("select")];
        let report = fill_with_report(&mut doc, &specs);
        assert_eq!(report.outcome("country"), Some(FieldOutcome::Skipped));
        assert!(doc.by_id("ddlLocation").unwrap().notifications().is_empty());
    }

    #[test]
    fn report_serializes_outcomes() {
        let report = FillReport {
            fields: vec![FieldReport {
                field_name: "country".into(),
                outcome: FieldOutcome::Filled {
                    via: StrategyKind::XPath,
                    selection: Some(OptionMatch::TextContains(3)),
                },
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fields"][0]["outcome"], "filled");
        assert_eq!(json["fields"][0]["via"], "xpath");
        assert_eq!(json["fields"][0]["selection"]["tier"], "text_contains");
        assert_eq!(json["fields"][0]["selection"]["index"], 3);
    }
}
