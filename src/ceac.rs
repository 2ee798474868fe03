//! Field locations on the CEAC nonimmigrant visa start page.

use crate::dom::Document;
use crate::fill::{FieldSpec, FillReport, fill_with_report};
use crate::retry::{PollOutcome, RetryPolicy};
use crate::types::FormData;

pub const TARGET_URL: &str = "https://ceac.state.gov/genniv/";

pub const COUNTRY_FIELD: &str = "country";
pub const CAPTCHA_FIELD: &str = "captcha";

pub const COUNTRY_XPATH: &str = r#"//*[@id="ctl00_SiteContentPlaceHolder_ucLocation_ddlLocation"]"#;
pub const COUNTRY_SELECTORS: [&str; 4] = [
    r#"select[name*="ctl00$SiteContentPlaceHolder$ucLocation$ddlLocation"]"#,
    r#"select[id*="ddlLocation"]"#,
    r#"select[name="Country"]"#,
    r#"select[id*="country"]"#,
];

pub const CAPTCHA_XPATH: &str = r#"//*[@id="ctl00_SiteContentPlaceHolder_ucCaptcha_txtCaptchaCode"]"#;
pub const CAPTCHA_SELECTORS: [&str; 3] = [
    r#"input[id*="captcha"]"#,
    r#"input[name*="captcha"]"#,
    r#"input[id*="code"]"#,
];

/// The location dropdown renders last; its presence means the form is ready.
pub const ANCHOR_XPATH: &str = COUNTRY_XPATH;

/// Fill specs for the start page, location first.
///
/// Fields absent from `form` get an empty value and are reported as skipped.
#[must_use]
pub fn field_specs(form: &FormData) -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(COUNTRY_FIELD, form.get(COUNTRY_FIELD).unwrap_or_default())
            .with_xpath(COUNTRY_XPATH)
            .with_selectors(COUNTRY_SELECTORS),
        FieldSpec::new(CAPTCHA_FIELD, form.get(CAPTCHA_FIELD).unwrap_or_default())
            .with_xpath(CAPTCHA_XPATH)
            .with_selectors(CAPTCHA_SELECTORS),
    ]
}

/// Handles a relayed fill: waits for the location dropdown, then fills.
///
/// If the dropdown never shows up the fill still runs with whatever
/// controls are present.
pub async fn fill_when_ready<D: Document>(
    doc: &mut D,
    form: &FormData,
    policy: &RetryPolicy,
) -> FillReport {
    let outcome = policy
        .wait_for(|| doc.evaluate_xpath(ANCHOR_XPATH).is_some())
        .await;
    if let PollOutcome::Exhausted { attempts } = outcome {
        tracing::warn!(attempts, "Location dropdown never appeared, filling anyway");
    }

    let report = fill_with_report(doc, &field_specs(form));
    tracing::info!(
        filled = report.filled(),
        requested = form.len(),
        "Form fill finished"
    );
    report
}
