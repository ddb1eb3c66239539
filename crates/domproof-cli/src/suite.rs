//! The mission-planner verification suite.
//!
//! Scenario plans for the tactical mission-planner document: review
//! sanitization, Albanian locale switching, accessibility semantics of the
//! review flow, and keyboard parity for the custom map markers. Every
//! scenario starts from a fresh session on `entry_url`.

use domproof_core::suite::{
    ActivationSpec, AriaSpec, LocalizationSpec, SanitizationSpec, TextExpectation,
    activation_parity, aria_attributes, live_region_checks, localization, rating_checks,
    sanitization,
};
use domproof_core::{Check, Condition, Expect, Probe, Scenario, Selector, Step};

const XSS_PAYLOAD: &str = "<img src=x onerror=alert(1)>";

/// Interaction path from the map to the review form: open the first marker's
/// popup, then its reviews modal.
fn open_review_modal() -> Vec<Step> {
    vec![
        Step::Click {
            selector: Selector::css(".leaflet-marker-icon").first(),
        },
        Step::Click {
            selector: Selector::css(".view-reviews-btn").first(),
        },
    ]
}

fn review_sanitization(entry_url: &str) -> Scenario {
    sanitization(
        "review markup sanitization",
        SanitizationSpec {
            entry_url: entry_url.into(),
            open_steps: open_review_modal(),
            input: Selector::css("#reviewText"),
            payload: XSS_PAYLOAD.into(),
            extra_control: Some(Selector::css(
                "#starRatingContainer .star[data-value='5']",
            )),
            submit: Selector::css("#submitReviewBtn"),
            rendered: Selector::css(".review-item .review-text").last(),
            rendered_gate: Condition::Present {
                selector: Selector::css(".review-item .review-text"),
            },
            escaped_form: "&lt;img".into(),
            live_form: "<img".into(),
        },
    )
}

fn albanian_localization(entry_url: &str) -> Scenario {
    let expectation = |label: &str, css: &str, expected: &str| TextExpectation {
        label: label.into(),
        selector: Selector::css(css),
        expected: expected.into(),
    };
    localization(
        "albanian locale switch",
        LocalizationSpec {
            entry_url: entry_url.into(),
            locale_control: Selector::css("button[data-lang='sq']"),
            expectations: vec![
                expectation("mission title", "#missionTitle", "Plani i Misionit"),
                expectation(
                    "mission control toggle",
                    "#missionControlToggle",
                    "Kontrolli i Misionit",
                ),
                expectation("targets label", "#targetsLabel", "Objektivat"),
                expectation("clear mission button", "#clearMissionBtn", "Anulo Misionin"),
            ],
        },
    )
}

fn confirmation_live_region(entry_url: &str) -> Scenario {
    let confirmation = Selector::css(".confirmation-message");
    let mut open_steps = open_review_modal();
    open_steps.extend([
        Step::Fill {
            selector: Selector::css("#reviewText"),
            text: "Pamje e mrekullueshme".into(),
        },
        Step::Click {
            selector: Selector::css("#starRatingContainer .star[data-value='5']"),
        },
        Step::Click {
            selector: Selector::css("#submitReviewBtn"),
        },
        Step::WaitFor {
            condition: Condition::Visible {
                selector: confirmation.clone(),
            },
            timeout_ms: None,
        },
    ]);
    aria_attributes(
        "confirmation live region",
        AriaSpec {
            entry_url: entry_url.into(),
            open_steps,
            checks: live_region_checks(&confirmation),
        },
    )
}

fn rating_semantics(entry_url: &str) -> Scenario {
    aria_attributes(
        "star rating semantics",
        AriaSpec {
            entry_url: entry_url.into(),
            open_steps: open_review_modal(),
            checks: rating_checks(
                &Selector::css(".rating-static").first(),
                "out of 5 stars",
                &Selector::css(".rating-static .star-icon").first(),
            ),
        },
    )
}

fn marker_activation(entry_url: &str) -> Vec<Scenario> {
    let popup = Selector::css(".leaflet-popup-content");
    activation_parity(
        "marker activation",
        ActivationSpec {
            entry_url: entry_url.into(),
            control: Selector::css(".custom-marker div[role='button']").first(),
            key: "Enter".into(),
            post_condition: Condition::Visible {
                selector: popup.clone(),
            },
            confirm: Check {
                name: "popup open".into(),
                selector: popup,
                probe: Probe::Count,
                expect: Expect::AtLeast(1),
            },
        },
    )
}

/// Every scenario the harness knows about, in reporting order.
pub fn scenarios(entry_url: &str) -> Vec<Scenario> {
    let mut all = vec![
        review_sanitization(entry_url),
        albanian_localization(entry_url),
        confirmation_live_region(entry_url),
        rating_semantics(entry_url),
    ];
    all.extend(marker_activation(entry_url));
    all
}
