//! Canonical scenario builders.
//!
//! The three verification families the harness exists for — sanitization of
//! injected markup, locale switching, and accessibility semantics — are
//! assembled here as plain [`Scenario`] values from small parameter structs.
//! Nothing in a built scenario depends on ambient state from another one.

use crate::scenario::{Check, Expect, Probe, Scenario, Step};
use crate::selector::Selector;
use crate::wait::Condition;

/// Inputs for a script-injection sanitization scenario.
pub struct SanitizationSpec {
    pub entry_url: String,
    /// Interaction path that reaches the input surface (marker click, modal
    /// open button, ...).
    pub open_steps: Vec<Step>,
    pub input: Selector,
    /// Attacker-controlled markup submitted as user text.
    pub payload: String,
    /// Extra control to satisfy before submitting (a rating star, say).
    pub extra_control: Option<Selector>,
    pub submit: Selector,
    /// Node whose serialized markup is inspected after rendering.
    pub rendered: Selector,
    /// Gate confirming the submitted content actually rendered.
    pub rendered_gate: Condition,
    /// Escaped entity form that must appear (`&lt;b&gt;...`).
    pub escaped_form: String,
    /// Live tag prefix that must not appear (`<b>`).
    pub live_form: String,
}

/// Open input surface → submit payload → wait for rendering → assert the
/// markup is escaped, not live.
pub fn sanitization(name: impl Into<String>, spec: SanitizationSpec) -> Scenario {
    let mut scenario = Scenario::new(name, spec.entry_url);
    for step in spec.open_steps {
        scenario = scenario.step(step);
    }
    scenario = scenario.step(Step::Fill {
        selector: spec.input,
        text: spec.payload,
    });
    if let Some(control) = spec.extra_control {
        scenario = scenario.step(Step::Click { selector: control });
    }
    scenario
        .step(Step::Click {
            selector: spec.submit,
        })
        .step(Step::WaitFor {
            condition: spec.rendered_gate,
            timeout_ms: None,
        })
        .step(Step::Assert {
            check: Check {
                name: "submitted markup is escaped".into(),
                selector: spec.rendered.clone(),
                probe: Probe::Markup,
                expect: Expect::Contains(spec.escaped_form),
            },
        })
        .step(Step::Assert {
            check: Check {
                name: "no live tag rendered".into(),
                selector: spec.rendered,
                probe: Probe::Markup,
                expect: Expect::NotContains(spec.live_form),
            },
        })
        .step(Step::Capture {
            label: "rendered".into(),
        })
}

/// One element whose text must equal the translated string.
pub struct TextExpectation {
    pub label: String,
    pub selector: Selector,
    pub expected: String,
}

/// Inputs for a locale-switch scenario.
pub struct LocalizationSpec {
    pub entry_url: String,
    /// The locale-selection control (`button[data-lang='sq']`).
    pub locale_control: Selector,
    pub expectations: Vec<TextExpectation>,
}

/// Switch locale → assert each named element shows the translated string,
/// then switch again and re-assert: re-selecting the same locale must be
/// idempotent.
pub fn localization(name: impl Into<String>, spec: LocalizationSpec) -> Scenario {
    let mut scenario = Scenario::new(name, spec.entry_url).step(Step::Click {
        selector: spec.locale_control.clone(),
    });
    for pass in ["", " (recheck)"] {
        if !pass.is_empty() {
            scenario = scenario.step(Step::Click {
                selector: spec.locale_control.clone(),
            });
        }
        for expectation in &spec.expectations {
            scenario = scenario.step(Step::Assert {
                check: Check {
                    name: format!("{}{pass}", expectation.label),
                    selector: expectation.selector.clone(),
                    probe: Probe::Text,
                    expect: Expect::Equals(expectation.expected.clone()),
                },
            });
        }
    }
    scenario.step(Step::Capture {
        label: "localized".into(),
    })
}

/// Inputs for an accessibility-attribute scenario.
pub struct AriaSpec {
    pub entry_url: String,
    /// Interaction path that exposes the checked elements (opening a modal).
    pub open_steps: Vec<Step>,
    pub checks: Vec<Check>,
}

/// Locate semantic controls by role/attribute and assert their accessibility
/// attributes.
pub fn aria_attributes(name: impl Into<String>, spec: AriaSpec) -> Scenario {
    let mut scenario = Scenario::new(name, spec.entry_url);
    for step in spec.open_steps {
        scenario = scenario.step(step);
    }
    for check in spec.checks {
        scenario = scenario.step(Step::Assert { check });
    }
    scenario.step(Step::Capture {
        label: "aria".into(),
    })
}

/// The conjunctive live-region invariant: role=`status` AND
/// aria-live=`polite`. Neither alone passes.
pub fn live_region_checks(selector: &Selector) -> Vec<Check> {
    vec![
        Check {
            name: "live region role".into(),
            selector: selector.clone(),
            probe: Probe::Attribute {
                name: "role".into(),
            },
            expect: Expect::Equals("status".into()),
        },
        Check {
            name: "live region politeness".into(),
            selector: selector.clone(),
            probe: Probe::Attribute {
                name: "aria-live".into(),
            },
            expect: Expect::Equals("polite".into()),
        },
    ]
}

/// Star-rating semantics: the container reads as an image with a textual
/// label, and its decorative children are hidden from assistive tech.
pub fn rating_checks(
    container: &Selector,
    label_contains: &str,
    decorative: &Selector,
) -> Vec<Check> {
    vec![
        Check {
            name: "rating role".into(),
            selector: container.clone(),
            probe: Probe::Attribute {
                name: "role".into(),
            },
            expect: Expect::Equals("img".into()),
        },
        Check {
            name: "rating label".into(),
            selector: container.clone(),
            probe: Probe::Attribute {
                name: "aria-label".into(),
            },
            expect: Expect::Contains(label_contains.into()),
        },
        Check {
            name: "decorative stars hidden".into(),
            selector: decorative.clone(),
            probe: Probe::Attribute {
                name: "aria-hidden".into(),
            },
            expect: Expect::Equals("true".into()),
        },
    ]
}

/// Inputs for the keyboard-vs-pointer activation parity pair.
pub struct ActivationSpec {
    pub entry_url: String,
    /// The semantic control, located by role/attribute.
    pub control: Selector,
    /// Key that must activate it (usually `Enter`).
    pub key: String,
    /// State change both entry points must produce.
    pub post_condition: Condition,
    /// Assertion confirming the post-state, shared verbatim by both
    /// scenarios so the observable transition is provably the same.
    pub confirm: Check,
}

/// Two scenarios asserting the same post-condition through two driver entry
/// points: pointer click, and focus + key press.
pub fn activation_parity(base_name: &str, spec: ActivationSpec) -> Vec<Scenario> {
    let pointer = Scenario::new(format!("{base_name} (pointer)"), spec.entry_url.clone())
        .step(Step::Click {
            selector: spec.control.clone(),
        })
        .step(Step::WaitFor {
            condition: spec.post_condition.clone(),
            timeout_ms: None,
        })
        .step(Step::Assert {
            check: spec.confirm.clone(),
        })
        .step(Step::Capture {
            label: "pointer".into(),
        });

    let keyboard = Scenario::new(format!("{base_name} (keyboard)"), spec.entry_url)
        .step(Step::Focus {
            selector: spec.control,
        })
        .step(Step::Press { key: spec.key })
        .step(Step::WaitFor {
            condition: spec.post_condition,
            timeout_ms: None,
        })
        .step(Step::Assert { check: spec.confirm })
        .step(Step::Capture {
            label: "keyboard".into(),
        });

    vec![pointer, keyboard]
}
