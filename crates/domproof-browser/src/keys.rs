//! Keyboard definitions for `Input.dispatchKeyEvent`.

use crate::cdp::transport;
use domproof_core::Result;

/// What one logical key dispatches as: DOM key/code values, the Windows
/// virtual key code Chromium expects, and the text a press produces (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDefinition {
    pub key: String,
    pub code: String,
    pub key_code: i64,
    pub text: Option<String>,
}

/// Resolve a logical key name (`Enter`, `Tab`, `ArrowDown`, single
/// characters) to its event definition.
pub fn lookup(key: &str) -> Result<KeyDefinition> {
    let named = |key: &str, code: &str, key_code: i64, text: Option<&str>| KeyDefinition {
        key: key.to_string(),
        code: code.to_string(),
        key_code,
        text: text.map(str::to_string),
    };

    match key {
        "Enter" => Ok(named("Enter", "Enter", 13, Some("\r"))),
        "Tab" => Ok(named("Tab", "Tab", 9, None)),
        "Escape" => Ok(named("Escape", "Escape", 27, None)),
        "Backspace" => Ok(named("Backspace", "Backspace", 8, None)),
        "Space" | " " => Ok(named(" ", "Space", 32, Some(" "))),
        "ArrowUp" => Ok(named("ArrowUp", "ArrowUp", 38, None)),
        "ArrowDown" => Ok(named("ArrowDown", "ArrowDown", 40, None)),
        "ArrowLeft" => Ok(named("ArrowLeft", "ArrowLeft", 37, None)),
        "ArrowRight" => Ok(named("ArrowRight", "ArrowRight", 39, None)),
        single if single.chars().count() == 1 => {
            let ch = single.chars().next().unwrap_or_default();
            let code = if ch.is_ascii_alphabetic() {
                format!("Key{}", ch.to_ascii_uppercase())
            } else if ch.is_ascii_digit() {
                format!("Digit{ch}")
            } else {
                String::new()
            };
            Ok(KeyDefinition {
                key: single.to_string(),
                code,
                key_code: ch.to_ascii_uppercase() as i64,
                text: Some(single.to_string()),
            })
        }
        other => Err(transport(format!("unsupported key: {other}"))),
    }
}
