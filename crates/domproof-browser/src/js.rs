//! Page-side JavaScript built from [`Selector`] values.
//!
//! Every snippet resolves the selector fresh against the current DOM, so
//! callers observe post-mutation state. String values are embedded as JSON
//! literals; nothing from a selector or payload is spliced in raw.

use domproof_core::{Pick, Selector};

/// `let nodes = ...;` prelude applying CSS match, text filter and pick.
fn resolve_snippet(selector: &Selector) -> String {
    let css = js_string(&selector.css);
    let mut snippet = format!("let nodes = Array.from(document.querySelectorAll({css}));\n");
    if let Some(text) = &selector.text_contains {
        let needle = js_string(text);
        snippet.push_str(&format!(
            "nodes = nodes.filter((el) => (el.textContent || '').includes({needle}));\n"
        ));
    }
    match selector.pick {
        Pick::All => {}
        Pick::First => snippet.push_str("nodes = nodes.slice(0, 1);\n"),
        Pick::Last => snippet.push_str("nodes = nodes.slice(-1);\n"),
    }
    snippet
}

/// Element facts for every match, as a JSON string (`query` payload).
pub fn query_expression(selector: &Selector) -> String {
    format!(
        r#"(() => {{
{resolve}return JSON.stringify(nodes.map((el) => {{
  const rect = el.getBoundingClientRect();
  const style = window.getComputedStyle(el);
  const visible = rect.width > 0 && rect.height > 0
    && style.visibility !== 'hidden' && style.display !== 'none';
  const attributes = {{}};
  for (const attr of el.attributes) attributes[attr.name] = attr.value;
  const isField = el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement;
  return {{
    visible,
    text: isField ? el.value : (el.textContent || '').trim(),
    inner_html: el.innerHTML,
    attributes,
  }};
}}));
}})()"#,
        resolve = resolve_snippet(selector)
    )
}

/// Viewport center of the first match after scrolling it into view, or null.
pub fn center_expression(selector: &Selector) -> String {
    format!(
        r#"(() => {{
{resolve}const el = nodes[0];
if (!el) return null;
el.scrollIntoView({{ block: 'center', inline: 'center' }});
const rect = el.getBoundingClientRect();
return JSON.stringify({{ x: rect.x + rect.width / 2, y: rect.y + rect.height / 2 }});
}})()"#,
        resolve = resolve_snippet(selector)
    )
}

/// Focus the first match; true when an element was found.
pub fn focus_expression(selector: &Selector) -> String {
    format!(
        r#"(() => {{
{resolve}const el = nodes[0];
if (!el) return false;
el.focus();
return true;
}})()"#,
        resolve = resolve_snippet(selector)
    )
}

/// Focus the first match and clear its current content, notifying listeners;
/// true when an element was found. The caller then types the replacement
/// through the input pipeline.
pub fn clear_expression(selector: &Selector) -> String {
    format!(
        r#"(() => {{
{resolve}const el = nodes[0];
if (!el) return false;
el.focus();
if (el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement) {{
  el.value = '';
}} else if (el.isContentEditable) {{
  el.textContent = '';
}}
el.dispatchEvent(new Event('input', {{ bubbles: true }}));
return true;
}})()"#,
        resolve = resolve_snippet(selector)
    )
}

fn js_string(raw: &str) -> String {
    // serde_json produces a valid JS string literal, quotes included
    serde_json::Value::String(raw.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_is_embedded_as_a_json_literal() {
        let expr = query_expression(&Selector::css("button[data-lang='sq']"));
        assert!(expr.contains(r#"document.querySelectorAll("button[data-lang='sq']")"#));
    }

    #[test]
    fn quotes_in_text_filters_are_escaped() {
        let expr = query_expression(
            &Selector::css(".review-text").containing_text(r#"said "hi" <b>"#),
        );
        assert!(expr.contains(r#".includes("said \"hi\" <b>")"#));
    }

    #[test]
    fn picks_become_slices() {
        assert!(query_expression(&Selector::css("li").first()).contains("slice(0, 1)"));
        assert!(center_expression(&Selector::css("li").last()).contains("slice(-1)"));
        assert!(!query_expression(&Selector::css("li")).contains("slice"));
    }
}
