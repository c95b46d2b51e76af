//! Focus descriptions
//!
//! Builds the sentence announced when an interactive element receives focus:
//! role, accessible name, then state.

use civic_dom::{Document, ElementData, NodeId};

/// Elements that get focus listeners: links, buttons, form controls and
/// anything with an explicit non-negative tabindex.
pub fn is_interactive(el: &ElementData) -> bool {
    if el.is("a") || el.is("button") || el.is("input") || el.is("select") || el.is("textarea") {
        return true;
    }
    if el.get_attr("role") == Some("button") {
        return true;
    }
    el.get_attr("tabindex")
        .and_then(|t| t.trim().parse::<i32>().ok())
        .is_some_and(|t| t >= 0)
}

/// Describe a focused element, or None if there is nothing worth saying
pub fn describe_focus(doc: &Document, node: NodeId) -> Option<String> {
    let el = doc.element(node)?;

    if el.is("a") {
        let mut text = format!("Link: {}", name_or(doc, node, el, "Unnamed link"));
        if let Some(href) = el.get_attr("href").filter(|h| !h.is_empty()) {
            text.push_str(&format!(", goes to {href}"));
        }
        return Some(text);
    }

    if el.is("button") || el.get_attr("role") == Some("button") {
        let mut text = format!("Button: {}", name_or(doc, node, el, "Unnamed button"));
        match el.get_attr("aria-expanded") {
            Some("true") => text.push_str(", expanded"),
            Some("false") => text.push_str(", collapsed"),
            _ => {}
        }
        return Some(text);
    }

    if el.is("input") {
        let input_type = el.get_attr("type").unwrap_or("text").to_ascii_lowercase();
        let label = form_label(doc, el).unwrap_or_else(|| "Unnamed input".to_string());
        let mut text = format!("{input_type} input: {label}");
        if input_type == "checkbox" || input_type == "radio" {
            text.push_str(if el.has_attr("checked") { ", checked" } else { ", unchecked" });
        }
        return Some(text);
    }

    if el.is("textarea") {
        let label = form_label(doc, el).unwrap_or_else(|| "Unnamed text area".to_string());
        return Some(format!("Text area: {label}"));
    }

    if el.is("select") {
        let label = el.get_attr("aria-label").unwrap_or("Select an option");
        let mut text = format!("Dropdown: {label}");
        if let Some(option) = selected_option_text(doc, node) {
            text.push_str(&format!(", currently selected: {option}"));
        }
        return Some(text);
    }

    let role = el.get_attr("role").filter(|r| !r.trim().is_empty())?;
    Some(format!("{}: {}", capitalize(role.trim()), name_or(doc, node, el, "Unnamed")))
}

/// Text content, then aria-label, then the fallback
fn name_or(doc: &Document, node: NodeId, el: &ElementData, fallback: &str) -> String {
    let text = doc.text_content(node);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    el.get_attr("aria-label")
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// aria-label, then the text of `<label for=id>`
fn form_label(doc: &Document, el: &ElementData) -> Option<String> {
    if let Some(label) = el.get_attr("aria-label").filter(|l| !l.trim().is_empty()) {
        return Some(label.to_string());
    }
    let id = el.id()?;
    let text = doc.label_text_for(id)?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn selected_option_text(doc: &Document, select: NodeId) -> Option<String> {
    let options: Vec<NodeId> = doc
        .tree()
        .descendants(select)
        .into_iter()
        .filter(|&n| doc.element(n).is_some_and(|e| e.is("option")))
        .collect();
    let chosen = options
        .iter()
        .copied()
        .find(|&n| doc.element(n).is_some_and(|e| e.has_attr("selected")))
        .or_else(|| options.first().copied())?;
    Some(doc.text_content(chosen).trim().to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
