//! Sample portal page

use civic_dom::{Document, DomError, NodeId};

/// Id of the region `insert` commands append to
pub const MAIN_ID: &str = "main";

/// Build the feedback page: navigation, a feedback form and a main region
pub fn feedback_page() -> Result<Document, DomError> {
    let mut doc = Document::new("https://portal.example/feedback");
    let body = doc.body();

    let nav = append(&mut doc, body, "nav", &[("aria-label", "Primary")], "")?;
    append(&mut doc, nav, "a", &[("id", "home"), ("href", "/")], "Home")?;
    append(&mut doc, nav, "a", &[("id", "status"), ("href", "/status")], "Track a report")?;
    append(
        &mut doc,
        nav,
        "button",
        &[("id", "a11y"), ("aria-haspopup", "dialog"), ("aria-expanded", "false")],
        "Accessibility",
    )?;

    let main = append(&mut doc, body, "main", &[("id", MAIN_ID)], "")?;
    let form = append(&mut doc, main, "form", &[("id", "feedback")], "")?;

    append(&mut doc, form, "label", &[("for", "email")], "Email address")?;
    append(&mut doc, form, "input", &[("id", "email"), ("type", "email")], "")?;

    let select = append(
        &mut doc,
        form,
        "select",
        &[("id", "department"), ("aria-label", "Department")],
        "",
    )?;
    append(&mut doc, select, "option", &[], "Roads")?;
    append(&mut doc, select, "option", &[("selected", "")], "Parks")?;
    append(&mut doc, select, "option", &[], "Waste collection")?;

    append(&mut doc, form, "label", &[("for", "details")], "Describe the issue")?;
    append(&mut doc, form, "textarea", &[("id", "details")], "")?;
    append(
        &mut doc,
        form,
        "input",
        &[("id", "contact"), ("type", "checkbox"), ("aria-label", "Contact me about this report")],
        "",
    )?;
    append(&mut doc, form, "button", &[("id", "submit"), ("type", "submit")], "Submit feedback")?;

    Ok(doc)
}

fn append(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    attrs: &[(&str, &str)],
    text: &str,
) -> Result<NodeId, DomError> {
    let el = doc.create_element(tag);
    for (name, value) in attrs {
        doc.set_attribute(el, name, value)?;
    }
    if !text.is_empty() {
        doc.set_text_content(el, text)?;
    }
    doc.append_child(parent, el)?;
    Ok(el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_a11y::{describe_focus, is_interactive};

    #[test]
    fn test_page_controls() {
        let doc = feedback_page().unwrap();
        assert_eq!(doc.query_all(is_interactive).len(), 8);

        let select = doc.get_element_by_id("department").unwrap();
        assert_eq!(
            describe_focus(&doc, select).as_deref(),
            Some("Dropdown: Department, currently selected: Parks")
        );
        let email = doc.get_element_by_id("email").unwrap();
        assert_eq!(
            describe_focus(&doc, email).as_deref(),
            Some("email input: Email address")
        );
    }
}
