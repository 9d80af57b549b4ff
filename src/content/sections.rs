//! Section builders
//!
//! Each builder turns one decoded section into markup. Absent sections never
//! reach a builder; empty lists and empty strings are skipped the same way
//! missing ones are.

use super::document::{About, Contact, Service};
use crate::escape::{escape_attr, escape_html};

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect()
}

pub fn build_about(about: &About) -> String {
    let mut html: String = about
        .paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect();

    if !about.points.is_empty() {
        html.push_str("<ul>");
        html.push_str(&list_items(&about.points));
        html.push_str("</ul>");
    }
    if !about.licenses.is_empty() {
        html.push_str("<div class=\"licenses\"><strong>");
        html.push_str(&escape_html("Licenses & Accreditations:"));
        html.push_str("</strong><ul>");
        html.push_str(&list_items(&about.licenses));
        html.push_str("</ul></div>");
    }
    html
}

pub fn build_services(services: &[Service]) -> String {
    services
        .iter()
        .map(|service| {
            let description = present(service.description.as_ref())
                .map(|d| format!("<p>{}</p>", escape_html(d)))
                .unwrap_or_default();
            format!(
                "\n      <li>\n        <h3>{}</h3>\n        {description}\n      </li>",
                escape_html(&service.title)
            )
        })
        .collect()
}

pub fn build_contact(contact: &Contact) -> String {
    let mut html = String::new();

    if let Some(phone) = present(contact.phone.as_ref()) {
        html.push_str(&format!(
            "<div><strong>Phone:</strong> <a href=\"tel:{}\">{}</a></div>",
            escape_attr(phone),
            escape_html(phone)
        ));
    }
    if let Some(email) = present(contact.email.as_ref()) {
        html.push_str(&format!(
            "<div><strong>Email:</strong> <a href=\"mailto:{}\">{}</a></div>",
            escape_attr(email),
            escape_html(email)
        ));
    }
    if let Some(full) = contact
        .address
        .as_ref()
        .and_then(|a| present(a.full.as_ref()))
    {
        html.push_str(&format!(
            "<div><strong>Address:</strong> {}</div>",
            escape_html(full)
        ));
    }
    if let Some(hours) = present(contact.emergency_hours.as_ref()) {
        html.push_str(&format!(
            "<div><strong>Emergency Service:</strong> {}</div>",
            escape_html(hours)
        ));
    }
    if !contact.service_areas.is_empty() {
        let areas: Vec<String> = contact.service_areas.iter().map(|a| escape_html(a)).collect();
        html.push_str(&format!(
            "<div><strong>Service Areas:</strong> {}</div>",
            areas.join(", ")
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::document::ContactAddress;

    #[test]
    fn test_about_all_parts() {
        let about = About {
            paragraphs: vec!["One".into(), "Two".into()],
            points: vec!["Fast".into()],
            licenses: vec!["NICEIC".into()],
        };
        let html = build_about(&about);
        assert!(html.starts_with("<p>One</p><p>Two</p><ul><li>Fast</li></ul>"));
        assert!(html.contains(
            "<div class=\"licenses\"><strong>Licenses &amp; Accreditations:</strong><ul><li>NICEIC</li></ul></div>"
        ));
    }

    #[test]
    fn test_about_skips_empty_lists() {
        let about = About {
            paragraphs: vec!["Only".into()],
            ..About::default()
        };
        assert_eq!(build_about(&about), "<p>Only</p>");
    }

    #[test]
    fn test_about_escapes_script() {
        let about = About {
            paragraphs: vec!["<script>alert(1)</script>".into()],
            ..About::default()
        };
        let html = build_about(&about);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_service_without_description_omits_block() {
        let services = vec![
            Service {
                title: "Rewiring".into(),
                description: Some("Whole house".into()),
            },
            Service {
                title: "Testing".into(),
                description: None,
            },
        ];
        let html = build_services(&services);
        assert_eq!(html.matches("<li>").count(), 2);
        assert_eq!(html.matches("<p>").count(), 1);
        assert!(html.contains("<h3>Testing</h3>"));
    }

    #[test]
    fn test_contact_lines_are_conditional() {
        let contact = Contact {
            phone: Some("0123 456".into()),
            email: None,
            address: Some(ContactAddress {
                full: Some("1 High St".into()),
            }),
            emergency_hours: Some(String::new()),
            service_areas: vec!["North".into(), "South & East".into()],
        };
        let html = build_contact(&contact);
        assert!(html.contains("<a href=\"tel:0123 456\">0123 456</a>"));
        assert!(!html.contains("Email:"));
        assert!(html.contains("<strong>Address:</strong> 1 High St"));
        assert!(!html.contains("Emergency Service"));
        assert!(html.contains("North, South &amp; East"));
    }

    #[test]
    fn test_contact_attribute_escaped() {
        let contact = Contact {
            email: Some("x\"onmouseover=\"y@z.com".into()),
            ..Contact::default()
        };
        let html = build_contact(&contact);
        assert!(html.contains("mailto:x&quot;onmouseover=&quot;y@z.com"));
    }
}
