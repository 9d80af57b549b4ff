//! Page assembly
//!
//! The page template is plain HTML with empty section containers identified
//! by `id`. Rendered markup is inserted right after each container's start
//! tag; containers the template lacks are skipped.

use super::document::ContentDocument;
use super::gallery::{self, GalleryView};
use super::schema::merge_schema_text;
use super::sections::{build_about, build_contact, build_services};
use super::viewer::{ImageViewer, ViewerBindings, ViewerEvent, CLOSE_CONTROL, LIGHTBOX};
use crate::escape::escape_html;
use crate::logger;

pub const ABOUT: &str = "aboutContent";
pub const SERVICES: &str = "servicesList";
pub const GALLERY_FILTERS: &str = "galleryFilters";
pub const GALLERY_GRID: &str = "galleryGrid";
pub const CONTACT: &str = "contactContent";
pub const YEAR: &str = "year";
pub const STRUCTURED_DATA: &str = "structured-data";
pub const FORM_STATUS: &str = "formStatus";
/// Page content made inert while the viewer is open
pub const PAGE: &str = "page";

pub const LOAD_FAILED: &str =
    "<p class=\"content-error\" role=\"alert\">Content failed to load. Please ensure data.json is present.</p>";

/// Outcome of the last contact form submission, shown next to the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Sent,
    Incomplete,
    Error,
}

impl FormStatus {
    /// Value carried in the `status` query parameter
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Incomplete => "incomplete",
            Self::Error => "error",
        }
    }

    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "sent" => Some(Self::Sent),
            "incomplete" => Some(Self::Incomplete),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Sent => "Thank you \u{2014} your request has been sent.",
            Self::Incomplete => "Please fill required fields.",
            Self::Error => "Error sending request. Please try again later.",
        }
    }

    fn markup(self) -> String {
        let class = match self {
            Self::Sent => "form-status-ok",
            Self::Incomplete | Self::Error => "form-status-error",
        };
        format!("<span class=\"{class}\">{}</span>", escape_html(self.message()))
    }
}

/// Per-request view state taken from the query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// Gallery filter
    pub category: String,
    /// Gallery image open in the viewer
    pub image: Option<usize>,
    pub status: Option<FormStatus>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            category: gallery::ALL.to_string(),
            image: None,
            status: None,
        }
    }
}

/// Byte offset just past the start tag of the element with `id`
fn start_tag_end(html: &str, id: &str) -> Option<usize> {
    let needle = format!(" id=\"{id}\"");
    let attr = html.find(&needle)?;
    let close = html[attr..].find('>')?;
    Some(attr + close + 1)
}

/// Insert `content` as the first child of the element with `id`
fn fill(html: &mut String, id: &str, content: &str) {
    if content.is_empty() {
        return;
    }
    match start_tag_end(html, id) {
        Some(at) => html.insert_str(at, content),
        None => logger::log_debug(&format!("Template has no #{id} container")),
    }
}

/// Add a bare attribute to the start tag of the element with `id`
fn set_attribute(html: &mut String, id: &str, attribute: &str) {
    let Some(end) = start_tag_end(html, id) else {
        logger::log_debug(&format!("Template has no #{id} element"));
        return;
    };
    let mut at = end - 1;
    if html[..at].ends_with('/') {
        at -= 1;
    }
    html.insert_str(at, &format!(" {attribute}"));
}

/// Open the viewer on gallery image `index` when it is among the bound
/// figures; focus moves to the close control and the page behind is inert
fn open_viewer(html: &mut String, view: &GalleryView, bindings: &ViewerBindings, index: usize) {
    let mut viewer = ImageViewer::new(vec![CLOSE_CONTROL.to_string()]);
    if !viewer.handle(bindings, ViewerEvent::ImageClick(index)) {
        logger::log_debug(&format!("Gallery image {index} is not shown, viewer stays closed"));
        return;
    }
    if let Some(markup) = viewer.markup(&view.href(None)) {
        fill(html, LIGHTBOX, &markup);
        set_attribute(html, PAGE, "inert");
    }
}

/// Rewrite the JSON-LD block in place; absent or malformed blocks are left
/// untouched
fn merge_structured_data(html: &mut String, document: &ContentDocument) {
    let Some(start) = start_tag_end(html, STRUCTURED_DATA) else {
        logger::log_debug("Template has no structured data block");
        return;
    };
    let Some(len) = html[start..].find("</script>") else {
        logger::log_warning("Structured data block is not terminated");
        return;
    };
    let end = start + len;

    match merge_schema_text(&html[start..end], document.business.as_ref()) {
        Ok(text) => html.replace_range(start..end, &format!("\n{text}\n")),
        Err(e) => logger::log_warning(&format!("Schema update failed: {e}")),
    }
}

/// Render the page for one request.
///
/// `document` is `None` when the content document could not be loaded; the
/// about container then carries a visible error and the other sections stay
/// empty. `options` selects the gallery filter, the image open in the viewer
/// and the form status message.
pub fn render_page(
    template: &str,
    document: Option<&ContentDocument>,
    options: &PageOptions,
    year: i32,
) -> String {
    let mut html = template.to_string();
    fill(&mut html, YEAR, &year.to_string());
    if let Some(status) = options.status {
        fill(&mut html, FORM_STATUS, &status.markup());
    }

    let Some(doc) = document else {
        fill(&mut html, ABOUT, LOAD_FAILED);
        return html;
    };

    if let Some(about) = &doc.about {
        fill(&mut html, ABOUT, &build_about(about));
    }
    if let Some(services) = &doc.services {
        fill(&mut html, SERVICES, &build_services(services));
    }
    if let Some(items) = doc.gallery.as_ref().map(|g| g.items.as_slice()) {
        let view = gallery::render(items, &options.category);
        let mut bindings = ViewerBindings::default();
        bindings.bind(&view.figures);
        fill(&mut html, GALLERY_FILTERS, &view.filters_markup());
        fill(&mut html, GALLERY_GRID, &view.grid_markup(&bindings));
        if let Some(index) = options.image {
            open_viewer(&mut html, &view, &bindings, index);
        }
    }
    if let Some(contact) = &doc.contact {
        fill(&mut html, CONTACT, &build_contact(contact));
    }
    merge_structured_data(&mut html, doc);
    html
}
