//! Filterable gallery view model
//!
//! `render` is a pure function of the items and the selected category. It
//! produces the filter buttons and the figures; markup is written from that
//! model, with the viewer bindings supplied by the separate binding step.

use super::document::GalleryItem;
use super::viewer::{ViewerBindings, LIGHTBOX};
use crate::escape::{escape_attr, escape_html};

/// Synthetic category that disables filtering
pub const ALL: &str = "all";

const DEFAULT_ALT: &str = "Work sample";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterButton {
    pub value: String,
    pub label: String,
    pub active: bool,
}

/// One visible gallery image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    /// Position in the document's item list, stable across filters
    pub index: usize,
    pub src: String,
    pub alt: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub filters: Vec<FilterButton>,
    pub figures: Vec<Figure>,
    /// Category actually applied (`all` when the request named an unknown one)
    pub selected: String,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Distinct categories in order of first appearance, excluding the
/// reserved `all`
pub fn categories(items: &[GalleryItem]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for category in items.iter().filter_map(|i| non_empty(i.category.as_ref())) {
        if category != ALL && !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}

pub fn render(items: &[GalleryItem], selected: &str) -> GalleryView {
    let categories = categories(items);
    let selected = if categories.contains(&selected) {
        selected
    } else {
        ALL
    };

    let mut filters = vec![FilterButton {
        value: ALL.to_string(),
        label: "All".to_string(),
        active: selected == ALL,
    }];
    filters.extend(categories.iter().map(|c| FilterButton {
        value: (*c).to_string(),
        label: (*c).to_string(),
        active: *c == selected,
    }));

    let figures = items
        .iter()
        .enumerate()
        .filter(|(_, item)| selected == ALL || item.category.as_deref() == Some(selected))
        .map(|(index, item)| {
            let caption = non_empty(item.caption.as_ref()).map(str::to_string);
            let alt = non_empty(item.alt.as_ref())
                .or(caption.as_deref())
                .unwrap_or(DEFAULT_ALT)
                .to_string();
            Figure {
                index,
                src: item.src.clone(),
                alt,
                caption,
            }
        })
        .collect();

    GalleryView {
        filters,
        figures,
        selected: selected.to_string(),
    }
}

impl GalleryView {
    /// Page URL for this filter, optionally with `image` open in the viewer
    pub fn href(&self, image: Option<usize>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if self.selected != ALL {
            pairs.push(("category", self.selected.clone()));
        }
        if let Some(index) = image {
            pairs.push(("image", index.to_string()));
        }
        match serde_urlencoded::to_string(&pairs) {
            Ok(query) if !query.is_empty() => format!("/?{query}"),
            _ => "/".to_string(),
        }
    }

    /// Filter control; each button resubmits the page with its category
    pub fn filters_markup(&self) -> String {
        let buttons: String = self
            .filters
            .iter()
            .map(|f| {
                format!(
                    "<button type=\"submit\" name=\"category\" value=\"{value}\" data-filter=\"{value}\"{active}>{label}</button>",
                    value = escape_attr(&f.value),
                    active = if f.active {
                        " class=\"active\" aria-pressed=\"true\""
                    } else {
                        " aria-pressed=\"false\""
                    },
                    label = escape_html(&f.label),
                )
            })
            .collect();
        format!("<form method=\"get\" action=\"#gallery\">{buttons}</form>")
    }

    /// Grid of figures. `bindings` must come from binding these same figures;
    /// bound images link to the page with the viewer open on them.
    pub fn grid_markup(&self, bindings: &ViewerBindings) -> String {
        self.figures
            .iter()
            .map(|fig| {
                let caption = fig.caption.as_deref().unwrap_or("");
                let figcaption = if caption.is_empty() {
                    String::new()
                } else {
                    format!(
                        "<figcaption class=\"caption\">{}</figcaption>",
                        escape_html(caption)
                    )
                };
                let img = format!(
                    "<img src=\"{}\" alt=\"{}\" loading=\"lazy\" data-caption=\"{}\" />",
                    escape_attr(&fig.src),
                    escape_attr(&fig.alt),
                    escape_attr(caption),
                );
                let open = format!("{}#{LIGHTBOX}", self.href(Some(fig.index)));
                format!(
                    "\n      <figure class=\"gallery-item\">\n        {}\n        {figcaption}\n      </figure>",
                    bindings.wrap(fig.index, &open, &img),
                )
            })
            .collect()
    }
}
