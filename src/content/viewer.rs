//! Image viewer (lightbox)
//!
//! Two pieces: `ViewerBindings`, the explicit binding step run after every
//! grid render, and `ImageViewer`, the modal's state machine including the
//! focus trap and focus restoration. The page renders the viewer from the
//! machine's state, so an open viewer is a page URL naming the image.

use std::collections::BTreeMap;

use super::gallery::Figure;
use crate::escape::{escape_attr, escape_html};

/// Id of the template element the open viewer is rendered into
pub const LIGHTBOX: &str = "lightbox";

/// Focus id of the viewer's close control
pub const CLOSE_CONTROL: &str = "lightbox-close";

/// Focus id given to a bound gallery image
pub fn image_focus_id(index: usize) -> String {
    format!("gallery-image-{index}")
}

/// What opening the viewer from one image shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerBinding {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

/// Image index to viewer binding, rebuilt wholesale on every grid render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerBindings {
    bindings: BTreeMap<usize, ViewerBinding>,
}

impl ViewerBindings {
    /// Replace every binding with ones for `figures`. Binding the same
    /// figures again yields the same state; nothing from an earlier render
    /// survives.
    pub fn bind(&mut self, figures: &[Figure]) {
        self.bindings = figures
            .iter()
            .map(|fig| {
                let caption = fig
                    .caption
                    .clone()
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| fig.alt.clone());
                (
                    fig.index,
                    ViewerBinding {
                        src: fig.src.clone(),
                        alt: fig.alt.clone(),
                        caption,
                    },
                )
            })
            .collect();
    }

    pub fn get(&self, index: usize) -> Option<&ViewerBinding> {
        self.bindings.get(&index)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Wrap a bound image's markup in a focusable link that opens the
    /// viewer at `open_href`; unbound images are returned as they are
    pub fn wrap(&self, index: usize, open_href: &str, img: &str) -> String {
        if self.bindings.contains_key(&index) {
            format!(
                "<a id=\"{}\" class=\"gallery-open\" href=\"{}\" data-viewer-index=\"{index}\">{img}</a>",
                image_focus_id(index),
                escape_attr(open_href),
            )
        } else {
            img.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    ShiftTab,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    ImageClick(usize),
    ImageKey(usize, Key),
    /// Key pressed anywhere in the document
    Key(Key),
    BackdropClick,
    CloseClick,
}

#[derive(Debug)]
pub struct ImageViewer {
    /// Focusable elements inside the modal, in tab order
    focusable: Vec<String>,
    shown: Option<ViewerBinding>,
    focused: Option<String>,
    previous_focus: Option<String>,
}

impl ImageViewer {
    /// `focusable` lists the modal's focusable element ids in tab order;
    /// it should include [`CLOSE_CONTROL`]
    pub const fn new(focusable: Vec<String>) -> Self {
        Self {
            focusable,
            shown: None,
            focused: None,
            previous_focus: None,
        }
    }

    pub const fn is_open(&self) -> bool {
        self.shown.is_some()
    }

    pub const fn shown(&self) -> Option<&ViewerBinding> {
        self.shown.as_ref()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Element that regains focus when the viewer closes
    pub fn return_focus(&self) -> Option<&str> {
        self.previous_focus.as_deref()
    }

    /// Focus moved by the user outside of viewer events
    pub fn focus(&mut self, id: impl Into<String>) {
        self.focused = Some(id.into());
    }

    /// Apply one event. Returns true when the event was consumed (the
    /// browser default must not run).
    pub fn handle(&mut self, bindings: &ViewerBindings, event: ViewerEvent) -> bool {
        match event {
            ViewerEvent::ImageClick(index) => {
                self.focused = Some(image_focus_id(index));
                self.open(bindings, index)
            }
            ViewerEvent::ImageKey(index, Key::Enter) => self.open(bindings, index),
            ViewerEvent::ImageKey(_, key) | ViewerEvent::Key(key) => self.handle_key(key),
            ViewerEvent::BackdropClick | ViewerEvent::CloseClick => self.close(),
        }
    }

    /// Dialog markup for the current state, `None` while closed. Closing
    /// (the close control or the backdrop) navigates back to `page_href`
    /// at the element focus returns to.
    pub fn markup(&self, page_href: &str) -> Option<String> {
        let shown = self.shown.as_ref()?;
        let back = escape_attr(&format!(
            "{page_href}#{}",
            self.return_focus().unwrap_or("gallery")
        ));
        let autofocus = if self.focused() == Some(CLOSE_CONTROL) {
            " autofocus"
        } else {
            ""
        };
        Some(format!(
            "<a class=\"lightbox-backdrop\" href=\"{back}\" tabindex=\"-1\" aria-hidden=\"true\"></a>\
             <div class=\"lightbox-dialog\" role=\"dialog\" aria-modal=\"true\" aria-label=\"Image viewer\">\
             <a id=\"{CLOSE_CONTROL}\" class=\"lightbox-close\" href=\"{back}\" aria-label=\"Close\"{autofocus}>&times;</a>\
             <img id=\"lightboxImg\" src=\"{}\" alt=\"{}\" />\
             <p id=\"lightboxCaption\">{}</p>\
             </div>",
            escape_attr(&shown.src),
            escape_attr(&shown.alt),
            escape_html(&shown.caption),
        ))
    }

    fn open(&mut self, bindings: &ViewerBindings, index: usize) -> bool {
        let Some(binding) = bindings.get(index) else {
            return false;
        };
        if !self.is_open() {
            self.previous_focus = self.focused.clone();
        }
        self.shown = Some(binding.clone());
        self.focused = Some(CLOSE_CONTROL.to_string());
        true
    }

    fn close(&mut self) -> bool {
        if self.shown.take().is_none() {
            return false;
        }
        self.focused = self.previous_focus.take();
        true
    }

    fn handle_key(&mut self, key: Key) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            Key::Escape => self.close(),
            Key::Tab => self.cycle(true),
            Key::ShiftTab => self.cycle(false),
            Key::Enter | Key::Other => false,
        }
    }

    /// Move focus to the next/previous focusable element, wrapping at the
    /// ends so focus never leaves the modal
    fn cycle(&mut self, forward: bool) -> bool {
        let count = self.focusable.len();
        if count == 0 {
            return false;
        }
        let current = self
            .focused
            .as_ref()
            .and_then(|f| self.focusable.iter().position(|id| id == f));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
            (None, true) => 0,
            (None, false) => count - 1,
        };
        self.focused = Some(self.focusable[next].clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figures() -> Vec<Figure> {
        vec![
            Figure {
                index: 0,
                src: "a.jpg".into(),
                alt: "Panel".into(),
                caption: Some("New panel".into()),
            },
            Figure {
                index: 3,
                src: "d.jpg".into(),
                alt: "Lights".into(),
                caption: None,
            },
        ]
    }

    fn bound() -> ViewerBindings {
        let mut bindings = ViewerBindings::default();
        bindings.bind(&figures());
        bindings
    }

    fn viewer() -> ImageViewer {
        ImageViewer::new(vec![
            CLOSE_CONTROL.to_string(),
            "lightbox-download".to_string(),
            "lightbox-next".to_string(),
        ])
    }

    #[test]
    fn test_rebinding_replaces_previous_bindings() {
        let mut bindings = bound();
        assert_eq!(bindings.len(), 2);
        bindings.bind(&figures()[1..]);
        assert_eq!(bindings.len(), 1);
        assert!(bindings.get(0).is_none());
        assert_eq!(bindings.wrap(0, "/?image=0", "<img />"), "<img />");
        assert!(bindings
            .wrap(3, "/?category=A&image=3", "<img />")
            .starts_with("<a id=\"gallery-image-3\" class=\"gallery-open\" href=\"/?category=A&amp;image=3\""));

        let once = bound();
        let mut twice = bound();
        twice.bind(&figures());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_caption_falls_back_to_alt() {
        assert_eq!(bound().get(3).unwrap().caption, "Lights");
        assert_eq!(bound().get(0).unwrap().caption, "New panel");
    }

    #[test]
    fn test_click_opens_and_focuses_close() {
        let bindings = bound();
        let mut viewer = viewer();
        assert!(viewer.handle(&bindings, ViewerEvent::ImageClick(0)));
        assert!(viewer.is_open());
        assert_eq!(viewer.shown().unwrap().src, "a.jpg");
        assert_eq!(viewer.focused(), Some(CLOSE_CONTROL));
    }

    #[test]
    fn test_enter_on_image_opens() {
        let bindings = bound();
        let mut viewer = viewer();
        viewer.focus(image_focus_id(3));
        assert!(viewer.handle(&bindings, ViewerEvent::ImageKey(3, Key::Enter)));
        assert_eq!(viewer.shown().unwrap().caption, "Lights");
    }

    #[test]
    fn test_unbound_image_does_nothing() {
        let mut viewer = viewer();
        assert!(!viewer.handle(&bound(), ViewerEvent::ImageClick(7)));
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_tab_cycles_within_modal() {
        let bindings = bound();
        let mut viewer = viewer();
        viewer.handle(&bindings, ViewerEvent::ImageClick(0));

        let mut seen = Vec::new();
        for _ in 0..6 {
            viewer.handle(&bindings, ViewerEvent::Key(Key::Tab));
            seen.push(viewer.focused().unwrap().to_string());
        }
        assert_eq!(
            seen,
            vec![
                "lightbox-download",
                "lightbox-next",
                CLOSE_CONTROL,
                "lightbox-download",
                "lightbox-next",
                CLOSE_CONTROL
            ]
        );

        // Shift+Tab on the first element wraps to the last
        viewer.handle(&bindings, ViewerEvent::Key(Key::ShiftTab));
        assert_eq!(viewer.focused(), Some("lightbox-next"));
    }

    #[test]
    fn test_close_restores_previous_focus() {
        let bindings = bound();
        for closing in [
            ViewerEvent::Key(Key::Escape),
            ViewerEvent::BackdropClick,
            ViewerEvent::CloseClick,
        ] {
            let mut viewer = viewer();
            viewer.focus(image_focus_id(3));
            viewer.handle(&bindings, ViewerEvent::ImageKey(3, Key::Enter));
            viewer.handle(&bindings, ViewerEvent::Key(Key::Tab));
            assert!(viewer.handle(&bindings, closing));
            assert!(!viewer.is_open());
            assert!(viewer.shown().is_none());
            assert_eq!(viewer.focused(), Some("gallery-image-3"));
        }
    }

    #[test]
    fn test_markup_follows_state() {
        let bindings = bound();
        let mut viewer = viewer();
        assert!(viewer.markup("/").is_none());

        viewer.handle(&bindings, ViewerEvent::ImageClick(0));
        let html = viewer.markup("/?category=Panels").unwrap();
        assert!(html.contains("<img id=\"lightboxImg\" src=\"a.jpg\" alt=\"Panel\" />"));
        assert!(html.contains("<p id=\"lightboxCaption\">New panel</p>"));
        assert!(html.contains("href=\"/?category=Panels#gallery-image-0\" aria-label=\"Close\" autofocus"));
        assert_eq!(html.matches("#gallery-image-0").count(), 2);

        viewer.handle(&bindings, ViewerEvent::CloseClick);
        assert!(viewer.markup("/").is_none());
    }

    #[test]
    fn test_keys_ignored_while_closed() {
        let bindings = bound();
        let mut viewer = viewer();
        viewer.focus("nav-home");
        assert!(!viewer.handle(&bindings, ViewerEvent::Key(Key::Escape)));
        assert!(!viewer.handle(&bindings, ViewerEvent::Key(Key::Tab)));
        assert_eq!(viewer.focused(), Some("nav-home"));
    }
}
