//! Content document types
//!
//! The JSON document that drives every rendered section. Each section is
//! decoded on its own: a malformed section is dropped (and logged) without
//! taking the rest of the document with it.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use super::ContentError;
use crate::logger;

#[derive(Debug, Clone, Default)]
pub struct ContentDocument {
    pub about: Option<About>,
    pub services: Option<Vec<Service>>,
    pub gallery: Option<Gallery>,
    pub contact: Option<Contact>,
    pub business: Option<Business>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct About {
    pub paragraphs: Vec<String>,
    pub points: Vec<String>,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gallery {
    pub items: Vec<GalleryItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryItem {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<ContactAddress>,
    pub emergency_hours: Option<String>,
    pub service_areas: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactAddress {
    pub full: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Business {
    pub name: Option<String>,
    pub telephone: Option<String>,
    pub url: Option<String>,
    pub address: Option<BusinessAddress>,
    pub geo: Option<Geo>,
    pub opening_hours: Option<Vec<OpeningHours>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessAddress {
    pub street_address: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
}

/// Coordinates may be written as numbers or strings; both pass through
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Geo {
    pub lat: Value,
    pub lng: Value,
}

/// `days` is a single day name or a list of them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpeningHours {
    pub days: Value,
    pub opens: Value,
    pub closes: Value,
}

impl ContentDocument {
    /// Decode a document. Only a non-JSON or non-object payload is an error.
    pub fn parse(bytes: &[u8]) -> Result<Self, ContentError> {
        let Value::Object(mut root) = serde_json::from_slice::<Value>(bytes)? else {
            return Err(ContentError::NotAnObject);
        };

        Ok(Self {
            about: section(&mut root, "about"),
            services: section(&mut root, "services"),
            gallery: section(&mut root, "gallery"),
            contact: section(&mut root, "contact"),
            business: section(&mut root, "business"),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, ContentError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ContentError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::parse(&bytes)
    }
}

fn section<T: DeserializeOwned>(root: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = root.remove(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            logger::log_warning(&format!("Ignoring malformed '{key}' section: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let doc = ContentDocument::parse(
            br#"{
                "about": {"paragraphs": ["Hi"], "points": ["Fast"]},
                "services": [{"title": "Rewiring", "description": "Whole house"}],
                "gallery": {"items": [{"src": "a.jpg", "category": "Panels"}]},
                "contact": {"phone": "555", "serviceAreas": ["North"], "emergencyHours": "24/7"},
                "business": {"name": "Sparks", "geo": {"lat": 51.5, "lng": "-0.1"}}
            }"#,
        )
        .unwrap();

        assert_eq!(doc.about.unwrap().paragraphs, vec!["Hi"]);
        assert_eq!(doc.services.unwrap()[0].title, "Rewiring");
        assert_eq!(doc.gallery.unwrap().items[0].category.as_deref(), Some("Panels"));
        let contact = doc.contact.unwrap();
        assert_eq!(contact.service_areas, vec!["North"]);
        assert_eq!(contact.emergency_hours.as_deref(), Some("24/7"));
        assert_eq!(doc.business.unwrap().geo.unwrap().lat, serde_json::json!(51.5));
    }

    #[test]
    fn test_malformed_section_is_isolated() {
        let doc = ContentDocument::parse(
            br#"{"services": "not a list", "about": {"paragraphs": ["Still here"]}}"#,
        )
        .unwrap();
        assert!(doc.services.is_none());
        assert_eq!(doc.about.unwrap().paragraphs, vec!["Still here"]);
    }

    #[test]
    fn test_empty_object_has_no_sections() {
        let doc = ContentDocument::parse(b"{}").unwrap();
        assert!(doc.about.is_none() && doc.gallery.is_none() && doc.business.is_none());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            ContentDocument::parse(b"[1, 2]"),
            Err(ContentError::NotAnObject)
        ));
        assert!(matches!(
            ContentDocument::parse(b"<html>"),
            Err(ContentError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ContentDocument::load(Path::new("/nonexistent/data.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Read { .. }));
    }
}
