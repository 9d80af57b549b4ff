//! Home page rendering
//!
//! The template and the content document are both read on every request,
//! so edits to either show up without a restart.

use chrono::Datelike;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::config::SiteConfig;
use crate::content::{gallery, render_page, ContentDocument, FormStatus, PageOptions};
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    category: Option<String>,
    image: Option<String>,
    status: Option<String>,
}

/// View state requested by the query string. Unknown or malformed values
/// fall back to the plain page.
fn page_options(query: Option<&str>) -> PageOptions {
    let query = query
        .and_then(|q| serde_urlencoded::from_str::<PageQuery>(q).ok())
        .unwrap_or_default();
    PageOptions {
        category: query
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| gallery::ALL.to_string()),
        image: query.image.and_then(|i| i.parse().ok()),
        status: query.status.as_deref().and_then(FormStatus::from_query),
    }
}

pub async fn serve_page(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    let root = Path::new(&site.root);

    let template_path = root.join(&site.index_file);
    let template = match fs::read_to_string(&template_path).await {
        Ok(t) => t,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read page template '{}': {e}",
                template_path.display()
            ));
            return http::build_404_response();
        }
    };

    let document = match ContentDocument::load(&root.join(&site.data_file)).await {
        Ok(doc) => Some(doc),
        Err(e) => {
            logger::log_error(&format!("Content failed to load: {e}"));
            None
        }
    };

    let html = render_page(
        &template,
        document.as_ref(),
        &page_options(ctx.query),
        chrono::Local::now().year(),
    );
    http::build_html_response(html, ctx.is_head)
}
