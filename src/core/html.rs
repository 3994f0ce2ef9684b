//! Small helpers over `scraper` shared by the page parsers.
//!
//! `scraper::Html` is not `Send`, so documents are parsed and dropped inside
//! synchronous parser functions and never held across an `.await`.

use crate::utils::error::{Result, ScrapeError};
use scraper::{ElementRef, Html, Selector};

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::SelectorError {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Concatenated text of an element with every text node trimmed and empty
/// nodes dropped.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next().map(element_text))
}

pub fn first_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string))
}

/// Trimmed `content` of the first matching `<meta>`; `None` when blank.
pub fn meta_content(document: &Html, css: &str) -> Result<Option<String>> {
    Ok(first_attr(document, css, "content")?
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty()))
}

/// Every `href` in the document, in document order.
pub fn hrefs(document: &Html) -> Result<Vec<String>> {
    let sel = selector("a[href]")?;
    Ok(document
        .select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect())
}

/// Next sibling that is an element, skipping text and comments.
pub fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Text nodes of the document outside `<script>`/`<style>`, paired with their
/// parent element.
pub fn text_nodes(document: &Html) -> Vec<(ElementRef<'_>, &str)> {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            if matches!(parent.value().name(), "script" | "style") {
                return None;
            }
            let text: &str = text;
            Some((parent, text))
        })
        .collect()
}

/// Prefixes site-relative links (`/path`) with `base_url`; anything else is
/// returned unchanged.
pub fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

/// `s` trimmed, or `None` when nothing is left.
pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <html>
    <head>
        <title>Grand Hall - Blissful Brides Singapore</title>
        <meta name="description" content="  A lovely hall  ">
        <script>var capacity = 500;</script>
    </head>
    <body>
        <h1>
            Grand <span>Hall</span>
        </h1>
        <dl><dt>Address</dt> <!-- note --> <dd>1 Orchard Road, Singapore</dd></dl>
        <a href="/detail/1/grand-hall">Profile</a>
        <a href="tel:+6561234567">Call</a>
    </body>
    </html>"#;

    #[test]
    fn test_text_and_attributes() {
        let document = Html::parse_document(PAGE);

        assert_eq!(first_text(&document, "h1").unwrap().as_deref(), Some("GrandHall"));
        assert_eq!(
            meta_content(&document, "meta[name=description]").unwrap().as_deref(),
            Some("A lovely hall")
        );
        assert_eq!(first_text(&document, "h2").unwrap(), None);
        assert_eq!(
            hrefs(&document).unwrap(),
            vec!["/detail/1/grand-hall", "tel:+6561234567"]
        );
    }

    #[test]
    fn test_next_element_sibling_skips_text_and_comments() {
        let document = Html::parse_document(PAGE);
        let dt = document.select(&selector("dt").unwrap()).next().unwrap();

        let sibling = next_element_sibling(dt).unwrap();
        assert_eq!(sibling.value().name(), "dd");
        assert_eq!(element_text(sibling), "1 Orchard Road, Singapore");
    }

    #[test]
    fn test_text_nodes_skip_scripts() {
        let document = Html::parse_document(PAGE);
        let texts: Vec<&str> = text_nodes(&document).into_iter().map(|(_, t)| t).collect();

        assert!(texts.iter().any(|t| t.contains("Address")));
        assert!(!texts.iter().any(|t| t.contains("var capacity")));
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        assert!(matches!(
            selector("a[href"),
            Err(ScrapeError::SelectorError { .. })
        ));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("https://example.com/", "/detail/1/x"),
            "https://example.com/detail/1/x"
        );
        assert_eq!(absolutize("https://example.com", "menu.pdf"), "menu.pdf");
        assert_eq!(
            absolutize("https://example.com", "https://cdn.example.com/a.pdf"),
            "https://cdn.example.com/a.pdf"
        );
    }
}
