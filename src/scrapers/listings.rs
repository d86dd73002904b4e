use crate::scrapers::types::ListingFragment;
use anyhow::{anyhow, Result};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements that never carry listing data
const DROPPED_TAGS: &[&str] = &["script", "style", "iframe", "noscript"];

/// Attributes worth keeping for the extractor
const KEPT_ATTRS: &[&str] = &["class", "id", "href", "src"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Select every listing element on an index page and reduce each one to a
/// cleaned fragment. The parsed document does not outlive this call.
pub fn select_listings(html: &str, selector: &str) -> Result<Vec<ListingFragment>> {
    let selector = Selector::parse(selector)
        .map_err(|e| anyhow!("Invalid listing selector {:?}: {:?}", selector, e))?;
    let link_selector = Selector::parse("a[href]").map_err(|e| anyhow!("{:?}", e))?;

    let document = Html::parse_document(html);

    let listings = document
        .select(&selector)
        .enumerate()
        .map(|(index, element)| {
            let href = element
                .value()
                .attr("href")
                .or_else(|| {
                    element
                        .select(&link_selector)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                })
                .map(str::to_string);

            ListingFragment {
                index,
                html: clean_element(element),
                href,
            }
        })
        .collect();

    Ok(listings)
}

/// Serialize an element without scripts, styles, noise attributes and empty
/// `div`/`span` wrappers
pub fn clean_element(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_node(node: &Node, element: Option<ElementRef<'_>>, out: &mut String) {
    match (node, element) {
        (Node::Text(text), _) => escape_text(text, out),
        (Node::Element(_), Some(element)) => write_element(element, out),
        _ => {}
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let el = element.value();
    let name = el.name();

    if DROPPED_TAGS.contains(&name) {
        return;
    }
    if (name == "div" || name == "span") && is_empty(element) {
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in el.attrs() {
        if KEPT_ATTRS.contains(&attr) {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
    }
    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }

    for child in element.children() {
        write_node(child.value(), ElementRef::wrap(child), out);
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// No visible text and no child elements
fn is_empty(element: ElementRef<'_>) -> bool {
    let has_text = element.text().any(|t| !t.trim().is_empty());
    let has_children = element.children().any(|c| c.value().is_element());
    !has_text && !has_children
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_PAGE: &str = r#"
        <html><body>
          <ul class="results">
            <li class="listing" data-id="1">
              <a href="/huren/oudegracht-12" data-track="x">Oudegracht 12</a>
              <span class="price" style="color:red">€ 1.450</span>
              <script>track()</script>
            </li>
            <li class="listing" data-id="2">
              <a href="https://www.example.nl/huren/biltstraat-3">Biltstraat 3</a>
              <div class="spacer"></div>
            </li>
            <li class="ad">Advertisement</li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn test_select_listings() {
        let listings = select_listings(INDEX_PAGE, "li.listing").unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].index, 0);
        assert_eq!(listings[0].href.as_deref(), Some("/huren/oudegracht-12"));
        assert_eq!(
            listings[1].href.as_deref(),
            Some("https://www.example.nl/huren/biltstraat-3")
        );
    }

    #[test]
    fn test_listing_html_is_cleaned() {
        let listings = select_listings(INDEX_PAGE, "li.listing").unwrap();
        let first = &listings[0].html;

        assert!(first.starts_with(r#"<li class="listing">"#));
        assert!(first.contains(r#"<a href="/huren/oudegracht-12">Oudegracht 12</a>"#));
        assert!(first.contains(r#"<span class="price">€ 1.450</span>"#));
        assert!(!first.contains("script"));
        assert!(!first.contains("data-"));
        assert!(!first.contains("style"));

        assert!(!listings[1].html.contains("spacer"));
    }

    #[test]
    fn test_no_matches() {
        let listings = select_listings(INDEX_PAGE, "article.property").unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        assert!(select_listings(INDEX_PAGE, "li[").is_err());
    }

    #[test]
    fn test_void_elements_and_escaping() {
        let listings = select_listings(
            r#"<div class="card" onclick="go()"><img src="/a.jpg" alt="x"><p>3 &amp; 4 kamers</p><span></span><noscript>hi</noscript></div>"#,
            "div.card",
        )
        .unwrap();
        assert_eq!(
            listings[0].html,
            r#"<div class="card"><img src="/a.jpg"><p>3 &amp; 4 kamers</p></div>"#
        );
        assert_eq!(listings[0].href, None);
    }
}
