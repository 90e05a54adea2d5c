use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::SelectorChains;
use crate::error::ExtractError;

/// Fields pulled out of a listing container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Price,
    Link,
    Image,
    TimeLeft,
    Bids,
    Shipping,
}

/// Selector chains parsed once, ready to run against many documents
#[derive(Debug, Clone)]
pub struct CompiledChains {
    containers: Vec<Selector>,
    title: Vec<Selector>,
    price: Vec<Selector>,
    link: Vec<Selector>,
    image: Vec<Selector>,
    time_left: Vec<Selector>,
    bids: Vec<Selector>,
    shipping: Vec<Selector>,
}

fn compile(name: &'static str, raw: &[String]) -> Vec<Selector> {
    raw.iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                debug!("Skipping invalid {} selector '{}': {}", name, s, e);
                None
            }
        })
        .collect()
}

fn required(name: &'static str, raw: &[String]) -> Result<Vec<Selector>, ExtractError> {
    let compiled = compile(name, raw);
    if compiled.is_empty() {
        return Err(ExtractError::EmptyChain(name));
    }
    Ok(compiled)
}

impl CompiledChains {
    /// Parse every chain. Container and title chains must keep at least one
    /// valid selector; the rest may end up empty and simply never match
    pub fn compile(chains: &SelectorChains) -> Result<Self, ExtractError> {
        Ok(Self {
            containers: required("listing_container", &chains.listing_container)?,
            title: required("title", &chains.title)?,
            price: compile("price", &chains.price),
            link: compile("link", &chains.link),
            image: compile("image", &chains.image),
            time_left: compile("time_left", &chains.time_left),
            bids: compile("bids", &chains.bids),
            shipping: compile("shipping", &chains.shipping),
        })
    }

    fn chain(&self, field: Field) -> &[Selector] {
        match field {
            Field::Title => &self.title,
            Field::Price => &self.price,
            Field::Link => &self.link,
            Field::Image => &self.image,
            Field::TimeLeft => &self.time_left,
            Field::Bids => &self.bids,
            Field::Shipping => &self.shipping,
        }
    }
}

/// Candidate listing containers in document order
///
/// The first container selector matching more than `min_matches` elements
/// wins, so a selector that only hits a few sidebar widgets is passed over
/// Returns an empty vec when nothing qualifies
pub fn locate_listings<'a>(
    document: &'a Html,
    chains: &CompiledChains,
    min_matches: usize,
) -> Vec<ElementRef<'a>> {
    for selector in &chains.containers {
        let found: Vec<ElementRef<'a>> = document.select(selector).collect();
        if found.len() > min_matches {
            debug!("Container selector {:?} matched {} elements", selector, found.len());
            return found;
        }
    }
    Vec::new()
}

/// First descendant of `element` matched by the field's chain
pub fn locate_field<'a>(
    element: ElementRef<'a>,
    field: Field,
    chains: &CompiledChains,
) -> Option<ElementRef<'a>> {
    chains
        .chain(field)
        .iter()
        .find_map(|selector| element.select(selector).next())
}

/// Whether any text inside the listing carries a sponsored marker
pub fn is_sponsored(element: ElementRef<'_>) -> bool {
    element
        .text()
        .any(|t| t.to_lowercase().contains("sponsored"))
}

/// Text content with whitespace runs collapsed to single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chains() -> CompiledChains {
        CompiledChains::compile(&SelectorChains::default()).unwrap()
    }

    #[test]
    fn sidebar_matches_are_not_enough() {
        let html = Html::parse_document(
            r#"<ul><li class="s-item">filter</li><li class="s-item">filter</li></ul>"#,
        );
        assert!(locate_listings(&html, &chains(), 2).is_empty());
    }

    #[test]
    fn later_container_selector_wins_when_earlier_fail() {
        let html = Html::parse_document(
            r#"<div class="srp-results">
                 <div class="s-item x">a</div><div class="s-item x">b</div><div class="s-item x">c</div>
               </div>"#,
        );
        let found = locate_listings(&html, &chains(), 2);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn field_chain_falls_back_in_order() {
        let html = Html::parse_fragment(
            r#"<div><h3>Fallback heading</h3><div class="s-item__title">Primary title</div></div>"#,
        );
        let root = html.root_element();
        let title = locate_field(root, Field::Title, &chains()).unwrap();
        assert_eq!(element_text(title), "Primary title");
        assert!(locate_field(root, Field::Price, &chains()).is_none());
    }

    #[test]
    fn sponsored_marker_is_case_insensitive() {
        let html = Html::parse_fragment(r#"<div><span>SpOnSoReD</span></div>"#);
        assert!(is_sponsored(html.root_element()));
    }

    #[test]
    fn invalid_required_chain_is_an_error() {
        let chains = SelectorChains {
            title: vec!["[[[".to_string()],
            ..SelectorChains::default()
        };
        assert!(matches!(
            CompiledChains::compile(&chains),
            Err(ExtractError::EmptyChain("title"))
        ));
    }

    #[test]
    fn text_is_whitespace_collapsed() {
        let html = Html::parse_fragment("<p>  2d   <b>4h</b>\n left </p>");
        assert_eq!(element_text(html.root_element()), "2d 4h left");
    }
}
