//! Offer extraction from the promotions page.
//!
//! The walk over sections and cards is written against [`OfferMarkup`], a
//! small capability trait: "give me the sections, the cards in a section,
//! and the child playing a given [`Role`]". [`ScrapedPage`] implements it
//! with `scraper` and the CSS selectors from [`PageLayout`], so every
//! selector that tracks the retailer's presentational markup lives in one
//! place.
//!
//! # Page Shape
//!
//! ```text
//! section[id^=offer_list_multiple]      one per category
//! ├── h2                                 category heading (required)
//! └── div.offer-card                     one per offer
//!     ├── h4                             title (required)
//!     ├── div.discount                   "-40%" badge (optional)
//!     └── div.benefit-icon               special label (optional)
//! ```

use crate::config::LayoutConfig;
use crate::error::DigestError;
use crate::models::OfferRecord;
use crate::utils::{digits_to_number, strip_line_breaks};
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::{debug, info, instrument};

/// Semantic role of a child element inside a section or card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SectionHeading,
    CardTitle,
    DiscountBadge,
    SpecialLabel,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SectionHeading => "section heading",
            Role::CardTitle => "card title",
            Role::DiscountBadge => "discount badge",
            Role::SpecialLabel => "special label",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural lookups over a parsed page.
pub trait OfferMarkup {
    type Node<'a>: Copy
    where
        Self: 'a;

    /// Offer sections, in document order.
    fn sections(&self) -> Vec<Self::Node<'_>>;

    /// Offer cards inside `section`, in document order.
    fn cards<'a>(&'a self, section: Self::Node<'a>) -> Vec<Self::Node<'a>>;

    /// First descendant of `scope` playing `role`.
    fn find<'a>(&'a self, scope: Self::Node<'a>, role: Role) -> Option<Self::Node<'a>>;

    /// Concatenated text content of `node`, untouched.
    fn text(&self, node: Self::Node<'_>) -> String;
}

/// Compiled selectors for the current page layout.
#[derive(Debug, Clone)]
pub struct PageLayout {
    section: Selector,
    card: Selector,
    section_heading: Selector,
    card_title: Selector,
    discount_badge: Selector,
    special_label: Selector,
}

impl PageLayout {
    /// Compile the configured selectors, failing on the first invalid one.
    pub fn compile(config: &LayoutConfig) -> Result<Self, DigestError> {
        let section = format!("section[id^=\"{}\"]", config.section_id_prefix);
        let by_role = |role: Role, raw: &str| parse_selector(role.as_str(), raw);
        Ok(Self {
            section: parse_selector("section", &section)?,
            card: parse_selector("card", &config.card)?,
            section_heading: by_role(Role::SectionHeading, &config.section_heading)?,
            card_title: by_role(Role::CardTitle, &config.card_title)?,
            discount_badge: by_role(Role::DiscountBadge, &config.discount_badge)?,
            special_label: by_role(Role::SpecialLabel, &config.special_label)?,
        })
    }

    fn selector(&self, role: Role) -> &Selector {
        match role {
            Role::SectionHeading => &self.section_heading,
            Role::CardTitle => &self.card_title,
            Role::DiscountBadge => &self.discount_badge,
            Role::SpecialLabel => &self.special_label,
        }
    }
}

fn parse_selector(role: &'static str, raw: &str) -> Result<Selector, DigestError> {
    Selector::parse(raw).map_err(|e| DigestError::InvalidSelector {
        role,
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// A page parsed by `scraper`, paired with the layout used to query it.
pub struct ScrapedPage<'l> {
    document: Html,
    layout: &'l PageLayout,
}

impl<'l> ScrapedPage<'l> {
    pub fn parse(markup: &str, layout: &'l PageLayout) -> Self {
        Self {
            document: Html::parse_document(markup),
            layout,
        }
    }
}

impl OfferMarkup for ScrapedPage<'_> {
    type Node<'a>
        = ElementRef<'a>
    where
        Self: 'a;

    fn sections(&self) -> Vec<ElementRef<'_>> {
        self.document.select(&self.layout.section).collect()
    }

    fn cards<'a>(&'a self, section: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        section.select(&self.layout.card).collect()
    }

    fn find<'a>(&'a self, scope: ElementRef<'a>, role: Role) -> Option<ElementRef<'a>> {
        scope.select(self.layout.selector(role)).next()
    }

    fn text(&self, node: ElementRef<'_>) -> String {
        node.text().collect()
    }
}

/// Parse `markup` with `layout` and extract every offer on it.
#[instrument(level = "info", skip_all, fields(bytes = markup.len()))]
pub fn extract_offers(markup: &str, layout: &PageLayout) -> Result<Vec<OfferRecord>, DigestError> {
    let page = ScrapedPage::parse(markup, layout);
    let records = extract(&page)?;
    info!(count = records.len(), "Extracted offers");
    Ok(records)
}

/// Walk sections then cards in document order, producing one record per card.
///
/// No deduplication: repeated names, within or across categories, are all kept.
pub fn extract<M: OfferMarkup>(markup: &M) -> Result<Vec<OfferRecord>, DigestError> {
    let mut records = Vec::new();

    for (index, section) in markup.sections().into_iter().enumerate() {
        let category = markup
            .find(section, Role::SectionHeading)
            .map(|heading| markup.text(heading).trim().to_string())
            .filter(|category| !category.is_empty())
            .ok_or(DigestError::MalformedSection { index })?;

        let cards = markup.cards(section);
        debug!(%category, cards = cards.len(), "Reading section");

        for (card_index, card) in cards.into_iter().enumerate() {
            records.push(read_card(markup, card, &category, card_index)?);
        }
    }

    Ok(records)
}

fn read_card<'a, M: OfferMarkup>(
    markup: &'a M,
    card: M::Node<'a>,
    category: &str,
    index: usize,
) -> Result<OfferRecord, DigestError> {
    // An empty title is as unusable as a missing one.
    let name = markup
        .find(card, Role::CardTitle)
        .map(|title| strip_line_breaks(&markup.text(title)))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DigestError::MalformedCard {
            category: category.to_string(),
            index,
        })?;

    let discount_percent = match markup.find(card, Role::DiscountBadge) {
        Some(badge) => {
            let badge = strip_line_breaks(&markup.text(badge));
            let pct = digits_to_number(&badge).ok_or_else(|| DigestError::UnparseableDiscount {
                category: category.to_string(),
                name: name.clone(),
                badge,
            })?;
            Some(pct)
        }
        None => None,
    };

    let special_label = markup
        .find(card, Role::SpecialLabel)
        .map(|label| strip_line_breaks(&markup.text(label)))
        .unwrap_or_default();

    Ok(OfferRecord {
        name,
        discount_percent,
        special_label,
        category: category.to_string(),
    })
}
