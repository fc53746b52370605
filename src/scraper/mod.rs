//! Parses a rendered facility search results page into candidate blocks

use anyhow::Result;
use ::scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{CandidateBlock, SlotLabel};

/// CSS selectors for the parts of a search result, overridable from the
/// `[selectors]` config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultSelectors {
    /// Container of one court's result entry
    pub block: String,
    /// Court title within the block
    pub title: String,
    /// Court description within the block
    pub description: String,
    /// Time slot buttons within the block
    pub slot: String,
    /// Class fragment marking a slot as bookable
    pub available_class: String,
}

impl Default for ResultSelectors {
    fn default() -> Self {
        Self {
            block: ".result-content".to_string(),
            title: "h2 span".to_string(),
            description: ".result-header__description".to_string(),
            slot: "a.button.cart-button".to_string(),
            available_class: "success".to_string(),
        }
    }
}

struct CompiledSelectors {
    block: Selector,
    title: Selector,
    description: Selector,
    slot: Selector,
}

impl CompiledSelectors {
    fn compile(selectors: &ResultSelectors) -> Result<Self> {
        let parse = |name: &str, css: &str| {
            Selector::parse(css)
                .map_err(|e| anyhow::anyhow!("Failed to parse {name} selector '{css}': {e:?}"))
        };

        Ok(Self {
            block: parse("block", &selectors.block)?,
            title: parse("title", &selectors.title)?,
            description: parse("description", &selectors.description)?,
            slot: parse("slot", &selectors.slot)?,
        })
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts candidate blocks in document order.
///
/// Blocks without a title or description are skipped.
///
/// # Errors
///
/// Fails if any configured selector is not valid CSS.
pub fn parse_results(html: &str, selectors: &ResultSelectors) -> Result<Vec<CandidateBlock>> {
    let compiled = CompiledSelectors::compile(selectors)?;
    let document = Html::parse_document(html);

    let mut blocks = Vec::new();

    for result in document.select(&compiled.block) {
        let Some(title) = result.select(&compiled.title).next().map(element_text) else {
            debug!("Skipping result block without a title");
            continue;
        };
        let Some(description) = result.select(&compiled.description).next().map(element_text)
        else {
            debug!("Skipping result block '{}' without a description", title);
            continue;
        };

        let slots = result
            .select(&compiled.slot)
            .map(|slot| {
                let available = slot
                    .value()
                    .attr("class")
                    .is_some_and(|class| class.contains(selectors.available_class.as_str()));
                SlotLabel::new(element_text(slot), available)
            })
            .collect();

        blocks.push(CandidateBlock {
            title,
            description,
            slots,
        });
    }

    info!("Found {} court options", blocks.len());
    Ok(blocks)
}
