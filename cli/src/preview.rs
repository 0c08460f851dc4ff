//! Offline decoration preview against a synthetic storefront page.

use std::rc::Rc;

use gallery_wall_core::dom::SelectorError;
use gallery_wall_core::{
    DecorationReport, EngineConfig, EngineConfigExt, LifecycleCoordinator, ManualScheduler, MemoryDom,
    MemoryStorage, MemoryStyleHost, NodeId,
};

/// Result of running the full lifecycle once on a sample page
pub struct Preview {
    pub report: DecorationReport,
    /// Styled nodes with `var(--gw-*)` references resolved
    pub styles: Vec<(NodeId, String)>,
    pub variables: Vec<(&'static str, String)>,
}

/// A page with every anchor the decorator knows about: header, product
/// hero, recently-viewed carousel, listing grid and two listing sections.
pub fn sample_page(path: &str) -> Result<MemoryDom, SelectorError> {
    let dom = MemoryDom::new();
    dom.set_path(path);
    let body = dom.body();

    dom.append(body, r#"header[role="banner"]"#)?;
    let main = dom.append(body, "main")?;

    let hero = dom.append(main, "div.bg-brand-300")?;
    for _ in 0..2 {
        dom.append_path(hero, &["a", "span", "img"])?;
    }

    let carousel = dom.append(main, "ul")?;
    let card = dom.append_path(carousel, &["li", "article", "div.absolute"])?;
    dom.append(card, "img")?;

    dom.append(main, "div.grid.w-full.gap-4")?;

    let listing = dom.append(main, "div.listing")?;
    dom.append(listing, "div.sticky")?;
    for _ in 0..2 {
        let overlay = dom.append_path(listing, &["section", "article", "div.absolute"])?;
        dom.append(overlay, "img")?;
    }

    Ok(dom)
}

/// Activate an engine on the sample page, let the settle timer fire, and
/// collect what was written.
pub fn run(config: &EngineConfig, storage: MemoryStorage, path: &str) -> Result<Preview, String> {
    let dom = sample_page(path).map_err(|e| e.to_string())?;
    let scheduler = Rc::new(ManualScheduler::new());
    let engine = LifecycleCoordinator::new(
        config,
        storage,
        MemoryStyleHost::new(),
        dom,
        scheduler.clone(),
    );

    engine.activate();
    scheduler.advance(config.settle_delay());

    let report = engine
        .last_report()
        .ok_or("settle timer did not fire")?;
    let variables = engine.variables();
    let styles = engine
        .dom()
        .styled_nodes()
        .into_iter()
        .map(|(id, style)| (id, variables.resolve(&style)))
        .collect();

    Ok(Preview {
        report,
        styles,
        variables: variables.entries().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_wall_core::DecorationOutcome;

    #[test]
    fn listing_page_is_fully_decorated() {
        let preview = run(&EngineConfig::default(), MemoryStorage::new(), "/en/posters-prints/").unwrap();

        assert_eq!(preview.report.outcome, DecorationOutcome::Decorated);
        assert!(preview.report.missing.is_empty());
        assert!(preview.report.capability.frame_color_eligible);
        assert!(
            preview
                .styles
                .iter()
                .any(|(_, style)| style.contains("repeat(4, minmax(0, 1fr))"))
        );
        assert!(
            preview
                .styles
                .iter()
                .any(|(_, style)| style.contains("padding: 5px !important"))
        );
    }

    #[test]
    fn stored_preferences_flow_into_preview() {
        let storage = MemoryStorage::with_items([("countPerRow", "6"), ("wallColor", "#112233")]);
        let preview = run(&EngineConfig::default(), storage, "/en/new-in/").unwrap();

        assert!(
            preview
                .variables
                .contains(&("--gw-count-per-row", "6".to_string()))
        );
        assert!(
            preview
                .styles
                .iter()
                .any(|(_, style)| style.contains("background: #112233"))
        );
    }

    #[test]
    fn checkout_is_left_alone() {
        let preview = run(&EngineConfig::default(), MemoryStorage::new(), "/en/checkout/").unwrap();
        assert_eq!(preview.report.outcome, DecorationOutcome::Ineligible);
        assert!(preview.styles.is_empty());
    }
}
