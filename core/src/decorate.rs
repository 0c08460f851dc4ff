//! DOM decorator ("draw")
//!
//! Locates the configured anchors and merges wall, frame and grid declarations
//! into their inline styles. Values are `var(--gw-*)` references, so the
//! decorator only has to run when the page structure changes; preference edits
//! repaint through the variables alone.
//!
//! Every anchor is looked up fresh on each pass and a missing anchor only
//! skips its own step. All writes are absolute merges, so running a pass twice
//! over an unchanged document leaves identical styles.

use gallery_wall_types::{AnchorSelectors, Preference, RouteCapability};
use tracing::debug;

use crate::dom::{Declaration, HostDom, style};
use crate::paint::StyleVariableSet;
use crate::routes::RouteCapabilityMatcher;

const DROP_SHADOW: &str = "4px 4px 5px 0px rgba(0,0,0,0.5)";
const INSET_SHADOW: &str = "inset 4px 4px 5px rgba(0,0,0,0.5)";

fn var(preference: Preference) -> String {
    format!("var({})", preference.css_variable())
}

fn wall_declarations() -> [Declaration; 1] {
    [Declaration::new("background", var(Preference::WallColor))]
}

fn grid_declarations() -> [Declaration; 1] {
    [Declaration::important(
        "grid-template-columns",
        format!("repeat({}, minmax(0, 1fr))", var(Preference::CountPerRow)),
    )]
}

/// How a pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationOutcome {
    /// No primary content region yet; the host has not rendered
    NotRendered,
    /// Route is not wall-color eligible; nothing touched
    Ineligible,
    Decorated,
}

/// Summary of one decoration pass, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationReport {
    pub path: String,
    pub capability: RouteCapability,
    pub outcome: DecorationOutcome,
    /// Nodes whose inline style was written
    pub styled: usize,
    /// Optional anchors that were absent on this pass
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct DomDecorator {
    anchors: AnchorSelectors,
    matcher: RouteCapabilityMatcher,
}

impl Default for DomDecorator {
    fn default() -> Self {
        Self::new(AnchorSelectors::default(), RouteCapabilityMatcher::default())
    }
}

impl DomDecorator {
    pub fn new(anchors: AnchorSelectors, matcher: RouteCapabilityMatcher) -> Self {
        Self { anchors, matcher }
    }

    /// Run one decoration pass over `dom`.
    pub fn decorate<D: HostDom>(&self, dom: &D, variables: &StyleVariableSet) -> DecorationReport {
        let path = dom.location_path();
        let mut pass = Pass {
            dom,
            capability: RouteCapability::NONE,
            styled: 0,
            missing: Vec::new(),
        };

        let Some(main) = dom.query(None, &self.anchors.main) else {
            debug!(%path, "no main region yet, skipping decoration");
            return pass.finish(path, DecorationOutcome::NotRendered);
        };

        pass.capability = self.matcher.classify(&path);
        if !pass.capability.wall_color_eligible {
            debug!(%path, "route not eligible for wall color");
            return pass.finish(path, DecorationOutcome::Ineligible);
        }

        match dom.query(None, &self.anchors.header) {
            Some(header) => pass.write(&header, &wall_declarations()),
            None => pass.missing.push("header"),
        }
        pass.write(&main, &wall_declarations());

        // product detail view
        match dom.query(Some(&main), &self.anchors.hero) {
            Some(hero) => {
                pass.write(&hero, &wall_declarations());
                for image in dom.query_all(Some(&hero), &self.anchors.hero_images) {
                    pass.frame(&image);
                }
            }
            None => pass.missing.push("hero"),
        }

        // recently viewed carousel
        for overlay in dom.query_all(None, &self.anchors.carousel_overlays) {
            pass.frame(&overlay);
        }

        match dom.query(None, &self.anchors.grid) {
            Some(grid) => {
                pass.write(&grid, &grid_declarations());
                debug!(tracks = variables.count_per_row, "grid columns set");
            }
            None => pass.missing.push("grid"),
        }

        for section in dom.query_all(None, &self.anchors.sections) {
            let Some(parent) = dom.parent(&section) else {
                continue;
            };
            pass.write(&parent, &wall_declarations());

            // filter/sort sticky bar
            if let Some(sticky) = dom.query(Some(&parent), &self.anchors.sticky_bar) {
                pass.write(&sticky, &wall_declarations());
            }
            for overlay in dom.query_all(Some(&section), &self.anchors.section_overlays) {
                pass.frame(&overlay);
            }
        }

        pass.finish(path, DecorationOutcome::Decorated)
    }
}

struct Pass<'a, D: HostDom> {
    dom: &'a D,
    capability: RouteCapability,
    styled: usize,
    missing: Vec<&'static str>,
}

impl<D: HostDom> Pass<'_, D> {
    fn write(&mut self, node: &D::Node, declarations: &[Declaration]) {
        let existing = self.dom.inline_style(node);
        let merged = style::merge(existing.as_deref(), declarations);
        if existing.as_deref() != Some(merged.as_str()) {
            self.dom.set_inline_style(node, &merged);
            self.styled += 1;
        }
    }

    /// Drop shadow, plus the mat/border layer when frames are eligible
    fn frame(&mut self, element: &D::Node) {
        let mut declarations = vec![Declaration::important("box-shadow", DROP_SHADOW)];
        if self.capability.frame_color_eligible {
            declarations.push(Declaration::important(
                "background-color",
                var(Preference::FrameColor),
            ));
            declarations.push(Declaration::important("padding", var(Preference::FrameWidth)));
        }
        self.write(element, &declarations);

        if self.capability.frame_color_eligible
            && let Some(child) = self.dom.first_child(element)
        {
            self.write(&child, &[Declaration::important("box-shadow", INSET_SHADOW)]);
        }
    }

    fn finish(self, path: String, outcome: DecorationOutcome) -> DecorationReport {
        if outcome == DecorationOutcome::Decorated {
            debug!(
                %path,
                styled = self.styled,
                missing = ?self.missing,
                frames = self.capability.frame_color_eligible,
                "decoration pass complete"
            );
        }
        DecorationReport {
            path,
            capability: self.capability,
            outcome,
            styled: self.styled,
            missing: self.missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, NodeId};

    struct Page {
        dom: MemoryDom,
        header: NodeId,
        main: NodeId,
        carousel_overlay: NodeId,
        carousel_mat: NodeId,
        grid: NodeId,
        listing: NodeId,
        sticky: NodeId,
        article_overlay: NodeId,
    }

    fn listing_page(path: &str) -> Page {
        let dom = MemoryDom::new();
        dom.set_path(path);
        let body = dom.body();
        let header = dom.append(body, r#"header[role="banner"]"#).unwrap();
        let main = dom.append(body, "main").unwrap();

        let listing = dom.append(main, "div").unwrap();
        let sticky = dom.append(listing, "div.sticky").unwrap();
        let section = dom.append(listing, "section").unwrap();
        let grid = dom.append(section, "div.grid.w-full.gap-4").unwrap();
        let article_overlay = dom.append_path(grid, &["article", "div.absolute"]).unwrap();
        dom.append(article_overlay, "img").unwrap();

        let carousel_overlay = dom
            .append_path(main, &["ul", "li", "article", "div.absolute"])
            .unwrap();
        dom.set_attribute(carousel_overlay, "style", "inset: 0px");
        let carousel_mat = dom.append(carousel_overlay, "img").unwrap();

        Page {
            dom,
            header,
            main,
            carousel_overlay,
            carousel_mat,
            grid,
            listing,
            sticky,
            article_overlay,
        }
    }

    #[test]
    fn listing_page_gets_wall_frames_and_grid() {
        let page = listing_page("/posters-prints/");
        let report = DomDecorator::default().decorate(&page.dom, &StyleVariableSet::default());

        assert_eq!(report.outcome, DecorationOutcome::Decorated);
        for node in [page.header, page.main, page.listing, page.sticky] {
            assert_eq!(
                page.dom.style(node).as_deref(),
                Some("background: var(--gw-wall-color);")
            );
        }
        assert_eq!(
            page.dom.style(page.grid).as_deref(),
            Some("grid-template-columns: repeat(var(--gw-count-per-row), minmax(0, 1fr)) !important;")
        );
        assert_eq!(
            page.dom.style(page.carousel_overlay).as_deref(),
            Some(
                "inset: 0px; box-shadow: 4px 4px 5px 0px rgba(0,0,0,0.5) !important; \
                 background-color: var(--gw-frame-color) !important; \
                 padding: var(--gw-frame-width) !important;"
            )
        );
        assert_eq!(
            page.dom.style(page.carousel_mat).as_deref(),
            Some("box-shadow: inset 4px 4px 5px rgba(0,0,0,0.5) !important;")
        );
        assert!(page.dom.style(page.article_overlay).unwrap().contains("--gw-frame-color"));
        assert_eq!(report.missing, vec!["hero"]);
    }

    #[test]
    fn canvas_page_gets_shadow_without_frame() {
        let page = listing_page("/canvas/xyz");
        DomDecorator::default().decorate(&page.dom, &StyleVariableSet::default());

        let overlay = page.dom.style(page.carousel_overlay).unwrap();
        assert!(overlay.contains("box-shadow: 4px 4px 5px"));
        assert!(!overlay.contains("--gw-frame-color"));
        assert!(!overlay.contains("padding"));
        assert_eq!(page.dom.style(page.carousel_mat), None);
        assert!(page.dom.style(page.main).is_some());
    }

    #[test]
    fn ineligible_route_touches_nothing() {
        let page = listing_page("/checkout");
        let before = page.dom.styled_nodes();
        let report = DomDecorator::default().decorate(&page.dom, &StyleVariableSet::default());

        assert_eq!(report.outcome, DecorationOutcome::Ineligible);
        assert_eq!(report.styled, 0);
        assert_eq!(page.dom.styled_nodes(), before);
    }

    #[test]
    fn missing_main_is_a_no_op() {
        let dom = MemoryDom::new();
        dom.set_path("/new-in/");
        let header = dom.append(dom.body(), r#"header[role="banner"]"#).unwrap();
        let report = DomDecorator::default().decorate(&dom, &StyleVariableSet::default());

        assert_eq!(report.outcome, DecorationOutcome::NotRendered);
        assert_eq!(dom.style(header), None);
    }

    #[test]
    fn decorating_twice_is_idempotent() {
        let page = listing_page("/new-in/");
        let decorator = DomDecorator::default();
        let first_pass = decorator.decorate(&page.dom, &StyleVariableSet::default());
        let first = page.dom.styled_nodes();
        let second_pass = decorator.decorate(&page.dom, &StyleVariableSet::default());
        assert_eq!(page.dom.styled_nodes(), first);
        assert!(first_pass.styled > 0);
        assert_eq!(second_pass.styled, 0, "unchanged styles are not rewritten");
    }

    #[test]
    fn partial_page_still_themes_what_exists() {
        let dom = MemoryDom::new();
        dom.set_path("/wishlist");
        let main = dom.append(dom.body(), "main").unwrap();
        let report = DomDecorator::default().decorate(&dom, &StyleVariableSet::default());

        assert_eq!(report.outcome, DecorationOutcome::Decorated);
        assert_eq!(report.styled, 1);
        assert_eq!(report.missing, vec!["header", "hero", "grid"]);
        assert!(dom.style(main).is_some());
    }

    #[test]
    fn hero_images_get_framed() {
        let dom = MemoryDom::new();
        dom.set_path("/posters-prints/p/abc");
        let main = dom.append(dom.body(), "main").unwrap();
        let hero = dom.append(main, "div.bg-brand-300").unwrap();
        let link = dom.append(hero, "a").unwrap();
        let img = dom.append_path(link, &["span", "img"]).unwrap();
        let mat = dom.append(img, "span").unwrap();

        DomDecorator::default().decorate(&dom, &StyleVariableSet::default());

        assert_eq!(
            dom.style(hero).as_deref(),
            Some("background: var(--gw-wall-color);")
        );
        assert!(dom.style(img).unwrap().contains("padding: var(--gw-frame-width) !important"));
        assert!(dom.style(mat).unwrap().starts_with("box-shadow: inset"));
    }

    #[test]
    fn replaced_nodes_are_found_fresh() {
        let page = listing_page("/new-in/");
        let decorator = DomDecorator::default();
        decorator.decorate(&page.dom, &StyleVariableSet::default());

        // host re-renders its main region
        page.dom.remove(page.main);
        let main = page.dom.append(page.dom.body(), "main").unwrap();
        decorator.decorate(&page.dom, &StyleVariableSet::default());

        assert!(page.dom.style(main).is_some());
    }
}
