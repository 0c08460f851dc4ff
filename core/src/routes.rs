//! Route capability matching
//!
//! Classifies a navigation path by keyword containment. The wall and frame
//! lists are checked independently: canvas, frame and home pages get a themed
//! wall but no themed frames.

use gallery_wall_types::{RouteCapability, RouteKeywords};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCapabilityMatcher {
    wall_color: Vec<String>,
    frame_color: Vec<String>,
}

impl Default for RouteCapabilityMatcher {
    fn default() -> Self {
        Self::new(&RouteKeywords::default())
    }
}

impl RouteCapabilityMatcher {
    /// Blank keywords are dropped; an empty keyword would match every path.
    pub fn new(keywords: &RouteKeywords) -> Self {
        let clean = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect()
        };
        Self {
            wall_color: clean(keywords.wall_color.as_slice()),
            frame_color: clean(keywords.frame_color.as_slice()),
        }
    }

    pub fn classify(&self, path: &str) -> RouteCapability {
        let contains_any = |list: &[String]| list.iter().any(|k| path.contains(k.as_str()));
        RouteCapability {
            wall_color_eligible: contains_any(self.wall_color.as_slice()),
            frame_color_eligible: contains_any(self.frame_color.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(wall: bool, frame: bool) -> RouteCapability {
        RouteCapability {
            wall_color_eligible: wall,
            frame_color_eligible: frame,
        }
    }

    #[test]
    fn listing_pages_get_both() {
        let matcher = RouteCapabilityMatcher::default();
        assert_eq!(matcher.classify("/posters-prints/abc"), cap(true, true));
        assert_eq!(matcher.classify("/new-in/"), cap(true, true));
        assert_eq!(matcher.classify("/wishlist"), cap(true, true));
        assert_eq!(matcher.classify("/special-offer/summer"), cap(true, true));
    }

    #[test]
    fn canvas_frames_home_get_wall_only() {
        let matcher = RouteCapabilityMatcher::default();
        assert_eq!(matcher.classify("/canvas/xyz"), cap(true, false));
        assert_eq!(matcher.classify("/frames/oak"), cap(true, false));
        assert_eq!(matcher.classify("/home"), cap(true, false));
    }

    #[test]
    fn unmatched_paths_get_nothing() {
        let matcher = RouteCapabilityMatcher::default();
        assert_eq!(matcher.classify("/checkout"), RouteCapability::NONE);
        assert_eq!(matcher.classify("/"), RouteCapability::NONE);
        assert_eq!(matcher.classify(""), RouteCapability::NONE);
    }

    #[test]
    fn frame_list_is_independent_of_wall_list() {
        let keywords = RouteKeywords {
            wall_color: vec!["gallery".into()],
            frame_color: vec!["frames-only".into()],
        };
        let matcher = RouteCapabilityMatcher::new(&keywords);
        assert_eq!(matcher.classify("/frames-only/1"), cap(false, true));
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let keywords = RouteKeywords {
            wall_color: vec!["".into(), "  ".into()],
            frame_color: vec![],
        };
        let matcher = RouteCapabilityMatcher::new(&keywords);
        assert_eq!(matcher.classify("/anything"), RouteCapability::NONE);
    }
}
