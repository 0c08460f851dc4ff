//! Shared preference and configuration types for Gallery Wall
//!
//! This crate contains the serializable types shared between the platform-neutral
//! engine (gallery-wall-core), the browser content script (gallery-wall-extension)
//! and the developer CLI. It has no platform code.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// A validated `#rrggbb` color as produced by an HTML color input.
///
/// Three-digit shorthand (`#abc`) is expanded on parse and the result is
/// always lowercase, so two equal colors always serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse a hex color string (e.g., "#ff0000", "ff0000" or "#f00")
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => return None,
        };
        Some(Self(format!("#{}", expanded.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid hex color '{value}'"))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preferences
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_WALL_COLOR: &str = "#e3e3e3";
pub const DEFAULT_FRAME_COLOR: &str = "#000000";
pub const DEFAULT_FRAME_WIDTH: u8 = 5;
pub const DEFAULT_COUNT_PER_ROW: u8 = 4;

/// Frame width in pixels
pub const FRAME_WIDTH_RANGE: RangeInclusive<u8> = 0..=20;
/// Grid tracks per row
pub const COUNT_PER_ROW_RANGE: RangeInclusive<u8> = 0..=10;

/// One of the four user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preference {
    WallColor,
    FrameColor,
    FrameWidth,
    CountPerRow,
}

impl Preference {
    pub const ALL: [Preference; 4] = [
        Preference::WallColor,
        Preference::FrameColor,
        Preference::FrameWidth,
        Preference::CountPerRow,
    ];

    /// Key used in durable per-origin storage
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::WallColor => "wallColor",
            Self::FrameColor => "frameColor",
            Self::FrameWidth => "frameWidth",
            Self::CountPerRow => "countPerRow",
        }
    }

    /// Custom property this preference is projected onto
    pub fn css_variable(&self) -> &'static str {
        match self {
            Self::WallColor => "--gw-wall-color",
            Self::FrameColor => "--gw-frame-color",
            Self::FrameWidth => "--gw-frame-width",
            Self::CountPerRow => "--gw-count-per-row",
        }
    }

    /// Valid range for numeric preferences, `None` for colors
    pub fn bounds(&self) -> Option<RangeInclusive<u8>> {
        match self {
            Self::FrameWidth => Some(FRAME_WIDTH_RANGE),
            Self::CountPerRow => Some(COUNT_PER_ROW_RANGE),
            Self::WallColor | Self::FrameColor => None,
        }
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.storage_key() == key)
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// A typed preference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Color(HexColor),
    Number(u8),
}

impl PreferenceValue {
    /// Literal string form written to storage (hex color or decimal integer)
    pub fn to_storage_string(&self) -> String {
        match self {
            Self::Color(color) => color.to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Snapshot of all four preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSet {
    pub wall_color: HexColor,
    pub frame_color: HexColor,
    pub frame_width: u8,
    pub count_per_row: u8,
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            wall_color: HexColor(DEFAULT_WALL_COLOR.to_string()),
            frame_color: HexColor(DEFAULT_FRAME_COLOR.to_string()),
            frame_width: DEFAULT_FRAME_WIDTH,
            count_per_row: DEFAULT_COUNT_PER_ROW,
        }
    }
}

impl PreferenceSet {
    pub fn get(&self, preference: Preference) -> PreferenceValue {
        match preference {
            Preference::WallColor => PreferenceValue::Color(self.wall_color.clone()),
            Preference::FrameColor => PreferenceValue::Color(self.frame_color.clone()),
            Preference::FrameWidth => PreferenceValue::Number(self.frame_width),
            Preference::CountPerRow => PreferenceValue::Number(self.count_per_row),
        }
    }

    /// Store a value. Returns false (and leaves the set unchanged) when the
    /// value kind does not match the preference.
    pub fn set(&mut self, preference: Preference, value: PreferenceValue) -> bool {
        match (preference, value) {
            (Preference::WallColor, PreferenceValue::Color(c)) => self.wall_color = c,
            (Preference::FrameColor, PreferenceValue::Color(c)) => self.frame_color = c,
            (Preference::FrameWidth, PreferenceValue::Number(n)) => self.frame_width = n,
            (Preference::CountPerRow, PreferenceValue::Number(n)) => self.count_per_row = n,
            _ => return false,
        }
        true
    }
}

/// A user-driven change coming from the settings panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreferenceEdit {
    WallColor { value: String },
    FrameColor { value: String },
    /// Absolute value, clamped into range
    FrameWidth { value: i32 },
    /// Absolute value, clamped into range
    CountPerRow { value: i32 },
    /// Increment/decrement; rejected if the result would leave the range
    Step { preference: Preference, delta: i32 },
}

// ─────────────────────────────────────────────────────────────────────────────
// Route Capability
// ─────────────────────────────────────────────────────────────────────────────

/// Which overrides are legal on the current page type.
///
/// Frame eligibility is computed from its own keyword list; it does not
/// imply wall eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCapability {
    pub wall_color_eligible: bool,
    pub frame_color_eligible: bool,
}

impl RouteCapability {
    pub const NONE: RouteCapability = RouteCapability {
        wall_color_eligible: false,
        frame_color_eligible: false,
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Message delivered by the extension background process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine Config
// ─────────────────────────────────────────────────────────────────────────────

/// What to do with a pending decoration pass when another route change arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RearmPolicy {
    /// Leave earlier timers running; every pass executes
    #[default]
    Overlap,
    /// Cancel the pending timer before arming a new one
    Debounce,
}

/// Path keywords that make a route eligible for each override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteKeywords {
    #[serde(default = "default_wall_color_routes")]
    pub wall_color: Vec<String>,
    #[serde(default = "default_frame_color_routes")]
    pub frame_color: Vec<String>,
}

fn default_wall_color_routes() -> Vec<String> {
    [
        "posters-prints",
        "new-in",
        "wishlist",
        "special-offer",
        "canvas",
        "frames",
        "home",
    ]
    .map(String::from)
    .to_vec()
}

fn default_frame_color_routes() -> Vec<String> {
    ["posters-prints", "new-in", "special-offer", "wishlist"]
        .map(String::from)
        .to_vec()
}

impl Default for RouteKeywords {
    fn default() -> Self {
        Self {
            wall_color: default_wall_color_routes(),
            frame_color: default_frame_color_routes(),
        }
    }
}

/// Selectors for the host-page anchors the decorator touches.
///
/// These track the host's markup and break silently when it is redesigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSelectors {
    #[serde(default = "default_header")]
    pub header: String,
    #[serde(default = "default_main")]
    pub main: String,
    /// Product-detail hero block, searched inside `main`
    #[serde(default = "default_hero")]
    pub hero: String,
    /// Framed images, searched inside the hero block
    #[serde(default = "default_hero_images")]
    pub hero_images: String,
    /// "Recently viewed" carousel overlays, searched document-wide
    #[serde(default = "default_carousel_overlays")]
    pub carousel_overlays: String,
    #[serde(default = "default_grid")]
    pub grid: String,
    #[serde(default = "default_sections")]
    pub sections: String,
    /// Filter/sort bar, searched inside each section's parent
    #[serde(default = "default_sticky_bar")]
    pub sticky_bar: String,
    /// Article overlays, searched inside each section
    #[serde(default = "default_section_overlays")]
    pub section_overlays: String,
}

fn default_header() -> String {
    r#"header[role="banner"]"#.to_string()
}
fn default_main() -> String {
    "main".to_string()
}
fn default_hero() -> String {
    "div.bg-brand-300".to_string()
}
fn default_hero_images() -> String {
    "a > span > img".to_string()
}
fn default_carousel_overlays() -> String {
    "ul > li article div.absolute".to_string()
}
fn default_grid() -> String {
    ".grid.w-full.gap-4".to_string()
}
fn default_sections() -> String {
    "section".to_string()
}
fn default_sticky_bar() -> String {
    "div.sticky".to_string()
}
fn default_section_overlays() -> String {
    "article div.absolute".to_string()
}

impl Default for AnchorSelectors {
    fn default() -> Self {
        Self {
            header: default_header(),
            main: default_main(),
            hero: default_hero(),
            hero_images: default_hero_images(),
            carousel_overlays: default_carousel_overlays(),
            grid: default_grid(),
            sections: default_sections(),
            sticky_bar: default_sticky_bar(),
            section_overlays: default_section_overlays(),
        }
    }
}

impl AnchorSelectors {
    /// All selectors with their config field names
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("header", &self.header),
            ("main", &self.main),
            ("hero", &self.hero),
            ("hero_images", &self.hero_images),
            ("carousel_overlays", &self.carousel_overlays),
            ("grid", &self.grid),
            ("sections", &self.sections),
            ("sticky_bar", &self.sticky_bar),
            ("section_overlays", &self.section_overlays),
        ]
    }
}

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 3000;
pub const DEFAULT_ROUTE_CHANGED_SIGNAL: &str = "changedTab";

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_route_changed_signal() -> String {
    DEFAULT_ROUTE_CHANGED_SIGNAL.to_string()
}

fn default_sites() -> Vec<String> {
    ["desenio.com", "desenio.ca", "desenio.co.uk", "desenio.eu"]
        .map(String::from)
        .to_vec()
}

/// Engine configuration: timing, route keywords, anchor selectors and site scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Wait after activation or route change before decorating
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default)]
    pub rearm: RearmPolicy,
    /// `message` value that signals an in-place navigation
    #[serde(default = "default_route_changed_signal")]
    pub route_changed_signal: String,
    /// Domains the engine activates on (subdomains included)
    #[serde(default = "default_sites")]
    pub sites: Vec<String>,
    #[serde(default)]
    pub routes: RouteKeywords,
    #[serde(default)]
    pub anchors: AnchorSelectors,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            rearm: RearmPolicy::default(),
            route_changed_signal: default_route_changed_signal(),
            routes: RouteKeywords::default(),
            anchors: AnchorSelectors::default(),
            sites: default_sites(),
        }
    }
}
