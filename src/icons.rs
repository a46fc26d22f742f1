//! Closed icon sets.
//!
//! Service icons are a fixed list of symbolic names; anything else renders as
//! [`ServiceIcon::Hammer`]. Social links carry either a CSS class token or an
//! image URL.

use std::fmt;
use std::str::FromStr;

use crate::validate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceIcon {
    #[default]
    Hammer,
    Palette,
    Brush,
    Wrench,
    Scissors,
    PaintBucket,
    Settings,
    Star,
    Heart,
    Shield,
    Award,
    Crown,
    Gem,
    Sparkles,
    Zap,
    Tool,
    Screwdriver,
    Drill,
}

impl ServiceIcon {
    pub const ALL: [ServiceIcon; 18] = [
        ServiceIcon::Hammer,
        ServiceIcon::Palette,
        ServiceIcon::Brush,
        ServiceIcon::Wrench,
        ServiceIcon::Scissors,
        ServiceIcon::PaintBucket,
        ServiceIcon::Settings,
        ServiceIcon::Star,
        ServiceIcon::Heart,
        ServiceIcon::Shield,
        ServiceIcon::Award,
        ServiceIcon::Crown,
        ServiceIcon::Gem,
        ServiceIcon::Sparkles,
        ServiceIcon::Zap,
        ServiceIcon::Tool,
        ServiceIcon::Screwdriver,
        ServiceIcon::Drill,
    ];

    /// Stored name of the icon.
    pub fn name(&self) -> &'static str {
        match self {
            ServiceIcon::Hammer => "Hammer",
            ServiceIcon::Palette => "Palette",
            ServiceIcon::Brush => "Brush",
            ServiceIcon::Wrench => "Wrench",
            ServiceIcon::Scissors => "Scissors",
            ServiceIcon::PaintBucket => "PaintBucket",
            ServiceIcon::Settings => "Settings",
            ServiceIcon::Star => "Star",
            ServiceIcon::Heart => "Heart",
            ServiceIcon::Shield => "Shield",
            ServiceIcon::Award => "Award",
            ServiceIcon::Crown => "Crown",
            ServiceIcon::Gem => "Gem",
            ServiceIcon::Sparkles => "Sparkles",
            ServiceIcon::Zap => "Zap",
            ServiceIcon::Tool => "Tool",
            ServiceIcon::Screwdriver => "Screwdriver",
            ServiceIcon::Drill => "Drill",
        }
    }

    /// Glyph used by the server-rendered page.
    pub fn symbol(&self) -> &'static str {
        match self {
            ServiceIcon::Hammer => "🔨",
            ServiceIcon::Palette => "🎨",
            ServiceIcon::Brush => "🖌",
            ServiceIcon::Wrench => "🔧",
            ServiceIcon::Scissors => "✂",
            ServiceIcon::PaintBucket => "🪣",
            ServiceIcon::Settings => "⚙",
            ServiceIcon::Star => "★",
            ServiceIcon::Heart => "♥",
            ServiceIcon::Shield => "🛡",
            ServiceIcon::Award => "🏅",
            ServiceIcon::Crown => "👑",
            ServiceIcon::Gem => "💎",
            ServiceIcon::Sparkles => "✨",
            ServiceIcon::Zap => "⚡",
            ServiceIcon::Tool => "🛠",
            ServiceIcon::Screwdriver => "🪛",
            ServiceIcon::Drill => "🪚",
        }
    }

    /// Exact lookup, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|icon| icon.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Lookup with fallback to the default icon.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }
}

impl fmt::Display for ServiceIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceIcon {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::UnknownIcon(s.to_string()))
    }
}

/// How a social link's icon is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialIcon<'a> {
    /// Icon-font class list, e.g. `fab fa-telegram`.
    Class(&'a str),
    /// Image to show instead of a font glyph.
    Image(&'a str),
    None,
}

impl<'a> SocialIcon<'a> {
    pub fn classify(icon: &'a str) -> Self {
        let icon = icon.trim();
        if icon.is_empty() {
            SocialIcon::None
        } else if icon.starts_with("http://")
            || icon.starts_with("https://")
            || icon.starts_with('/')
        {
            SocialIcon::Image(icon)
        } else {
            SocialIcon::Class(icon)
        }
    }
}

/// Platforms offered when adding a social link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocialPreset {
    pub name: &'static str,
    pub icon: &'static str,
    pub domain: &'static str,
}

pub const SOCIAL_PRESETS: [SocialPreset; 5] = [
    SocialPreset {
        name: "Вконтакте",
        icon: "fab fa-vk",
        domain: "vk.com",
    },
    SocialPreset {
        name: "Instagram",
        icon: "fab fa-instagram",
        domain: "instagram.com",
    },
    SocialPreset {
        name: "Telegram",
        icon: "fab fa-telegram",
        domain: "t.me",
    },
    SocialPreset {
        name: "WhatsApp",
        icon: "fab fa-whatsapp",
        domain: "wa.me",
    },
    SocialPreset {
        name: "Facebook",
        icon: "fab fa-facebook",
        domain: "facebook.com",
    },
];

impl SocialPreset {
    /// Finds a preset by display name or domain, ignoring case.
    pub fn find(key: &str) -> Option<&'static SocialPreset> {
        let key = key.trim().to_lowercase();
        SOCIAL_PRESETS
            .iter()
            .find(|p| p.name.to_lowercase() == key || p.domain == key)
    }

    /// Keeps `url` when it already points at the platform, otherwise returns
    /// the platform's root URL.
    pub fn url_for(&self, url: &str) -> String {
        if url.contains(self.domain) {
            url.to_string()
        } else {
            format!("https://{}/", self.domain)
        }
    }
}
