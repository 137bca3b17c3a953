/// 8-bit sRGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn hex(v: u32) -> Self {
        Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let s = hex.trim().trim_start_matches('#');
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn rgba_css(self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Slate; used for missing or unknown tags.
pub const DEFAULT_TAG_COLOR: Color = Color::hex(0x94a3b8);

/// Primary emotion tag of a story.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MainTag {
    Anxious,
    Overwhelmed,
    Hopeful,
    Empowered,
    Frustrated,
    Angry,
    Concerned,
    SadGrief,
    Motivated,
    Inspired,
    Determined,
    Resilient,
    Fearful,
    Curious,
}

impl MainTag {
    pub const ALL: [MainTag; 14] = [
        MainTag::Anxious,
        MainTag::Overwhelmed,
        MainTag::Hopeful,
        MainTag::Empowered,
        MainTag::Frustrated,
        MainTag::Angry,
        MainTag::Concerned,
        MainTag::SadGrief,
        MainTag::Motivated,
        MainTag::Inspired,
        MainTag::Determined,
        MainTag::Resilient,
        MainTag::Fearful,
        MainTag::Curious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MainTag::Anxious => "Anxious",
            MainTag::Overwhelmed => "Overwhelmed",
            MainTag::Hopeful => "Hopeful",
            MainTag::Empowered => "Empowered",
            MainTag::Frustrated => "Frustrated",
            MainTag::Angry => "Angry",
            MainTag::Concerned => "Concerned",
            MainTag::SadGrief => "Sad/Grief",
            MainTag::Motivated => "Motivated",
            MainTag::Inspired => "Inspired",
            MainTag::Determined => "Determined",
            MainTag::Resilient => "Resilient",
            MainTag::Fearful => "Fearful",
            MainTag::Curious => "Curious",
        }
    }

    /// Exact, case-sensitive match against the tag label.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn color(self) -> Color {
        match self {
            MainTag::Anxious => Color::hex(0xf59e0b),
            MainTag::Overwhelmed => Color::hex(0x6366f1),
            MainTag::Hopeful => Color::hex(0x22c55e),
            MainTag::Empowered => Color::hex(0x10b981),
            MainTag::Frustrated => Color::hex(0xf97316),
            MainTag::Angry => Color::hex(0xef4444),
            MainTag::Concerned => Color::hex(0x0ea5e9),
            MainTag::SadGrief => Color::hex(0x3b82f6),
            MainTag::Motivated => Color::hex(0x14b8a6),
            MainTag::Inspired => Color::hex(0xa855f7),
            MainTag::Determined => Color::hex(0xeab308),
            MainTag::Resilient => Color::hex(0x16a34a),
            MainTag::Fearful => Color::hex(0x111827),
            MainTag::Curious => Color::hex(0xec4899),
        }
    }
}

/// Sentiment tags from before the emotion palette existed. Older stories
/// still carry them.
fn legacy_tag_color(tag: &str) -> Option<Color> {
    match tag {
        "Positive" => Some(Color::hex(0x22c55e)),
        "Neutral" => Some(Color::hex(0x06b6d4)),
        "Negative" => Some(Color::hex(0xef4444)),
        _ => None,
    }
}

/// Marker color for a primary tag. Pure in `tag`.
pub fn tag_color(tag: &str) -> Color {
    if tag.is_empty() {
        return DEFAULT_TAG_COLOR;
    }
    MainTag::parse(tag)
        .map(MainTag::color)
        .or_else(|| legacy_tag_color(tag))
        .unwrap_or(DEFAULT_TAG_COLOR)
}

/// `rgba(...)` for a hex string; malformed input falls back to the default
/// slate at the requested alpha.
pub fn rgba_css(hex: &str, alpha: f64) -> String {
    Color::from_hex(hex)
        .unwrap_or(DEFAULT_TAG_COLOR)
        .rgba_css(alpha)
}

/// Climate topic carried in a story's secondary tags; selects the marker
/// glyph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TopicTag {
    ExtremeHeat,
    Flooding,
    Wildfire,
    AirQuality,
    FoodAndWater,
    Housing,
    RenewableEnergy,
    Health,
    Equity,
    ClimateAction,
}

impl TopicTag {
    pub const ALL: [TopicTag; 10] = [
        TopicTag::ExtremeHeat,
        TopicTag::Flooding,
        TopicTag::Wildfire,
        TopicTag::AirQuality,
        TopicTag::FoodAndWater,
        TopicTag::Housing,
        TopicTag::RenewableEnergy,
        TopicTag::Health,
        TopicTag::Equity,
        TopicTag::ClimateAction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TopicTag::ExtremeHeat => "Extreme heat",
            TopicTag::Flooding => "Flooding",
            TopicTag::Wildfire => "Wildfire",
            TopicTag::AirQuality => "Air quality",
            TopicTag::FoodAndWater => "Food & water",
            TopicTag::Housing => "Housing",
            TopicTag::RenewableEnergy => "Renewable energy",
            TopicTag::Health => "Health",
            TopicTag::Equity => "Equity",
            TopicTag::ClimateAction => "Climate action",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

pub fn first_topic_tag<S: AsRef<str>>(secondary_tags: &[S]) -> Option<TopicTag> {
    secondary_tags.iter().find_map(|t| TopicTag::parse(t.as_ref()))
}
