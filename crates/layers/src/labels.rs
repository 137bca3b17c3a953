use scene::story::Story;

use crate::symbology::{Color, first_topic_tag, tag_color};

/// Writing prompts offered by the submission form. Stories store the chosen
/// prompt as a secondary tag; it is not shown on the card.
pub const STORY_PROMPTS: [&str; 13] = [
    "A moment that stayed with me",
    "A change I've noticed over time",
    "A challenge I'm facing",
    "Something I lost",
    "Something I'm protecting",
    "Something I'm proud of",
    "A solution I believe in",
    "A question I have",
    "Lived experience / One-time event",
    "Personal action I took",
    "Community action",
    "Something I'm worried about",
    "Something that gives me hope",
];

/// Background alpha of the primary tag badge.
pub const BADGE_BACKGROUND_ALPHA: f64 = 0.15;

pub fn is_story_prompt(tag: &str) -> bool {
    let tag = tag.trim();
    STORY_PROMPTS.contains(&tag)
}

/// Secondary tags as shown on the popup card: blanks and prompts removed.
pub fn visible_secondary_tags(story: &Story) -> Vec<&str> {
    story
        .secondary_tags
        .iter()
        .map(String::as_str)
        .filter(|t| !t.trim().is_empty() && !is_story_prompt(t))
        .collect()
}

/// Primary tag badge: text color doubles as border color.
#[derive(Debug, Clone, PartialEq)]
pub struct TagBadge {
    pub label: String,
    pub color: Color,
    pub background: String,
}

impl TagBadge {
    pub fn for_story(story: &Story) -> Option<Self> {
        if !story.has_primary_tag() {
            return None;
        }
        let color = tag_color(&story.tag);
        Some(Self {
            label: story.tag.clone(),
            color,
            background: color.rgba_css(BADGE_BACKGROUND_ALPHA),
        })
    }
}

/// Accessible name for a story marker, e.g.
/// `"Smoke again. Emotion: Anxious. Topic: Wildfire."`.
pub fn marker_aria_label(story: &Story) -> String {
    let mut label = format!("{}.", story.title);
    if !story.tag.is_empty() && story.tag != "-" {
        label.push_str(&format!(" Emotion: {}.", story.tag));
    }
    if let Some(topic) = first_topic_tag(&story.secondary_tags) {
        label.push_str(&format!(" Topic: {}.", topic.as_str()));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::{TagBadge, is_story_prompt, marker_aria_label, visible_secondary_tags};
    use foundation::geo::GeoPoint;
    use scene::story::Story;

    fn story() -> Story {
        Story::new("a", GeoPoint::new(-123.1, 49.3), "Anxious")
            .with_title("Smoke again")
            .with_secondary_tags(["Wildfire", " ", "A question I have", "Health"])
    }

    #[test]
    fn card_hides_prompts_and_blanks() {
        let s = story();
        assert_eq!(visible_secondary_tags(&s), vec!["Wildfire", "Health"]);
        assert!(is_story_prompt(" Community action "));
    }

    #[test]
    fn aria_label_mentions_emotion_and_topic() {
        assert_eq!(
            marker_aria_label(&story()),
            "Smoke again. Emotion: Anxious. Topic: Wildfire."
        );
        let bare = Story::new("b", GeoPoint::new(0.0, 0.0), "-").with_title("Quiet");
        assert_eq!(marker_aria_label(&bare), "Quiet.");
    }

    #[test]
    fn badge_uses_translucent_background() {
        let badge = TagBadge::for_story(&story()).expect("badge");
        assert_eq!(badge.color.to_hex(), "#f59e0b");
        assert_eq!(badge.background, "rgba(245, 158, 11, 0.15)");
        let untagged = Story::new("c", GeoPoint::new(0.0, 0.0), " ");
        assert!(TagBadge::for_story(&untagged).is_none());
    }
}
