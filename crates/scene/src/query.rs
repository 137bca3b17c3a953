use std::collections::BTreeSet;

use crate::story::Story;

/// Tag filter over the visible story set.
///
/// A story matches when its primary tag or any secondary tag is selected. An
/// empty selection matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    selected: Vec<String>,
}

impl TagQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Adds `tag` if absent, removes it otherwise.
    pub fn toggle(&mut self, tag: &str) {
        if let Some(pos) = self.selected.iter().position(|t| t == tag) {
            self.selected.remove(pos);
        } else {
            self.selected.push(tag.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn matches(&self, story: &Story) -> bool {
        if self.selected.is_empty() {
            return true;
        }
        self.selected.iter().any(|t| *t == story.tag)
            || story
                .secondary_tags
                .iter()
                .any(|tag| self.selected.iter().any(|t| t == tag))
    }

    pub fn filter(&self, stories: &[Story]) -> Vec<Story> {
        stories.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

/// Sorted unique set of every primary and secondary tag in `stories`.
pub fn all_tags(stories: &[Story]) -> Vec<String> {
    let mut set: BTreeSet<&str> = BTreeSet::new();
    for story in stories {
        if !story.tag.is_empty() {
            set.insert(&story.tag);
        }
        for tag in &story.secondary_tags {
            set.insert(tag);
        }
    }
    set.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::{TagQuery, all_tags};
    use crate::story::Story;
    use foundation::geo::GeoPoint;
    use pretty_assertions::assert_eq;

    fn stories() -> Vec<Story> {
        vec![
            Story::new("a", GeoPoint::new(-79.0, 43.0), "Hopeful").with_secondary_tags(["Flooding"]),
            Story::new("b", GeoPoint::new(-75.0, 45.0), "Fearful"),
            Story::new("c", GeoPoint::new(-123.0, 49.0), "Anxious").with_secondary_tags(["Wildfire"]),
        ]
    }

    fn ids(v: &[Story]) -> Vec<&str> {
        v.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let q = TagQuery::new();
        assert_eq!(ids(&q.filter(&stories())), vec!["a", "b", "c"]);
    }

    #[test]
    fn matches_primary_or_secondary_tags() {
        let q = TagQuery::with_tags(["Fearful", "Wildfire"]);
        assert_eq!(ids(&q.filter(&stories())), vec!["b", "c"]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut q = TagQuery::new();
        q.toggle("Hopeful");
        assert_eq!(q.selected(), ["Hopeful".to_string()]);
        q.toggle("Hopeful");
        assert!(q.is_empty());
    }

    #[test]
    fn all_tags_is_sorted_and_unique() {
        let mut v = stories();
        v.push(Story::new("d", GeoPoint::new(0.0, 0.0), "Hopeful"));
        assert_eq!(
            all_tags(&v),
            vec!["Anxious", "Fearful", "Flooding", "Hopeful", "Wildfire"]
        );
    }
}
