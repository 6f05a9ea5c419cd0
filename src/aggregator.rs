use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::config::TopStoriesConfig;
use crate::parser::StoryItem;
use crate::registry::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryResult {
    pub id: String,
    pub label: String,
    pub stories: Vec<StoryItem>,
}

/// A top story remembers which category it was picked from.
#[derive(Debug, Clone, PartialEq)]
pub struct TopStory {
    pub category_id: String,
    pub category_label: String,
    pub story: StoryItem,
}

/// Newest first; stories without a timestamp go last.
fn by_recency(a: &StoryItem, b: &StoryItem) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Merge the per-source story lists of one category.
///
/// Lists are concatenated in source order, stably sorted by recency and cut to
/// `cap`. With `dedupe_links`, a link seen earlier in the concatenation drops
/// later copies.
pub fn aggregate(
    category: &Category,
    per_source: Vec<Vec<StoryItem>>,
    cap: usize,
    dedupe_links: bool,
) -> CategoryResult {
    let mut seen = HashSet::new();
    let mut stories: Vec<StoryItem> = per_source
        .into_iter()
        .flatten()
        .filter(|story| !dedupe_links || seen.insert(story.link.clone()))
        .collect();

    // sort_by is stable, so ties keep their concatenation order
    stories.sort_by(by_recency);
    stories.truncate(cap);

    CategoryResult {
        id: category.id.clone(),
        label: category.label.clone(),
        stories,
    }
}

/// Pick the freshest stories across all categories.
///
/// Only stories younger than `max_age_hours` at `now` qualify. Each link is
/// used once, each category contributes at most `max_per_category`, and at
/// most `count` stories are returned, newest first.
pub fn top_stories(
    results: &[CategoryResult],
    now: DateTime<Utc>,
    config: &TopStoriesConfig,
) -> Vec<TopStory> {
    // A window reaching past the representable range means no cutoff
    let cutoff = i64::try_from(config.max_age_hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|window| now.checked_sub_signed(window));

    let mut candidates: Vec<TopStory> = results
        .iter()
        .flat_map(|result| {
            result.stories.iter().map(move |story| TopStory {
                category_id: result.id.clone(),
                category_label: result.label.clone(),
                story: story.clone(),
            })
        })
        .filter(|top| match (top.story.published_at, cutoff) {
            (Some(at), Some(cutoff)) => at > cutoff,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .collect();
    candidates.sort_by(|a, b| by_recency(&a.story, &b.story));

    let mut seen_links = HashSet::new();
    let mut per_category: HashMap<String, usize> = HashMap::new();
    let mut picked = Vec::new();

    for candidate in candidates {
        if picked.len() >= config.count {
            break;
        }
        if seen_links.contains(&candidate.story.link) {
            continue;
        }
        let taken = per_category.entry(candidate.category_id.clone()).or_insert(0);
        if *taken >= config.max_per_category {
            continue;
        }

        *taken += 1;
        seen_links.insert(candidate.story.link.clone());
        picked.push(candidate);
    }

    picked
}
