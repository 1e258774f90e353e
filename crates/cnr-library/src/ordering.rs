//! Game list ordering

use crate::models::Game;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort key for game lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOrder {
    #[default]
    Alphabetic,
    CreatedAt,
    MostPlayed,
    RecentlyPlayed,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort games in place
pub fn sort_games(games: &mut [Game], order: GameOrder, direction: SortDirection) {
    games.sort_by(|a, b| {
        let ordering = compare(a, b, order);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare(a: &Game, b: &Game, order: GameOrder) -> Ordering {
    match order {
        GameOrder::Alphabetic => compare_names(&a.name, &b.name),
        GameOrder::CreatedAt => a.created_at.cmp(&b.created_at),
        GameOrder::MostPlayed => a.play_count.cmp(&b.play_count),
        GameOrder::RecentlyPlayed => a.last_played.cmp(&b.last_played),
    }
}

/// Case-insensitive name order, ties broken by the raw name
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
