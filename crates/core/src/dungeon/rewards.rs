//! Reward rolls for completed rooms.

use log::{debug, warn};

use crate::rng::FloorRng;
use crate::types::ChestKind;

pub(super) const ITEM_CHEST_PERCENT: u32 = 25;
pub(super) const PICKUP_CHEST_TABLE: &[(ChestKind, u32)] =
    &[(ChestKind::Coin, 70), (ChestKind::Health, 30)];

/// One reward per completed room: an item chest with fixed probability while
/// the item pool lasts, otherwise a weighted coin/health pickup chest.
pub(super) fn roll_reward(rng: &mut FloorRng, item_pool: &mut Vec<String>) -> Option<ChestKind> {
    if rng.percent(ITEM_CHEST_PERCENT) {
        if item_pool.is_empty() {
            warn!("item pool is empty; falling back to a pickup chest");
        } else {
            let index = rng.range_usize(item_pool.len());
            let key = item_pool.remove(index);
            debug!("item chest rolled: {key}");
            return Some(ChestKind::Item);
        }
    }
    roll_pickup_chest(rng, PICKUP_CHEST_TABLE)
}

pub(super) fn roll_pickup_chest(
    rng: &mut FloorRng,
    table: &[(ChestKind, u32)],
) -> Option<ChestKind> {
    let weights: Vec<u32> = table.iter().map(|&(_, weight)| weight).collect();
    match rng.weighted(&weights) {
        Some(index) => Some(table[index].0),
        None => {
            warn!("reward table is empty; no chest spawned");
            None
        }
    }
}
