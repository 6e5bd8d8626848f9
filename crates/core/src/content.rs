//! Asset keys and fixed content tables shared with the collaborator layers.

pub mod keys {
    pub const IMAGE_TILE_ATLAS: &str = "image_tile_atlas";

    pub const SOUND_DOORS_CLOSE: &str = "sound_doors_close";
    pub const SOUND_DOORS_OPEN: &str = "sound_doors_open";

    pub const ITEM_PHASE_DAGGER: &str = "item_phase_dagger";
    pub const ITEM_IRON_MACE: &str = "item_iron_mace";
    pub const ITEM_BLOOD_AXE: &str = "item_blood_axe";
    pub const ITEM_WARD_CHARM: &str = "item_ward_charm";
    pub const ITEM_HUNTERS_RING: &str = "item_hunters_ring";
}

/// Item keys a fresh run can still roll from reward chests.
pub fn default_item_pool() -> Vec<String> {
    [
        keys::ITEM_PHASE_DAGGER,
        keys::ITEM_IRON_MACE,
        keys::ITEM_BLOOD_AXE,
        keys::ITEM_WARD_CHARM,
        keys::ITEM_HUNTERS_RING,
    ]
    .iter()
    .map(|key| key.to_string())
    .collect()
}
