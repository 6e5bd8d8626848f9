use dungeon_core::content::keys;
use dungeon_core::{
    EntityArchetype, FloorParams, GridPos, HeadlessScene, RoomKind, RoomState, WorldRect,
    generate_floor,
};
use dungeon_core::{EntityId, Floor};

fn generated(seed: u64) -> (Floor, HeadlessScene) {
    let params = FloorParams { target_room_count: 8, ..FloorParams::default() };
    let mut scene = HeadlessScene::with_tile_atlas(params.tile_len);
    let floor = generate_floor(&mut scene, params, Some(seed)).expect("generation succeeds");
    (floor, scene)
}

fn first_room_of_kind(floor: &Floor, kind: RoomKind) -> GridPos {
    floor
        .rooms()
        .values()
        .find(|room| room.kind() == kind)
        .map(|room| room.origin())
        .unwrap_or_else(|| panic!("floor should contain a {kind:?} room"))
}

fn step_player_into(floor: &Floor, scene: &mut HeadlessScene, coord: GridPos) {
    let center = floor.room_at(coord).expect("room exists").bounds().center();
    scene.set_player_rect(WorldRect::new(center.x - 6.0, center.y - 6.0, 12.0, 12.0));
}

fn living_enemies(scene: &HeadlessScene) -> Vec<EntityId> {
    scene.living_ids_where(|archetype| matches!(archetype, EntityArchetype::Enemy(_)))
}

fn door_blocker_count(scene: &HeadlessScene) -> usize {
    scene
        .entities
        .values()
        .filter(|entity| matches!(entity.archetype, EntityArchetype::DoorBlocker(_)))
        .count()
}

fn chest_count(scene: &HeadlessScene) -> usize {
    scene
        .entities
        .values()
        .filter(|entity| matches!(entity.archetype, EntityArchetype::Chest(_)))
        .count()
}

#[test]
fn entering_a_dormant_room_activates_and_seals_it() {
    let (mut floor, mut scene) = generated(42);
    let coord = first_room_of_kind(&floor, RoomKind::Normal);
    let expected_enemies: u32 =
        floor.room_at(coord).expect("room exists").enemy_pool().values().sum();
    let expected_doors = floor.room_at(coord).expect("room exists").connections().len();
    let fades_before = scene.fades.len();

    step_player_into(&floor, &mut scene, coord);
    floor.update(&mut scene);

    let room = floor.room_at(coord).expect("room exists");
    assert_eq!(room.state(), RoomState::Activated);
    assert_eq!(living_enemies(&scene).len() as u32, expected_enemies);
    assert_eq!(door_blocker_count(&scene), expected_doors, "every doorway is sealed");
    assert!(
        scene.sounds.iter().any(|(key, _)| key == keys::SOUND_DOORS_CLOSE),
        "the door-close cue fires on activation"
    );
    assert_eq!(scene.fades.len(), fades_before + 1, "the reveal fade starts on activation");
}

#[test]
fn clearing_the_room_completes_it_and_spawns_one_chest() {
    let (mut floor, mut scene) = generated(42);
    let coord = first_room_of_kind(&floor, RoomKind::Normal);

    step_player_into(&floor, &mut scene, coord);
    floor.update(&mut scene);
    for id in living_enemies(&scene) {
        scene.kill(id);
    }
    floor.update(&mut scene);

    let room = floor.room_at(coord).expect("room exists");
    assert_eq!(room.state(), RoomState::Completed);
    assert_eq!(door_blocker_count(&scene), 0, "blockers are removed on completion");
    assert_eq!(chest_count(&scene), 1, "exactly one reward chest");
}

#[test]
fn room_states_never_regress_across_frames() {
    let (mut floor, mut scene) = generated(42);
    let coord = first_room_of_kind(&floor, RoomKind::Normal);

    step_player_into(&floor, &mut scene, coord);
    floor.update(&mut scene);
    let mut previous: Vec<(GridPos, RoomState)> =
        floor.rooms().iter().map(|(&c, room)| (c, room.state())).collect();

    for frame in 0..10 {
        if frame == 3 {
            for id in living_enemies(&scene) {
                scene.kill(id);
            }
        }
        floor.update(&mut scene);
        let current: Vec<(GridPos, RoomState)> =
            floor.rooms().iter().map(|(&c, room)| (c, room.state())).collect();
        for ((coord, before), (_, after)) in previous.iter().zip(current.iter()) {
            assert!(after >= before, "room {coord:?} regressed from {before:?} to {after:?}");
        }
        previous = current;
    }
}

#[test]
fn an_idle_floor_stays_unchanged_frame_over_frame() {
    let (mut floor, mut scene) = generated(7);
    // Park the player outside every room.
    scene.set_player_rect(WorldRect::new(1.0e8, 1.0e8, 12.0, 12.0));

    let before = floor.snapshot();
    for _ in 0..5 {
        floor.update(&mut scene);
    }
    assert_eq!(floor.snapshot(), before);
    assert_eq!(floor.completion_status().0, 1, "only the spawn room is completed");
}

#[test]
fn the_boss_room_seals_and_rewards_like_a_combat_room() {
    let (mut floor, mut scene) = generated(42);
    let coord = first_room_of_kind(&floor, RoomKind::Boss);

    step_player_into(&floor, &mut scene, coord);
    floor.update(&mut scene);

    let room = floor.room_at(coord).expect("boss room");
    assert_eq!(room.state(), RoomState::Activated);
    assert_eq!(living_enemies(&scene).len(), 1, "a lone boss archetype");
    assert_eq!(door_blocker_count(&scene), 1, "the single doorway is sealed");

    for id in living_enemies(&scene) {
        scene.kill(id);
    }
    floor.update(&mut scene);
    assert_eq!(floor.room_at(coord).expect("boss room").state(), RoomState::Completed);
    assert_eq!(chest_count(&scene), 1);
}

#[test]
fn the_upgrade_room_never_locks_the_player_in() {
    let (mut floor, mut scene) = generated(42);
    let coord = first_room_of_kind(&floor, RoomKind::Upgrade);

    step_player_into(&floor, &mut scene, coord);
    floor.update(&mut scene);

    assert_eq!(floor.room_at(coord).expect("upgrade room").state(), RoomState::Activated);
    assert_eq!(living_enemies(&scene).len(), 0);
    assert_eq!(door_blocker_count(&scene), 0);

    let chests_before = chest_count(&scene);
    floor.update(&mut scene);
    assert_eq!(floor.room_at(coord).expect("upgrade room").state(), RoomState::Completed);
    assert_eq!(chest_count(&scene), chests_before, "no reward chest from the shrine room");
}

#[test]
fn force_completion_advances_state_without_spawning() {
    let (mut floor, mut scene) = generated(7);
    let coord = first_room_of_kind(&floor, RoomKind::Normal);
    let entities_before = scene.entities.len();
    let fades_before = scene.fades.len();

    assert!(floor.force_complete_room(coord, &mut scene));

    let room = floor.room_at(coord).expect("room exists");
    assert_eq!(room.state(), RoomState::Completed);
    assert!(room.enemy_pool().is_empty(), "the pool is cleared, not spawned");
    assert_eq!(scene.entities.len(), entities_before, "nothing was instantiated");
    assert_eq!(scene.fades.len(), fades_before + 1, "the reveal fade still triggers");
}

#[test]
fn completion_status_counts_cleared_rooms() {
    let (mut floor, mut scene) = generated(7);
    let total = floor.rooms().len();
    assert_eq!(floor.completion_status(), (1, total));

    let coord = first_room_of_kind(&floor, RoomKind::Normal);
    floor.force_complete_room(coord, &mut scene);
    assert_eq!(floor.completion_status(), (2, total));
}
