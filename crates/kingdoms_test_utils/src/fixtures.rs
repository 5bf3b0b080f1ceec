//! Test fixtures and helpers.

use uuid::Uuid;

use kingdoms_core::config::GameConfig;
use kingdoms_core::economy::Stockpile;
use kingdoms_core::game::Game;
use kingdoms_core::player::PlayerId;

/// A small, seeded configuration every test can share.
///
/// Same seed, same world: assertions on terrain or node placement are
/// stable across runs.
#[must_use]
pub fn test_config() -> GameConfig {
    GameConfig::small().with_seed(1234)
}

/// A game with `count` players joined and no kingdom affiliations.
#[must_use]
pub fn game_with_players(count: usize) -> (Game, Vec<PlayerId>) {
    let mut game = Game::new(test_config());
    let ids: Vec<PlayerId> = (0..count)
        .map(|i| {
            let id = Uuid::new_v4();
            game.add_player(id, format!("player-{i}"), None);
            id
        })
        .collect();
    (game, ids)
}

/// Set a player's wallet to a known bundle.
///
/// # Panics
///
/// Panics if the player does not exist (tests want that loud).
pub fn set_wallet(game: &mut Game, player: PlayerId, wallet: Stockpile) {
    game.player_mut(player)
        .expect("fixture player must exist")
        .resources = wallet;
}

/// Ids of every unit owned by a player.
#[must_use]
pub fn owned_unit_ids(game: &Game, player: PlayerId) -> Vec<kingdoms_core::entity::EntityId> {
    game.world()
        .entities()
        .iter()
        .filter_map(|(&id, entity)| match entity {
            kingdoms_core::entity::Entity::Unit(unit) if unit.owner == player => Some(id),
            _ => None,
        })
        .collect()
}

/// Remove every seeded resource node so a test controls world contents.
pub fn clear_resource_nodes(game: &mut Game) {
    let ids: Vec<_> = game
        .world()
        .entities()
        .iter()
        .filter_map(|(&id, entity)| {
            matches!(entity, kingdoms_core::entity::Entity::Resource(_)).then_some(id)
        })
        .collect();
    for id in ids {
        game.world_mut().entities_mut().remove(id);
    }
}
