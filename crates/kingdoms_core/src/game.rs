//! Top-level game orchestrator.
//!
//! [`Game`] owns the world, all players and kingdoms, and the trade,
//! technology, and event systems. The transport layer talks to it through
//! exactly three calls: [`Game::handle_command`] for inbound commands,
//! [`Game::update`] once per tick, and [`Game::state`] for the snapshot
//! broadcast after the tick. Notifications returned from the first two are
//! targeted messages for single players.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::data::{BuildingKind, UnitKind};
use crate::economy::{NodeKind, Stockpile};
use crate::entity::{Entity, EntityId};
use crate::error::{GameError, Result};
use crate::events::{EventNotice, EventSystem};
use crate::kingdom::{Kingdom, KingdomId, KingdomMember};
use crate::player::{Age, Player, PlayerId, PLAYER_COLORS};
use crate::tech::TechnologyTree;
use crate::terrain::TileInfo;
use crate::time_of_day::TimeOfDay;
use crate::trade::{TradeId, TradeOffer, TradeSystem};
use crate::unit::UnitAction;
use crate::weather::WeatherInfo;
use crate::world::World;

/// A player-issued command, as delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Command {
    /// Move units to a destination.
    MoveUnits {
        /// Units to move.
        unit_ids: Vec<EntityId>,
        /// Destination x.
        target_x: f32,
        /// Destination y.
        target_y: f32,
    },
    /// Send units to harvest a resource node.
    GatherResource {
        /// Units to dispatch.
        unit_ids: Vec<EntityId>,
        /// Target node.
        resource_id: EntityId,
    },
    /// Place a building and send builders to it.
    Build {
        /// Builders to dispatch.
        unit_ids: Vec<EntityId>,
        /// Building type.
        building_type: BuildingKind,
        /// Site x.
        x: f32,
        /// Site y.
        y: f32,
    },
    /// Queue a unit for training.
    TrainUnit {
        /// Training building.
        building_id: EntityId,
        /// Unit type to train.
        unit_type: UnitKind,
    },
    /// Order units to attack a target.
    Attack {
        /// Attackers.
        unit_ids: Vec<EntityId>,
        /// Victim entity.
        target_id: EntityId,
    },
    /// Offer a resource trade to another player.
    CreateTradeOffer {
        /// Recipient.
        to_player_id: PlayerId,
        /// Resources given.
        offer: Stockpile,
        /// Resources wanted.
        request: Stockpile,
    },
    /// Accept a pending trade offer.
    AcceptTradeOffer {
        /// Offer id.
        trade_id: TradeId,
    },
    /// Reject a pending trade offer.
    RejectTradeOffer {
        /// Offer id.
        trade_id: TradeId,
    },
    /// Cancel an own pending trade offer.
    CancelTradeOffer {
        /// Offer id.
        trade_id: TradeId,
    },
    /// Research a technology.
    ResearchTechnology {
        /// Technology id.
        tech_id: String,
    },
    /// Advance to the next age.
    AdvanceAge,
}

/// A targeted message for a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notice {
    /// A trade offer arrived.
    NewTradeOffer(TradeOffer),
    /// A trade completed.
    TradeCompleted(TradeOffer),
    /// A trade was rejected by its recipient.
    TradeRejected(TradeOffer),
    /// A trade was cancelled by its creator.
    TradeCancelled(TradeOffer),
    /// A trade expired unanswered.
    TradeExpired(TradeOffer),
    /// The player reached a new age.
    #[serde(rename_all = "camelCase")]
    AgeAdvanced {
        /// The age reached.
        new_age: Age,
        /// Technologies now offered.
        unlocked_technologies: Vec<String>,
        /// Units now trainable.
        unlocked_units: Vec<UnitKind>,
        /// Buildings now constructible.
        unlocked_buildings: Vec<BuildingKind>,
    },
    /// A research finished.
    #[serde(rename_all = "camelCase")]
    ResearchCompleted {
        /// Technology id.
        tech_id: String,
        /// Display name.
        name: String,
    },
    /// A world event touched this player.
    Event(EventNotice),
    /// A command was refused; the reason, in words.
    #[serde(rename_all = "camelCase")]
    CommandFailed {
        /// Human-readable reason.
        message: String,
    },
}

/// A [`Notice`] addressed to a player.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Addressee.
    pub player: PlayerId,
    /// Payload.
    pub notice: Notice,
}

impl Notification {
    fn new(player: PlayerId, notice: Notice) -> Self {
        Self { player, notice }
    }
}

// ---------------------------------------------------------------------------
// Wire views
// ---------------------------------------------------------------------------

/// Player state as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Wallet.
    pub resources: Stockpile,
    /// Current population.
    pub population: u32,
    /// Population cap.
    pub population_cap: u32,
    /// Kingdom membership.
    pub kingdom_id: Option<KingdomId>,
    /// Leadership flag.
    pub is_kingdom_leader: bool,
    /// Current age.
    pub age: Age,
    /// Researched technology ids.
    pub researched: Vec<String>,
    /// Offered technology ids.
    pub available_technologies: Vec<String>,
    /// Trainable unit types.
    pub available_units: Vec<UnitKind>,
    /// Constructible building types.
    pub available_buildings: Vec<BuildingKind>,
}

/// Kingdom state as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KingdomView {
    /// Kingdom id.
    pub id: KingdomId,
    /// Name.
    pub name: String,
    /// Current leader.
    pub leader_id: PlayerId,
    /// Display color.
    pub color: String,
    /// Member count.
    pub member_count: usize,
    /// Membership roll.
    pub members: Vec<KingdomMember>,
}

/// Unit state as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    /// Entity id.
    pub id: EntityId,
    /// Unit type.
    #[serde(rename = "type")]
    pub kind: UnitKind,
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// Owning player.
    pub owner_id: PlayerId,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current action.
    pub current_action: UnitAction,
    /// Carried wallet resource.
    pub carrying_resource: Option<crate::economy::ResourceKind>,
    /// Carried amount.
    pub carrying_amount: f64,
}

/// Building state as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingView {
    /// Entity id.
    pub id: EntityId,
    /// Building type.
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// Owning player.
    pub owner_id: PlayerId,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Footprint edge length.
    pub size: u32,
    /// Whether construction is complete.
    pub is_built: bool,
    /// Accumulated construction effort.
    pub build_progress: f32,
    /// Training queue contents.
    pub training_queue: Vec<UnitKind>,
    /// Progress on the queue head.
    pub training_progress: f32,
}

/// Either mobile or stationary entity view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityView {
    /// A unit.
    Unit(UnitView),
    /// A building.
    Building(BuildingView),
}

/// Resource node state as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    /// Entity id.
    pub id: EntityId,
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// Node flavor.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Remaining amount.
    pub amount: f64,
}

/// Full game state, broadcast identically to every client each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// All players.
    pub players: Vec<PlayerView>,
    /// All kingdoms.
    pub kingdoms: Vec<KingdomView>,
    /// All units and buildings.
    pub entities: Vec<EntityView>,
    /// All resource nodes.
    pub resources: Vec<ResourceView>,
    /// Down-sampled terrain.
    pub terrain: Vec<Vec<TileInfo>>,
    /// Time of day.
    pub time_of_day: TimeOfDay,
    /// Weather.
    pub weather: WeatherInfo,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// The authoritative game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    world: World,
    players: HashMap<PlayerId, Player>,
    kingdoms: HashMap<KingdomId, Kingdom>,
    trade: TradeSystem,
    #[serde(skip)]
    tech: TechnologyTree,
    events: EventSystem,
    /// Total simulation time in seconds.
    elapsed: f64,
    /// Terrain never changes shape after generation, so its wire snapshot
    /// is computed once.
    terrain_snapshot: Vec<Vec<TileInfo>>,
    #[serde(skip, default = "restored_rng")]
    rng: StdRng,
}

fn restored_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

impl Game {
    /// Create a game with a freshly generated world.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let world = World::new(&config);
        let terrain_snapshot = world.terrain_snapshot();
        let events = EventSystem::new(config.seed.wrapping_add(1));
        let rng = StdRng::seed_from_u64(config.seed.wrapping_add(7));

        Self {
            config,
            world,
            players: HashMap::new(),
            kingdoms: HashMap::new(),
            trade: TradeSystem::new(),
            tech: TechnologyTree::new(),
            events,
            elapsed: 0.0,
            terrain_snapshot,
            rng,
        }
    }

    /// Borrow the configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Borrow the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutably borrow the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Borrow a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Mutably borrow a player.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Borrow the kingdoms.
    #[must_use]
    pub fn kingdoms(&self) -> &HashMap<KingdomId, Kingdom> {
        &self.kingdoms
    }

    /// Borrow the trade system.
    #[must_use]
    pub fn trade_system(&self) -> &TradeSystem {
        &self.trade
    }

    /// Pending trade offers involving a player.
    #[must_use]
    pub fn pending_trade_offers(&self, player: PlayerId) -> Vec<&TradeOffer> {
        self.trade.pending_offers_for(player)
    }

    /// Completed-trade history of a player.
    #[must_use]
    pub fn trade_history(&self, player: PlayerId) -> &[TradeOffer] {
        self.trade.history_for(player)
    }

    /// Number of connected players.
    #[must_use]
    pub fn online_players(&self) -> usize {
        self.players.len()
    }

    /// Number of kingdoms.
    #[must_use]
    pub fn kingdom_count(&self) -> usize {
        self.kingdoms.len()
    }

    /// Add a player, founding their town center and starting villagers.
    ///
    /// With a kingdom name the player joins the kingdom of that name, or
    /// founds it (and leads it) if it does not exist yet. A full kingdom is
    /// not joined.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        kingdom_name: Option<&str>,
    ) -> &Player {
        let name = name.into();
        let start = self.world.random_start_position();
        let color = PLAYER_COLORS[self.rng.gen_range(0..PLAYER_COLORS.len())].to_string();
        let mut player = Player::new(id, name.clone(), start, color);

        if let Some(kingdom_name) = kingdom_name {
            self.join_or_found_kingdom(&mut player, kingdom_name, &name);
        }

        self.world
            .entities_mut()
            .insert(Entity::Building(player.found_town_center()));
        for _ in 0..3 {
            let dx = self.rng.gen_range(-20.0..20.0);
            let dy = self.rng.gen_range(-20.0..20.0);
            if let Err(error) =
                self.world
                    .spawn_unit_for(&mut player, UnitKind::Villager, start.0 + dx, start.1 + dy)
            {
                tracing::warn!(%error, "Failed to spawn starting villager");
            }
        }

        tracing::info!(player = %id, name = %name, "Player joined");
        self.players.entry(id).or_insert(player)
    }

    fn join_or_found_kingdom(&mut self, player: &mut Player, kingdom_name: &str, player_name: &str) {
        let existing = self
            .kingdoms
            .values()
            .find(|k| k.name.eq_ignore_ascii_case(kingdom_name))
            .map(|k| k.id);

        if let Some(kingdom_id) = existing {
            let Some(kingdom) = self.kingdoms.get_mut(&kingdom_id) else {
                return;
            };
            if kingdom.member_count() >= self.config.max_players_per_kingdom {
                tracing::warn!(kingdom = %kingdom.name, "Kingdom is full; joining without one");
                return;
            }
            kingdom.add_member(player.id, player_name, self.elapsed);
            player.kingdom_id = Some(kingdom_id);
        } else {
            let color = PLAYER_COLORS[self.rng.gen_range(0..PLAYER_COLORS.len())].to_string();
            let mut kingdom = Kingdom::new(kingdom_name, player.id, color, self.elapsed);
            kingdom.add_member(player.id, player_name, self.elapsed);
            player.kingdom_id = Some(kingdom.id);
            player.is_kingdom_leader = true;
            self.kingdoms.insert(kingdom.id, kingdom);
        }
    }

    /// Remove a player: despawn their entities and free their kingdom
    /// slot. An emptied kingdom is dissolved.
    pub fn remove_player(&mut self, id: PlayerId) {
        self.world.remove_entities_by_owner(id);
        let Some(player) = self.players.remove(&id) else {
            return;
        };

        if let Some(kingdom_id) = player.kingdom_id {
            if let Some(kingdom) = self.kingdoms.get_mut(&kingdom_id) {
                if kingdom.remove_member(id) == 0 {
                    self.kingdoms.remove(&kingdom_id);
                    tracing::info!(kingdom = %kingdom_id, "Kingdom dissolved");
                } else if player.is_kingdom_leader {
                    let new_leader = kingdom.leader;
                    if let Some(promoted) = self.players.get_mut(&new_leader) {
                        promoted.is_kingdom_leader = true;
                    }
                }
            }
        }
        tracing::info!(player = %id, "Player removed");
    }

    /// Route a command from the transport layer.
    ///
    /// Unit batch commands are advisory and produce no reply; economy and
    /// protocol commands answer with targeted notifications, including a
    /// `command_failed` notice carrying the refusal reason.
    pub fn handle_command(&mut self, player_id: PlayerId, command: Command) -> Vec<Notification> {
        if !self.players.contains_key(&player_id) {
            return Vec::new();
        }

        match command {
            Command::MoveUnits {
                unit_ids,
                target_x,
                target_y,
            } => {
                self.world
                    .move_units(&unit_ids, target_x, target_y, player_id);
                Vec::new()
            }
            Command::GatherResource {
                unit_ids,
                resource_id,
            } => {
                self.world.gather_resource(&unit_ids, resource_id, player_id);
                Vec::new()
            }
            Command::Attack {
                unit_ids,
                target_id,
            } => {
                self.world.attack_entity(&unit_ids, target_id, player_id);
                Vec::new()
            }
            Command::Build {
                unit_ids,
                building_type,
                x,
                y,
            } => {
                let Some(player) = self.players.get_mut(&player_id) else {
                    return Vec::new();
                };
                match self
                    .world
                    .build_structure(&unit_ids, building_type, x, y, player_id, player)
                {
                    Ok(_) => Vec::new(),
                    Err(error) => vec![Self::failed(player_id, &error)],
                }
            }
            Command::TrainUnit {
                building_id,
                unit_type,
            } => {
                let Some(player) = self.players.get_mut(&player_id) else {
                    return Vec::new();
                };
                match self
                    .world
                    .train_unit(building_id, unit_type, player_id, player)
                {
                    Ok(()) => Vec::new(),
                    Err(error) => vec![Self::failed(player_id, &error)],
                }
            }
            Command::CreateTradeOffer {
                to_player_id,
                offer,
                request,
            } => match self.trade.create_offer(
                &self.players,
                player_id,
                to_player_id,
                offer,
                request,
                self.elapsed,
            ) {
                Ok(trade) => vec![Notification::new(
                    to_player_id,
                    Notice::NewTradeOffer(trade),
                )],
                Err(error) => vec![Self::failed(player_id, &error)],
            },
            Command::AcceptTradeOffer { trade_id } => {
                match self
                    .trade
                    .accept_offer(&mut self.players, trade_id, player_id, self.elapsed)
                {
                    Ok(trade) => vec![
                        Notification::new(
                            trade.from_player_id,
                            Notice::TradeCompleted(trade.clone()),
                        ),
                        Notification::new(trade.to_player_id, Notice::TradeCompleted(trade)),
                    ],
                    Err(error) => vec![Self::failed(player_id, &error)],
                }
            }
            Command::RejectTradeOffer { trade_id } => {
                match self.trade.reject_offer(trade_id, player_id) {
                    Ok(trade) => vec![Notification::new(
                        trade.from_player_id,
                        Notice::TradeRejected(trade),
                    )],
                    Err(error) => vec![Self::failed(player_id, &error)],
                }
            }
            Command::CancelTradeOffer { trade_id } => {
                match self.trade.cancel_offer(trade_id, player_id) {
                    Ok(trade) => vec![Notification::new(
                        trade.to_player_id,
                        Notice::TradeCancelled(trade),
                    )],
                    Err(error) => vec![Self::failed(player_id, &error)],
                }
            }
            Command::ResearchTechnology { tech_id } => {
                let Some(player) = self.players.get_mut(&player_id) else {
                    return Vec::new();
                };
                match self.tech.research(player, &tech_id) {
                    Ok(tech) => vec![Notification::new(
                        player_id,
                        Notice::ResearchCompleted {
                            tech_id: tech.id.to_string(),
                            name: tech.name.to_string(),
                        },
                    )],
                    Err(error) => vec![Self::failed(player_id, &error)],
                }
            }
            Command::AdvanceAge => match self.advance_age(player_id) {
                Ok(notice) => vec![Notification::new(player_id, notice)],
                Err(error) => vec![Self::failed(player_id, &error)],
            },
        }
    }

    fn failed(player: PlayerId, error: &dyn std::fmt::Display) -> Notification {
        Notification::new(
            player,
            Notice::CommandFailed {
                message: error.to_string(),
            },
        )
    }

    /// Advance a player to the next age.
    ///
    /// Debits the age requirement, unlocks the new era's units, buildings,
    /// and technologies, and reports what was unlocked.
    pub fn advance_age(&mut self, player_id: PlayerId) -> Result<Notice> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let (next, cost) = player.age.next_with_cost().ok_or(GameError::AlreadyMaxAge)?;

        if let Some((resource, required, available)) = player.resources.first_shortfall(&cost) {
            return Err(GameError::InsufficientResources {
                resource: resource.as_str().to_string(),
                required: required as u32,
                available: available as u32,
            });
        }
        player.resources.debit_all(&cost);
        player.age = next;
        player.unlock_for_age(next);
        self.tech.unlock_age_technologies(player, next);

        tracing::info!(player = %player_id, age = next.as_str(), "Age advanced");
        Ok(Notice::AgeAdvanced {
            new_age: next,
            unlocked_technologies: player.available_technologies.clone(),
            unlocked_units: player.available_units.clone(),
            unlocked_buildings: player.available_buildings.clone(),
        })
    }

    /// Advance the whole game by one tick.
    ///
    /// Returns the targeted notifications produced this tick (world events
    /// and trade expiries).
    pub fn update(&mut self, delta_time: f32) -> Vec<Notification> {
        self.elapsed += f64::from(delta_time);

        self.world.update(delta_time, &mut self.players);

        let time = self.world.time_of_day();
        for player in self.players.values_mut() {
            player.update_visibility(&time);
        }

        let mut notifications: Vec<Notification> = self
            .events
            .process(f64::from(delta_time), time.is_day_time, &mut self.players)
            .into_iter()
            .map(|(player, notice)| Notification::new(player, Notice::Event(notice)))
            .collect();

        for trade in self.trade.expire_stale(self.elapsed) {
            notifications.push(Notification::new(
                trade.from_player_id,
                Notice::TradeExpired(trade.clone()),
            ));
            notifications.push(Notification::new(
                trade.to_player_id,
                Notice::TradeExpired(trade),
            ));
        }

        notifications
    }

    /// Full state snapshot, identical for every client.
    #[must_use]
    pub fn state(&self) -> GameState {
        let mut entities = Vec::new();
        let mut resources = Vec::new();
        for id in self.world.entities().sorted_ids() {
            match self.world.entities().get(id) {
                Some(Entity::Unit(unit)) => entities.push(EntityView::Unit(UnitView {
                    id: unit.id,
                    kind: unit.kind,
                    x: unit.x,
                    y: unit.y,
                    owner_id: unit.owner,
                    health: unit.health,
                    max_health: unit.max_health,
                    current_action: unit.action,
                    carrying_resource: unit.carrying,
                    carrying_amount: unit.carrying_amount,
                })),
                Some(Entity::Building(building)) => {
                    entities.push(EntityView::Building(BuildingView {
                        id: building.id,
                        kind: building.kind,
                        x: building.x,
                        y: building.y,
                        owner_id: building.owner,
                        health: building.health,
                        max_health: building.max_health,
                        size: building.size,
                        is_built: building.is_built,
                        build_progress: building.build_progress,
                        training_queue: building.training_queue.iter().copied().collect(),
                        training_progress: building.current_training_progress,
                    }));
                }
                Some(Entity::Resource(node)) => resources.push(ResourceView {
                    id: node.id,
                    x: node.x,
                    y: node.y,
                    kind: node.kind,
                    amount: node.amount,
                }),
                None => {}
            }
        }

        let mut players: Vec<PlayerView> = self.players.values().map(Self::view_of_player).collect();
        players.sort_by_key(|p| p.id);

        let mut kingdoms: Vec<KingdomView> = self
            .kingdoms
            .values()
            .map(|k| {
                let mut members: Vec<KingdomMember> = k.members.values().cloned().collect();
                members.sort_by_key(|m| m.id);
                KingdomView {
                    id: k.id,
                    name: k.name.clone(),
                    leader_id: k.leader,
                    color: k.color.clone(),
                    member_count: k.member_count(),
                    members,
                }
            })
            .collect();
        kingdoms.sort_by_key(|k| k.id);

        GameState {
            players,
            kingdoms,
            entities,
            resources,
            terrain: self.terrain_snapshot.clone(),
            time_of_day: self.world.time_of_day(),
            weather: self.world.weather(),
        }
    }

    /// Wire view of a single player.
    #[must_use]
    pub fn player_view(&self, id: PlayerId) -> Option<PlayerView> {
        self.players.get(&id).map(Self::view_of_player)
    }

    fn view_of_player(p: &Player) -> PlayerView {
        PlayerView {
            id: p.id,
            name: p.name.clone(),
            color: p.color.clone(),
            resources: p.resources,
            population: p.population,
            population_cap: p.population_cap,
            kingdom_id: p.kingdom_id,
            is_kingdom_leader: p.is_kingdom_leader,
            age: p.age,
            researched: p.researched.clone(),
            available_technologies: p.available_technologies.clone(),
            available_units: p.available_units.clone(),
            available_buildings: p.available_buildings.clone(),
        }
    }

    /// Serialize the whole game for persistence or hand-off.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize game: {e}")))
    }

    /// Restore a game from [`Game::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize game: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn small_game() -> Game {
        Game::new(GameConfig::small().with_seed(21))
    }

    #[test]
    fn test_add_player_founds_town_and_villagers() {
        let mut game = small_game();
        let id = Uuid::new_v4();
        game.add_player(id, "alice", None);

        let player = game.player(id).unwrap();
        assert_eq!(player.population, 3);
        assert_eq!(player.resources, Stockpile::cost(200.0, 200.0, 100.0, 100.0));

        let (mut units, mut town_centers) = (0, 0);
        for (_, entity) in game.world().entities().iter() {
            match entity {
                Entity::Unit(u) if u.owner == id => units += 1,
                Entity::Building(b) if b.owner == id => {
                    assert!(b.is_built);
                    town_centers += 1;
                }
                _ => {}
            }
        }
        assert_eq!(units, 3);
        assert_eq!(town_centers, 1);
    }

    #[test]
    fn test_kingdom_founding_and_joining() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        game.add_player(a, "alice", Some("Wessex"));
        game.add_player(b, "bob", Some("wessex"));

        assert_eq!(game.kingdom_count(), 1);
        let kingdom = game.kingdoms().values().next().unwrap();
        assert_eq!(kingdom.member_count(), 2);
        assert_eq!(kingdom.leader, a);
        assert!(game.player(a).unwrap().is_kingdom_leader);
        assert!(!game.player(b).unwrap().is_kingdom_leader);
    }

    #[test]
    fn test_remove_player_dissolves_empty_kingdom() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", Some("Wessex"));
        assert_eq!(game.kingdom_count(), 1);

        game.remove_player(a);
        assert_eq!(game.kingdom_count(), 0);
        assert_eq!(game.online_players(), 0);

        let owned = game
            .world()
            .entities()
            .iter()
            .filter(|(_, e)| e.owner() == Some(a))
            .count();
        assert_eq!(owned, 0);
    }

    #[test]
    fn test_remove_leader_promotes_member() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        game.add_player(a, "alice", Some("Wessex"));
        game.add_player(b, "bob", Some("Wessex"));

        game.remove_player(a);
        assert_eq!(game.kingdom_count(), 1);
        let kingdom = game.kingdoms().values().next().unwrap();
        assert_eq!(kingdom.leader, b);
        assert!(game.player(b).unwrap().is_kingdom_leader);
    }

    #[test]
    fn test_advance_age_debits_and_unlocks() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", None);
        game.player_mut(a).unwrap().resources = Stockpile::cost(600.0, 300.0, 0.0, 0.0);

        let notice = game.advance_age(a).unwrap();
        let Notice::AgeAdvanced {
            new_age,
            unlocked_buildings,
            ..
        } = notice
        else {
            panic!("expected AgeAdvanced");
        };
        assert_eq!(new_age, Age::Feudal);
        assert!(unlocked_buildings.contains(&BuildingKind::Barracks));

        let player = game.player(a).unwrap();
        assert_eq!(player.resources.food, 100.0);
        assert_eq!(player.resources.wood, 100.0);
        assert_eq!(player.age, Age::Feudal);
    }

    #[test]
    fn test_advance_age_refused_without_funds() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", None);

        let err = game.advance_age(a).unwrap_err();
        assert!(matches!(err, GameError::InsufficientResources { .. }));
        assert_eq!(game.player(a).unwrap().age, Age::Initial);
    }

    #[test]
    fn test_advance_age_stops_at_imperial() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", None);
        {
            let player = game.player_mut(a).unwrap();
            player.age = Age::Imperial;
        }
        assert!(matches!(
            game.advance_age(a),
            Err(GameError::AlreadyMaxAge)
        ));
    }

    #[test]
    fn test_handle_command_failure_notifies_issuer() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", None);
        game.player_mut(a).unwrap().resources = Stockpile::EMPTY;

        let unit_ids: Vec<EntityId> = game
            .world()
            .entities()
            .iter()
            .filter_map(|(&id, e)| matches!(e, Entity::Unit(_)).then_some(id))
            .collect();

        let notifications = game.handle_command(
            a,
            Command::Build {
                unit_ids,
                building_type: BuildingKind::House,
                x: game.player(a).unwrap().start_x,
                y: game.player(a).unwrap().start_y,
                },
        );
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].player, a);
        assert!(matches!(
            notifications[0].notice,
            Notice::CommandFailed { .. }
        ));
    }

    #[test]
    fn test_trade_flow_over_commands() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        game.add_player(a, "alice", None);
        game.add_player(b, "bob", None);

        let offered = game.handle_command(
            a,
            Command::CreateTradeOffer {
                to_player_id: b,
                offer: Stockpile::cost(0.0, 50.0, 0.0, 0.0),
                request: Stockpile::cost(0.0, 0.0, 0.0, 25.0),
            },
        );
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].player, b);
        let Notice::NewTradeOffer(ref trade) = offered[0].notice else {
            panic!("expected NewTradeOffer");
        };

        let accepted = game.handle_command(b, Command::AcceptTradeOffer { trade_id: trade.id });
        assert_eq!(accepted.len(), 2);
        assert_eq!(game.player(a).unwrap().resources.wood, 150.0);
        assert_eq!(game.player(a).unwrap().resources.gold, 125.0);
        assert_eq!(game.player(b).unwrap().resources.wood, 250.0);
        assert_eq!(game.player(b).unwrap().resources.gold, 75.0);
    }

    #[test]
    fn test_command_from_unknown_player_ignored() {
        let mut game = small_game();
        let notifications = game.handle_command(Uuid::new_v4(), Command::AdvanceAge);
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_update_refreshes_visibility() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", None);

        game.update(0.05);
        let time = game.world().time_of_day();
        let expected = if time.is_day_time { 10.0 } else { 6.0 };
        assert_eq!(game.player(a).unwrap().visibility_range, expected);
    }

    #[test]
    fn test_state_snapshot_shape() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", Some("Wessex"));
        game.update(0.05);

        let state = game.state();
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.kingdoms.len(), 1);
        assert!(state.entities.len() >= 4);
        assert!(!state.resources.is_empty());
        assert!(!state.terrain.is_empty());

        // The snapshot is plain data; it must serialize to JSON.
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"timeOfDay\""));
        assert!(json.contains("\"isDayTime\""));
    }

    #[test]
    fn test_game_roundtrips_through_bincode() {
        let mut game = small_game();
        let a = Uuid::new_v4();
        game.add_player(a, "alice", Some("Wessex"));
        for _ in 0..10 {
            game.update(0.05);
        }

        let bytes = game.to_bytes().unwrap();
        let restored = Game::from_bytes(&bytes).unwrap();
        assert_eq!(restored.online_players(), 1);
        assert_eq!(restored.kingdom_count(), 1);
        assert_eq!(
            restored.world().entities().len(),
            game.world().entities().len()
        );
    }

    #[test]
    fn test_command_json_wire_shape() {
        let json = r#"{
            "type": "move_units",
            "unitIds": [1, 2, 3],
            "targetX": 100.0,
            "targetY": 50.0
        }"#;
        let command: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            command,
            Command::MoveUnits {
                unit_ids: vec![1, 2, 3],
                target_x: 100.0,
                target_y: 50.0,
            }
        );
    }

    #[test]
    fn test_notice_json_wire_shape() {
        let notice = Notice::CommandFailed {
            message: "Insufficient resources".into(),
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["type"], "command_failed");
        assert_eq!(json["data"]["message"], "Insufficient resources");
    }
}
