//! Bilateral trade protocol between players.
//!
//! An offer is a one-way state machine: `pending` transitions to exactly
//! one of `completed`, `rejected`, `cancelled`, `expired`, or `failed`,
//! and nothing ever leaves those. The swap itself is atomic - both sides'
//! affordability is re-validated at acceptance time and both debits and
//! credits are applied together or not at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::economy::Stockpile;
use crate::player::{Player, PlayerId};

/// Unique identifier for trade offers.
pub type TradeId = Uuid;

/// How long an offer stays open, in simulation seconds.
pub const TRADE_TTL: f64 = 24.0 * 60.0 * 60.0;

/// Lifecycle state of a trade offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TradeStatus {
    Pending,
    Completed,
    Rejected,
    Cancelled,
    Expired,
    Failed,
}

/// A resource-for-resource offer between two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOffer {
    /// Unique id.
    pub id: TradeId,
    /// Creator.
    pub from_player_id: PlayerId,
    /// Intended recipient.
    pub to_player_id: PlayerId,
    /// What the creator gives.
    pub offer: Stockpile,
    /// What the creator wants in return.
    pub request: Stockpile,
    /// Lifecycle state.
    pub status: TradeStatus,
    /// Simulation time of creation, seconds.
    pub created_at: f64,
    /// Simulation time after which the offer expires, seconds.
    pub expires_at: f64,
}

/// Reasons a trade operation can be refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    /// No offer with that id.
    #[error("Trade offer not found")]
    OfferNotFound,

    /// One of the counterparties has left the game.
    #[error("One of the players was not found")]
    PlayerNotFound,

    /// Only the recipient may accept or reject.
    #[error("You are not the recipient of this offer")]
    NotRecipient,

    /// Only the creator may cancel.
    #[error("You are not the creator of this offer")]
    NotCreator,

    /// The offer already left the pending state.
    #[error("The offer is already {0:?}")]
    NotPending(TradeStatus),

    /// The offer expired before acceptance.
    #[error("The offer has expired")]
    Expired,

    /// The creator can no longer cover the offered resources.
    #[error("The offering player no longer has enough {resource}")]
    CreatorInsufficient {
        /// Missing resource.
        resource: &'static str,
    },

    /// The recipient cannot cover the requested resources.
    #[error("You do not have enough {resource}")]
    RecipientInsufficient {
        /// Missing resource.
        resource: &'static str,
    },
}

/// The trade system: open offers plus per-player history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeSystem {
    offers: HashMap<TradeId, TradeOffer>,
    history: HashMap<PlayerId, Vec<TradeOffer>>,
}

impl TradeSystem {
    /// Create an empty trade system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new offer.
    ///
    /// The creator must currently afford `offer`; balances are *not*
    /// escrowed and both sides are re-validated at acceptance.
    pub fn create_offer(
        &mut self,
        players: &HashMap<PlayerId, Player>,
        from: PlayerId,
        to: PlayerId,
        offer: Stockpile,
        request: Stockpile,
        now: f64,
    ) -> Result<TradeOffer, TradeError> {
        let from_player = players.get(&from).ok_or(TradeError::PlayerNotFound)?;
        players.get(&to).ok_or(TradeError::PlayerNotFound)?;

        if let Some((kind, _, _)) = from_player.resources.first_shortfall(&offer) {
            return Err(TradeError::CreatorInsufficient {
                resource: kind.as_str(),
            });
        }

        let trade = TradeOffer {
            id: Uuid::new_v4(),
            from_player_id: from,
            to_player_id: to,
            offer,
            request,
            status: TradeStatus::Pending,
            created_at: now,
            expires_at: now + TRADE_TTL,
        };
        self.offers.insert(trade.id, trade.clone());
        tracing::debug!(trade = %trade.id, %from, %to, "Trade offer created");
        Ok(trade)
    }

    /// Accept an offer as its recipient.
    ///
    /// Re-validates both sides' current affordability; a failed re-check
    /// marks the offer `failed` and leaves both wallets untouched. On
    /// success the swap is applied atomically and the offer completes.
    pub fn accept_offer(
        &mut self,
        players: &mut HashMap<PlayerId, Player>,
        trade_id: TradeId,
        by: PlayerId,
        now: f64,
    ) -> Result<TradeOffer, TradeError> {
        let trade = self
            .offers
            .get_mut(&trade_id)
            .ok_or(TradeError::OfferNotFound)?;

        if trade.to_player_id != by {
            return Err(TradeError::NotRecipient);
        }
        if trade.status != TradeStatus::Pending {
            return Err(TradeError::NotPending(trade.status));
        }
        if trade.expires_at < now {
            trade.status = TradeStatus::Expired;
            return Err(TradeError::Expired);
        }

        let from = trade.from_player_id;
        let to = trade.to_player_id;
        if !players.contains_key(&from) || !players.contains_key(&to) {
            trade.status = TradeStatus::Failed;
            return Err(TradeError::PlayerNotFound);
        }

        // Re-check both wallets before touching either.
        if let Some((kind, _, _)) = players[&from].resources.first_shortfall(&trade.offer) {
            trade.status = TradeStatus::Failed;
            return Err(TradeError::CreatorInsufficient {
                resource: kind.as_str(),
            });
        }
        if let Some((kind, _, _)) = players[&to].resources.first_shortfall(&trade.request) {
            trade.status = TradeStatus::Failed;
            return Err(TradeError::RecipientInsufficient {
                resource: kind.as_str(),
            });
        }

        let (offer, request) = (trade.offer, trade.request);
        if let Some(from_player) = players.get_mut(&from) {
            from_player.resources.debit_all(&offer);
            from_player.resources.credit_all(&request);
        }
        if let Some(to_player) = players.get_mut(&to) {
            to_player.resources.debit_all(&request);
            to_player.resources.credit_all(&offer);
        }

        trade.status = TradeStatus::Completed;
        let completed = trade.clone();
        self.record_history(&completed);
        tracing::debug!(trade = %trade_id, "Trade completed");
        Ok(completed)
    }

    /// Reject a pending offer as its recipient.
    pub fn reject_offer(
        &mut self,
        trade_id: TradeId,
        by: PlayerId,
    ) -> Result<TradeOffer, TradeError> {
        let trade = self
            .offers
            .get_mut(&trade_id)
            .ok_or(TradeError::OfferNotFound)?;
        if trade.to_player_id != by {
            return Err(TradeError::NotRecipient);
        }
        if trade.status != TradeStatus::Pending {
            return Err(TradeError::NotPending(trade.status));
        }
        trade.status = TradeStatus::Rejected;
        Ok(trade.clone())
    }

    /// Cancel a pending offer as its creator.
    pub fn cancel_offer(
        &mut self,
        trade_id: TradeId,
        by: PlayerId,
    ) -> Result<TradeOffer, TradeError> {
        let trade = self
            .offers
            .get_mut(&trade_id)
            .ok_or(TradeError::OfferNotFound)?;
        if trade.from_player_id != by {
            return Err(TradeError::NotCreator);
        }
        if trade.status != TradeStatus::Pending {
            return Err(TradeError::NotPending(trade.status));
        }
        trade.status = TradeStatus::Cancelled;
        Ok(trade.clone())
    }

    /// Expire every pending offer past its deadline.
    ///
    /// Returns the offers that flipped this sweep so both parties can be
    /// notified.
    pub fn expire_stale(&mut self, now: f64) -> Vec<TradeOffer> {
        let mut expired = Vec::new();
        for trade in self.offers.values_mut() {
            if trade.status == TradeStatus::Pending && trade.expires_at < now {
                trade.status = TradeStatus::Expired;
                expired.push(trade.clone());
            }
        }
        expired
    }

    /// Look up an offer by id.
    #[must_use]
    pub fn offer(&self, trade_id: TradeId) -> Option<&TradeOffer> {
        self.offers.get(&trade_id)
    }

    /// Pending offers involving a player, as creator or recipient.
    #[must_use]
    pub fn pending_offers_for(&self, player: PlayerId) -> Vec<&TradeOffer> {
        self.offers
            .values()
            .filter(|t| {
                t.status == TradeStatus::Pending
                    && (t.from_player_id == player || t.to_player_id == player)
            })
            .collect()
    }

    /// Completed-trade history of a player.
    #[must_use]
    pub fn history_for(&self, player: PlayerId) -> &[TradeOffer] {
        self.history.get(&player).map_or(&[], Vec::as_slice)
    }

    fn record_history(&mut self, trade: &TradeOffer) {
        self.history
            .entry(trade.from_player_id)
            .or_default()
            .push(trade.clone());
        self.history
            .entry(trade.to_player_id)
            .or_default()
            .push(trade.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_players() -> (HashMap<PlayerId, Player>, PlayerId, PlayerId) {
        let a = Player::new(Uuid::new_v4(), "a", (0.0, 0.0), "#FF0000".into());
        let b = Player::new(Uuid::new_v4(), "b", (0.0, 0.0), "#0000FF".into());
        let (ida, idb) = (a.id, b.id);
        let mut players = HashMap::new();
        players.insert(ida, a);
        players.insert(idb, b);
        (players, ida, idb)
    }

    #[test]
    fn test_swap_is_atomic_and_complete() {
        let (mut players, a, b) = two_players();
        let mut trades = TradeSystem::new();

        // a gives 100 wood for 50 gold. Starting wallets: 200w / 100g each.
        let trade = trades
            .create_offer(
                &players,
                a,
                b,
                Stockpile::cost(0.0, 100.0, 0.0, 0.0),
                Stockpile::cost(0.0, 0.0, 0.0, 50.0),
                0.0,
            )
            .unwrap();

        let completed = trades.accept_offer(&mut players, trade.id, b, 1.0).unwrap();
        assert_eq!(completed.status, TradeStatus::Completed);
        assert_eq!(players[&a].resources.wood, 100.0);
        assert_eq!(players[&a].resources.gold, 150.0);
        assert_eq!(players[&b].resources.wood, 300.0);
        assert_eq!(players[&b].resources.gold, 50.0);
    }

    #[test]
    fn test_accept_is_idempotent() {
        let (mut players, a, b) = two_players();
        let mut trades = TradeSystem::new();
        let trade = trades
            .create_offer(
                &players,
                a,
                b,
                Stockpile::cost(0.0, 10.0, 0.0, 0.0),
                Stockpile::EMPTY,
                0.0,
            )
            .unwrap();

        trades.accept_offer(&mut players, trade.id, b, 1.0).unwrap();
        let wood_after = players[&b].resources.wood;

        let err = trades
            .accept_offer(&mut players, trade.id, b, 2.0)
            .unwrap_err();
        assert_eq!(err, TradeError::NotPending(TradeStatus::Completed));
        assert_eq!(players[&b].resources.wood, wood_after);
    }

    #[test]
    fn test_recipient_shortfall_fails_offer_without_mutation() {
        let (mut players, a, b) = two_players();
        let mut trades = TradeSystem::new();

        // b only has 100 gold but a asks for 500.
        let trade = trades
            .create_offer(
                &players,
                a,
                b,
                Stockpile::cost(0.0, 100.0, 0.0, 0.0),
                Stockpile::cost(0.0, 0.0, 0.0, 500.0),
                0.0,
            )
            .unwrap();

        let err = trades
            .accept_offer(&mut players, trade.id, b, 1.0)
            .unwrap_err();
        assert_eq!(err, TradeError::RecipientInsufficient { resource: "gold" });
        assert_eq!(
            trades.pending_offers_for(a).len(),
            0,
            "failed offer is no longer pending"
        );
        assert_eq!(players[&a].resources.wood, 200.0);
        assert_eq!(players[&b].resources.gold, 100.0);
    }

    #[test]
    fn test_creator_spent_down_fails_offer() {
        let (mut players, a, b) = two_players();
        let mut trades = TradeSystem::new();
        let trade = trades
            .create_offer(
                &players,
                a,
                b,
                Stockpile::cost(0.0, 150.0, 0.0, 0.0),
                Stockpile::EMPTY,
                0.0,
            )
            .unwrap();

        // a spends wood after creating the offer.
        players.get_mut(&a).unwrap().resources.drain(crate::economy::ResourceKind::Wood, 120.0);

        let err = trades
            .accept_offer(&mut players, trade.id, b, 1.0)
            .unwrap_err();
        assert_eq!(err, TradeError::CreatorInsufficient { resource: "wood" });
    }

    #[test]
    fn test_only_recipient_accepts_only_creator_cancels() {
        let (mut players, a, b) = two_players();
        let mut trades = TradeSystem::new();
        let trade = trades
            .create_offer(&players, a, b, Stockpile::EMPTY, Stockpile::EMPTY, 0.0)
            .unwrap();

        assert_eq!(
            trades.accept_offer(&mut players, trade.id, a, 1.0),
            Err(TradeError::NotRecipient)
        );
        assert_eq!(trades.cancel_offer(trade.id, b), Err(TradeError::NotCreator));
        assert!(trades.cancel_offer(trade.id, a).is_ok());
    }

    #[test]
    fn test_unaffordable_offer_refused_at_creation() {
        let (players, a, b) = two_players();
        let mut trades = TradeSystem::new();
        let err = trades
            .create_offer(
                &players,
                a,
                b,
                Stockpile::cost(0.0, 10_000.0, 0.0, 0.0),
                Stockpile::EMPTY,
                0.0,
            )
            .unwrap_err();
        assert_eq!(err, TradeError::CreatorInsufficient { resource: "wood" });
    }

    #[test]
    fn test_expiry_sweep_flips_once() {
        let (players, a, b) = two_players();
        let mut trades = TradeSystem::new();
        trades
            .create_offer(&players, a, b, Stockpile::EMPTY, Stockpile::EMPTY, 0.0)
            .unwrap();

        assert!(trades.expire_stale(TRADE_TTL / 2.0).is_empty());
        assert_eq!(trades.expire_stale(TRADE_TTL + 1.0).len(), 1);
        assert!(trades.expire_stale(TRADE_TTL + 2.0).is_empty());
    }

    #[test]
    fn test_accept_after_expiry_expires_offer() {
        let (mut players, a, b) = two_players();
        let mut trades = TradeSystem::new();
        let trade = trades
            .create_offer(&players, a, b, Stockpile::EMPTY, Stockpile::EMPTY, 0.0)
            .unwrap();

        let err = trades
            .accept_offer(&mut players, trade.id, b, TRADE_TTL + 1.0)
            .unwrap_err();
        assert_eq!(err, TradeError::Expired);
    }

    #[test]
    fn test_history_records_both_parties() {
        let (mut players, a, b) = two_players();
        let mut trades = TradeSystem::new();
        let trade = trades
            .create_offer(
                &players,
                a,
                b,
                Stockpile::cost(0.0, 10.0, 0.0, 0.0),
                Stockpile::EMPTY,
                0.0,
            )
            .unwrap();
        trades.accept_offer(&mut players, trade.id, b, 1.0).unwrap();

        assert_eq!(trades.history_for(a).len(), 1);
        assert_eq!(trades.history_for(b).len(), 1);
    }
}
