//! Kingdoms - named alliances of players.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::player::PlayerId;

/// Unique identifier for kingdoms.
pub type KingdomId = Uuid;

/// Membership record for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KingdomMember {
    /// Member player id.
    pub id: PlayerId,
    /// Member display name at join time.
    pub name: String,
    /// Simulation time the player joined, in seconds.
    pub joined_at: f64,
}

/// A named grouping of players sharing a color and leadership.
///
/// Invariant: `leader` is always a current member while any member remains.
/// An emptied kingdom is dissolved by the game aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kingdom {
    /// Unique id.
    pub id: KingdomId,
    /// Kingdom name (unique per game, case-insensitive).
    pub name: String,
    /// Current leader.
    pub leader: PlayerId,
    /// Members keyed by player id.
    pub members: HashMap<PlayerId, KingdomMember>,
    /// Display color (hex).
    pub color: String,
    /// Simulation time the kingdom was founded, in seconds.
    pub created_at: f64,
}

impl Kingdom {
    /// Found a new kingdom led by `leader`.
    #[must_use]
    pub fn new(name: impl Into<String>, leader: PlayerId, color: String, created_at: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            leader,
            members: HashMap::new(),
            color,
            created_at,
        }
    }

    /// Add a member.
    pub fn add_member(&mut self, id: PlayerId, name: impl Into<String>, joined_at: f64) {
        self.members.insert(
            id,
            KingdomMember {
                id,
                name: name.into(),
                joined_at,
            },
        );
    }

    /// Remove a member, promoting a remaining member to leader if the
    /// leader left. Returns the number of members left.
    pub fn remove_member(&mut self, id: PlayerId) -> usize {
        self.members.remove(&id);
        if id == self.leader {
            if let Some(&next) = self.members.keys().next() {
                self.leader = next;
            }
        }
        self.members.len()
    }

    /// Number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_promotion_on_leader_exit() {
        let leader = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut kingdom = Kingdom::new("wessex", leader, "#0000FF".into(), 0.0);
        kingdom.add_member(leader, "alfred", 0.0);
        kingdom.add_member(other, "edward", 1.0);

        let remaining = kingdom.remove_member(leader);
        assert_eq!(remaining, 1);
        assert_eq!(kingdom.leader, other);
        assert!(kingdom.members.contains_key(&other));
    }

    #[test]
    fn test_non_leader_exit_keeps_leader() {
        let leader = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut kingdom = Kingdom::new("mercia", leader, "#00FF00".into(), 0.0);
        kingdom.add_member(leader, "offa", 0.0);
        kingdom.add_member(other, "penda", 1.0);

        kingdom.remove_member(other);
        assert_eq!(kingdom.leader, leader);
    }

    #[test]
    fn test_empty_after_last_member() {
        let leader = Uuid::new_v4();
        let mut kingdom = Kingdom::new("northumbria", leader, "#FF0000".into(), 0.0);
        kingdom.add_member(leader, "oswald", 0.0);
        assert_eq!(kingdom.remove_member(leader), 0);
    }
}
