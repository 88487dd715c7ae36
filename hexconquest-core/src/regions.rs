//! Contiguous regions: same-owner territories reachable through adjacency

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::state::{GameState, PlayerId, TerritoryId};

/// Connected component of one player's territories
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContiguousRegion {
    /// Territory ids in BFS order
    pub territories: Vec<TerritoryId>,
    pub total_dice: u32,
}

impl ContiguousRegion {
    pub fn size(&self) -> usize {
        self.territories.len()
    }

    pub fn contains(&self, id: TerritoryId) -> bool {
        self.territories.contains(&id)
    }
}

/// Partition a player's territories into connected components.
///
/// Components are discovered in territory-id order, so the result is
/// deterministic for a given state.
pub fn find_contiguous_regions(state: &GameState, player: PlayerId) -> Vec<ContiguousRegion> {
    let mut regions = Vec::new();
    let mut visited: FxHashSet<TerritoryId> = FxHashSet::default();

    for start in state.owned_territories(player) {
        if !visited.insert(start.id) {
            continue;
        }

        let mut region = ContiguousRegion::default();
        let mut queue = VecDeque::from([start.id]);

        while let Some(current) = queue.pop_front() {
            let Some(territory) = state.territory(current) else {
                continue;
            };
            region.territories.push(current);
            region.total_dice += u32::from(territory.dice_count);

            for &neighbor in &territory.neighbors {
                let friendly = state
                    .territory(neighbor)
                    .is_some_and(|t| t.is_owned_by(player));
                if friendly && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        regions.push(region);
    }

    regions
}

/// First region of maximum size
pub fn largest_region(regions: &[ContiguousRegion]) -> Option<&ContiguousRegion> {
    regions
        .iter()
        .fold(None, |best: Option<&ContiguousRegion>, region| match best {
            Some(b) if b.size() >= region.size() => Some(b),
            _ => Some(region),
        })
}

/// Size of the player's largest contiguous region (0 if none)
pub fn largest_region_size(state: &GameState, player: PlayerId) -> usize {
    let regions = find_contiguous_regions(state, player);
    largest_region(&regions).map_or(0, ContiguousRegion::size)
}
