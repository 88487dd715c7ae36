//! Island detection over the territory adjacency graph

use rustc_hash::FxHashSet;

use crate::state::{GameState, TerritoryData, TerritoryId};

/// Maximal set of territories connected by adjacency, regardless of owner
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Island {
    pub territories: Vec<TerritoryId>,
    pub total_hex_count: usize,
}

/// Connected components of the territory graph, in territory-id order
pub fn find_islands(state: &GameState) -> Vec<Island> {
    let mut islands = Vec::new();
    let mut visited: FxHashSet<TerritoryId> = FxHashSet::default();

    for territory in &state.territories {
        if !visited.insert(territory.id) {
            continue;
        }

        let mut island = Island::default();
        let mut stack = vec![territory.id];

        while let Some(current) = stack.pop() {
            island.territories.push(current);
            let Some(t) = state.territory(current) else {
                continue;
            };
            island.total_hex_count += t.hexes.len();

            // Reverse so neighbors are visited in ascending order
            for &neighbor in t.neighbors.iter().rev() {
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        islands.push(island);
    }

    islands
}

/// Drop every island but the one with the most hexes.
///
/// Surviving territories are renumbered 0..N in their original order and
/// every cross-reference (ids, neighbor lists, hex index) goes through the
/// same old-to-new table. Returns the original ids of removed territories.
pub fn keep_largest_island_only(state: &mut GameState) -> Vec<TerritoryId> {
    let islands = find_islands(state);
    if islands.len() <= 1 {
        return Vec::new();
    }

    let largest = islands
        .iter()
        .enumerate()
        .fold(0, |best, (i, island)| {
            if island.total_hex_count > islands[best].total_hex_count {
                i
            } else {
                best
            }
        });

    let keep: FxHashSet<TerritoryId> = islands[largest].territories.iter().copied().collect();
    let mut removed: Vec<TerritoryId> = islands
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != largest)
        .flat_map(|(_, island)| island.territories.iter().copied())
        .collect();
    removed.sort_unstable();

    // old id -> new id
    let mut remap: Vec<Option<TerritoryId>> = vec![None; state.territories.len()];
    let mut kept: Vec<TerritoryData> = Vec::with_capacity(keep.len());
    for mut territory in std::mem::take(&mut state.territories) {
        if keep.contains(&territory.id) {
            let new_id = kept.len();
            remap[territory.id] = Some(new_id);
            territory.id = new_id;
            kept.push(territory);
        } else {
            for hex in &territory.hexes {
                state.hex_to_territory.remove(hex);
            }
        }
    }

    let lookup = |old: TerritoryId| remap.get(old).copied().flatten();
    for territory in &mut kept {
        territory.neighbors = territory.neighbors.iter().filter_map(|&n| lookup(n)).collect();
    }
    state.hex_to_territory.retain(|_, id| match lookup(*id) {
        Some(new_id) => {
            *id = new_id;
            true
        }
        None => false,
    });

    state.territories = kept;

    tracing::debug!(
        "Kept island of {} territories, removed {}",
        state.territories.len(),
        removed.len()
    );

    removed
}
