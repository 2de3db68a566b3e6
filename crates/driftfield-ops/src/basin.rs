//! Attractor basin segmentation via greedy ascent.

use std::collections::BTreeSet;

use driftfield_core::Field;

use crate::derived::BASIN_MAGNITUDE_THRESHOLD;

/// A dense basin labelling of the field.
#[derive(Clone, Debug, PartialEq)]
pub struct BasinMap {
    /// Grid edge length.
    pub width: u32,
    /// Grid edge length (square grid: equal to `width`).
    pub height: u32,
    /// Row-major basin id per cell; `-1` means "not in any basin".
    pub labels: Vec<i32>,
    /// Number of distinct basins, i.e. `max(labels) + 1` or `0`.
    pub count: usize,
}

/// Walk every cell to its terminating local maximum (8-neighbourhood,
/// toroidal, strictly-greater ascent, lowest-flat-index tie-break), group by
/// shared terminal, drop basins below the magnitude threshold, and assign
/// dense ids in row-major order of their terminal cell.
pub fn basin_labels(field: &Field) -> BasinMap {
    let size = field.size();
    let n = (size as usize) * (size as usize);
    const UNVISITED: usize = usize::MAX;
    let mut terminal = vec![UNVISITED; n];
    // A terminal with no neighbour strictly below it is indistinguishable
    // from its surroundings (e.g. every cell of a globally constant field)
    // and never forms a basin, regardless of magnitude.
    let mut featureless = vec![false; n];

    for start in 0..n {
        if terminal[start] != UNVISITED {
            continue;
        }
        let mut path = Vec::new();
        let mut cur = start;
        let resolved = loop {
            if terminal[cur] != UNVISITED {
                break terminal[cur];
            }
            if path.contains(&cur) {
                // Defensive: a strictly-ascending walk cannot cycle, but
                // guard against it rather than loop forever.
                break cur;
            }
            path.push(cur);

            let x = (cur % size as usize) as i32;
            let y = (cur / size as usize) as i32;
            let cur_val = field.get_flat(cur);

            let mut best_idx = cur;
            let mut best_val = cur_val;
            let mut has_lower_neighbour = false;
            for dy in -1..=1i32 {
                for dx in -1..=1i32 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nidx = field.index(x + dx, y + dy);
                    let nval = field.get_flat(nidx);
                    if nval < cur_val {
                        has_lower_neighbour = true;
                    }
                    if nval > cur_val && (nval > best_val || (nval == best_val && nidx < best_idx))
                    {
                        best_val = nval;
                        best_idx = nidx;
                    }
                }
            }

            if best_idx == cur {
                if !has_lower_neighbour {
                    featureless[cur] = true;
                }
                break cur;
            }
            cur = best_idx;
        };

        for &idx in &path {
            terminal[idx] = resolved;
        }
    }

    let significant: BTreeSet<usize> = terminal
        .iter()
        .filter(|&&t| !featureless[t] && field.get_flat(t).abs() >= BASIN_MAGNITUDE_THRESHOLD)
        .copied()
        .collect();
    let dense_id: std::collections::HashMap<usize, i32> = significant
        .iter()
        .enumerate()
        .map(|(i, &t)| (t, i as i32))
        .collect();

    let labels: Vec<i32> = terminal
        .iter()
        .map(|&t| *dense_id.get(&t).unwrap_or(&-1))
        .collect();

    BasinMap {
        width: size,
        height: size,
        count: dense_id.len(),
        labels,
    }
}
