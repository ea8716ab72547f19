/*
--------------------------------------------------------------------------------
   Brute-force nearest neighbour search over row-major data
--------------------------------------------------------------------------------
*/

/// Squared Euclidean distance between two rows
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Indices of the `k` rows of `data` (row-major, `ncols` wide) closest to
/// `query`, nearest first.
///
/// Equal distances are ordered by row index. `exclude` removes one row from
/// the candidate set, used when the query is itself a member of `data`.
pub fn k_nearest(
    data: &[f64],
    ncols: usize,
    query: &[f64],
    k: usize,
    exclude: Option<usize>,
) -> Vec<usize> {
    if ncols == 0 {
        return Vec::new();
    }

    let mut distances: Vec<(f64, usize)> = data
        .chunks_exact(ncols)
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .map(|(i, row)| (squared_euclidean(row, query), i))
        .collect();

    distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    distances.truncate(k);
    distances.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_euclidean() {
        assert_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_k_nearest_orders_by_distance() {
        let data = vec![
            0.0, 0.0, //
            5.0, 5.0, //
            1.0, 0.0, //
            0.0, 2.0,
        ];
        let nn = k_nearest(&data, 2, &[0.0, 0.0], 3, None);
        assert_eq!(nn, vec![0, 2, 3]);
    }

    #[test]
    fn test_k_nearest_excludes_self_and_breaks_ties_by_index() {
        let data = vec![
            0.0, //
            1.0, //
            -1.0, //
            3.0,
        ];
        let nn = k_nearest(&data, 1, &[0.0], 2, Some(0));
        assert_eq!(nn, vec![1, 2]);
    }

    #[test]
    fn test_k_nearest_caps_at_available_rows() {
        let data = vec![1.0, 2.0];
        let nn = k_nearest(&data, 1, &[0.0], 5, None);
        assert_eq!(nn.len(), 2);
    }
}
