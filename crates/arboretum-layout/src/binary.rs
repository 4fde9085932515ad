use crate::geom::{Tile, tile};

/// Splits `bounds` among `values` by recursive binary partition.
///
/// Each step cuts the current run of values where the prefix sum is closest to half its total and
/// splits the rectangle along its longer side in proportion. Siblings keep their order, so with
/// values sorted descending the largest tiles land top-left. `total` is the parent's aggregate,
/// normally the sum of `values`.
pub fn partition(values: &[f64], total: f64, bounds: Tile) -> Vec<Tile> {
    let n = values.len();
    let mut out = vec![bounds; n];
    if n == 0 {
        return out;
    }
    let mut sums = Vec::with_capacity(n + 1);
    sums.push(0.0);
    let mut acc = 0.0;
    for v in values {
        acc += v;
        sums.push(acc);
    }
    split(&sums, &mut out, 0, n, total, bounds);
    out
}

fn split(sums: &[f64], out: &mut [Tile], i: usize, j: usize, value: f64, b: Tile) {
    if i + 1 >= j {
        out[i] = b;
        return;
    }

    let offset = sums[i];
    let target = value / 2.0 + offset;
    let mut k = i + 1;
    let mut hi = j - 1;
    while k < hi {
        let mid = (k + hi) / 2;
        if sums[mid] < target {
            k = mid + 1;
        } else {
            hi = mid;
        }
    }
    if target - sums[k - 1] < sums[k] - target && i + 1 < k {
        k -= 1;
    }

    let value_left = sums[k] - offset;
    let value_right = value - value_left;
    let (x0, y0, x1, y1) = (b.min.x, b.min.y, b.max.x, b.max.y);

    if x1 - x0 > y1 - y0 {
        let xk = if value != 0.0 {
            (x0 * value_right + x1 * value_left) / value
        } else {
            x1
        };
        split(sums, out, i, k, value_left, tile(x0, y0, xk, y1));
        split(sums, out, k, j, value_right, tile(xk, y0, x1, y1));
    } else {
        let yk = if value != 0.0 {
            (y0 * value_right + y1 * value_left) / value
        } else {
            y1
        };
        split(sums, out, i, k, value_left, tile(x0, y0, x1, yk));
        split(sums, out, k, j, value_right, tile(x0, yk, x1, y1));
    }
}
