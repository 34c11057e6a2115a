//! # Compare-Exchange Kernel
//!
//! The two passes every variant runs. `cells` is a working slice whose
//! pair offsets line up with global parity (index 0 is even).
//!
//! ```text
//! even pass:  (0,1) (2,3) (4,5) ...
//! odd pass:     (1,2) (3,4) (5,6) ...
//! ```
//!
//! Both passes are branchless (`min`/`max`) so they vectorize.

/// Orders `lo <= hi`. Returns true if they were inverted.
#[inline(always)]
pub fn compare_exchange(lo: &mut i16, hi: &mut i16) -> bool {
    let (a, b) = (*lo, *hi);
    *lo = a.min(b);
    *hi = a.max(b);
    a > b
}

/// Orders every even-offset pair. Activity is not reported.
#[inline]
pub fn even_pass(cells: &mut [i16]) {
    for pair in cells.chunks_exact_mut(2) {
        if let [lo, hi] = pair {
            compare_exchange(lo, hi);
        }
    }
}

/// Orders every odd-offset pair. Returns true if any pair was inverted.
#[inline]
pub fn odd_pass(cells: &mut [i16]) -> bool {
    let Some(tail) = cells.get_mut(1..) else {
        return false;
    };
    let mut swapped = false;
    for pair in tail.chunks_exact_mut(2) {
        if let [lo, hi] = pair {
            swapped |= compare_exchange(lo, hi);
        }
    }
    swapped
}
