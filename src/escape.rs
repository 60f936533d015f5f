// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Iterating `z = z² + c` is the only
//! expensive thing this crate does, so before falling into the loop
//! we try three closed-form tests that settle most of the plane at
//! the default zoom: the main cardioid and the period-2 bulb are
//! provably inside the set, and anything farther than 2 from the
//! origin is provably outside it.

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;
const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// True if `c` lies strictly inside the main cardioid.
#[inline]
pub fn in_main_cardioid(c_re: f64, c_im: f64) -> bool {
    let x = c_re - D4;
    let y = c_im * c_im;
    let q = x * x + y;
    q * (q + x) < D4 * y
}

/// True if `c` lies strictly inside the disc of radius 1/4 around -1.
#[inline]
pub fn in_period2_bulb(c_re: f64, c_im: f64) -> bool {
    (c_re + 1.0) * (c_re + 1.0) + c_im * c_im < D16
}

/// Count the iterations it takes `c` to leave the disc of radius 2.
///
/// Returns `max_iter` for points classified as interior, whether by
/// one of the shortcuts or by running out of iterations, and `0` for
/// points that start outside the disc.  Anything in between is the
/// number of steps it took to escape.  `max_iter` must be positive.
#[inline]
pub fn escape(c_re: f64, c_im: f64, max_iter: u32) -> u32 {
    if in_main_cardioid(c_re, c_im) || in_period2_bulb(c_re, c_im) {
        return max_iter;
    }

    if c_re * c_re + c_im * c_im > ESCAPE_RADIUS_SQR {
        return 0;
    }

    let (mut zx, mut zy) = (0.0_f64, 0.0_f64);
    let mut n = 0;
    loop {
        // The escape test looks at the squares of the z we just
        // stepped from, so the count matches a test-then-step loop.
        let zx2 = zx * zx;
        let zy2 = zy * zy;
        zy = 2.0 * zx * zy + c_im;
        zx = zx2 - zy2 + c_re;
        n += 1;
        if zx2 + zy2 > ESCAPE_RADIUS_SQR || n >= max_iter {
            return n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_interior_points() {
        assert_eq!(escape(0.0, 0.0, 100), 100);
        assert_eq!(escape(-1.0, 0.0, 100), 100);
        assert!(in_main_cardioid(0.0, 0.0));
        assert!(in_period2_bulb(-1.0, 0.0));
        assert!(!in_period2_bulb(0.0, 0.0));
    }

    #[test]
    fn far_points_take_no_iterations() {
        assert_eq!(escape(2.5, 0.0, 100), 0);
        assert_eq!(escape(0.0, -2.01, 100), 0);
        assert_eq!(escape(-1.5, 1.5, 100), 0);
    }

    #[test]
    fn boundary_of_the_disc_is_iterated() {
        // Exactly radius 2 is not trivially exterior.
        let n = escape(2.0, 0.0, 100);
        assert!(n > 0 && n < 100);
    }

    #[test]
    fn known_escape_counts() {
        // Orbit of 1 is 0, 1, 2, 5: |2|² = 4 does not count as out,
        // so the escape is seen on the step away from 5.
        assert_eq!(escape(1.0, 0.0, 100), 4);
        // Orbit of 0.5 is 0, 0.5, 0.75, 1.0625, 1.6289, 3.1533.
        assert_eq!(escape(0.5, 0.0, 100), 6);
    }

    #[test]
    fn interior_outside_shortcuts_exhausts_cap() {
        // c = -1.76 sits in the period-3 window on the real axis, far
        // from both shortcut regions, and never escapes.
        assert!(!in_main_cardioid(-1.76, 0.0));
        assert!(!in_period2_bulb(-1.76, 0.0));
        assert_eq!(escape(-1.76, 0.0, 250), 250);
    }

    #[test]
    fn result_never_exceeds_cap() {
        for &m in &[1, 2, 7, 100] {
            for &(re, im) in &[(0.3, 0.5), (-0.75, 0.1), (0.26, 0.0), (-2.0, 0.0)] {
                assert!(escape(re, im, m) <= m);
            }
        }
    }

    #[test]
    fn conjugates_escape_together() {
        for &(re, im) in &[(0.3, 0.5), (-0.75, 0.1), (-0.1, 0.651), (0.37, 0.2)] {
            assert_eq!(escape(re, im, 500), escape(re, -im, 500));
        }
    }
}
