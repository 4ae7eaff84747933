//! Univariate polynomials in Bernstein form on `[0, 1]`.
//!
//! Used to restrict implicit surface equations to a line or a rational curve
//! and extract the real roots inside the curve's parameter interval.

/// A polynomial `Σ c_i · B_i^n(t)` in Bernstein basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Bernstein {
    coeffs: Vec<f64>,
}

const MAX_DEPTH: u32 = 48;

#[allow(clippy::cast_precision_loss)]
fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

impl Bernstein {
    /// Creates a polynomial from its Bernstein coefficients.
    ///
    /// An empty coefficient list is treated as the zero constant.
    #[must_use]
    pub fn new(coeffs: Vec<f64>) -> Self {
        if coeffs.is_empty() {
            return Self { coeffs: vec![0.0] };
        }
        Self { coeffs }
    }

    /// Linear polynomial from `a` at `t = 0` to `b` at `t = 1`.
    #[must_use]
    pub fn linear(a: f64, b: f64) -> Self {
        Self { coeffs: vec![a, b] }
    }

    /// Constant polynomial.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            coeffs: vec![value],
        }
    }

    /// Polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Bernstein coefficients.
    #[must_use]
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Evaluates with de Casteljau's algorithm.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let mut work = self.coeffs.clone();
        let n = work.len();
        for level in 1..n {
            for i in 0..n - level {
                work[i] = (1.0 - t) * work[i] + t * work[i + 1];
            }
        }
        work[0]
    }

    /// Product of two polynomials; the degree is the sum of the degrees.
    #[must_use]
    pub fn product(&self, other: &Self) -> Self {
        let m = self.degree();
        let n = other.degree();
        let mut coeffs = vec![0.0; m + n + 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            let wi = binomial(m, i);
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += wi * binomial(n, j) * a * b;
            }
        }
        for (k, c) in coeffs.iter_mut().enumerate() {
            *c /= binomial(m + n, k);
        }
        Self { coeffs }
    }

    /// Raises the degree by one without changing the polynomial.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn elevate(&self) -> Self {
        let n = self.degree() + 1;
        let mut coeffs = Vec::with_capacity(n + 1);
        coeffs.push(self.coeffs[0]);
        for i in 1..n {
            let f = i as f64 / n as f64;
            coeffs.push(f * self.coeffs[i - 1] + (1.0 - f) * self.coeffs[i]);
        }
        coeffs.push(self.coeffs[n - 1]);
        Self { coeffs }
    }

    fn elevated_to(&self, degree: usize) -> Self {
        let mut p = self.clone();
        while p.degree() < degree {
            p = p.elevate();
        }
        p
    }

    /// Sum of two polynomials, elevating the lower-degree one as needed.
    #[must_use]
    pub fn sum(&self, other: &Self) -> Self {
        let degree = self.degree().max(other.degree());
        let a = self.elevated_to(degree);
        let b = other.elevated_to(degree);
        Self {
            coeffs: a.coeffs.iter().zip(&b.coeffs).map(|(x, y)| x + y).collect(),
        }
    }

    /// Multiplies every coefficient by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coeffs: self.coeffs.iter().map(|c| c * factor).collect(),
        }
    }

    /// Splits at `t`, returning the polynomials over `[0, t]` and `[t, 1]`,
    /// each reparameterized to `[0, 1]`.
    #[must_use]
    pub fn subdivide(&self, t: f64) -> (Self, Self) {
        let n = self.coeffs.len();
        let mut work = self.coeffs.clone();
        let mut left = Vec::with_capacity(n);
        let mut right = vec![0.0; n];
        left.push(work[0]);
        right[n - 1] = work[n - 1];
        for level in 1..n {
            for i in 0..n - level {
                work[i] = (1.0 - t) * work[i] + t * work[i + 1];
            }
            left.push(work[0]);
            right[n - 1 - level] = work[n - 1 - level];
        }
        (Self { coeffs: left }, Self { coeffs: right })
    }

    /// Real roots in `[0, 1]`, sorted ascending.
    ///
    /// Uses Bernstein subdivision: an interval whose coefficients share one
    /// sign holds no root, one sign variation with a sign change between the
    /// endpoints is refined by bisection. `tol` is the parameter resolution
    /// used to merge clustered roots.
    #[must_use]
    pub fn roots(&self, tol: f64) -> Vec<f64> {
        let scale = self.coeffs.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
        if scale == 0.0 {
            return Vec::new();
        }
        let zero = scale * 1e-14;
        let mut roots = Vec::new();
        collect_roots(self, 0.0, 1.0, zero, tol, 0, &mut roots);
        if self.coeffs[0].abs() <= zero {
            roots.push(0.0);
        }
        if self.coeffs[self.coeffs.len() - 1].abs() <= zero {
            roots.push(1.0);
        }
        roots.sort_by(f64::total_cmp);
        roots.dedup_by(|a, b| (*a - *b).abs() <= tol);
        roots
    }
}

fn sign_variations(coeffs: &[f64], zero: f64) -> usize {
    let mut count = 0;
    let mut last = 0.0_f64;
    for &c in coeffs {
        if c.abs() <= zero {
            continue;
        }
        if last != 0.0 && c.signum() != last.signum() {
            count += 1;
        }
        last = c;
    }
    count
}

fn collect_roots(
    poly: &Bernstein,
    a: f64,
    b: f64,
    zero: f64,
    tol: f64,
    depth: u32,
    roots: &mut Vec<f64>,
) {
    let variations = sign_variations(&poly.coeffs, zero);
    if variations == 0 {
        return;
    }
    let first = poly.coeffs[0];
    let last = poly.coeffs[poly.coeffs.len() - 1];
    if variations == 1 && first.abs() > zero && last.abs() > zero && first * last < 0.0 {
        roots.push(a + (b - a) * bisect(poly, tol / (b - a).max(f64::MIN_POSITIVE)));
        return;
    }
    if depth >= MAX_DEPTH || b - a < tol {
        let mid = poly.evaluate(0.5);
        if mid.abs() <= zero.max(1e-9 * poly.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()))) {
            roots.push(0.5 * (a + b));
        }
        return;
    }
    let (left, right) = poly.subdivide(0.5);
    let mid = 0.5 * (a + b);
    if right.coeffs[0].abs() <= zero {
        roots.push(mid);
    }
    collect_roots(&left, a, mid, zero, tol, depth + 1, roots);
    collect_roots(&right, mid, b, zero, tol, depth + 1, roots);
}

/// Bisection on `[0, 1]` for a polynomial with a sign change between its ends.
fn bisect(poly: &Bernstein, tol: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = 1.0;
    let f_lo = poly.evaluate(lo);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = poly.evaluate(mid);
        if f_mid == 0.0 {
            return mid;
        }
        if (f_mid > 0.0) == (f_lo > 0.0) {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < tol.max(1e-15) {
            break;
        }
    }
    0.5 * (lo + hi)
}
