pub(crate) const EPS: f64 = 1e-12;

#[inline]
pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// `a + t (b - a)`.
#[inline]
pub fn lerp(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    add(a, scale(sub(b, a), t))
}

/// Unit vector along `a`, or `None` for a (numerically) null vector.
pub fn normalize(a: [f64; 3]) -> Option<[f64; 3]> {
    let n = norm(a);
    (n > EPS).then(|| scale(a, 1.0 / n))
}

/// Rotate `p` around the axis through `center` with direction `axis` by
/// `angle` radians (Rodrigues formula). A null axis leaves `p` unchanged.
pub fn rotate_about_axis(p: [f64; 3], center: [f64; 3], axis: [f64; 3], angle: f64) -> [f64; 3] {
    let Some(k) = normalize(axis) else {
        return p;
    };
    let v = sub(p, center);
    let (s, c) = angle.sin_cos();
    let rotated = add(
        add(scale(v, c), scale(cross(k, v), s)),
        scale(k, dot(k, v) * (1.0 - c)),
    );
    add(center, rotated)
}
