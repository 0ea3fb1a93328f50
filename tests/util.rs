#![allow(dead_code)]
use line_mesh::{CurveAdapter, CurveError, data::Coordinates, progress::ProgressSink};

/// Build a point set from 2-D points.
pub fn points2(pts: &[[f64; 2]]) -> Coordinates {
    Coordinates::from_points(pts).unwrap()
}

pub fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}

/// Helix `(r cos u, r sin u, pitch u)`.
pub struct Helix {
    pub r: f64,
    pub pitch: f64,
}

impl Helix {
    pub fn curvature(&self) -> f64 {
        self.r / (self.r * self.r + self.pitch * self.pitch)
    }

    pub fn point(&self, u: f64) -> [f64; 3] {
        [self.r * u.cos(), self.r * u.sin(), self.pitch * u]
    }
}

impl CurveAdapter for Helix {
    fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        Ok(us.iter().map(|&u| self.point(u)).collect())
    }

    fn coordinates_1d(&self, points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError> {
        if self.pitch == 0.0 {
            return Err(CurveError::Failed("flat helix".into()));
        }
        Ok(points.iter().map(|p| p[2] / self.pitch).collect())
    }

    fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        Ok(us
            .iter()
            .map(|&u| [-self.r * u.sin(), self.r * u.cos(), self.pitch])
            .collect())
    }

    fn curvatures(&self, us: &[f64]) -> Result<Vec<f64>, CurveError> {
        Ok(vec![self.curvature(); us.len()])
    }
}

/// Circle of radius `r` without curvature support.
pub struct PlainCircle(pub f64);

impl CurveAdapter for PlainCircle {
    fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        Ok(us.iter().map(|&u| [self.0 * u.cos(), self.0 * u.sin(), 0.0]).collect())
    }

    fn coordinates_1d(&self, points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError> {
        Ok(points.iter().map(|p| p[1].atan2(p[0])).collect())
    }

    fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        Ok(us.iter().map(|&u| [-self.0 * u.sin(), self.0 * u.cos(), 0.0]).collect())
    }
}

/// Wraps a curve and fails every inverse mapping.
pub struct NoInverse<C>(pub C);

impl<C: CurveAdapter> CurveAdapter for NoInverse<C> {
    fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        self.0.coordinates_3d(us)
    }

    fn coordinates_1d(&self, _points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError> {
        Err(CurveError::Failed("no inverse mapping".into()))
    }

    fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        self.0.local_bases(us)
    }
}

/// Aborts on the `n`-th poll and records the messages it receives.
#[derive(Default)]
pub struct AbortAfter {
    pub n: usize,
    pub polls: usize,
    pub messages: Vec<String>,
}

impl AbortAfter {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            ..Default::default()
        }
    }
}

impl ProgressSink for AbortAfter {
    fn report(&mut self, _level: u32, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn should_abort(&mut self, progress: f64) -> bool {
        assert!((0.0..=1.0).contains(&progress), "progress {progress}");
        self.polls += 1;
        self.polls == self.n
    }
}
