//! Constrained sampling of the particle kinematics and production vertex
//!
//! The beam envelope has a Gaussian falloff but hard cutoffs on momentum and
//! on the transverse source position. No closed-form bounded distribution
//! captures both, so we sample from the unbounded Gaussians and reject draws
//! which fall outside of the bounds.

use crate::{
    error::{Error, Result},
    numeric::{floats::consts::PI, Float},
    random::RandomSource,
};

use nalgebra::Vector3;
use prefix_num_ops::real::*;

/// Maximal number of rejected draws before we declare a sampling stall.
///
/// The default bounds sit several standard deviations away from the Gaussian
/// means, so the expected number of draws is below 2. Reaching this ceiling
/// means that the random source is broken or that the bounds are absurd.
pub const MAX_SAMPLING_ATTEMPTS: u32 = 10_000;

/// Outgoing particle 3-momentum (GeV/c)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentumVector {
    /// Cartesian components (px, py, pz)
    components: Vector3<Float>,

    /// Magnitude which the components were derived from
    magnitude: Float,
}
//
impl MomentumVector {
    /// Build a momentum from spherical coordinates
    pub fn from_spherical(magnitude: Float, theta: Float, phi: Float) -> Self {
        let sin_theta = sin(theta);
        Self {
            components: Vector3::new(
                magnitude * sin_theta * cos(phi),
                magnitude * sin_theta * sin(phi),
                magnitude * cos(theta),
            ),
            magnitude,
        }
    }

    /// Momentum component along the x axis
    pub fn px(&self) -> Float {
        self.components.x
    }

    /// Momentum component along the y axis
    pub fn py(&self) -> Float {
        self.components.y
    }

    /// Momentum component along the beam axis
    pub fn pz(&self) -> Float {
        self.components.z
    }

    /// Magnitude of the momentum, as it was sampled
    pub fn magnitude(&self) -> Float {
        self.magnitude
    }

    /// Cartesian components as a vector
    pub fn components(&self) -> &Vector3<Float> {
        &self.components
    }
}

/// Production vertex position (mm)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexPosition(Vector3<Float>);
//
impl VertexPosition {
    /// Build a vertex in the source plane (z = 0)
    pub fn planar(vx: Float, vy: Float) -> Self {
        Self(Vector3::new(vx, vy, 0.))
    }

    /// Transverse x coordinate
    pub fn vx(&self) -> Float {
        self.0.x
    }

    /// Transverse y coordinate
    pub fn vy(&self) -> Float {
        self.0.y
    }

    /// Longitudinal coordinate, always 0 for our planar source
    pub fn vz(&self) -> Float {
        self.0.z
    }
}

/// Parameters of the beam envelope
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicsConfig {
    /// Lower bound of the momentum magnitude (GeV/c, inclusive)
    pub min_mom: Float,

    /// Upper bound of the momentum magnitude (GeV/c, inclusive)
    pub max_mom: Float,

    /// Mean of the momentum magnitude distribution (GeV/c)
    pub mom_mean: Float,

    /// Standard deviation of the momentum magnitude distribution (GeV/c)
    pub mom_sigma: Float,

    /// Opening of the forward cone (rad)
    pub theta_max: Float,

    /// Half of the side of the square vertex region (mm)
    pub half_side: Float,

    /// Standard deviation of the transverse vertex coordinates (mm)
    pub vertex_sigma: Float,
}
//
impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            min_mom: 3.0,
            max_mom: 10.0,
            mom_mean: 6.5,
            mom_sigma: 1.0,
            theta_max: 0.030,
            half_side: 150.0,
            vertex_sigma: 50.0,
        }
    }
}

impl KinematicsConfig {
    /// Check that the envelope is consistent and that sampling can succeed
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("min_mom", self.min_mom),
            ("max_mom", self.max_mom),
            ("mom_mean", self.mom_mean),
            ("mom_sigma", self.mom_sigma),
            ("theta_max", self.theta_max),
            ("half_side", self.half_side),
            ("vertex_sigma", self.vertex_sigma),
        ];
        if let Some((name, _)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Error::Config(format!("{name} must be a finite number")));
        }
        if self.min_mom < 0. || self.min_mom > self.max_mom {
            return Err(Error::Config(format!(
                "momentum bounds [{}, {}] are malformed",
                self.min_mom, self.max_mom
            )));
        }
        if self.mom_sigma <= 0. || self.vertex_sigma <= 0. {
            return Err(Error::Config("standard deviations must be positive".into()));
        }
        if self.half_side <= 0. {
            return Err(Error::Config(format!(
                "vertex region half side must be positive, got {}",
                self.half_side
            )));
        }
        // The beam is a forward cone around the z axis
        if self.theta_max <= 0. || self.theta_max > PI / 2. {
            return Err(Error::Config(format!(
                "polar angle limit {} is outside of (0, pi/2]",
                self.theta_max
            )));
        }
        Ok(())
    }
}

/// Generator of beam kinematics
///
/// Holds no random state of its own: every draw comes from the random source
/// passed in, so a seeded source fully determines the output.
pub struct KinematicsSampler {
    cfg: KinematicsConfig,
}
//
impl KinematicsSampler {
    /// Set up sampling within a (validated) beam envelope
    pub fn new(cfg: KinematicsConfig) -> Self {
        Self { cfg }
    }

    /// Draw an outgoing momentum within [min_mom, max_mom], in the forward cone
    pub fn sample_momentum<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<MomentumVector> {
        let cfg = &self.cfg;
        let magnitude = rejection_sample(
            "momentum",
            || rng.gaussian(cfg.mom_mean, cfg.mom_sigma),
            |&p| cfg.min_mom <= p && p <= cfg.max_mom,
        )?;
        let theta = rng.uniform_in(0., cfg.theta_max);
        let phi = rng.uniform_in(0., 2. * PI);
        Ok(MomentumVector::from_spherical(magnitude, theta, phi))
    }

    /// Draw a production vertex within the square source region
    ///
    /// Both coordinates are redrawn whenever either one is out of bounds, which
    /// keeps the accepted pair distributed as the truncated 2D Gaussian.
    pub fn sample_vertex<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<VertexPosition> {
        let cfg = &self.cfg;
        let (vx, vy) = rejection_sample(
            "vertex",
            || {
                let vx = rng.gaussian(0., cfg.vertex_sigma);
                let vy = rng.gaussian(0., cfg.vertex_sigma);
                (vx, vy)
            },
            |&(vx, vy)| abs(vx) <= cfg.half_side && abs(vy) <= cfg.half_side,
        )?;
        Ok(VertexPosition::planar(vx, vy))
    }
}

/// Draw candidates until one is accepted, or give up after
/// MAX_SAMPLING_ATTEMPTS rejections.
///
/// Rejected draws are retried, never clamped, so the accepted values follow
/// the truncated distribution exactly.
fn rejection_sample<T>(
    what: &'static str,
    mut draw: impl FnMut() -> T,
    accept: impl Fn(&T) -> bool,
) -> Result<T> {
    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let candidate = draw();
        if accept(&candidate) {
            return Ok(candidate);
        }
    }
    log::error!("{what} rejection sampling gave up after {MAX_SAMPLING_ATTEMPTS} draws");
    Err(Error::SamplingStall {
        what,
        attempts: MAX_SAMPLING_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{
        scripted::{ScriptedSource, StuckSource},
        RandomGenerator,
    };
    use approx::assert_relative_eq;

    fn sampler() -> KinematicsSampler {
        KinematicsSampler::new(KinematicsConfig::default())
    }

    #[test]
    fn momentum_bounds_hold() {
        let sampler = sampler();
        let mut rng = RandomGenerator::new(42);
        for _ in 0..20_000 {
            let p = sampler.sample_momentum(&mut rng).unwrap();
            assert!((3.0..=10.0).contains(&p.magnitude()));
            assert_relative_eq!(p.components().norm(), p.magnitude(), max_relative = 1e-12);
            // Forward cone of 30 mrad
            assert!(p.pz() >= p.magnitude() * cos(0.030) - 1e-12);
        }
    }

    #[test]
    fn vertex_bounds_hold() {
        let sampler = sampler();
        let mut rng = RandomGenerator::new(43);
        for _ in 0..20_000 {
            let v = sampler.sample_vertex(&mut rng).unwrap();
            assert!(abs(v.vx()) <= 150.);
            assert!(abs(v.vy()) <= 150.);
            assert_eq!(v.vz(), 0.);
        }
    }

    #[test]
    fn out_of_range_momenta_are_redrawn() {
        // Standard normal draws: 6.5 - 4 = 2.5 and 6.5 + 4 = 10.5 are rejected
        let mut rng = ScriptedSource::new(&[0., 0.25], &[-4., 4., 1.]);
        let p = sampler().sample_momentum(&mut rng).unwrap();
        assert_eq!(p.magnitude(), 7.5);
        assert!(rng.gaussians.is_empty());
        // theta = 0 means the momentum is purely longitudinal
        assert_relative_eq!(p.pz(), 7.5);
        assert_relative_eq!(p.px(), 0.);
    }

    #[test]
    fn momentum_bounds_are_inclusive() {
        let mut rng = ScriptedSource::new(&[0., 0.], &[-3.5]);
        let p = sampler().sample_momentum(&mut rng).unwrap();
        assert_eq!(p.magnitude(), 3.0);
    }

    #[test]
    fn spherical_to_cartesian() {
        let p = MomentumVector::from_spherical(2., PI / 2., PI / 2.);
        assert_relative_eq!(p.px(), 0., epsilon = 1e-12);
        assert_relative_eq!(p.py(), 2., epsilon = 1e-12);
        assert_relative_eq!(p.pz(), 0., epsilon = 1e-12);
    }

    #[test]
    fn vertex_pair_is_redrawn_together() {
        // First pair has vx in range but vy out of range: both get redrawn
        let mut rng = ScriptedSource::new(&[], &[1., 3.5, -2., 0.5]);
        let v = sampler().sample_vertex(&mut rng).unwrap();
        assert_eq!(v.vx(), -100.);
        assert_eq!(v.vy(), 25.);
    }

    #[test]
    fn envelope_validation() {
        assert!(KinematicsConfig::default().validate().is_ok());
        let invalid = |tweak: fn(&mut KinematicsConfig)| {
            let mut cfg = KinematicsConfig::default();
            tweak(&mut cfg);
            matches!(cfg.validate(), Err(Error::Config(_)))
        };
        assert!(invalid(|cfg| cfg.min_mom = 11.));
        assert!(invalid(|cfg| cfg.half_side = 0.));
        assert!(invalid(|cfg| cfg.vertex_sigma = -1.));
        assert!(invalid(|cfg| cfg.theta_max = 4.));
        assert!(invalid(|cfg| cfg.theta_max = 2.));
        assert!(invalid(|cfg| cfg.theta_max = 0.));
        assert!(invalid(|cfg| cfg.mom_mean = Float::NAN));
        // Degenerate but consistent bounds are fine
        let mut cfg = KinematicsConfig::default();
        cfg.theta_max = PI / 2.;
        assert!(cfg.validate().is_ok());
        cfg.min_mom = 6.5;
        cfg.max_mom = 6.5;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn broken_source_stalls_instead_of_clamping() {
        let sampler = sampler();
        match sampler.sample_momentum(&mut StuckSource(-1.)) {
            Err(Error::SamplingStall { what, attempts }) => {
                assert_eq!(what, "momentum");
                assert_eq!(attempts, MAX_SAMPLING_ATTEMPTS);
            }
            other => panic!("expected a stall, got {other:?}"),
        }
        assert!(matches!(
            sampler.sample_vertex(&mut StuckSource(1000.)),
            Err(Error::SamplingStall { what: "vertex", .. })
        ));
    }
}
