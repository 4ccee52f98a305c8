//! This module defines the properties of generated events

use crate::{
    kinematics::{MomentumVector, VertexPosition},
    numeric::Float,
    species::Species,
};

use prefix_num_ops::real::*;

/// One simulated particle, with its production vertex and kinematics
///
/// Events are immutable once built. They are serialized right away and never
/// retained, the generator streams rather than buffering whole runs.
#[derive(Clone, Debug)]
pub struct Event<'sp> {
    event_id: usize,
    species: &'sp Species,
    momentum: MomentumVector,
    vertex: VertexPosition,
    energy: Float,
}
//
impl<'sp> Event<'sp> {
    /// Build an event, deriving the particle energy from its momentum and mass
    pub fn new(
        event_id: usize,
        species: &'sp Species,
        momentum: MomentumVector,
        vertex: VertexPosition,
    ) -> Self {
        let energy = relativistic_energy(momentum.magnitude(), species.mass);
        Self {
            event_id,
            species,
            momentum,
            vertex,
            energy,
        }
    }

    /// Position of the event in the run, starting at 0
    pub fn event_id(&self) -> usize {
        self.event_id
    }

    /// Species of the outgoing particle
    pub fn species(&self) -> &'sp Species {
        self.species
    }

    /// Momentum of the outgoing particle
    pub fn momentum(&self) -> &MomentumVector {
        &self.momentum
    }

    /// Production vertex of the outgoing particle
    pub fn vertex(&self) -> &VertexPosition {
        &self.vertex
    }

    /// Total energy of the outgoing particle (GeV)
    pub fn energy(&self) -> Float {
        self.energy
    }
}

/// Total energy of a particle in natural units (c = 1)
pub fn relativistic_energy(momentum: Float, mass: Float) -> Float {
    sqrt(momentum.powi(2) + mass.powi(2))
}
