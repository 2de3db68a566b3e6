//! The six perturbation kernels and their parameter bags.

/// Which of the six kernels a [`PerturbationParams`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerturbationKind {
    /// Gaussian bump, one-shot.
    Impulse,
    /// Directional linear gradient over a disk, decaying over `duration` steps.
    Shear,
    /// Radial sinusoid with exponential damping, decaying over time.
    Wave,
    /// Rotation of concentric rings, one-shot.
    Vortex,
    /// High-frequency noise along a branching crack, decaying over time.
    Fracture,
    /// Translation of field values by a small vector, decaying over `duration` steps.
    Drift,
}

/// Rotation sense for [`VortexParams`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationDirection {
    /// Counter-clockwise.
    Clockwise,
    /// Clockwise.
    CounterClockwise,
}

/// Parameters for the one-shot [`PerturbationKind::Impulse`] kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpulseParams {
    /// Peak added value at the centre.
    pub intensity: f32,
    /// Nominal bump radius in cells.
    pub radius: f32,
    /// Controls the bump's Gaussian width: `sigma = radius / decay`.
    pub decay: f32,
}

/// Parameters for the residual [`PerturbationKind::Shear`] kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShearParams {
    /// Peak gradient magnitude.
    pub magnitude: f32,
    /// Shear direction, degrees from the positive x-axis.
    pub angle_deg: f32,
    /// Number of steps the residual is re-applied and decayed over.
    pub duration: u32,
    /// Radius of the affected disk, in cells.
    pub radius: f32,
}

/// Parameters for the residual [`PerturbationKind::Wave`] kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveParams {
    /// Peak amplitude at the origin.
    pub amplitude: f32,
    /// Angular frequency of the sinusoid.
    pub frequency: f32,
    /// Spatial wavelength in cells.
    pub wavelength: f32,
    /// Per-step multiplicative damping factor, `(0, 1]`.
    pub damping: f32,
}

/// Parameters for the one-shot [`PerturbationKind::Vortex`] kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VortexParams {
    /// Angular velocity, radians per ring step.
    pub angular_velocity: f32,
    /// Affected radius, in cells.
    pub radius: f32,
    /// Rotation sense.
    pub direction: RotationDirection,
}

/// Parameters for the residual [`PerturbationKind::Fracture`] kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractureParams {
    /// Peak noise amplitude along the crack.
    pub strength: f32,
    /// Additional per-cell jitter amplitude.
    pub noise: f32,
    /// Per-step multiplicative decay of the crack's reach and strength.
    pub propagation_rate: f32,
}

/// Parameters for the residual [`PerturbationKind::Drift`] kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftParams {
    /// Overall translation magnitude multiplier.
    pub magnitude: f32,
    /// Translation vector, x component (cells per step).
    pub vector_x: f32,
    /// Translation vector, y component (cells per step).
    pub vector_y: f32,
    /// Number of steps the residual is re-applied and decayed over.
    pub duration: u32,
}

/// The parameters for any one of the six kernels, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PerturbationParams {
    /// See [`ImpulseParams`].
    Impulse(ImpulseParams),
    /// See [`ShearParams`].
    Shear(ShearParams),
    /// See [`WaveParams`].
    Wave(WaveParams),
    /// See [`VortexParams`].
    Vortex(VortexParams),
    /// See [`FractureParams`].
    Fracture(FractureParams),
    /// See [`DriftParams`].
    Drift(DriftParams),
}

impl PerturbationParams {
    /// The [`PerturbationKind`] this parameter bag carries.
    pub fn kind(&self) -> PerturbationKind {
        match self {
            PerturbationParams::Impulse(_) => PerturbationKind::Impulse,
            PerturbationParams::Shear(_) => PerturbationKind::Shear,
            PerturbationParams::Wave(_) => PerturbationKind::Wave,
            PerturbationParams::Vortex(_) => PerturbationKind::Vortex,
            PerturbationParams::Fracture(_) => PerturbationKind::Fracture,
            PerturbationParams::Drift(_) => PerturbationKind::Drift,
        }
    }
}
