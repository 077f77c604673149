use crate::core::Measurement;
use rand::Rng;

/// A photon polarization basis.
///
/// BB84 and BBM92 draw from the conjugate pair {rectilinear, diagonal};
/// E91 draws from the full three-basis set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    Rectilinear,
    Diagonal,
    Circular,
}

impl Basis {
    /// Draws uniformly from {rectilinear, diagonal}.
    pub fn random_conjugate<R: Rng + ?Sized>(rng: &mut R) -> Basis {
        if rng.random_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }

    /// Draws uniformly from {rectilinear, diagonal, circular}.
    pub fn random_polarization<R: Rng + ?Sized>(rng: &mut R) -> Basis {
        match rng.random_range(0..3) {
            0 => Basis::Rectilinear,
            1 => Basis::Diagonal,
            _ => Basis::Circular,
        }
    }

    /// The projective measurement reading this basis out.
    pub(crate) fn measurement(self) -> Measurement {
        match self {
            Basis::Rectilinear => Measurement::z_basis(),
            Basis::Diagonal => Measurement::x_basis(),
            Basis::Circular => Measurement::y_basis(),
        }
    }
}
