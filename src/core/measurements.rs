use crate::core::errors::MeasurementError;
use crate::core::utils;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;

/// A projective measurement on a single qubit.
///
/// Every measurement in this crate is binary: outcome index 0 or 1, with
/// index 1 read as the classical bit 1.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// Projector onto each outcome, in outcome order.
    pub projectors: Vec<Array2<Complex64>>,
    /// Number of qubits the measurement acts on.
    pub num_qubits: usize,
}

impl Measurement {
    pub fn new(projectors: Vec<Array2<Complex64>>) -> Result<Self, MeasurementError> {
        if projectors.is_empty() {
            return Err(MeasurementError::Empty);
        }

        let (rows, cols) = projectors[0].dim();
        if rows != cols || !rows.is_power_of_two() {
            return Err(MeasurementError::InvalidDimensions);
        }
        let num_qubits = rows.trailing_zeros() as usize;

        for p in &projectors {
            if p.dim() != (rows, cols) {
                return Err(MeasurementError::InvalidDimensions);
            }
        }

        if !utils::check_completeness(&projectors, rows) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self {
            projectors,
            num_qubits,
        })
    }

    /// Builds a projective measurement from a list of orthonormal states,
    /// one per outcome.
    pub fn from_orthonormal_states(
        states: &[Array1<Complex64>],
    ) -> Result<Self, MeasurementError> {
        let projectors = states
            .iter()
            .map(|v| utils::outer_product(v, v))
            .collect();
        Self::new(projectors)
    }

    /// Expands each projector to act on `target` within a larger system.
    pub fn expanded_projectors(
        &self,
        num_total_qubits: usize,
        target: usize,
    ) -> Vec<Array2<Complex64>> {
        self.projectors
            .iter()
            .map(|p| utils::expand_operator(num_total_qubits, p, &[target]))
            .collect()
    }

    /// Z basis (computational) -> {|0>, |1>}.
    pub fn z_basis() -> Measurement {
        let v0: Array1<Complex64> = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let v1: Array1<Complex64> = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];

        Measurement::from_orthonormal_states(&[v0, v1]).expect("Error in basis Z")
    }

    /// X basis (Hadamard) -> {|+>, |->}.
    pub fn x_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);

        let v_plus: Array1<Complex64> = array![inv_sqrt2, inv_sqrt2];
        let v_minus: Array1<Complex64> = array![inv_sqrt2, -inv_sqrt2];

        Measurement::from_orthonormal_states(&[v_plus, v_minus]).expect("Error in basis X")
    }

    /// Y basis -> {|+i>, |-i>}.
    pub fn y_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        let i_inv_sqrt2 = Complex64::new(0.0, 1.0 / 2.0_f64.sqrt());

        let v_plus_i: Array1<Complex64> = array![inv_sqrt2, i_inv_sqrt2];
        let v_minus_i: Array1<Complex64> = array![inv_sqrt2, -i_inv_sqrt2];

        Measurement::from_orthonormal_states(&[v_plus_i, v_minus_i]).expect("Error in basis Y")
    }
}
