use crate::core::errors::GateError;
use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// A quantum gate: a unitary matrix plus the number of qubits it acts on.
pub struct Gate {
    /// The unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
    /// The number of qubits the gate acts on.
    pub num_qubits: usize,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if the matrix is not square, its dimension is
    /// not a power of two, or it is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != cols {
            return Err(GateError::NotSquare);
        }

        if !rows.is_power_of_two() {
            return Err(GateError::InvalidDimensions);
        }

        if !Self::check_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        let num_qubits = rows.trailing_zeros() as usize;

        Ok(Self { matrix, num_qubits })
    }

    /// Checks whether U·U† is the identity.
    fn check_unitary(matrix: &Array2<Complex64>) -> bool {
        let (rows, _) = matrix.dim();
        let eye = Array2::<Complex64>::eye(rows);

        let u_dagger = matrix.t().mapv(|x| x.conj());
        let product = matrix.dot(&u_dagger);

        product
            .iter()
            .zip(eye.iter())
            .all(|(a, b)| (*a - *b).norm() < 1e-6)
    }

    // --- Standard gates ---

    /// Pauli-X (NOT) gate.
    pub fn x() -> Gate {
        Gate::new(arr2(&[
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ]))
        .unwrap()
    }

    /// Pauli-Z gate.
    pub fn z() -> Gate {
        Gate::new(arr2(&[
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(-1.0, 0.0)],
        ]))
        .unwrap()
    }

    /// Hadamard gate.
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate::new(arr2(&[
            [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
            [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
        ]))
        .unwrap()
    }

    /// S gate (phase gate, Z^1/2).
    pub fn s() -> Gate {
        Gate::new(arr2(&[
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(0.0, 1.0)],
        ]))
        .unwrap()
    }

    /// CNOT gate. Little-endian: the control is the first target qubit
    /// passed to `QuantumState::apply`, the NOT acts on the second.
    pub fn cnot() -> Gate {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        Gate::new(arr2(&[
            [one, zero, zero, zero],
            [zero, zero, zero, one],
            [zero, zero, one, zero],
            [zero, one, zero, zero],
        ]))
        .unwrap()
    }
}
