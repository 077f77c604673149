use crate::core::channels::QuantumChannel;
use crate::core::errors::StateError;
use crate::core::gates::Gate;
use crate::core::measurements::Measurement;
use crate::core::utils::{self, trace};
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

/// A multi-qubit quantum state kept as a density matrix.
#[derive(Clone, Debug)]
pub struct QuantumState {
    pub density_matrix: Array2<Complex64>,
    pub num_qubits: usize,
}

impl QuantumState {
    /// Creates a new quantum state initialized to |0...0>.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1 << num_qubits;
        let mut density_matrix = Array2::<Complex64>::zeros((dim, dim));
        density_matrix[[0, 0]] = Complex64::new(1.0, 0.0);

        Self {
            density_matrix,
            num_qubits,
        }
    }

    /// Checks that the density matrix is square, 2^n and has unit trace.
    pub fn is_valid(&self) -> Result<(), StateError> {
        let (rows, cols) = self.density_matrix.dim();

        if rows != cols {
            return Err(StateError::DimensionMismatch {
                expected: rows,
                got_rows: rows,
                got_cols: cols,
            });
        }

        let tr = trace(&self.density_matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > 1e-9 {
            return Err(StateError::InvalidTrace(tr));
        }

        Ok(())
    }

    fn validate_targets(&self, targets: &[usize]) -> Result<(), StateError> {
        for &q in targets {
            if q >= self.num_qubits {
                return Err(StateError::IndexOutOfBounds {
                    index: q,
                    num_qubits: self.num_qubits,
                });
            }
        }
        if let Some(dup) = utils::find_duplicate(targets) {
            return Err(StateError::DuplicateQubit(dup));
        }
        Ok(())
    }

    /// Applies a full-system operator as rho -> U rho U†.
    fn conjugate_apply(&mut self, op: &Array2<Complex64>) -> Result<(), StateError> {
        let (rows, cols) = op.dim();
        let dim = 1 << self.num_qubits;

        if rows != dim || cols != dim {
            return Err(StateError::DimensionMismatch {
                expected: dim,
                got_rows: rows,
                got_cols: cols,
            });
        }

        let op_dagger = op.t().mapv(|x| x.conj());
        self.density_matrix = op.dot(&self.density_matrix).dot(&op_dagger);

        Ok(())
    }

    /// Applies a gate to the given target qubits.
    pub fn apply(&mut self, gate: &Gate, targets: &[usize]) -> Result<(), StateError> {
        if gate.num_qubits != targets.len() {
            return Err(StateError::DimensionMismatch {
                expected: gate.num_qubits,
                got_rows: targets.len(),
                got_cols: 0,
            });
        }
        self.validate_targets(targets)?;

        let full_operator = utils::expand_operator(self.num_qubits, &gate.matrix, targets);
        self.conjugate_apply(&full_operator)
    }

    /// Returns the outcome probabilities of measuring `target`, together
    /// with the projectors expanded to the whole system.
    pub fn outcome_probabilities(
        &self,
        measurement: &Measurement,
        target: usize,
    ) -> Result<(Vec<f64>, Vec<Array2<Complex64>>), StateError> {
        self.validate_targets(&[target])?;

        if measurement.num_qubits != 1 {
            return Err(StateError::DimensionMismatch {
                expected: 1,
                got_rows: measurement.num_qubits,
                got_cols: 0,
            });
        }

        let expanded = measurement.expanded_projectors(self.num_qubits, target);

        let mut probs = Vec::with_capacity(expanded.len());
        let mut sum_probs = 0.0;

        for op in &expanded {
            let op_dagger = op.t().mapv(|c| c.conj());
            let unnormalized = op.dot(&self.density_matrix).dot(&op_dagger);

            let p_k = trace(&unnormalized).re.max(0.0);
            probs.push(p_k);
            sum_probs += p_k;
        }

        // Renormalize to absorb floating point drift.
        for p in &mut probs {
            *p /= sum_probs;
        }

        Ok((probs, expanded))
    }

    /// Physically measures `target`, collapsing the state. Returns the
    /// outcome index.
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        measurement: &Measurement,
        target: usize,
        rng: &mut R,
    ) -> Result<usize, StateError> {
        let (probs, ops) = self.outcome_probabilities(measurement, target)?;

        let outcome_idx = sample_outcome(&probs, rng);
        let p_selected = probs[outcome_idx];

        if p_selected <= 1e-12 {
            return Err(StateError::InvalidTrace(Complex64::new(0.0, 0.0)));
        }

        // rho' = (M_k rho M_k†) / p_k
        let m_k = &ops[outcome_idx];
        let m_k_dagger = m_k.t().mapv(|c| c.conj());
        let numerator = m_k.dot(&self.density_matrix).dot(&m_k_dagger);

        self.density_matrix = numerator.mapv(|val| val / Complex64::new(p_selected, 0.0));

        Ok(outcome_idx)
    }

    /// Sends `target` through a noisy channel: rho -> sum_k K_k rho K_k†.
    pub fn apply_channel(
        &mut self,
        channel: &QuantumChannel,
        target: usize,
    ) -> Result<(), StateError> {
        self.validate_targets(&[target])?;

        let ops = channel.expanded_operators(self.num_qubits, target)?;

        let dim = self.density_matrix.nrows();
        let mut new_rho = Array2::<Complex64>::zeros((dim, dim));

        for k in ops {
            let k_dagger = k.t().mapv(|c| c.conj());
            new_rho = new_rho + k.dot(&self.density_matrix).dot(&k_dagger);
        }

        self.density_matrix = new_rho;

        Ok(())
    }
}

/// Samples an outcome index weighted by `probs`.
fn sample_outcome<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
    let roll: f64 = rng.random();

    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if roll < cumulative {
            return i;
        }
    }
    probs.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fresh_state_is_valid() {
        QuantumState::new(2).is_valid().unwrap();
    }

    #[test]
    fn x_gate_flips_computational_outcome() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = QuantumState::new(1);
        state.apply(&Gate::x(), &[0]).unwrap();

        let outcome = state.measure(&Measurement::z_basis(), 0, &mut rng).unwrap();
        assert_eq!(outcome, 1);
    }

    #[test]
    fn repeated_measurement_is_stable() {
        // After collapse, measuring the same basis again returns the
        // same outcome.
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let mut state = QuantumState::new(1);
            state.apply(&Gate::h(), &[0]).unwrap();

            let first = state.measure(&Measurement::z_basis(), 0, &mut rng).unwrap();
            let second = state.measure(&Measurement::z_basis(), 0, &mut rng).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn bell_pair_outcomes_are_correlated() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..20 {
            let mut state = QuantumState::new(2);
            state.apply(&Gate::h(), &[0]).unwrap();
            state.apply(&Gate::cnot(), &[0, 1]).unwrap();

            let a = state.measure(&Measurement::z_basis(), 0, &mut rng).unwrap();
            let b = state.measure(&Measurement::z_basis(), 1, &mut rng).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn gate_arity_mismatch_is_rejected() {
        let mut state = QuantumState::new(2);
        assert!(matches!(
            state.apply(&Gate::cnot(), &[0]),
            Err(StateError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn out_of_bounds_qubit_is_rejected() {
        let mut state = QuantumState::new(1);
        assert!(matches!(
            state.apply(&Gate::x(), &[1]),
            Err(StateError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn duplicate_target_is_rejected() {
        let mut state = QuantumState::new(2);
        assert!(matches!(
            state.apply(&Gate::cnot(), &[1, 1]),
            Err(StateError::DuplicateQubit(1))
        ));
    }

    #[test]
    fn full_bit_flip_channel_inverts_state() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut state = QuantumState::new(1);
        let channel = QuantumChannel::bit_flip(1.0).unwrap();
        state.apply_channel(&channel, 0).unwrap();

        let outcome = state.measure(&Measurement::z_basis(), 0, &mut rng).unwrap();
        assert_eq!(outcome, 1);
    }
}
