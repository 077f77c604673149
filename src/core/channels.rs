use crate::core::errors::ChannelError;
use crate::core::utils;
use ndarray::{Array2, array};
use num_complex::Complex64;

/// A noisy quantum channel given by its Kraus operators.
#[derive(Clone, Debug)]
pub struct QuantumChannel {
    pub kraus_ops: Vec<Array2<Complex64>>,
    pub num_qubits: usize,
}

impl QuantumChannel {
    pub fn new(kraus_ops: Vec<Array2<Complex64>>) -> Result<Self, ChannelError> {
        if kraus_ops.is_empty() {
            return Err(ChannelError::Empty);
        }

        let (rows, cols) = kraus_ops[0].dim();

        if rows != cols || !rows.is_power_of_two() {
            return Err(ChannelError::InvalidDimensions);
        }

        let num_qubits = rows.trailing_zeros() as usize;

        for op in &kraus_ops {
            if op.dim() != (rows, cols) {
                return Err(ChannelError::OperatorSizeMismatch);
            }
        }

        if !utils::check_completeness(&kraus_ops, rows) {
            return Err(ChannelError::NotComplete);
        }

        Ok(Self {
            kraus_ops,
            num_qubits,
        })
    }

    /// Expands each Kraus operator to act on `target` within a larger system.
    pub fn expanded_operators(
        &self,
        num_total_qubits: usize,
        target: usize,
    ) -> Result<Vec<Array2<Complex64>>, ChannelError> {
        if self.num_qubits != 1 {
            return Err(ChannelError::InvalidDimensions);
        }

        Ok(self
            .kraus_ops
            .iter()
            .map(|op| utils::expand_operator(num_total_qubits, op, &[target]))
            .collect())
    }

    /// Bit flip channel: applies X with probability `p`.
    pub fn bit_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(p)?;

        let p_stay = (1.0 - p).sqrt();
        let p_flip = p.sqrt();

        let k0 = array![
            [Complex64::new(p_stay, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(p_stay, 0.0)]
        ];

        let k1 = array![
            [Complex64::new(0.0, 0.0), Complex64::new(p_flip, 0.0)],
            [Complex64::new(p_flip, 0.0), Complex64::new(0.0, 0.0)]
        ];

        QuantumChannel::new(vec![k0, k1])
    }

    /// Phase flip channel: applies Z with probability `p`.
    pub fn phase_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(p)?;

        let p_stay = (1.0 - p).sqrt();
        let p_flip = p.sqrt();

        let k0 = array![
            [Complex64::new(p_stay, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(p_stay, 0.0)]
        ];

        let k1 = array![
            [Complex64::new(p_flip, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(-p_flip, 0.0)]
        ];

        QuantumChannel::new(vec![k0, k1])
    }

    /// Depolarizing channel: the state is fully randomized with probability `p`.
    pub fn depolarizing(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(p)?;

        let weight_i = (1.0 - 0.75 * p).sqrt();
        let weight_xyz = (p / 4.0).sqrt();

        let k0 = array![
            // ~ I
            [Complex64::new(weight_i, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(weight_i, 0.0)]
        ];

        let k1 = array![
            // ~ X
            [Complex64::new(0.0, 0.0), Complex64::new(weight_xyz, 0.0)],
            [Complex64::new(weight_xyz, 0.0), Complex64::new(0.0, 0.0)]
        ];

        let k2 = array![
            // ~ Y
            [Complex64::new(0.0, 0.0), Complex64::new(0.0, -weight_xyz)],
            [Complex64::new(0.0, weight_xyz), Complex64::new(0.0, 0.0)]
        ];

        let k3 = array![
            // ~ Z
            [Complex64::new(weight_xyz, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(-weight_xyz, 0.0)]
        ];

        QuantumChannel::new(vec![k0, k1, k2, k3])
    }
}

/// Validates a probability parameter.
fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}
