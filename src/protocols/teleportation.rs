//! Teleportation-based key distribution.
//!
//! Each key bit is teleported to Bob over a shared entangled pair plus two
//! classical correction bits. There is no basis reconciliation: every
//! round contributes, so the raw and sifted keys coincide.

use super::{KeyPair, ProtocolError, checked_custom_bits};
use crate::backend::QuantumBackend;
use rand::Rng;
use tracing::debug;

pub const NAME: &str = "Teleportation QKD";
pub const DESCRIPTION: &str = "QKD using quantum teleportation protocol";

/// Probability that the adversary attempts to tamper with a round.
const TAMPER_ATTEMPT_PROBABILITY: f64 = 0.2;
/// Probability that an attempt actually lands a bit flip.
const TAMPER_SUCCESS_PROBABILITY: f64 = 0.3;

pub fn run<B: QuantumBackend, R: Rng + ?Sized>(
    backend: &B,
    key_length: usize,
    eavesdropping: bool,
    custom_bits: Option<&str>,
    rng: &mut R,
) -> Result<KeyPair, ProtocolError> {
    let fixed = checked_custom_bits(custom_bits, key_length)?;

    let mut alice_key = Vec::with_capacity(key_length);
    let mut bob_key = Vec::with_capacity(key_length);
    let mut tampered_rounds = 0usize;

    for i in 0..key_length {
        let secret = match &fixed {
            Some(bits) => bits[i],
            None => rng.random_bool(0.5),
        };

        let tampered_qubit = if eavesdropping
            && rng.random_bool(TAMPER_ATTEMPT_PROBABILITY)
            && rng.random_bool(TAMPER_SUCCESS_PROBABILITY)
        {
            tampered_rounds += 1;
            Some(rng.random_range(0..3))
        } else {
            None
        };

        let outcome = backend.teleport(secret, tampered_qubit, rng)?;

        alice_key.push(secret);
        bob_key.push(outcome.received);
    }

    debug!(
        rounds = key_length,
        tampered = tampered_rounds,
        "teleportation rounds finished"
    );

    Ok(KeyPair {
        alice_key,
        bob_key,
        protocol: NAME,
        eavesdropping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DensityMatrixBackend;
    use crate::security;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn quiet_channel_reconstructs_every_bit() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(61);

        let pair = run(&backend, 48, false, None, &mut rng).unwrap();
        assert_eq!(pair.alice_key, pair.bob_key);
        assert_eq!(pair.alice_key.len(), 48);
    }

    #[test]
    fn custom_bits_become_the_secret_sequence() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(63);

        let pair = run(&backend, 8, false, Some("10011010"), &mut rng).unwrap();
        let expected: Vec<bool> = "10011010".chars().map(|c| c == '1').collect();
        assert_eq!(pair.alice_key, expected);
        // Teleportation is exact absent tampering.
        assert_eq!(pair.bob_key, expected);
    }

    #[test]
    fn tampering_raises_the_error_rate() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(65);

        let pair = run(&backend, 800, true, None, &mut rng).unwrap();
        let metrics = security::evaluate(&pair.alice_key, &pair.bob_key);

        // Roughly 6% of rounds are tampered; two of the three possible
        // targets flip Bob's reconstructed bit.
        assert!(metrics.qber > 0.0, "qber {} should be positive", metrics.qber);
        assert!(metrics.qber < 0.5, "qber {} should stay below 0.5", metrics.qber);
    }
}
