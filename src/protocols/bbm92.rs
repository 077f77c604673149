//! BBM92 (Bennett, Brassard, Mermin 1992) key distribution.
//!
//! The entanglement-based rendition of BB84: a source distributes Bell
//! pairs and both parties measure in random conjugate bases, so matched
//! rounds are always positively correlated (no circular basis).

use super::{KeyPair, ProtocolError, checked_custom_bits};
use crate::backend::QuantumBackend;
use crate::basis::Basis;
use rand::Rng;
use tracing::debug;

pub const NAME: &str = "BBM92";
pub const DESCRIPTION: &str = "Bell state measurement based QKD protocol";

/// Probability that the eavesdropper intercepts a given pair.
const INTERCEPT_PROBABILITY: f64 = 0.3;

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
    let mut rounds = 0usize;

    match fixed {
        Some(bits) => {
            alice_key = bits;
            while bob_key.len() < key_length {
                rounds += 1;
                let alice_basis = Basis::random_conjugate(rng);
                let bob_basis = Basis::random_conjugate(rng);

                let (_, bob_bit) =
                    exchange_pair(backend, alice_basis, bob_basis, eavesdropping, rng)?;

                if alice_basis == bob_basis {
                    bob_key.push(bob_bit);
                }
            }
        }
        None => {
            while alice_key.len() < key_length {
                rounds += 1;
                let alice_basis = Basis::random_conjugate(rng);
                let bob_basis = Basis::random_conjugate(rng);

                let (alice_bit, bob_bit) =
                    exchange_pair(backend, alice_basis, bob_basis, eavesdropping, rng)?;

                if alice_basis == bob_basis {
                    alice_key.push(alice_bit);
                    bob_key.push(bob_bit);
                }
            }
        }
    }

    debug!(rounds, sifted = bob_key.len(), "bbm92 sifting finished");

    Ok(KeyPair {
        alice_key,
        bob_key,
        protocol: NAME,
        eavesdropping,
    })
}

/// Distributes one pair, optionally through Eve, and returns both bits.
fn exchange_pair<B: QuantumBackend, R: Rng + ?Sized>(
    backend: &B,
    alice_basis: Basis,
    bob_basis: Basis,
    eavesdropping: bool,
    rng: &mut R,
) -> Result<(bool, bool), ProtocolError> {
    if eavesdropping && rng.random_bool(INTERCEPT_PROBABILITY) {
        // Intercept-resend on both halves: Eve measures the pair in a
        // single basis of her own, then forwards two polarized qubits
        // encoding her outcomes.
        let eve_basis = Basis::random_conjugate(rng);
        let (eve_alice, eve_bob) = backend.measure_pair(eve_basis, eve_basis, rng)?;

        let alice_bit = backend.measure_qubit(eve_alice, eve_basis, alice_basis, rng)?;
        let bob_bit = backend.measure_qubit(eve_bob, eve_basis, bob_basis, rng)?;
        Ok((alice_bit, bob_bit))
    } else {
        Ok(backend.measure_pair(alice_basis, bob_basis, rng)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DensityMatrixBackend;
    use crate::security;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn quiet_channel_gives_identical_keys() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(51);

        let pair = run(&backend, 48, false, None, &mut rng).unwrap();
        assert_eq!(pair.alice_key, pair.bob_key);
        assert_eq!(pair.alice_key.len(), 48);
    }

    #[test]
    fn custom_bits_fix_alices_key() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(53);

        let pair = run(&backend, 6, false, Some("111000"), &mut rng).unwrap();
        let expected: Vec<bool> = "111000".chars().map(|c| c == '1').collect();
        assert_eq!(pair.alice_key, expected);
        assert_eq!(pair.bob_key.len(), 6);
    }

    #[test]
    fn interception_raises_the_error_rate() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(55);

        let pair = run(&backend, 500, true, None, &mut rng).unwrap();
        let metrics = security::evaluate(&pair.alice_key, &pair.bob_key);

        // Eve guesses the wrong basis half the time, disturbing roughly
        // 7.5% of sifted bits.
        assert!(metrics.qber > 0.0, "qber {} should be positive", metrics.qber);
        assert!(metrics.qber < 0.5, "qber {} should stay below 0.5", metrics.qber);
    }
}
