//! E91 (Ekert 1991) entanglement-based key distribution.
//!
//! A source distributes Bell pairs; Alice and Bob each measure their half
//! in one of three polarization bases. Rounds with matching bases yield
//! correlated bits (anti-correlated in the circular basis, which the
//! engine re-aligns).

use super::{KeyPair, ProtocolError, checked_custom_bits};
use crate::backend::QuantumBackend;
use crate::basis::Basis;
use rand::Rng;
use tracing::debug;

pub const NAME: &str = "E91";
pub const DESCRIPTION: &str = "Entanglement-based QKD protocol using Bell states";

/// Probability that the eavesdropper intercepts a given pair.
const INTERCEPT_PROBABILITY: f64 = 0.25;
/// Probability that Eve's re-prepared pair carries a stray bit flip.
const RESEND_NOISE_PROBABILITY: f64 = 0.1;

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
                let alice_basis = Basis::random_polarization(rng);
                let bob_basis = Basis::random_polarization(rng);

                let (_, bob_bit) =
                    exchange_pair(backend, alice_basis, bob_basis, eavesdropping, rng)?;

                if alice_basis == bob_basis {
                    bob_key.push(align(bob_bit, alice_basis));
                }
            }
        }
        None => {
            while alice_key.len() < key_length {
                rounds += 1;
                let alice_basis = Basis::random_polarization(rng);
                let bob_basis = Basis::random_polarization(rng);

                let (alice_bit, bob_bit) =
                    exchange_pair(backend, alice_basis, bob_basis, eavesdropping, rng)?;

                if alice_basis == bob_basis {
                    alice_key.push(alice_bit);
                    bob_key.push(align(bob_bit, alice_basis));
                }
            }
        }
    }

    debug!(rounds, sifted = bob_key.len(), "e91 sifting finished");

    Ok(KeyPair {
        alice_key,
        bob_key,
        protocol: NAME,
        eavesdropping,
    })
}

/// Distributes one pair and returns both measured bits.
fn exchange_pair<B: QuantumBackend, R: Rng + ?Sized>(
    backend: &B,
    alice_basis: Basis,
    bob_basis: Basis,
    eavesdropping: bool,
    rng: &mut R,
) -> Result<(bool, bool), ProtocolError> {
    let (mut alice_bit, mut bob_bit) = backend.measure_pair(alice_basis, bob_basis, rng)?;

    if eavesdropping && rng.random_bool(INTERCEPT_PROBABILITY) {
        // Eve collapses the pair and forwards a freshly entangled one; her
        // re-preparation occasionally flips one of the qubits.
        if rng.random_bool(RESEND_NOISE_PROBABILITY) {
            if rng.random_bool(0.5) {
                alice_bit = !alice_bit;
            } else {
                bob_bit = !bob_bit;
            }
        }
    }

    Ok((alice_bit, bob_bit))
}

/// Re-aligns Bob's bit with Alice's: the circular basis anti-correlates
/// the pair, so his raw outcome is complemented there.
fn align(bob_bit: bool, basis: Basis) -> bool {
    if basis == Basis::Circular { !bob_bit } else { bob_bit }
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
        // Exercises the circular-basis re-alignment: without it, roughly a
        // third of the sifted bits would disagree.
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(41);

        let pair = run(&backend, 48, false, None, &mut rng).unwrap();
        assert_eq!(pair.alice_key, pair.bob_key);
        assert_eq!(pair.alice_key.len(), 48);
    }

    #[test]
    fn custom_bits_fix_alices_key() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(43);

        let pair = run(&backend, 6, false, Some("010011"), &mut rng).unwrap();
        let expected: Vec<bool> = "010011".chars().map(|c| c == '1').collect();
        assert_eq!(pair.alice_key, expected);
        assert_eq!(pair.bob_key.len(), 6);
    }

    #[test]
    fn interception_raises_the_error_rate() {
        let backend = DensityMatrixBackend::new();
        let mut rng = StdRng::seed_from_u64(45);

        let pair = run(&backend, 800, true, None, &mut rng).unwrap();
        let metrics = security::evaluate(&pair.alice_key, &pair.bob_key);

        // The residual flip disturbs about 2.5% of sifted bits.
        assert!(metrics.qber > 0.0, "qber {} should be positive", metrics.qber);
        assert!(metrics.qber < 0.5, "qber {} should stay below 0.5", metrics.qber);
    }
}
