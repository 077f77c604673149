use super::{KeyPair, ProtocolError, checked_custom_bits};
use crate::backend::QuantumBackend;
use crate::basis::Basis;
use rand::Rng;
use tracing::debug;

pub const NAME: &str = "BB84";
pub const DESCRIPTION: &str =
    "First practical quantum key distribution protocol using photon polarization";

/// Probability that the eavesdropper intercepts a given transmission.
const INTERCEPT_PROBABILITY: f64 = 0.3;

/// Runs the BB84 protocol.
///
/// Alice encodes a random bit in a random conjugate basis, Bob measures in
/// his own random basis, and a round contributes to the key only when the
/// two bases agree.
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
            // The cursor into Alice's fixed bits only advances on a basis
            // match; a discarded round retries the same bit.
            let mut cursor = 0;
            while bob_key.len() < key_length {
                rounds += 1;
                let alice_basis = Basis::random_conjugate(rng);
                let bob_basis = Basis::random_conjugate(rng);

                let bob_bit = transmit(
                    backend,
                    alice_key[cursor],
                    alice_basis,
                    bob_basis,
                    eavesdropping,
                    rng,
                )?;

                if alice_basis == bob_basis {
                    bob_key.push(bob_bit);
                    cursor += 1;
                }
            }
        }
        None => {
            while alice_key.len() < key_length {
                rounds += 1;
                let alice_bit = rng.random_bool(0.5);
                let alice_basis = Basis::random_conjugate(rng);
                let bob_basis = Basis::random_conjugate(rng);

                let bob_bit =
                    transmit(backend, alice_bit, alice_basis, bob_basis, eavesdropping, rng)?;

                if alice_basis == bob_basis {
                    alice_key.push(alice_bit);
                    bob_key.push(bob_bit);
                }
            }
        }
    }

    debug!(rounds, sifted = bob_key.len(), "bb84 sifting finished");

    Ok(KeyPair {
        alice_key,
        bob_key,
        protocol: NAME,
        eavesdropping,
    })
}

/// Sends one polarized qubit through the (possibly tapped) channel and
/// returns Bob's measurement.
fn transmit<B: QuantumBackend, R: Rng + ?Sized>(
    backend: &B,
    bit: bool,
    alice_basis: Basis,
    bob_basis: Basis,
    eavesdropping: bool,
    rng: &mut R,
) -> Result<bool, ProtocolError> {
    if eavesdropping && rng.random_bool(INTERCEPT_PROBABILITY) {
        // Intercept-resend: Eve measures in her own basis and forwards a
        // fresh qubit encoding what she saw.
        let eve_basis = Basis::random_conjugate(rng);
        let eve_bit = backend.measure_qubit(bit, alice_basis, eve_basis, rng)?;
        Ok(backend.measure_qubit(eve_bit, eve_basis, bob_basis, rng)?)
    } else {
        Ok(backend.measure_qubit(bit, alice_basis, bob_basis, rng)?)
    }
}
