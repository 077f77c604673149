//! Quantum Key Distribution protocols.
//!
//! Four engines share the same contract: drive the measurement backend
//! through rounds, sift on the protocol's reconciliation rule, and return a
//! pair of keys of exactly the requested length.
//! - **BB84**: prepare-and-measure over polarized single photons.
//! - **E91**: entanglement-based, three measurement bases.
//! - **BBM92**: entanglement-based variant of BB84, two bases.
//! - **Teleportation**: key bits carried by quantum teleportation.

pub mod bb84;
pub mod bbm92;
pub mod e91;
pub mod teleportation;

use crate::backend::QuantumBackend;
use crate::core::errors::StateError;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("unknown protocol: {name}")]
    InvalidProtocol { name: String },

    #[error("custom bits must contain only '0' and '1', found {found:?}")]
    CustomBitsNotBinary { found: char },

    #[error("custom bits must hold at least {needed} bits, got {got}")]
    CustomBitsTooShort { needed: usize, got: usize },

    #[error("measurement backend failure: {0}")]
    Backend(#[from] StateError),
}

/// The keys produced by one protocol run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub alice_key: Vec<bool>,
    pub bob_key: Vec<bool>,
    /// Display name of the protocol that produced the keys.
    pub protocol: &'static str,
    /// Whether an eavesdropper was simulated on the channel.
    pub eavesdropping: bool,
}

/// The closed set of supported protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Bb84,
    E91,
    Bbm92,
    Teleportation,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::Bb84,
        Protocol::E91,
        Protocol::Bbm92,
        Protocol::Teleportation,
    ];

    /// Resolves a lookup id (case-insensitive) to a protocol.
    pub fn from_name(name: &str) -> Result<Protocol, ProtocolError> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProtocolError::InvalidProtocol {
                name: name.to_string(),
            })
    }

    /// The lookup id used for protocol selection.
    pub fn id(&self) -> &'static str {
        match self {
            Protocol::Bb84 => "bb84",
            Protocol::E91 => "e91",
            Protocol::Bbm92 => "bbm92",
            Protocol::Teleportation => "teleportation",
        }
    }

    /// Human-readable protocol name.
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Bb84 => bb84::NAME,
            Protocol::E91 => e91::NAME,
            Protocol::Bbm92 => bbm92::NAME,
            Protocol::Teleportation => teleportation::NAME,
        }
    }

    /// One-line protocol description.
    pub fn description(&self) -> &'static str {
        match self {
            Protocol::Bb84 => bb84::DESCRIPTION,
            Protocol::E91 => e91::DESCRIPTION,
            Protocol::Bbm92 => bbm92::DESCRIPTION,
            Protocol::Teleportation => teleportation::DESCRIPTION,
        }
    }

    /// Runs the protocol until both keys hold `key_length` bits.
    ///
    /// With `custom_bits`, the first `key_length` bits become Alice's key
    /// verbatim and only Bob's side is simulated. A `key_length` of zero
    /// yields empty keys.
    pub fn generate_key<B: QuantumBackend, R: Rng + ?Sized>(
        &self,
        backend: &B,
        key_length: usize,
        eavesdropping: bool,
        custom_bits: Option<&str>,
        rng: &mut R,
    ) -> Result<KeyPair, ProtocolError> {
        match self {
            Protocol::Bb84 => bb84::run(backend, key_length, eavesdropping, custom_bits, rng),
            Protocol::E91 => e91::run(backend, key_length, eavesdropping, custom_bits, rng),
            Protocol::Bbm92 => bbm92::run(backend, key_length, eavesdropping, custom_bits, rng),
            Protocol::Teleportation => {
                teleportation::run(backend, key_length, eavesdropping, custom_bits, rng)
            }
        }
    }
}

/// Validates a custom bit string and returns Alice's fixed key, or `None`
/// when no custom bits were supplied. Validation happens before any
/// backend call: the alphabet is checked first, then the length.
pub(crate) fn checked_custom_bits(
    custom_bits: Option<&str>,
    key_length: usize,
) -> Result<Option<Vec<bool>>, ProtocolError> {
    let Some(bits) = custom_bits else {
        return Ok(None);
    };

    if let Some(found) = bits.chars().find(|c| !matches!(c, '0' | '1')) {
        return Err(ProtocolError::CustomBitsNotBinary { found });
    }
    if bits.len() < key_length {
        return Err(ProtocolError::CustomBitsTooShort {
            needed: key_length,
            got: bits.len(),
        });
    }

    Ok(Some(bits.bytes().take(key_length).map(|b| b == b'1').collect()))
}
