//! Assembly of a protocol run and its security verdict into one record.

use crate::backend::QuantumBackend;
use crate::protocols::{KeyPair, Protocol, ProtocolError};
use crate::security::{self, SecurityLevel, SecurityMetrics};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Everything a caller needs from one simulation: the key material plus
/// the security assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub protocol: String,
    pub alice_key: Vec<u8>,
    pub bob_key: Vec<u8>,
    pub key_length: usize,
    pub eavesdropping: bool,
    pub agreement_rate: f64,
    pub qber: f64,
    pub is_secure: bool,
    pub security_level: SecurityLevel,
    pub status: String,
}

impl SimulationReport {
    pub fn assemble(pair: &KeyPair, metrics: &SecurityMetrics) -> Self {
        SimulationReport {
            protocol: pair.protocol.to_string(),
            alice_key: to_bit_values(&pair.alice_key),
            bob_key: to_bit_values(&pair.bob_key),
            key_length: pair.alice_key.len(),
            eavesdropping: pair.eavesdropping,
            agreement_rate: metrics.agreement_rate,
            qber: metrics.qber,
            is_secure: metrics.is_secure,
            security_level: metrics.security_level,
            status: metrics.status().to_string(),
        }
    }
}

fn to_bit_values(key: &[bool]) -> Vec<u8> {
    key.iter().map(|&b| b as u8).collect()
}

/// Generates a key with the given protocol and scores it.
pub fn run_simulation<B: QuantumBackend, R: Rng + ?Sized>(
    backend: &B,
    protocol: Protocol,
    key_length: usize,
    eavesdropping: bool,
    custom_bits: Option<&str>,
    rng: &mut R,
) -> Result<SimulationReport, ProtocolError> {
    let pair = protocol.generate_key(backend, key_length, eavesdropping, custom_bits, rng)?;
    let metrics = security::evaluate(&pair.alice_key, &pair.bob_key);

    debug!(
        protocol = pair.protocol,
        qber = metrics.qber,
        secure = metrics.is_secure,
        "simulation finished"
    );

    Ok(SimulationReport::assemble(&pair, &metrics))
}

/// Runs every protocol under the same settings. Each run is independent:
/// one protocol failing does not abort the others.
pub fn compare_protocols<B: QuantumBackend, R: Rng + ?Sized>(
    backend: &B,
    key_length: usize,
    eavesdropping: bool,
    custom_bits: Option<&str>,
    rng: &mut R,
) -> Vec<(Protocol, Result<SimulationReport, ProtocolError>)> {
    Protocol::ALL
        .into_iter()
        .map(|protocol| {
            let report = run_simulation(
                backend,
                protocol,
                key_length,
                eavesdropping,
                custom_bits,
                rng,
            );
            (protocol, report)
        })
        .collect()
}
