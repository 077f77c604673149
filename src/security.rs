//! Security evaluation of a sifted key pair.

use serde::Serialize;
use std::fmt;

/// QBER below which the exchange counts as secure.
const SECURE_QBER_THRESHOLD: f64 = 0.15;
/// QBER below which the exchange counts as high security.
const HIGH_QBER_THRESHOLD: f64 = 0.05;

/// Discrete trust classification of a key exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecurityLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecurityLevel::High => "High",
            SecurityLevel::Medium => "Medium",
            SecurityLevel::Low => "Low",
        };
        f.write_str(name)
    }
}

/// Statistical comparison of Alice's and Bob's keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecurityMetrics {
    /// Fraction of compared positions that agree, in [0, 1].
    pub agreement_rate: f64,
    /// Quantum bit error rate: fraction of compared positions that differ.
    pub qber: f64,
    pub is_secure: bool,
    pub security_level: SecurityLevel,
}

impl SecurityMetrics {
    /// Human-readable verdict for the exchange.
    pub fn status(&self) -> &'static str {
        if self.is_secure {
            "Secure communication possible"
        } else {
            "Security compromised - abort key exchange"
        }
    }
}

/// Compares the two keys position by position and classifies the channel.
///
/// Empty keys score as fully erroneous. Keys of unequal length are
/// compared up to the shorter one.
pub fn evaluate(alice_key: &[bool], bob_key: &[bool]) -> SecurityMetrics {
    if alice_key.is_empty() || bob_key.is_empty() {
        return SecurityMetrics {
            agreement_rate: 0.0,
            qber: 1.0,
            is_secure: false,
            security_level: SecurityLevel::Low,
        };
    }

    let compared = alice_key.len().min(bob_key.len());
    let matches = alice_key
        .iter()
        .zip(bob_key.iter())
        .filter(|(a, b)| a == b)
        .count();

    let agreement_rate = matches as f64 / compared as f64;
    let qber = 1.0 - agreement_rate;

    let is_secure = qber < SECURE_QBER_THRESHOLD;
    let security_level = if qber < HIGH_QBER_THRESHOLD {
        SecurityLevel::High
    } else if qber < SECURE_QBER_THRESHOLD {
        SecurityLevel::Medium
    } else {
        SecurityLevel::Low
    };

    SecurityMetrics {
        agreement_rate,
        qber,
        is_secure,
        security_level,
    }
}
