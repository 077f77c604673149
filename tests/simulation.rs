//! End-to-end runs through the public API.

use qkd_sim::{
    Basis, DensityMatrixBackend, Protocol, ProtocolError, QuantumBackend, QuantumChannel,
    SecurityLevel, TeleportOutcome, compare_protocols, errors::StateError, run_simulation,
};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A noiseless scripted backend: same-basis exchanges are perfect,
/// mismatched bases collapse to 0. Substitutes for the simulator to pin
/// down engine behavior without quantum sampling.
struct ScriptedBackend;

impl QuantumBackend for ScriptedBackend {
    fn measure_qubit<R: Rng + ?Sized>(
        &self,
        bit: bool,
        prep_basis: Basis,
        meas_basis: Basis,
        _rng: &mut R,
    ) -> Result<bool, StateError> {
        Ok(if prep_basis == meas_basis { bit } else { false })
    }

    fn measure_pair<R: Rng + ?Sized>(
        &self,
        alice_basis: Basis,
        bob_basis: Basis,
        _rng: &mut R,
    ) -> Result<(bool, bool), StateError> {
        if alice_basis == bob_basis {
            // Circular-basis pairs anti-correlate.
            Ok((false, alice_basis == Basis::Circular))
        } else {
            Ok((false, false))
        }
    }

    fn teleport<R: Rng + ?Sized>(
        &self,
        secret: bool,
        tampered_qubit: Option<usize>,
        _rng: &mut R,
    ) -> Result<TeleportOutcome, StateError> {
        let received = match tampered_qubit {
            Some(1) | Some(2) => !secret,
            _ => secret,
        };
        Ok(TeleportOutcome {
            corrections: (false, false),
            received,
        })
    }
}

#[test]
fn quiet_runs_report_secure_for_every_protocol() {
    let backend = DensityMatrixBackend::new();
    let mut rng = StdRng::seed_from_u64(101);

    for protocol in Protocol::ALL {
        let report = run_simulation(&backend, protocol, 24, false, None, &mut rng).unwrap();

        assert_eq!(report.protocol, protocol.name());
        assert_eq!(report.key_length, 24);
        assert_eq!(report.alice_key, report.bob_key);
        assert_eq!(report.agreement_rate, 1.0);
        assert_eq!(report.qber, 0.0);
        assert!(report.is_secure);
        assert_eq!(report.security_level, SecurityLevel::High);
        assert_eq!(report.status, "Secure communication possible");
    }
}

#[test]
fn compare_runs_all_four_protocols_independently() {
    let backend = DensityMatrixBackend::new();
    let mut rng = StdRng::seed_from_u64(103);

    let results = compare_protocols(&backend, 12, true, None, &mut rng);
    assert_eq!(results.len(), 4);

    for (protocol, report) in results {
        let report = report.unwrap();
        assert_eq!(report.protocol, protocol.name());
        assert_eq!(report.key_length, 12);
        assert!(report.eavesdropping);
    }
}

#[test]
fn unknown_protocol_name_is_rejected_without_running() {
    assert!(matches!(
        Protocol::from_name("b92"),
        Err(ProtocolError::InvalidProtocol { .. })
    ));
}

#[test]
fn report_serializes_the_full_response_shape() {
    let backend = DensityMatrixBackend::new();
    let mut rng = StdRng::seed_from_u64(105);

    let report =
        run_simulation(&backend, Protocol::Bb84, 8, false, Some("10110010"), &mut rng).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["protocol"], "BB84");
    assert_eq!(value["alice_key"], serde_json::json!([1, 0, 1, 1, 0, 0, 1, 0]));
    assert_eq!(value["key_length"], 8);
    assert_eq!(value["eavesdropping"], false);
    assert_eq!(value["security_level"], "High");
    assert_eq!(value["status"], "Secure communication possible");
}

#[test]
fn engines_run_against_a_scripted_backend() {
    let mut rng = StdRng::seed_from_u64(107);

    for protocol in Protocol::ALL {
        let report = run_simulation(&ScriptedBackend, protocol, 16, false, None, &mut rng).unwrap();

        // The scripted backend is noiseless, so every protocol agrees
        // perfectly once sifting and re-alignment are applied.
        assert_eq!(report.key_length, 16, "{}", protocol.name());
        assert_eq!(report.agreement_rate, 1.0, "{}", protocol.name());
    }
}

#[test]
fn depolarizing_channel_degrades_the_key() {
    let backend =
        DensityMatrixBackend::new().with_channel(QuantumChannel::depolarizing(0.5).unwrap());
    let mut rng = StdRng::seed_from_u64(109);

    let report = run_simulation(&backend, Protocol::Bb84, 300, false, None, &mut rng).unwrap();

    // Half the transmissions are scrambled, so roughly a quarter of the
    // sifted bits disagree.
    assert!(report.qber > 0.0, "qber {} should be positive", report.qber);
    assert!(report.qber < 0.5, "qber {} should stay below 0.5", report.qber);
}

#[test]
fn registry_exposes_names_and_descriptions() {
    let expected = [
        ("bb84", "BB84"),
        ("e91", "E91"),
        ("bbm92", "BBM92"),
        ("teleportation", "Teleportation QKD"),
    ];

    for (id, name) in expected {
        let protocol = Protocol::from_name(id).unwrap();
        assert_eq!(protocol.id(), id);
        assert_eq!(protocol.name(), name);
        assert!(!protocol.description().is_empty());
    }
}
