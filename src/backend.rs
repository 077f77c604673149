//! The measurement backend the protocol engines drive.
//!
//! Engines never touch quantum state directly: every exchange goes through
//! one of the three `QuantumBackend` operations, so a deterministic stub
//! can stand in for the simulator under test.

use crate::basis::Basis;
use crate::core::errors::StateError;
use crate::core::{Gate, Measurement, QuantumChannel, QuantumState};
use rand::Rng;

/// Classical record of one teleportation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeleportOutcome {
    /// Alice's two Bell-measurement bits, sent to Bob over the classical
    /// channel.
    pub corrections: (bool, bool),
    /// The bit Bob reads out after applying his corrections.
    pub received: bool,
}

/// Backend contract for the three exchange shapes the protocols use.
pub trait QuantumBackend {
    /// Prepares `bit` in `prep_basis`, transmits the qubit, and measures it
    /// in `meas_basis`. Matching bases reproduce `bit` exactly; conjugate
    /// bases yield a uniform random outcome.
    fn measure_qubit<R: Rng + ?Sized>(
        &self,
        bit: bool,
        prep_basis: Basis,
        meas_basis: Basis,
        rng: &mut R,
    ) -> Result<bool, StateError>;

    /// Distributes one entangled pair and measures Alice's half in
    /// `alice_basis` and Bob's half in `bob_basis`. Matching
    /// rectilinear/diagonal bases give equal bits; matching circular bases
    /// give complementary bits; mismatched bases give independent bits.
    fn measure_pair<R: Rng + ?Sized>(
        &self,
        alice_basis: Basis,
        bob_basis: Basis,
        rng: &mut R,
    ) -> Result<(bool, bool), StateError>;

    /// Teleports `secret` to Bob over a shared entangled pair. When
    /// `tampered_qubit` names one of the three qubits, an X flip is applied
    /// to it before Alice's Bell measurement.
    fn teleport<R: Rng + ?Sized>(
        &self,
        secret: bool,
        tampered_qubit: Option<usize>,
        rng: &mut R,
    ) -> Result<TeleportOutcome, StateError>;
}

/// Density-matrix simulator behind the default backend.
#[derive(Debug, Clone, Default)]
pub struct DensityMatrixBackend {
    /// Optional noise applied to the qubit in transit.
    pub channel: Option<QuantumChannel>,
}

impl DensityMatrixBackend {
    /// Creates a noise-free backend.
    pub fn new() -> Self {
        Self { channel: None }
    }

    /// Attaches a noise channel to every transmission.
    pub fn with_channel(mut self, channel: QuantumChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    fn transmit(&self, state: &mut QuantumState, qubit: usize) -> Result<(), StateError> {
        if let Some(chan) = &self.channel {
            state.apply_channel(chan, qubit)?;
        }
        Ok(())
    }

    /// Encodes a classical bit on `qubit` in the given basis.
    fn encode(
        state: &mut QuantumState,
        qubit: usize,
        bit: bool,
        basis: Basis,
    ) -> Result<(), StateError> {
        if bit {
            state.apply(&Gate::x(), &[qubit])?;
        }
        match basis {
            Basis::Rectilinear => {}
            Basis::Diagonal => state.apply(&Gate::h(), &[qubit])?,
            Basis::Circular => {
                state.apply(&Gate::h(), &[qubit])?;
                state.apply(&Gate::s(), &[qubit])?;
            }
        }
        Ok(())
    }
}

impl QuantumBackend for DensityMatrixBackend {
    fn measure_qubit<R: Rng + ?Sized>(
        &self,
        bit: bool,
        prep_basis: Basis,
        meas_basis: Basis,
        rng: &mut R,
    ) -> Result<bool, StateError> {
        let mut state = QuantumState::new(1);
        Self::encode(&mut state, 0, bit, prep_basis)?;
        self.transmit(&mut state, 0)?;

        let outcome = state.measure(&meas_basis.measurement(), 0, rng)?;
        Ok(outcome == 1)
    }

    fn measure_pair<R: Rng + ?Sized>(
        &self,
        alice_basis: Basis,
        bob_basis: Basis,
        rng: &mut R,
    ) -> Result<(bool, bool), StateError> {
        let mut state = QuantumState::new(2);
        state.apply(&Gate::h(), &[0])?;
        state.apply(&Gate::cnot(), &[0, 1])?;

        // Bob's half travels; Alice keeps hers local.
        self.transmit(&mut state, 1)?;

        let alice_bit = state.measure(&alice_basis.measurement(), 0, rng)? == 1;
        let bob_bit = state.measure(&bob_basis.measurement(), 1, rng)? == 1;

        Ok((alice_bit, bob_bit))
    }

    fn teleport<R: Rng + ?Sized>(
        &self,
        secret: bool,
        tampered_qubit: Option<usize>,
        rng: &mut R,
    ) -> Result<TeleportOutcome, StateError> {
        let z = Measurement::z_basis();

        // Qubit 0 carries the secret; qubits 1-2 hold the shared pair.
        let mut state = QuantumState::new(3);
        if secret {
            state.apply(&Gate::x(), &[0])?;
        }
        state.apply(&Gate::h(), &[1])?;
        state.apply(&Gate::cnot(), &[1, 2])?;
        self.transmit(&mut state, 2)?;

        // Alice's Bell measurement basis change.
        state.apply(&Gate::cnot(), &[0, 1])?;
        state.apply(&Gate::h(), &[0])?;

        if let Some(q) = tampered_qubit {
            state.apply(&Gate::x(), &[q])?;
        }

        let b0 = state.measure(&z, 0, rng)? == 1;
        let b1 = state.measure(&z, 1, rng)? == 1;

        // Bob's classical corrections.
        if b1 {
            state.apply(&Gate::x(), &[2])?;
        }
        if b0 {
            state.apply(&Gate::z(), &[2])?;
        }
        let received = state.measure(&z, 2, rng)? == 1;

        Ok(TeleportOutcome {
            corrections: (b0, b1),
            received,
        })
    }
}
