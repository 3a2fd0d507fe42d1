//! Intrinsic gas: the minimum gas a transaction must provide before
//! execution starts.
//!
//! A clause is charged like a standalone transaction (base cost plus a
//! per-byte data cost). When several clauses share one transaction, the full
//! base cost is charged once and every further clause only pays the reduced
//! per-clause base.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::clause::Clause;
use crate::error::GasError;

/// Gas constants of the protocol's gas schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSchedule {
    /// Base cost of a transaction whose first clause is a call.
    pub tx_gas: u64,
    /// Base cost of a transaction whose first clause creates a contract.
    pub tx_gas_contract_creation: u64,
    /// Base cost of each additional call clause.
    pub clause_gas: u64,
    /// Base cost of each additional creation clause.
    pub clause_gas_contract_creation: u64,
    /// Cost per zero byte of clause data.
    pub tx_data_zero_gas: u64,
    /// Cost per non-zero byte of clause data.
    pub tx_data_non_zero_gas: u64,
}

impl GasSchedule {
    /// The schedule in force on the network.
    pub const PROTOCOL: GasSchedule = GasSchedule {
        tx_gas: 21_000,
        tx_gas_contract_creation: 53_000,
        clause_gas: 16_000,
        clause_gas_contract_creation: 48_000,
        tx_data_zero_gas: 4,
        tx_data_non_zero_gas: 68,
    };

    /// Per-clause costs never exceed the transaction-level costs.
    ///
    /// Intrinsic gas accounting asserts this holds.
    pub fn is_consistent(&self) -> bool {
        self.clause_gas <= self.tx_gas
            && self.clause_gas_contract_creation <= self.tx_gas_contract_creation
    }

    /// Gas returned for every clause after the first.
    ///
    /// # Panics
    ///
    /// If the per-clause base exceeds the transaction base, i.e. the schedule
    /// is not [consistent](Self::is_consistent).
    pub fn clause_discount(&self, creation: bool) -> u64 {
        let (tx_base, clause_base) = if creation {
            (self.tx_gas_contract_creation, self.clause_gas_contract_creation)
        } else {
            (self.tx_gas, self.clause_gas)
        };
        assert!(
            clause_base <= tx_base,
            "clause base gas exceeds transaction base gas"
        );
        tx_base - clause_base
    }

    /// Intrinsic gas of a clause as if it were a whole transaction.
    pub fn clause_intrinsic_gas(&self, clause: &Clause) -> U256 {
        let base = if clause.is_creation() {
            self.tx_gas_contract_creation
        } else {
            self.tx_gas
        };

        let data = clause.data();
        let non_zero = data.iter().filter(|b| **b != 0).count() as u64;
        let zero = data.len() as u64 - non_zero;

        U256::from(base)
            + U256::from(non_zero) * U256::from(self.tx_data_non_zero_gas)
            + U256::from(zero) * U256::from(self.tx_data_zero_gas)
    }

    /// Intrinsic gas of a whole clause list.
    pub fn intrinsic_gas(&self, clauses: &[Clause]) -> Result<u64, GasError> {
        let Some((first, rest)) = clauses.split_first() else {
            return Ok(self.tx_gas);
        };

        self.accumulate(
            self.clause_intrinsic_gas(first),
            rest.iter()
                .map(|c| (self.clause_intrinsic_gas(c), c.is_creation())),
        )
    }

    /// Sum per-clause costs, discounting every clause after the first, and
    /// narrow the total to 64 bits.
    ///
    /// # Panics
    ///
    /// If the schedule is not [consistent](Self::is_consistent), through
    /// [`clause_discount`](Self::clause_discount). The running total itself
    /// is asserted never to go below zero.
    pub(crate) fn accumulate<I>(&self, first: U256, rest: I) -> Result<u64, GasError>
    where
        I: IntoIterator<Item = (U256, bool)>,
    {
        let mut total = first;
        for (cost, creation) in rest {
            total = total.checked_add(cost).ok_or_else(|| {
                tracing::warn!("intrinsic gas exceeds 256 bits");
                GasError::GasTooLarge
            })?;

            let discount = U256::from(self.clause_discount(creation));
            assert!(total >= discount, "intrinsic gas went negative");
            total -= discount;
        }

        if total.bits() > 64 {
            tracing::warn!(total = %total, "intrinsic gas exceeds 64 bits");
            return Err(GasError::GasTooLarge);
        }
        Ok(total.low_u64())
    }
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self::PROTOCOL
    }
}
