//! CTfile field codes shared by the MOL and SDF readers and writers.

use crate::model::types::BondOrder;

pub fn bond_order_to_ctfile(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

pub fn bond_order_from_ctfile(code: i32) -> Option<BondOrder> {
    match code {
        1 => Some(BondOrder::Single),
        2 => Some(BondOrder::Double),
        3 => Some(BondOrder::Triple),
        4 => Some(BondOrder::Aromatic),
        _ => None,
    }
}

/// Atom-block charge code. Charges outside ±3 only appear in `M  CHG`.
pub fn charge_to_ctfile(charge: i8) -> u8 {
    match charge {
        3 => 1,
        2 => 2,
        1 => 3,
        -1 => 5,
        -2 => 6,
        -3 => 7,
        _ => 0,
    }
}

pub fn charge_from_ctfile(code: i32) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_codes_invert() {
        for charge in -3..=3 {
            assert_eq!(charge_from_ctfile(i32::from(charge_to_ctfile(charge))), charge);
        }
        assert_eq!(charge_to_ctfile(4), 0);
    }

    #[test]
    fn unknown_bond_codes_are_rejected() {
        assert_eq!(bond_order_from_ctfile(2), Some(BondOrder::Double));
        assert_eq!(bond_order_from_ctfile(8), None);
    }
}
