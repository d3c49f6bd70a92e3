use crate::storage::{CurveState, BASIS_POINTS};

/// Step added to the price when supply grows from `supply` to `supply + 1`
///
/// The step is `step1` while the new supply stays below `hitch`, `step2` once
/// it reaches it. Redemption reverses the same step (see `redemption_step`),
/// so the ladder is retraceable across the hitch.
///
/// Example (step1 = 0.005, step2 = 0.05, hitch = 20):
/// - supply 0 → 1: +0.005
/// - supply 19 → 20: +0.05
pub fn issuance_step(curve: &CurveState, supply: u32) -> i128 {
    if supply.saturating_add(1) >= curve.hitch {
        curve.step2
    } else {
        curve.step1
    }
}

/// Step removed from the price when supply shrinks from `supply` to `supply - 1`
pub fn redemption_step(curve: &CurveState, supply: u32) -> i128 {
    issuance_step(curve, supply.saturating_sub(1))
}

/// Number of `step1` transitions among the next `units` issuances
fn primary_steps(curve: &CurveState, supply: u32, units: u32) -> i128 {
    let available = curve.hitch as i128 - 1 - supply as i128;
    available.clamp(0, units as i128)
}

/// Price of the next unit after `units` more are issued
///
/// Formula: price + step1 × n1 + step2 × (units - n1)
/// where n1 is the number of issuances that land below the hitch.
pub fn price_after(curve: &CurveState, supply: u32, units: u32) -> Option<i128> {
    let n1 = primary_steps(curve, supply, units);
    let n2 = (units as i128).checked_sub(n1)?;

    curve
        .step1
        .checked_mul(n1)?
        .checked_add(curve.step2.checked_mul(n2)?)?
        .checked_add(curve.current_price)
}

/// Total cost of issuing the next `units` units one at a time
///
/// Unit i (0-based) costs price + step1 × min(i, n1) + step2 × (i - min(i, n1)),
/// summed over i in [0, units).
pub fn quote_buy(curve: &CurveState, supply: u32, units: u32) -> Option<i128> {
    if units == 0 {
        return Some(0);
    }
    let n = units as i128;
    let last = n - 1;
    let n1 = primary_steps(curve, supply, units);

    // Σ_{i<n} i
    let all_steps = n.checked_mul(last)? / 2;
    // Σ_{i<n} min(i, n1)
    let primary = if n1 >= last {
        all_steps
    } else {
        (n1.checked_mul(n1 + 1)? / 2).checked_add(n1.checked_mul(last - n1)?)?
    };
    let secondary = all_steps.checked_sub(primary)?;

    curve
        .current_price
        .checked_mul(n)?
        .checked_add(curve.step1.checked_mul(primary)?)?
        .checked_add(curve.step2.checked_mul(secondary)?)
}

/// Price the last unit was issued at, i.e. the price after one redemption
pub fn price_before(curve: &CurveState, supply: u32) -> Option<i128> {
    if supply == 0 {
        return None;
    }
    curve
        .current_price
        .checked_sub(redemption_step(curve, supply))
}

/// Amount paid out for redeeming a unit issued at `price`
///
/// Formula: burn_return = price × (10,000 - take_rate) / 10,000, rounded down
///
/// Example:
/// - price: 0.145
/// - take rate: 15% (1500 basis points)
/// - burn_return: 0.145 × 85% = 0.12325
pub fn burn_return(price: i128, take_rate_bps: u32) -> Option<i128> {
    let keep_bps = BASIS_POINTS.checked_sub(take_rate_bps as i128)?;

    price.checked_mul(keep_bps)?.checked_div(BASIS_POINTS)
}

/// Share of a unit's issue price the market keeps, rounded down
///
/// The reserve backs `price - take_amount(price)` per outstanding unit, which
/// is never less than the unit's `burn_return`.
pub fn take_amount(price: i128, take_rate_bps: u32) -> Option<i128> {
    price
        .checked_mul(take_rate_bps as i128)?
        .checked_div(BASIS_POINTS)
}

/// Royalty owed on a secondary sale
pub fn royalty_amount(sale_price: i128, royalty_bps: u32) -> Option<i128> {
    sale_price
        .checked_mul(royalty_bps as i128)?
        .checked_div(BASIS_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SCALE;

    fn curve() -> CurveState {
        CurveState {
            current_price: 5 * SCALE / 100, // 0.05
            step1: 5 * SCALE / 1000,        // 0.005
            step2: 5 * SCALE / 100,         // 0.05
            hitch: 20,
            take_rate_bps: 1500,
        }
    }

    fn walk(curve: &CurveState, supply: u32, units: u32) -> (i128, i128) {
        let mut price = curve.current_price;
        let mut cost = 0;
        for s in supply..supply + units {
            cost += price;
            price += issuance_step(curve, s);
        }
        (price, cost)
    }

    #[test]
    fn test_first_step_is_primary() {
        let curve = curve();
        assert_eq!(price_after(&curve, 0, 1).unwrap(), 55 * SCALE / 1000); // 0.055
    }

    #[test]
    fn test_step_switches_at_hitch() {
        let curve = curve();

        // 19 buys land below the hitch
        assert_eq!(price_after(&curve, 0, 19).unwrap(), 145 * SCALE / 1000); // 0.145
        // the 20th reaches it and takes the secondary step
        assert_eq!(price_after(&curve, 0, 20).unwrap(), 195 * SCALE / 1000); // 0.195
        assert_eq!(issuance_step(&curve, 19), curve.step2);
        assert_eq!(issuance_step(&curve, 18), curve.step1);
    }

    #[test]
    fn test_redemption_reverses_issuance() {
        let mut curve = curve();
        for supply in 0..40u32 {
            let before = curve.current_price;
            curve.current_price = price_after(&curve, supply, 1).unwrap();
            assert_eq!(price_before(&curve, supply + 1).unwrap(), before);
        }
    }

    #[test]
    fn test_price_before_at_zero_supply() {
        assert_eq!(price_before(&curve(), 0), None);
    }

    #[test]
    fn test_closed_forms_match_walk() {
        let curve = curve();
        for supply in [0u32, 5, 18, 19, 20, 35] {
            for units in [0u32, 1, 2, 3, 14, 21, 40] {
                let (price, cost) = walk(&curve, supply, units);
                assert_eq!(price_after(&curve, supply, units).unwrap(), price);
                assert_eq!(quote_buy(&curve, supply, units).unwrap(), cost);
            }
        }
    }

    #[test]
    fn test_zero_hitch_uses_secondary_step() {
        let mut curve = curve();
        curve.hitch = 0;
        assert_eq!(
            price_after(&curve, 0, 2).unwrap(),
            curve.current_price + 2 * curve.step2
        );
    }

    #[test]
    fn test_burn_return_applies_take_rate() {
        let returned = burn_return(145 * SCALE / 1000, 1500).unwrap();

        // Expected: 0.145 × 85% = 0.12325
        assert_eq!(returned, 1_232_500);
    }

    #[test]
    fn test_burn_return_rounds_down() {
        assert_eq!(burn_return(7, 1500).unwrap(), 5); // 5.95 → 5
        assert_eq!(burn_return(7, 0).unwrap(), 7);
        assert_eq!(burn_return(7, 10_000).unwrap(), 0);
    }

    #[test]
    fn test_take_amount_rounds_down() {
        assert_eq!(take_amount(5 * SCALE / 100, 1500).unwrap(), 75_000);
        assert_eq!(take_amount(7, 1500).unwrap(), 1); // 1.05 → 1

        // backing covers the payout even when both round
        let price = 7;
        let backing = price - take_amount(price, 1500).unwrap();
        assert_eq!(backing, 6);
        assert!(backing >= burn_return(price, 1500).unwrap());
    }

    #[test]
    fn test_royalty_amount() {
        let sale_price = 5 * SCALE / 100;
        assert_eq!(royalty_amount(sale_price, 1000).unwrap(), 50_000); // 10%
    }
}
