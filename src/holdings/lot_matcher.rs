use rust_decimal::Decimal;

use crate::holdings::holdings_errors::{HoldingsError, Result};
use crate::holdings::holdings_model::Lot;

/// The new state a matched lot must be written back with.
#[derive(Debug, Clone, PartialEq)]
pub struct LotConsumption {
    pub lot_id: i64,
    pub sell_quantity: Decimal,
    pub sell_price: Decimal,
    pub sell_value: Decimal,
    pub open_quantity: Decimal,
    pub buy_value: Decimal,
    /// Cost basis given up by this lot: old buy_value − new buy_value.
    pub buy_value_reduction: Decimal,
}

/// Matches a sell of `quantity` units at `price` against the given lots,
/// oldest buy first. Lots sharing a buy date are consumed in insertion
/// order (ascending id). Fails without producing any consumption when the
/// open quantity across all lots cannot cover the request; a sell is
/// all-or-nothing.
pub fn match_sell(lots: &[Lot], quantity: Decimal, price: Decimal) -> Result<Vec<LotConsumption>> {
    let mut open_lots: Vec<&Lot> = lots.iter().filter(|lot| lot.is_open()).collect();
    open_lots.sort_by(|a, b| a.buy_date.cmp(&b.buy_date).then(a.id.cmp(&b.id)));

    let available: Decimal = open_lots.iter().map(|lot| lot.open_quantity).sum();
    if quantity > available {
        return Err(HoldingsError::InsufficientInventory {
            requested: quantity,
            available,
        });
    }

    let mut consumptions = Vec::new();
    let mut remaining = quantity;

    for lot in open_lots {
        if remaining.is_zero() {
            break;
        }

        let consumed = remaining.min(lot.open_quantity);
        let sell_quantity = lot.sell_quantity + consumed;
        // Weighted average over everything this lot has sold so far.
        let sell_price =
            (lot.sell_quantity * lot.sell_price + consumed * price) / sell_quantity;
        let sell_value = sell_price * sell_quantity;
        let open_quantity = lot.buy_quantity - sell_quantity;
        let buy_value = open_quantity * lot.buy_price;

        consumptions.push(LotConsumption {
            lot_id: lot.id,
            sell_quantity,
            sell_price,
            sell_value,
            open_quantity,
            buy_value,
            buy_value_reduction: lot.buy_value - buy_value,
        });

        remaining -= consumed;
    }

    Ok(consumptions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::holdings_model::{FundSource, OwnedBy};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn lot(id: i64, day: u32, buy_quantity: Decimal, buy_price: Decimal) -> Lot {
        let buy_date = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Lot {
            id,
            client_id: "client-1".to_string(),
            instrument_id: "scrip-1".to_string(),
            buy_quantity,
            buy_price,
            buy_value: buy_quantity * buy_price,
            buy_date,
            sell_quantity: Decimal::ZERO,
            sell_price: Decimal::ZERO,
            sell_value: Decimal::ZERO,
            sell_date: None,
            open_quantity: buy_quantity,
            unrealised_pnl: Decimal::ZERO,
            market_value: Decimal::ZERO,
            owned_by: OwnedBy::ManagedEntity,
            fund_source: FundSource::OutsideAccount,
            from_date: buy_date,
            to_date: buy_date,
        }
    }

    #[test]
    fn consumes_oldest_lots_first() {
        let lots = vec![lot(2, 2, dec!(50), dec!(12)), lot(1, 1, dec!(100), dec!(10))];

        let consumptions = match_sell(&lots, dec!(120), dec!(15)).unwrap();

        assert_eq!(consumptions.len(), 2);
        // Day-1 lot fully closed.
        assert_eq!(consumptions[0].lot_id, 1);
        assert_eq!(consumptions[0].sell_quantity, dec!(100));
        assert_eq!(consumptions[0].sell_price, dec!(15));
        assert_eq!(consumptions[0].sell_value, dec!(1500));
        assert_eq!(consumptions[0].open_quantity, dec!(0));
        assert_eq!(consumptions[0].buy_value, dec!(0));
        // Day-2 lot partially closed.
        assert_eq!(consumptions[1].lot_id, 2);
        assert_eq!(consumptions[1].sell_quantity, dec!(30));
        assert_eq!(consumptions[1].sell_price, dec!(15));
        assert_eq!(consumptions[1].open_quantity, dec!(20));
        assert_eq!(consumptions[1].buy_value, dec!(240));

        let total_reduction: Decimal =
            consumptions.iter().map(|c| c.buy_value_reduction).sum();
        assert_eq!(total_reduction, dec!(1360));
    }

    #[test]
    fn over_sell_is_rejected_without_consumptions() {
        let lots = vec![lot(1, 1, dec!(100), dec!(10))];

        let err = match_sell(&lots, dec!(150), dec!(15)).unwrap_err();
        match err {
            HoldingsError::InsufficientInventory {
                requested,
                available,
            } => {
                assert_eq!(requested, dec!(150));
                assert_eq!(available, dec!(100));
            }
            other => panic!("expected InsufficientInventory, got {:?}", other),
        }
    }

    #[test]
    fn stops_at_requested_quantity() {
        let lots = vec![
            lot(1, 1, dec!(10), dec!(10)),
            lot(2, 2, dec!(10), dec!(10)),
            lot(3, 3, dec!(10), dec!(10)),
        ];

        let consumptions = match_sell(&lots, dec!(15), dec!(11)).unwrap();

        assert_eq!(consumptions.len(), 2);
        assert_eq!(consumptions[1].open_quantity, dec!(5));
    }

    #[test]
    fn same_day_lots_break_ties_by_insertion_order() {
        let lots = vec![lot(7, 5, dec!(10), dec!(10)), lot(4, 5, dec!(10), dec!(9))];

        let consumptions = match_sell(&lots, dec!(12), dec!(11)).unwrap();

        assert_eq!(consumptions[0].lot_id, 4);
        assert_eq!(consumptions[1].lot_id, 7);
    }

    #[test]
    fn closed_lots_are_never_matched() {
        let mut closed = lot(1, 1, dec!(100), dec!(10));
        closed.sell_quantity = dec!(100);
        closed.open_quantity = Decimal::ZERO;
        let lots = vec![closed, lot(2, 2, dec!(50), dec!(12))];

        let consumptions = match_sell(&lots, dec!(50), dec!(15)).unwrap();

        assert_eq!(consumptions.len(), 1);
        assert_eq!(consumptions[0].lot_id, 2);
    }

    #[test]
    fn repeat_sells_blend_the_weighted_sell_price() {
        let mut partially_sold = lot(1, 1, dec!(100), dec!(10));
        partially_sold.sell_quantity = dec!(40);
        partially_sold.sell_price = dec!(12);
        partially_sold.sell_value = dec!(480);
        partially_sold.open_quantity = dec!(60);
        partially_sold.buy_value = dec!(600);

        let consumptions = match_sell(&[partially_sold], dec!(20), dec!(18)).unwrap();

        // (40×12 + 20×18) / 60 = 14
        assert_eq!(consumptions[0].sell_quantity, dec!(60));
        assert_eq!(consumptions[0].sell_price, dec!(14));
        assert_eq!(consumptions[0].sell_value, dec!(840));
        assert_eq!(consumptions[0].open_quantity, dec!(40));
        assert_eq!(consumptions[0].buy_value, dec!(400));
        assert_eq!(consumptions[0].buy_value_reduction, dec!(200));
    }
}
