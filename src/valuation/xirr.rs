use chrono::NaiveDate;

/// One dated cash movement in a money-weighted return series. Outflows
/// (investments, lot costs) are negative; inflows and the terminal
/// liquidation value are positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    pub amount: f64,
    pub date: NaiveDate,
}

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-9;
const DAYS_PER_YEAR: f64 = 365.0;

/// Annualised internal rate of return for an irregularly dated series.
/// Newton-Raphson from a 10% guess, falling back to bisection when the
/// derivative misbehaves. Returns `None` when the series cannot produce a
/// rate: fewer than two flows, no time span, or flows all of one sign.
pub fn xirr(flows: &[CashFlow]) -> Option<f64> {
    if flows.len() < 2 {
        return None;
    }
    let has_inflow = flows.iter().any(|f| f.amount > 0.0);
    let has_outflow = flows.iter().any(|f| f.amount < 0.0);
    if !has_inflow || !has_outflow {
        return None;
    }

    let epoch = flows.iter().map(|f| f.date).min()?;
    if flows.iter().all(|f| f.date == epoch) {
        return None;
    }

    let years: Vec<f64> = flows
        .iter()
        .map(|f| (f.date - epoch).num_days() as f64 / DAYS_PER_YEAR)
        .collect();

    let npv = |rate: f64| -> f64 {
        flows
            .iter()
            .zip(&years)
            .map(|(f, &t)| f.amount / (1.0 + rate).powf(t))
            .sum()
    };
    let npv_derivative = |rate: f64| -> f64 {
        flows
            .iter()
            .zip(&years)
            .map(|(f, &t)| -t * f.amount / (1.0 + rate).powf(t + 1.0))
            .sum()
    };

    // Newton-Raphson
    let mut rate = 0.1_f64;
    for _ in 0..MAX_ITERATIONS {
        let value = npv(rate);
        if value.abs() < TOLERANCE {
            return Some(rate);
        }
        let derivative = npv_derivative(rate);
        if derivative.abs() < f64::EPSILON {
            break;
        }
        let next = rate - value / derivative;
        if !next.is_finite() || next <= -1.0 {
            break;
        }
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    bisect(npv)
}

/// Bisection over (-1, 1e3]; the NPV is monotonically decreasing in the
/// rate once the first flow is an outflow, which every series reaching
/// here has.
fn bisect<F: Fn(f64) -> f64>(npv: F) -> Option<f64> {
    let mut low = -0.999_999;
    let mut high = 1_000.0;
    let npv_low = npv(low);
    let npv_high = npv(high);
    if npv_low.is_nan() || npv_high.is_nan() || npv_low.signum() == npv_high.signum() {
        return None;
    }

    for _ in 0..200 {
        let mid = (low + high) / 2.0;
        let value = npv(mid);
        if value.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if value.signum() == npv_low.signum() {
            low = mid;
        } else {
            high = mid;
        }
    }

    Some((low + high) / 2.0)
}
