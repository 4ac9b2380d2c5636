use chrono::{Datelike, NaiveDate};
use lending_contracts::{LoanMetrics, LoanStatus, LoanSummary};

/// Portfolio figures for the analyst and admin dashboards.
///
/// `default_rate` is a percentage of originated (non-pending) loans.
pub fn summarize(loans: &[LoanSummary], today: NaiveDate) -> LoanMetrics {
    let active: Vec<&LoanSummary> = loans
        .iter()
        .filter(|loan| loan.status == LoanStatus::Active)
        .collect();
    let total_loan_amount: f64 = active.iter().map(|loan| loan.amount).sum();
    let average_loan_size = if active.is_empty() {
        0.0
    } else {
        total_loan_amount / active.len() as f64
    };

    let originated = loans
        .iter()
        .filter(|loan| loan.status != LoanStatus::Pending)
        .count();
    let defaulted = loans
        .iter()
        .filter(|loan| loan.status == LoanStatus::Default)
        .count();
    let default_rate = if originated == 0 {
        0.0
    } else {
        defaulted as f64 / originated as f64 * 100.0
    };

    let monthly_originations = loans
        .iter()
        .filter_map(|loan| parse_date(&loan.origination_date))
        .filter(|date| date.year() == today.year() && date.month() == today.month())
        .count();

    LoanMetrics {
        total_active_loans: active.len() as u32,
        total_loan_amount,
        average_loan_size,
        default_rate,
        monthly_originations: monthly_originations as u32,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!(value, %err, "skipping loan with unparseable origination date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(amount: f64, status: LoanStatus, originated: &str) -> LoanSummary {
        LoanSummary {
            id: originated.into(),
            amount,
            status,
            origination_date: originated.into(),
            maturity_date: "2030-01-01".into(),
            interest_rate: 5.0,
        }
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).expect("date");
        assert_eq!(summarize(&[], today), LoanMetrics::default());
    }

    #[test]
    fn aggregates_active_defaults_and_monthly_originations() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).expect("date");
        let loans = vec![
            loan(20_000.0, LoanStatus::Active, "2024-02-01"),
            loan(30_000.0, LoanStatus::Active, "2023-11-15"),
            loan(10_000.0, LoanStatus::Default, "2022-05-01"),
            loan(5_000.0, LoanStatus::Paid, "2021-01-01"),
            loan(8_000.0, LoanStatus::Pending, "2024-02-09T10:00:00Z"),
        ];

        let metrics = summarize(&loans, today);
        assert_eq!(metrics.total_active_loans, 2);
        assert_eq!(metrics.total_loan_amount, 50_000.0);
        assert_eq!(metrics.average_loan_size, 25_000.0);
        assert_eq!(metrics.default_rate, 25.0);
        assert_eq!(metrics.monthly_originations, 2);
    }
}
