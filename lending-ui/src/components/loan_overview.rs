use crate::components::progress::{clamp_progress, ProgressBar};
use crate::components::status_badge::LoanStatusBadge;
use crate::format::{currency, percent};
use chrono::{Datelike, NaiveDate};
use lending_contracts::{LoanStatus, LoanSummary};
use leptos::*;

#[derive(Clone, Debug, PartialEq)]
pub struct LoanDetails {
    pub id: String,
    pub amount: f64,
    pub balance: f64,
    pub monthly_payment: f64,
    pub rate: f64,
    pub term_months: u32,
    pub purpose: String,
    pub next_payment: String,
    pub status: LoanStatus,
}

impl LoanDetails {
    /// Amortizes `loan` as of `today` (year, month).
    pub fn from_summary(loan: &LoanSummary, purpose: impl Into<String>, today: (i32, u32)) -> Self {
        let start = parse_date(&loan.origination_date);
        let end = parse_date(&loan.maturity_date);
        let term_months = match (start, end) {
            (Some(start), Some(end)) => months_between(ym(start), ym(end)).max(1) as u32,
            _ => 1,
        };
        let elapsed = start
            .map(|start| months_between(ym(start), today).clamp(0, term_months as i32) as u32)
            .unwrap_or(0);

        let balance = match loan.status {
            LoanStatus::Paid => 0.0,
            LoanStatus::Pending => loan.amount,
            _ => remaining_balance(loan.amount, loan.interest_rate, term_months, elapsed),
        };

        Self {
            id: loan.id.clone(),
            amount: loan.amount,
            balance,
            monthly_payment: monthly_payment(loan.amount, loan.interest_rate, term_months),
            rate: loan.interest_rate,
            term_months,
            purpose: purpose.into(),
            next_payment: start
                .and_then(|start| next_payment_date(start.day(), today))
                .unwrap_or_else(|| "-".to_string()),
            status: loan.status,
        }
    }

    pub fn paid_percent(&self) -> u8 {
        if self.amount <= 0.0 {
            return 0;
        }
        clamp_progress((self.amount - self.balance) / self.amount * 100.0)
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn ym(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

pub fn months_between(from: (i32, u32), to: (i32, u32)) -> i32 {
    (to.0 - from.0) * 12 + to.1 as i32 - from.1 as i32
}

/// Level payment for a fully amortizing loan at an annual percentage rate.
pub fn monthly_payment(principal: f64, annual_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        return principal / months as f64;
    }
    let growth = (1.0 + r).powi(months as i32);
    principal * r * growth / (growth - 1.0)
}

pub fn remaining_balance(principal: f64, annual_rate: f64, months: u32, paid: u32) -> f64 {
    if paid >= months {
        return 0.0;
    }
    let payment = monthly_payment(principal, annual_rate, months);
    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        return (principal - payment * paid as f64).max(0.0);
    }
    let growth = (1.0 + r).powi(paid as i32);
    (principal * growth - payment * (growth - 1.0) / r).max(0.0)
}

/// Payment falls on the origination day of the following month.
fn next_payment_date(day: u32, today: (i32, u32)) -> Option<String> {
    let (year, month) = if today.1 >= 12 {
        (today.0 + 1, 1)
    } else {
        (today.0, today.1 + 1)
    };
    NaiveDate::from_ymd_opt(year, month, day.min(28))
        .map(|date| date.format("%B %-d, %Y").to_string())
}

#[component]
pub fn LoanOverview(details: LoanDetails) -> impl IntoView {
    let paid = details.paid_percent();
    view! {
      <section class="card loan-overview">
        <div class="row">
          <h2>"Current Loan"</h2>
          <LoanStatusBadge status=details.status/>
        </div>
        <p class="meta">{details.purpose.clone()}</p>
        <dl class="loan-grid">
          <dt>"Original Amount"</dt>
          <dd>{currency(details.amount)}</dd>
          <dt>"Current Balance"</dt>
          <dd>{currency(details.balance)}</dd>
          <dt>"Monthly Payment"</dt>
          <dd>{currency(details.monthly_payment)}</dd>
          <dt>"Interest Rate"</dt>
          <dd>{percent(details.rate)}</dd>
          <dt>"Term"</dt>
          <dd>{format!("{} months", details.term_months)}</dd>
          <dt>"Next Payment"</dt>
          <dd>{details.next_payment.clone()}</dd>
        </dl>
        <div class="row">
          <span class="meta">"Loan Progress"</span>
          <span class="meta">{format!("{paid}% paid")}</span>
        </div>
        <ProgressBar value=paid/>
      </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(amount: f64, rate: f64, status: LoanStatus) -> LoanSummary {
        LoanSummary {
            id: "7".into(),
            amount,
            status,
            origination_date: "2024-01-15".into(),
            maturity_date: "2025-01-15".into(),
            interest_rate: rate,
        }
    }

    #[test]
    fn zero_rate_loan_pays_down_linearly() {
        let details =
            LoanDetails::from_summary(&loan(12000.0, 0.0, LoanStatus::Active), "Ovens", (2024, 4));
        assert_eq!(details.term_months, 12);
        assert!((details.monthly_payment - 1000.0).abs() < 1e-9);
        assert!((details.balance - 9000.0).abs() < 1e-9);
        assert_eq!(details.paid_percent(), 25);
        assert_eq!(details.next_payment, "May 15, 2024");
    }

    #[test]
    fn amortized_payment_matches_standard_formula() {
        let payment = monthly_payment(25000.0, 4.5, 36);
        assert!(payment > 743.0 && payment < 744.5, "{payment}");
        assert!(remaining_balance(25000.0, 4.5, 36, 36).abs() < 1e-6);
        assert!(remaining_balance(25000.0, 4.5, 36, 12) < 25000.0);
    }

    #[test]
    fn paid_and_pending_loans_bound_progress() {
        let paid = LoanDetails::from_summary(&loan(5000.0, 6.0, LoanStatus::Paid), "", (2024, 6));
        assert_eq!(paid.paid_percent(), 100);
        let pending =
            LoanDetails::from_summary(&loan(5000.0, 6.0, LoanStatus::Pending), "", (2024, 6));
        assert_eq!(pending.paid_percent(), 0);
    }

    #[test]
    fn december_rolls_next_payment_into_january() {
        assert_eq!(next_payment_date(31, (2024, 12)).as_deref(), Some("January 28, 2025"));
    }

    #[test]
    fn unparseable_dates_degrade_to_single_term() {
        let mut summary = loan(1000.0, 0.0, LoanStatus::Active);
        summary.origination_date = "soon".into();
        let details = LoanDetails::from_summary(&summary, "", (2024, 6));
        assert_eq!(details.term_months, 1);
        assert_eq!(details.next_payment, "-");
        assert_eq!(details.paid_percent(), 0);
    }
}
