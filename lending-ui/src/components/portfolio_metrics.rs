use crate::dto::{Metric, MetricTone};
use crate::format::{compact_currency, percent};
use lending_contracts::LoanMetrics;
use leptos::*;

/// Default rate above this is flagged on the dashboard.
pub const DEFAULT_RATE_ALERT: f64 = 5.0;

pub fn portfolio_cards(metrics: &LoanMetrics) -> Vec<Metric> {
    let default_tone = if metrics.default_rate > DEFAULT_RATE_ALERT {
        MetricTone::Attention
    } else {
        MetricTone::Positive
    };
    vec![
        Metric {
            title: "Active Loans".into(),
            value: metrics.total_active_loans.to_string(),
            change: format!("{} originated this month", metrics.monthly_originations),
            tone: MetricTone::Info,
        },
        Metric {
            title: "Total Portfolio".into(),
            value: compact_currency(metrics.total_loan_amount),
            change: "Outstanding principal".into(),
            tone: MetricTone::Positive,
        },
        Metric {
            title: "Average Loan".into(),
            value: compact_currency(metrics.average_loan_size),
            change: "Across active loans".into(),
            tone: MetricTone::Highlight,
        },
        Metric {
            title: "Default Rate".into(),
            value: percent(metrics.default_rate),
            change: "Of closed and active loans".into(),
            tone: default_tone,
        },
    ]
}

#[component]
pub fn PortfolioMetrics(#[prop(into)] metrics: MaybeSignal<Vec<Metric>>) -> impl IntoView {
    view! {
      <div class="metric-grid">
        <For
          each=move || metrics.get()
          key=|m| m.title.clone()
          children=move |m| view! {
            <div class=m.tone.class()>
              <p class="meta">{m.title}</p>
              <p class="metric-value">{m.value}</p>
              <p class="meta">{m.change}</p>
            </div>
          }
        />
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(default_rate: f64) -> LoanMetrics {
        LoanMetrics {
            total_active_loans: 2,
            total_loan_amount: 65000.0,
            average_loan_size: 32400.0,
            default_rate,
            monthly_originations: 1,
        }
    }

    #[test]
    fn cards_format_portfolio_figures() {
        let cards = portfolio_cards(&metrics(0.0));
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].value, "2");
        assert_eq!(cards[1].value, "$65K");
        assert_eq!(cards[2].value, "$32K");
        assert_eq!(cards[3].value, "0.0%");
        assert_eq!(cards[3].tone, MetricTone::Positive);
    }

    #[test]
    fn high_default_rate_draws_attention() {
        let cards = portfolio_cards(&metrics(25.0));
        assert_eq!(cards[3].value, "25.0%");
        assert_eq!(cards[3].tone, MetricTone::Attention);
    }
}
