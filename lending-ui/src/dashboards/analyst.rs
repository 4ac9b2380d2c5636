use crate::bridge;
use crate::components::application_queue::{
    pending_applications, upsert_application, ApplicationQueue,
};
use crate::components::dashboard_layout::DashboardLayout;
use crate::components::error_display::ErrorDisplay;
use crate::components::loading_spinner::{LoadingSpinner, SpinnerSize};
use crate::components::portfolio_metrics::{portfolio_cards, PortfolioMetrics};
use crate::components::status_badge::LoanStatusBadge;
use crate::format::{currency, first_name, percent};
use lending_contracts::{
    ApplicationStatus, BorrowerProfile, LoanApplication, LoanMetrics, LoanStatus, User,
};
use leptos::*;
use wasm_bindgen_futures::spawn_local;

pub fn greeting(user: &User) -> String {
    format!("Good morning, {}", first_name(&user.name))
}

pub fn portfolio_summary(metrics: &LoanMetrics) -> String {
    match metrics.total_active_loans {
        0 => "No loans are active in the portfolio.".to_string(),
        1 => "1 loan is active across the portfolio.".to_string(),
        n => format!("{n} loans are active across the portfolio."),
    }
}

pub fn queue_summary(pending: usize) -> String {
    match pending {
        0 => "No applications are waiting for review.".to_string(),
        1 => "1 application is waiting for review.".to_string(),
        n => format!("{n} applications are waiting for review."),
    }
}

pub fn pending_count(profile: &BorrowerProfile) -> usize {
    profile
        .loan_history
        .iter()
        .filter(|loan| loan.status == LoanStatus::Pending)
        .count()
}

#[component]
fn BorrowerLookup() -> impl IntoView {
    let borrower_id = create_rw_signal(String::new());
    let profile = create_rw_signal(None::<BorrowerProfile>);
    let error = create_rw_signal(None::<String>);

    let lookup = move || {
        let id = borrower_id.get_untracked().trim().to_string();
        if id.is_empty() {
            return;
        }
        spawn_local(async move {
            match bridge::fetch_borrower_profile(&id).await {
                Ok(p) => {
                    profile.set(Some(p));
                    error.set(None);
                }
                Err(e) => {
                    profile.set(None);
                    error.set(Some(e));
                }
            }
        });
    };

    view! {
      <section class="card">
        <h2>"Borrower Lookup"</h2>
        <div class="row">
          <input
            prop:value=move || borrower_id.get()
            on:input=move |ev| borrower_id.set(event_target_value(&ev))
            placeholder="Borrower ID"
          />
          <button on:click=move |_| lookup()>"Look up"</button>
        </div>
        <Show when=move || error.get().is_some() fallback=|| ()>
          <p class="error">{move || error.get().unwrap_or_default()}</p>
        </Show>
        {move || profile.get().map(|p| {
            let pending = pending_count(&p);
            let business = p.business_name.unwrap_or_default();
            let history = p.loan_history;
            view! {
              <div class="stack">
                <div>
                  <b>{p.name}</b>
                  " "
                  <span class="meta">{business}</span>
                </div>
                <div class="meta">{format!("{pending} pending application(s)")}</div>
                <ul>
                  <For
                    each=move || history.clone()
                    key=|loan| loan.id.clone()
                    children=move |loan| {
                      let line = format!(
                          "#{} {} at {}",
                          loan.id,
                          currency(loan.amount),
                          percent(loan.interest_rate)
                      );
                      view! {
                        <li class="row">
                          <span>{line}</span>
                          <LoanStatusBadge status=loan.status/>
                        </li>
                      }
                    }
                  />
                </ul>
              </div>
            }
        })}
      </section>
    }
}

#[component]
pub fn AnalystDashboard(user: User, #[prop(into)] on_logout: Callback<()>) -> impl IntoView {
    let metrics = create_rw_signal(None::<LoanMetrics>);
    let loading = create_rw_signal(true);
    let error = create_rw_signal(None::<String>);

    let load_metrics = move || {
        loading.set(true);
        spawn_local(async move {
            match bridge::fetch_loan_metrics().await {
                Ok(m) => {
                    metrics.set(Some(m));
                    error.set(None);
                }
                Err(e) => {
                    logging::warn!("loan metrics failed to load: {e}");
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    };
    load_metrics();

    let applications = create_rw_signal(Vec::<LoanApplication>::new());
    let queue_error = create_rw_signal(None::<String>);
    spawn_local(async move {
        match bridge::fetch_applications().await {
            Ok(list) => applications.set(list),
            Err(e) => {
                logging::warn!("loan applications failed to load: {e}");
                queue_error.set(Some(e));
            }
        }
    });
    let pending = create_memo(move |_| applications.with(|list| pending_applications(list)));

    let on_decide = Callback::new(move |(id, status): (String, ApplicationStatus)| {
        spawn_local(async move {
            match bridge::set_application_status(&id, status).await {
                Ok(updated) => {
                    applications.update(|list| upsert_application(list, updated));
                    queue_error.set(None);
                }
                Err(e) => queue_error.set(Some(e)),
            }
        });
    });

    let hello = greeting(&user);

    view! {
      <DashboardLayout
        title="Portfolio Overview"
        subtitle=user.organization.clone()
        on_logout=on_logout
      >
        <h2>{hello}</h2>
        <p class="meta">{move || queue_summary(pending.get())}</p>
        {move || {
            if loading.get() {
                return view! { <LoadingSpinner size=SpinnerSize::Lg text="Loading portfolio..."/> }
                    .into_view();
            }
            if let Some(err) = error.get() {
                return view! { <ErrorDisplay error=err on_retry=move |_| load_metrics()/> }
                    .into_view();
            }
            match metrics.get() {
                Some(m) => view! {
                  <p class="meta">{portfolio_summary(&m)}</p>
                  <PortfolioMetrics metrics=portfolio_cards(&m)/>
                }
                .into_view(),
                None => ().into_view(),
            }
        }}
        <Show when=move || queue_error.get().is_some() fallback=|| ()>
          <p class="error">{move || queue_error.get().unwrap_or_default()}</p>
        </Show>
        <ApplicationQueue
          applications=Signal::derive(move || applications.get())
          on_decide=on_decide
        />
        <BorrowerLookup/>
      </DashboardLayout>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lending_contracts::LoanSummary;

    #[test]
    fn summary_pluralizes() {
        let mut m = LoanMetrics {
            total_active_loans: 0,
            total_loan_amount: 0.0,
            average_loan_size: 0.0,
            default_rate: 0.0,
            monthly_originations: 0,
        };
        assert_eq!(portfolio_summary(&m), "No loans are active in the portfolio.");
        m.total_active_loans = 1;
        assert_eq!(portfolio_summary(&m), "1 loan is active across the portfolio.");
        m.total_active_loans = 12;
        assert_eq!(portfolio_summary(&m), "12 loans are active across the portfolio.");
    }

    #[test]
    fn queue_summary_pluralizes() {
        assert_eq!(queue_summary(0), "No applications are waiting for review.");
        assert_eq!(queue_summary(1), "1 application is waiting for review.");
        assert_eq!(queue_summary(3), "3 applications are waiting for review.");
    }

    #[test]
    fn counts_pending_applications() {
        let loan = |id: &str, status| LoanSummary {
            id: id.into(),
            amount: 10000.0,
            status,
            origination_date: "2024-05-01".into(),
            maturity_date: "2026-05-01".into(),
            interest_rate: 6.0,
        };
        let profile = BorrowerProfile {
            id: "2".into(),
            name: "Luis Ortega".into(),
            business_name: Some("Corner Hardware".into()),
            email: "luis@cornerhardware.example".into(),
            phone: None,
            address: None,
            loan_history: vec![
                loan("a", LoanStatus::Pending),
                loan("b", LoanStatus::Active),
                loan("c", LoanStatus::Pending),
            ],
        };
        assert_eq!(pending_count(&profile), 2);
    }
}
