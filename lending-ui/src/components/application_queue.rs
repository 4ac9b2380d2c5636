use crate::components::status_badge::ApplicationStatusBadge;
use crate::components::upcoming_tasks::priority_class;
use crate::format::currency;
use lending_contracts::{ApplicationStatus, LoanApplication};
use leptos::*;

/// `"all"` (or anything unrecognized) means no status filter.
pub fn status_filter(value: &str) -> Option<ApplicationStatus> {
    ApplicationStatus::parse(value)
}

/// Case-insensitive match on business name, type or purpose, then status.
pub fn filter_applications(
    applications: &[LoanApplication],
    term: &str,
    status: Option<ApplicationStatus>,
) -> Vec<LoanApplication> {
    let term = term.trim().to_lowercase();
    applications
        .iter()
        .filter(|a| status.map_or(true, |s| a.status == s))
        .filter(|a| {
            term.is_empty()
                || a.business_name.to_lowercase().contains(&term)
                || a.business_type.to_lowercase().contains(&term)
                || a.loan_purpose.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

pub fn pending_applications(applications: &[LoanApplication]) -> usize {
    applications
        .iter()
        .filter(|a| a.status == ApplicationStatus::Pending)
        .count()
}

/// Moves staff may make from `status`. Decided and disbursed files are closed
/// except that an approval can still be disbursed.
pub fn next_actions(status: ApplicationStatus) -> &'static [ApplicationStatus] {
    use ApplicationStatus::*;
    match status {
        Pending => &[UnderReview, Approved, Rejected],
        UnderReview => &[Approved, Rejected],
        Approved => &[Disbursed],
        Rejected | Disbursed => &[],
    }
}

pub fn action_label(next: ApplicationStatus) -> &'static str {
    match next {
        ApplicationStatus::Pending => "Reopen",
        ApplicationStatus::UnderReview => "Start review",
        ApplicationStatus::Approved => "Approve",
        ApplicationStatus::Rejected => "Reject",
        ApplicationStatus::Disbursed => "Mark disbursed",
    }
}

/// Replaces the application with the same id, or appends it.
pub fn upsert_application(applications: &mut Vec<LoanApplication>, updated: LoanApplication) {
    match applications.iter_mut().find(|a| a.id == updated.id) {
        Some(slot) => *slot = updated,
        None => applications.push(updated),
    }
}

/// Searchable list of applications. Without `on_decide` the list is read-only.
#[component]
pub fn ApplicationQueue(
    #[prop(into)] applications: MaybeSignal<Vec<LoanApplication>>,
    #[prop(optional, into)] on_decide: Option<Callback<(String, ApplicationStatus)>>,
    #[prop(optional, into)] title: Option<String>,
) -> impl IntoView {
    let search = create_rw_signal(String::new());
    let status = create_rw_signal("all".to_string());
    let visible = create_memo(move |_| {
        let wanted = status.with(|s| status_filter(s));
        search.with(|term| applications.with(|list| filter_applications(list, term, wanted)))
    });

    view! {
      <section class="card">
        <h2>{title.unwrap_or_else(|| "Application Queue".to_string())}</h2>
        <div class="row">
          <input
            type="search"
            prop:value=move || search.get()
            on:input=move |ev| search.set(event_target_value(&ev))
            placeholder="Search applications..."
          />
          <select on:change=move |ev| status.set(event_target_value(&ev))>
            <option value="all">"All statuses"</option>
            {ApplicationStatus::ALL
                .into_iter()
                .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                .collect_view()}
          </select>
        </div>
        <Show
          when=move || !visible.with(Vec::is_empty)
          fallback=|| view! { <p class="meta">"No applications match."</p> }
        >
          <ul class="application-list">
            <For
              each=move || visible.get()
              key=|a| (a.id.clone(), a.status, a.updated_at.clone())
              children=move |a| {
                  let actions = match on_decide {
                      Some(decide) => next_actions(a.status)
                          .iter()
                          .map(|&next| {
                              let id = a.id.clone();
                              view! {
                                <button on:click=move |_| decide.call((id.clone(), next))>
                                  {action_label(next)}
                                </button>
                              }
                          })
                          .collect_view(),
                      None => ().into_view(),
                  };
                  let risk = a
                      .risk_score
                      .map(|score| format!("Risk score {score:.0}"))
                      .unwrap_or_else(|| "Not scored".to_string());
                  let submitted: String = a.application_date.chars().take(10).collect();
                  view! {
                    <li class="row">
                      <div>
                        <p><b>{a.business_name.clone()}</b>" "{currency(a.loan_amount)}</p>
                        <p class="meta">{a.loan_purpose.clone()}</p>
                        <p class="meta">{format!("Submitted {submitted} | {risk}")}</p>
                      </div>
                      <span class=priority_class(a.priority.as_str())>{a.priority.as_str()}</span>
                      <ApplicationStatusBadge status=a.status/>
                      <div class="row">{actions}</div>
                    </li>
                  }
              }
            />
          </ul>
        </Show>
      </section>
    }
}
