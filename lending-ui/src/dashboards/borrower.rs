use crate::bridge;
use crate::components::application_queue::ApplicationQueue;
use crate::components::dashboard_layout::DashboardLayout;
use crate::components::error_display::ErrorDisplay;
use crate::components::file_upload::{picked_file, FileUpload};
use crate::components::loading_spinner::{LoadingSpinner, SpinnerSize};
use crate::components::loan_overview::{LoanDetails, LoanOverview};
use crate::components::recent_activity::RecentActivity;
use crate::components::status_badge::LoanStatusBadge;
use crate::components::upcoming_tasks::UpcomingTasks;
use crate::dto::{Activity, Task};
use crate::format::{currency, current_year_month, first_name, percent};
use lending_contracts::{BorrowerProfile, LoanApplication, LoanStatus, UploadedFile, User};
use leptos::*;
use wasm_bindgen_futures::spawn_local;

pub fn welcome_line(user: &User) -> String {
    format!("Welcome back, {}", first_name(&user.name))
}

fn loan_purpose(profile: &BorrowerProfile) -> String {
    match &profile.business_name {
        Some(business) => format!("Working capital for {business}"),
        None => "Business loan".to_string(),
    }
}

/// Activity feed derived from loan history, newest first, plus any document
/// picked this session.
pub fn borrower_activities(
    profile: &BorrowerProfile,
    upload: Option<&UploadedFile>,
) -> Vec<Activity> {
    let mut activities: Vec<Activity> = upload
        .map(|file| Activity {
            id: format!("upload-{}", file.name),
            kind: "document".into(),
            description: format!("Uploaded {}", file.name),
            date: "Just now".into(),
            status: "success".into(),
        })
        .into_iter()
        .collect();

    activities.extend(profile.loan_history.iter().map(|loan| {
        let (kind, description, status) = match loan.status {
            LoanStatus::Active => (
                "payment",
                format!("Loan #{} disbursed: {}", loan.id, currency(loan.amount)),
                "success",
            ),
            LoanStatus::Paid => ("payment", format!("Loan #{} paid in full", loan.id), "success"),
            LoanStatus::Pending => (
                "document",
                format!("Application for {} under review", currency(loan.amount)),
                "info",
            ),
            LoanStatus::Default => (
                "contact",
                format!("Loan #{} referred to collections", loan.id),
                "info",
            ),
        };
        Activity {
            id: format!("loan-{}", loan.id),
            kind: kind.into(),
            description,
            date: loan.origination_date.clone(),
            status: status.into(),
        }
    }));
    activities
}

pub fn borrower_tasks(profile: &BorrowerProfile, has_upload: bool) -> Vec<Task> {
    let mut tasks = Vec::new();
    let pending = profile
        .loan_history
        .iter()
        .any(|loan| loan.status == LoanStatus::Pending);
    if pending && !has_upload {
        tasks.push(Task {
            task: "Upload supporting documents".into(),
            due: "As soon as possible".into(),
            priority: "high".into(),
        });
    }
    if profile.current_loan().is_some() {
        tasks.push(Task {
            task: "Submit quarterly financial statements".into(),
            due: "End of quarter".into(),
            priority: "medium".into(),
        });
    }
    tasks.push(Task {
        task: "Review business contact details".into(),
        due: "Annually".into(),
        priority: "low".into(),
    });
    tasks
}

#[component]
pub fn BorrowerDashboard(user: User, #[prop(into)] on_logout: Callback<()>) -> impl IntoView {
    let profile = create_rw_signal(None::<BorrowerProfile>);
    let loading = create_rw_signal(true);
    let error = create_rw_signal(None::<String>);
    let upload = create_rw_signal(None::<UploadedFile>);

    let load_profile = move || {
        loading.set(true);
        spawn_local(async move {
            match bridge::fetch_my_profile().await {
                Ok(p) => {
                    profile.set(Some(p));
                    error.set(None);
                }
                Err(e) => {
                    logging::warn!("borrower profile failed to load: {e}");
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    };
    load_profile();

    let applications = create_rw_signal(Vec::<LoanApplication>::new());
    spawn_local(async move {
        match bridge::fetch_applications().await {
            Ok(list) => applications.set(list),
            Err(e) => logging::warn!("loan applications failed to load: {e}"),
        }
    });

    let on_file_select = Callback::new(move |file: web_sys::File| {
        upload.set(Some(picked_file(&file.name(), file.size())));
    });

    let greeting = welcome_line(&user);

    view! {
      <DashboardLayout
        title="My Business Loan"
        subtitle=user.organization.clone()
        on_logout=on_logout
      >
        <h2>{greeting}</h2>
        {move || {
            if loading.get() {
                return view! { <LoadingSpinner size=SpinnerSize::Lg text="Loading your loan..."/> }
                    .into_view();
            }
            if let Some(err) = error.get() {
                return view! { <ErrorDisplay error=err on_retry=move |_| load_profile()/> }
                    .into_view();
            }
            let Some(p) = profile.get() else {
                return view! {
                  <p class="meta">"No borrower profile is linked to this account."</p>
                }
                .into_view();
            };

            let overview = p.current_loan().map(|loan| {
                LoanDetails::from_summary(loan, loan_purpose(&p), current_year_month())
            });
            let history = p.loan_history.clone();
            let activities = Signal::derive({
                let p = p.clone();
                move || upload.with(|file| borrower_activities(&p, file.as_ref()))
            });
            let tasks = Signal::derive({
                let p = p.clone();
                move || upload.with(|file| borrower_tasks(&p, file.is_some()))
            });

            view! {
              {match overview {
                  Some(details) => view! { <LoanOverview details=details/> }.into_view(),
                  None => view! { <p class="meta">"You have no active loan."</p> }.into_view(),
              }}
              <section class="card">
                <h2>"Loan History"</h2>
                <table>
                  <thead>
                    <tr>
                      <th>"Loan"</th>
                      <th>"Amount"</th>
                      <th>"Rate"</th>
                      <th>"Originated"</th>
                      <th>"Matures"</th>
                      <th>"Status"</th>
                    </tr>
                  </thead>
                  <tbody>
                    <For
                      each=move || history.clone()
                      key=|loan| loan.id.clone()
                      children=move |loan| view! {
                        <tr>
                          <td>{format!("#{}", loan.id)}</td>
                          <td>{currency(loan.amount)}</td>
                          <td>{percent(loan.interest_rate)}</td>
                          <td>{loan.origination_date.clone()}</td>
                          <td>{loan.maturity_date.clone()}</td>
                          <td><LoanStatusBadge status=loan.status/></td>
                        </tr>
                      }
                    />
                  </tbody>
                </table>
              </section>
              <div class="two-col">
                <RecentActivity activities=activities/>
                <UpcomingTasks tasks=tasks/>
              </div>
              <ApplicationQueue
                applications=Signal::derive(move || applications.get())
                title="My Applications"
              />
              <section class="card">
                <h2>"Documents"</h2>
                <FileUpload
                  label="Financial statements"
                  optional=true
                  uploaded_file=Signal::derive(move || upload.get())
                  on_file_select=on_file_select
                />
              </section>
            }
            .into_view()
        }}
      </DashboardLayout>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lending_contracts::{LoanSummary, UserRole};

    fn loan(id: &str, status: LoanStatus) -> LoanSummary {
        LoanSummary {
            id: id.into(),
            amount: 25000.0,
            status,
            origination_date: "2024-02-01".into(),
            maturity_date: "2027-02-01".into(),
            interest_rate: 4.5,
        }
    }

    fn profile(history: Vec<LoanSummary>) -> BorrowerProfile {
        BorrowerProfile {
            id: "1".into(),
            name: "Jessica Martinez".into(),
            business_name: Some("Sunrise Bakery".into()),
            email: "jessica@sunrisebakery.example".into(),
            phone: None,
            address: None,
            loan_history: history,
        }
    }

    #[test]
    fn welcome_uses_first_name() {
        let user = User {
            id: "3".into(),
            email: "jessica@sunrisebakery.example".into(),
            role: UserRole::Borrower,
            name: "Jessica Martinez".into(),
            organization: None,
            is_active: true,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: None,
        };
        assert_eq!(welcome_line(&user), "Welcome back, Jessica");
    }

    #[test]
    fn activities_follow_loan_history_after_uploads() {
        let p = profile(vec![loan("4", LoanStatus::Pending), loan("1", LoanStatus::Paid)]);
        let file = UploadedFile::new("statements.pdf", "2.0 MB", 100);
        let activities = borrower_activities(&p, Some(&file));
        assert_eq!(activities.len(), 3);
        assert_eq!(activities[0].kind, "document");
        assert_eq!(activities[1].status, "info");
        assert_eq!(activities[2].description, "Loan #1 paid in full");
    }

    #[test]
    fn empty_history_has_no_activities() {
        assert!(borrower_activities(&profile(Vec::new()), None).is_empty());
    }

    #[test]
    fn pending_application_asks_for_documents_until_uploaded() {
        let p = profile(vec![loan("4", LoanStatus::Pending), loan("2", LoanStatus::Active)]);
        let tasks = borrower_tasks(&p, false);
        assert_eq!(tasks[0].priority, "high");
        assert_eq!(tasks.len(), 3);
        let tasks = borrower_tasks(&p, true);
        assert!(tasks.iter().all(|t| t.priority != "high"));
    }
}
