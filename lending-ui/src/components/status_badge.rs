use lending_contracts::{ApplicationStatus, LoanStatus};
use leptos::*;

pub const NEUTRAL_BADGE: &str = "badge bg-gray-100 text-gray-800";

/// Badge style for application review states. Unknown states stay neutral.
pub fn status_badge_class(status: &str) -> &'static str {
    match status {
        "approved" => "badge bg-green-100 text-green-800",
        "rejected" => "badge bg-red-100 text-red-800",
        "in-review" => "badge bg-yellow-100 text-yellow-800",
        "active" => "badge bg-blue-100 text-blue-800",
        _ => NEUTRAL_BADGE,
    }
}

pub fn loan_status_class(status: LoanStatus) -> &'static str {
    match status {
        LoanStatus::Active => "badge bg-blue-100 text-blue-800",
        LoanStatus::Paid => "badge bg-green-100 text-green-800",
        LoanStatus::Default => "badge bg-red-100 text-red-800",
        LoanStatus::Pending => "badge bg-yellow-100 text-yellow-800",
    }
}

pub fn loan_status_label(status: LoanStatus) -> &'static str {
    match status {
        LoanStatus::Active => "Active",
        LoanStatus::Paid => "Paid",
        LoanStatus::Default => "Default",
        LoanStatus::Pending => "Pending",
    }
}

/// Review states reuse the badge tones: under review shows as `in-review`,
/// disbursed as `active`, pending stays neutral.
pub fn application_badge_key(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "pending",
        ApplicationStatus::UnderReview => "in-review",
        ApplicationStatus::Approved => "approved",
        ApplicationStatus::Rejected => "rejected",
        ApplicationStatus::Disbursed => "active",
    }
}

#[component]
pub fn StatusBadge(#[prop(into)] status: String, #[prop(into)] text: String) -> impl IntoView {
    view! { <span class=status_badge_class(&status)>{text}</span> }
}

#[component]
pub fn LoanStatusBadge(status: LoanStatus) -> impl IntoView {
    view! { <span class=loan_status_class(status)>{loan_status_label(status)}</span> }
}

#[component]
pub fn ApplicationStatusBadge(status: ApplicationStatus) -> impl IntoView {
    view! { <StatusBadge status=application_badge_key(status) text=status.label()/> }
}
