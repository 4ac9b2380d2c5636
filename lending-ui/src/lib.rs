pub mod app;
pub mod bridge;
pub mod dto;
pub mod format;
pub mod login;

pub mod components {
    pub mod application_queue;
    pub mod dashboard_layout;
    pub mod error_display;
    pub mod file_upload;
    pub mod loading_spinner;
    pub mod loan_overview;
    pub mod loan_product_card;
    pub mod loan_product_form;
    pub mod portfolio_metrics;
    pub mod progress;
    pub mod recent_activity;
    pub mod status_badge;
    pub mod upcoming_tasks;
}

pub mod dashboards {
    pub mod admin;
    pub mod analyst;
    pub mod borrower;
}
