use crate::bridge;
use crate::components::loading_spinner::{LoadingSpinner, SpinnerSize};
use crate::dashboards::admin::AdminDashboard;
use crate::dashboards::analyst::AnalystDashboard;
use crate::dashboards::borrower::BorrowerDashboard;
use crate::login::Login;
use lending_contracts::{User, UserRole};
use leptos::*;
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn App() -> impl IntoView {
    let session = create_rw_signal(None::<User>);
    let restoring = create_rw_signal(bridge::has_token());

    if restoring.get_untracked() {
        spawn_local(async move {
            match bridge::fetch_me().await {
                Ok(user) => session.set(Some(user)),
                Err(e) => {
                    logging::warn!("stored session rejected: {e}");
                    bridge::clear_token();
                }
            }
            restoring.set(false);
        });
    }

    let on_login = Callback::new(move |user: User| session.set(Some(user)));
    let on_logout = Callback::new(move |_: ()| {
        spawn_local(async move {
            if let Err(e) = bridge::logout().await {
                logging::warn!("logout failed: {e}");
            }
            session.set(None);
        });
    });

    move || {
        if restoring.get() {
            return view! { <LoadingSpinner size=SpinnerSize::Lg text="Restoring session..."/> }
                .into_view();
        }
        match session.get() {
            None => view! { <Login on_login=on_login/> }.into_view(),
            Some(user) => match user.role {
                UserRole::Borrower => {
                    view! { <BorrowerDashboard user=user on_logout=on_logout/> }.into_view()
                }
                UserRole::Analyst => {
                    view! { <AnalystDashboard user=user on_logout=on_logout/> }.into_view()
                }
                UserRole::Admin => {
                    view! { <AdminDashboard user=user on_logout=on_logout/> }.into_view()
                }
            },
        }
    }
}
