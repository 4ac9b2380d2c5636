use crate::bridge;
use lending_contracts::{validate_login, LoginRequest, User};
use leptos::*;
use wasm_bindgen_futures::spawn_local;

pub const DEMO_ACCOUNTS: [(&str, &str); 3] = [
    ("Admin", "sarah@withcaelo.ai"),
    ("Analyst", "mike@cdfi.example.org"),
    ("Borrower", "jessica@smallbiz.com"),
];

#[component]
pub fn Login(#[prop(into)] on_login: Callback<User>) -> impl IntoView {
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let submitting = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let request = LoginRequest {
            email: email.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        if let Err(err) = validate_login(&request) {
            error.set(Some(err.to_string()));
            return;
        }

        submitting.set(true);
        spawn_local(async move {
            let result = bridge::login(&request).await;
            submitting.set(false);
            match result {
                Ok(response) => {
                    error.set(None);
                    on_login.call(response.user);
                }
                Err(e) => error.set(Some(e)),
            }
        });
    };

    view! {
      <div class="login">
        <form class="card stack" on:submit=submit>
          <h1>"Community Lending Platform"</h1>
          <p class="meta">"Sign in to your account"</p>
          <input
            type="email"
            prop:value=move || email.get()
            on:input=move |ev| email.set(event_target_value(&ev))
            placeholder="Email"
          />
          <input
            type="password"
            prop:value=move || password.get()
            on:input=move |ev| password.set(event_target_value(&ev))
            placeholder="Password"
          />
          <Show when=move || error.get().is_some() fallback=|| ()>
            <p class="error">{move || error.get().unwrap_or_default()}</p>
          </Show>
          <button type="submit" prop:disabled=move || submitting.get()>
            {move || if submitting.get() { "Signing in..." } else { "Sign In" }}
          </button>
        </form>
        <div class="card meta">
          <p>"Demo accounts"</p>
          <ul>
            {DEMO_ACCOUNTS
                .iter()
                .map(|(role, address)| {
                    let address = *address;
                    view! {
                      <li on:click=move |_| email.set(address.to_string())>
                        <b>{*role}</b>
                        ": "
                        {address}
                      </li>
                    }
                })
                .collect_view()}
          </ul>
        </div>
      </div>
    }
}
