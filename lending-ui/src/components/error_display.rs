use leptos::*;

/// Retry needs both the flag and somebody to call.
pub fn shows_retry(show_retry: bool, has_handler: bool) -> bool {
    show_retry && has_handler
}

#[component]
pub fn ErrorDisplay(
    #[prop(into)] error: String,
    #[prop(optional, into)] on_retry: Option<Callback<()>>,
    #[prop(default = true)] show_retry: bool,
) -> impl IntoView {
    let retry = if shows_retry(show_retry, on_retry.is_some()) {
        on_retry
    } else {
        None
    };
    view! {
      <div class="error-display" role="alert">
        <h3>"Something went wrong"</h3>
        <p class="error">{error}</p>
        {retry.map(|cb| view! {
          <button class="btn-outline" on:click=move |_| cb.call(())>"Try Again"</button>
        })}
      </div>
    }
}
