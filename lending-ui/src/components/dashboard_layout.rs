use leptos::*;

#[component]
pub fn DashboardLayout(
    #[prop(into)] title: String,
    #[prop(optional_no_strip)] subtitle: Option<String>,
    #[prop(into)] on_logout: Callback<()>,
    children: Children,
) -> impl IntoView {
    view! {
      <div class="dashboard">
        <header class="dashboard-header row">
          <div>
            <h1>{title}</h1>
            {subtitle.map(|s| view! { <p class="meta">{s}</p> })}
          </div>
          <button class="btn-outline" on:click=move |_| on_logout.call(())>"Logout"</button>
        </header>
        <main class="dashboard-body">{children()}</main>
        <footer class="dashboard-footer meta">"Community Lending Platform"</footer>
      </div>
    }
}
