use crate::bridge;
use crate::components::dashboard_layout::DashboardLayout;
use crate::components::error_display::ErrorDisplay;
use crate::components::loading_spinner::{LoadingSpinner, SpinnerSize};
use crate::components::loan_product_card::LoanProductCard;
use crate::components::loan_product_form::LoanProductForm;
use lending_contracts::{LoanProduct, LoanProductDraft, User};
use leptos::*;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;

const HIGHLIGHT_FOR: Duration = Duration::from_secs(3);

/// Case-insensitive match on name or description. A blank term keeps everything.
pub fn filter_products(products: &[LoanProduct], term: &str) -> Vec<LoanProduct> {
    let term = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| {
            term.is_empty()
                || p.name.to_lowercase().contains(&term)
                || p.description.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

pub fn duplicate_draft(product: &LoanProduct) -> LoanProductDraft {
    let mut draft = product.to_draft();
    draft.name = format!("{} (Copy)", product.name);
    draft
}

/// Replaces the product with the same id, or appends it.
pub fn upsert_product(products: &mut Vec<LoanProduct>, product: LoanProduct) {
    match products.iter_mut().find(|p| p.id == product.id) {
        Some(slot) => *slot = product,
        None => products.push(product),
    }
}

pub fn empty_state(search: &str) -> (&'static str, &'static str) {
    if search.trim().is_empty() {
        (
            "No loan products yet",
            "Create your first loan product to start accepting applications.",
        )
    } else {
        (
            "No products match your search",
            "Try a different name or description.",
        )
    }
}

#[component]
pub fn AdminDashboard(user: User, #[prop(into)] on_logout: Callback<()>) -> impl IntoView {
    let products = create_rw_signal(Vec::<LoanProduct>::new());
    let loading = create_rw_signal(true);
    let error = create_rw_signal(None::<String>);
    let notice = create_rw_signal(None::<String>);
    let search = create_rw_signal(String::new());
    let form_open = create_rw_signal(false);
    let editing = create_rw_signal(None::<LoanProduct>);
    let highlighted = create_rw_signal(None::<String>);

    let load_products = move || {
        loading.set(true);
        spawn_local(async move {
            match bridge::fetch_loan_products().await {
                Ok(list) => {
                    products.set(list);
                    error.set(None);
                }
                Err(e) => {
                    logging::warn!("loan products failed to load: {e}");
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    };
    load_products();

    let filtered = create_memo(move |_| {
        search.with(|term| products.with(|list| filter_products(list, term)))
    });

    let on_edit = Callback::new(move |product: LoanProduct| {
        editing.set(Some(product));
        form_open.set(true);
    });

    let on_duplicate = Callback::new(move |product: LoanProduct| {
        spawn_local(async move {
            match bridge::create_loan_product(&duplicate_draft(&product)).await {
                Ok(created) => {
                    notice.set(Some(format!("Duplicated as \"{}\"", created.name)));
                    products.update(|list| upsert_product(list, created));
                }
                Err(e) => notice.set(Some(e)),
            }
        });
    });

    let on_delete = Callback::new(move |id: String| {
        spawn_local(async move {
            match bridge::delete_loan_product(&id).await {
                Ok(()) => {
                    products.update(|list| list.retain(|p| p.id != id));
                    notice.set(Some("Loan product deleted".into()));
                }
                Err(e) => notice.set(Some(e)),
            }
        });
    });

    let on_toggle_status = Callback::new(move |(id, is_active): (String, bool)| {
        spawn_local(async move {
            match bridge::set_loan_product_status(&id, is_active).await {
                Ok(updated) => products.update(|list| upsert_product(list, updated)),
                Err(e) => notice.set(Some(e)),
            }
        });
    });

    let on_save = Callback::new(move |draft: LoanProductDraft| {
        let current = editing.get_untracked();
        spawn_local(async move {
            let saved = match &current {
                Some(p) => bridge::update_loan_product(&p.id, &draft).await,
                None => bridge::create_loan_product(&draft).await,
            };
            match saved {
                Ok(product) => {
                    if current.is_some() {
                        highlighted.set(Some(product.id.clone()));
                        set_timeout(move || highlighted.set(None), HIGHLIGHT_FOR);
                    }
                    products.update(|list| upsert_product(list, product));
                    form_open.set(false);
                    editing.set(None);
                    notice.set(None);
                }
                Err(e) => notice.set(Some(e)),
            }
        });
    });

    let on_cancel = Callback::new(move |_: ()| {
        form_open.set(false);
        editing.set(None);
    });

    view! {
      <DashboardLayout
        title="Loan Products"
        subtitle=user.organization.clone()
        on_logout=on_logout
      >
        <div class="row">
          <input
            type="search"
            prop:value=move || search.get()
            on:input=move |ev| search.set(event_target_value(&ev))
            placeholder="Search products..."
          />
          <button on:click=move |_| {
              editing.set(None);
              form_open.set(true);
          }>"New Product"</button>
        </div>

        <Show when=move || notice.get().is_some() fallback=|| ()>
          <p class="notice" on:click=move |_| notice.set(None)>
            {move || notice.get().unwrap_or_default()}
          </p>
        </Show>

        <Show when=move || form_open.get() fallback=|| ()>
          {move || view! {
            <LoanProductForm product=editing.get() on_save=on_save on_cancel=on_cancel/>
          }}
        </Show>

        {move || {
            if loading.get() {
                return view! { <LoadingSpinner size=SpinnerSize::Lg text="Loading products..."/> }
                    .into_view();
            }
            if let Some(err) = error.get() {
                return view! { <ErrorDisplay error=err on_retry=move |_| load_products()/> }
                    .into_view();
            }
            view! {
              <Show
                when=move || !filtered.with(Vec::is_empty)
                fallback=move || {
                    let (title, hint) = empty_state(&search.get());
                    view! {
                      <div class="empty-state">
                        <h3>{title}</h3>
                        <p class="meta">{hint}</p>
                      </div>
                    }
                }
              >
                <div class="product-grid">
                  <For
                    each=move || filtered.get()
                    key=|p| (p.id.clone(), p.is_active, p.updated_at.clone())
                    children=move |product| {
                        let id = product.id.clone();
                        let is_highlighted = Signal::derive(move || {
                            highlighted.get().as_deref() == Some(id.as_str())
                        });
                        view! {
                          <LoanProductCard
                            product=product
                            on_edit=on_edit
                            on_duplicate=on_duplicate
                            on_delete=on_delete
                            on_toggle_status=on_toggle_status
                            is_highlighted=is_highlighted
                          />
                        }
                    }
                  />
                </div>
              </Show>
            }
            .into_view()
        }}
      </DashboardLayout>
    }
}
