use crate::format::{currency, percent};
use lending_contracts::LoanProduct;
use leptos::*;

pub fn amount_range(product: &LoanProduct) -> String {
    format!("{} - {}", currency(product.min_amount), currency(product.max_amount))
}

pub fn active_badge(is_active: bool) -> (&'static str, &'static str) {
    if is_active {
        ("Active", "badge bg-green-100 text-green-800")
    } else {
        ("Inactive", "badge bg-gray-100 text-gray-800")
    }
}

pub fn business_type_count(product: &LoanProduct) -> String {
    match product.business_types.len() {
        1 => "1 business type".to_string(),
        n => format!("{n} business types"),
    }
}

/// Hands the flipped flag to `on_toggle`. One call per invocation.
pub fn toggle_status(product: &LoanProduct, on_toggle: impl FnOnce(String, bool)) {
    on_toggle(product.id.clone(), !product.is_active);
}

#[component]
pub fn LoanProductCard(
    product: LoanProduct,
    #[prop(into)] on_edit: Callback<LoanProduct>,
    #[prop(into)] on_duplicate: Callback<LoanProduct>,
    #[prop(into)] on_delete: Callback<String>,
    #[prop(into)] on_toggle_status: Callback<(String, bool)>,
    #[prop(optional, into)] is_highlighted: MaybeSignal<bool>,
) -> impl IntoView {
    let (badge_text, badge_class) = active_badge(product.is_active);
    let card_class = move || {
        if is_highlighted.get() {
            "card product-card highlighted"
        } else {
            "card product-card"
        }
    };

    let toggled = product.clone();
    let edited = product.clone();
    let duplicated = product.clone();
    let delete_id = product.id.clone();

    view! {
      <div class=card_class>
        <div class="row">
          <h3>{product.name.clone()}</h3>
          <span class=badge_class>{badge_text}</span>
        </div>
        <p class="meta">{product.description.clone()}</p>
        <dl class="product-facts">
          <dt>"Amount"</dt>
          <dd>{amount_range(&product)}</dd>
          <dt>"Rate"</dt>
          <dd>{percent(product.interest_rate)}</dd>
          <dt>"Term"</dt>
          <dd>{format!("{} months", product.term_length)}</dd>
        </dl>
        <p class="meta">{business_type_count(&product)}</p>
        <div class="row">
          <button
            class="switch"
            role="switch"
            aria-checked=product.is_active.to_string()
            on:click=move |_| {
                toggle_status(&toggled, |id, active| on_toggle_status.call((id, active)))
            }
          >
            {if product.is_active { "Deactivate" } else { "Activate" }}
          </button>
          <button on:click=move |_| on_edit.call(edited.clone())>"Edit"</button>
          <button on:click=move |_| on_duplicate.call(duplicated.clone())>"Duplicate"</button>
          <button class="danger" on:click=move |_| on_delete.call(delete_id.clone())>
            "Delete"
          </button>
        </div>
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn product(is_active: bool) -> LoanProduct {
        LoanProduct {
            id: "p1".into(),
            name: "Small Business Growth".into(),
            description: "Working capital".into(),
            min_amount: 5000.0,
            max_amount: 100000.0,
            interest_rate: 6.5,
            term_length: 36,
            is_active,
            business_types: vec!["Retail".into(), "Food Service".into()],
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: None,
        }
    }

    #[test]
    fn toggle_reports_flipped_flag_once() {
        for start in [true, false] {
            let calls = RefCell::new(Vec::new());
            toggle_status(&product(start), |id, active| calls.borrow_mut().push((id, active)));
            assert_eq!(calls.into_inner(), vec![("p1".to_string(), !start)]);
        }
    }

    #[test]
    fn card_labels() {
        let p = product(false);
        assert_eq!(amount_range(&p), "$5,000 - $100,000");
        assert_eq!(active_badge(p.is_active).0, "Inactive");
        assert_eq!(business_type_count(&p), "2 business types");
    }
}
