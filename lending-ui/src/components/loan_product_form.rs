use lending_contracts::{validate_product_draft, LoanProduct, LoanProductDraft};
use leptos::*;

/// Raw form inputs. Numbers stay as typed until submit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub min_amount: String,
    pub max_amount: String,
    pub interest_rate: String,
    pub term_length: String,
    pub is_active: bool,
    pub business_types: String,
}

impl ProductFields {
    pub fn from_product(product: Option<&LoanProduct>) -> Self {
        match product {
            Some(p) => Self {
                name: p.name.clone(),
                description: p.description.clone(),
                min_amount: p.min_amount.to_string(),
                max_amount: p.max_amount.to_string(),
                interest_rate: p.interest_rate.to_string(),
                term_length: p.term_length.to_string(),
                is_active: p.is_active,
                business_types: p.business_types.join(", "),
            },
            None => Self {
                is_active: true,
                ..Self::default()
            },
        }
    }

    pub fn to_draft(&self) -> Result<LoanProductDraft, String> {
        let draft = LoanProductDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            min_amount: parse_number(&self.min_amount, "Minimum amount")?,
            max_amount: parse_number(&self.max_amount, "Maximum amount")?,
            interest_rate: parse_number(&self.interest_rate, "Interest rate")?,
            term_length: self
                .term_length
                .trim()
                .parse()
                .map_err(|_| "Term length must be a whole number of months".to_string())?,
            is_active: self.is_active,
            business_types: self
                .business_types
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        };
        validate_product_draft(&draft).map_err(|e| e.to_string())?;
        Ok(draft)
    }
}

fn parse_number(value: &str, label: &str) -> Result<f64, String> {
    value
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| format!("{label} must be a number"))
}

#[component]
fn FormField(
    #[prop(into)] label: String,
    value: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
    #[prop(default = "text")] input_type: &'static str,
) -> impl IntoView {
    view! {
      <label class="stack">
        <span class="field-label">{label}</span>
        <input
          type=input_type
          prop:value=move || value.get()
          on:input=move |ev| on_input.call(event_target_value(&ev))
        />
      </label>
    }
}

#[component]
pub fn LoanProductForm(
    product: Option<LoanProduct>,
    #[prop(into)] on_save: Callback<LoanProductDraft>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let title = if product.is_some() {
        "Edit Loan Product"
    } else {
        "Create Loan Product"
    };
    let fields = create_rw_signal(ProductFields::from_product(product.as_ref()));
    let error = create_rw_signal(None::<String>);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        match fields.get_untracked().to_draft() {
            Ok(draft) => {
                error.set(None);
                on_save.call(draft);
            }
            Err(e) => error.set(Some(e)),
        }
    };

    view! {
      <form class="card product-form" on:submit=submit>
        <h2>{title}</h2>
        <FormField
          label="Name"
          value=Signal::derive(move || fields.with(|f| f.name.clone()))
          on_input=move |v| fields.update(|f| f.name = v)
        />
        <FormField
          label="Description"
          value=Signal::derive(move || fields.with(|f| f.description.clone()))
          on_input=move |v| fields.update(|f| f.description = v)
        />
        <div class="row">
          <FormField
            label="Minimum Amount"
            input_type="number"
            value=Signal::derive(move || fields.with(|f| f.min_amount.clone()))
            on_input=move |v| fields.update(|f| f.min_amount = v)
          />
          <FormField
            label="Maximum Amount"
            input_type="number"
            value=Signal::derive(move || fields.with(|f| f.max_amount.clone()))
            on_input=move |v| fields.update(|f| f.max_amount = v)
          />
        </div>
        <div class="row">
          <FormField
            label="Interest Rate (%)"
            input_type="number"
            value=Signal::derive(move || fields.with(|f| f.interest_rate.clone()))
            on_input=move |v| fields.update(|f| f.interest_rate = v)
          />
          <FormField
            label="Term (months)"
            input_type="number"
            value=Signal::derive(move || fields.with(|f| f.term_length.clone()))
            on_input=move |v| fields.update(|f| f.term_length = v)
          />
        </div>
        <FormField
          label="Business Types (comma separated)"
          value=Signal::derive(move || fields.with(|f| f.business_types.clone()))
          on_input=move |v| fields.update(|f| f.business_types = v)
        />
        <label class="row">
          <input
            type="checkbox"
            prop:checked=move || fields.with(|f| f.is_active)
            on:change=move |ev| fields.update(|f| f.is_active = event_target_checked(&ev))
          />
          <span>"Active"</span>
        </label>
        <Show when=move || error.get().is_some() fallback=|| ()>
          <p class="error">{move || error.get().unwrap_or_default()}</p>
        </Show>
        <div class="row">
          <button type="button" on:click=move |_| on_cancel.call(())>"Cancel"</button>
          <button type="submit">"Save"</button>
        </div>
      </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ProductFields {
        ProductFields {
            name: " Equipment Financing ".into(),
            description: "Machinery and vehicles".into(),
            min_amount: "10,000".into(),
            max_amount: "250000".into(),
            interest_rate: "7.25".into(),
            term_length: "60".into(),
            is_active: true,
            business_types: "Manufacturing, , Construction".into(),
        }
    }

    #[test]
    fn parses_filled_form_into_draft() {
        let draft = filled().to_draft().expect("draft");
        assert_eq!(draft.name, "Equipment Financing");
        assert_eq!(draft.min_amount, 10000.0);
        assert_eq!(draft.term_length, 60);
        assert_eq!(draft.business_types, vec!["Manufacturing", "Construction"]);
    }

    #[test]
    fn rejects_non_numeric_and_inverted_amounts() {
        let mut fields = filled();
        fields.interest_rate = "seven".into();
        assert_eq!(fields.to_draft().unwrap_err(), "Interest rate must be a number");

        let mut fields = filled();
        fields.min_amount = "500000".into();
        assert!(fields.to_draft().is_err());
    }

    #[test]
    fn new_form_defaults_to_active() {
        let fields = ProductFields::from_product(None);
        assert!(fields.is_active);
        assert!(fields.name.is_empty());
    }

    #[test]
    fn editing_round_trips_existing_product() {
        let product = LoanProduct {
            id: "p9".into(),
            name: "Microloan".into(),
            description: "Starter capital".into(),
            min_amount: 500.0,
            max_amount: 50000.0,
            interest_rate: 8.0,
            term_length: 24,
            is_active: false,
            business_types: vec!["Retail".into(), "Services".into()],
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: None,
        };
        let draft = ProductFields::from_product(Some(&product)).to_draft().expect("draft");
        assert_eq!(draft, product.to_draft());
    }
}
