use leptos::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpinnerSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl SpinnerSize {
    pub fn class(self) -> &'static str {
        match self {
            Self::Sm => "spinner h-4 w-4",
            Self::Md => "spinner h-8 w-8",
            Self::Lg => "spinner h-12 w-12",
        }
    }
}

#[component]
pub fn LoadingSpinner(
    #[prop(optional)] size: SpinnerSize,
    #[prop(into, default = "Loading...".to_string())] text: String,
) -> impl IntoView {
    let label = (!text.is_empty()).then(|| view! { <p class="meta">{text}</p> });
    view! {
      <div class="loading" aria-busy="true">
        <div class=size.class()></div>
        {label}
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_is_default() {
        assert_eq!(SpinnerSize::default(), SpinnerSize::Md);
        assert_ne!(SpinnerSize::Sm.class(), SpinnerSize::Lg.class());
    }
}
