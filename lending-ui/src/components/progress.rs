use leptos::*;

/// Rounds a percentage into the bar's range. NaN reads as empty.
pub fn clamp_progress(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[component]
pub fn ProgressBar(#[prop(into)] value: MaybeSignal<u8>) -> impl IntoView {
    let value = Signal::derive(move || value.get().min(100));
    view! {
      <div
        class="progress"
        role="progressbar"
        aria-valuemin="0"
        aria-valuemax="100"
        aria-valuenow=move || value.get().to_string()
      >
        <div class="progress-fill" style=move || format!("width: {}%", value.get())></div>
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_percentage() {
        assert_eq!(clamp_progress(-5.0), 0);
        assert_eq!(clamp_progress(41.6), 42);
        assert_eq!(clamp_progress(250.0), 100);
        assert_eq!(clamp_progress(f64::NAN), 0);
    }
}
