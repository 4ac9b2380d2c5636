use crate::components::progress::ProgressBar;
use lending_contracts::{human_size, UploadedFile};
use leptos::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub const ACCEPTED_TYPES: &str = ".pdf,.png,.jpg,.jpeg";

/// A picked file is recorded as fully uploaded; nothing is transferred.
pub fn picked_file(name: &str, bytes: f64) -> UploadedFile {
    UploadedFile::new(name, human_size(bytes.max(0.0) as u64), 100)
}

pub fn shows_completion(file: &UploadedFile) -> bool {
    file.is_complete()
}

fn open_picker(on_select: Callback<web_sys::File>) {
    let Ok(element) = document().create_element("input") else {
        return;
    };
    let Ok(input) = element.dyn_into::<web_sys::HtmlInputElement>() else {
        return;
    };
    input.set_type("file");
    input.set_accept(ACCEPTED_TYPES);

    let target = input.clone();
    let on_change = Closure::once(move |_: web_sys::Event| {
        if let Some(file) = target.files().and_then(|files| files.get(0)) {
            on_select.call(file);
        }
    });
    input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
    on_change.forget();
    input.click();
}

#[component]
pub fn FileUpload(
    #[prop(into)] label: String,
    #[prop(optional)] optional: bool,
    #[prop(optional, into)] uploaded_file: MaybeSignal<Option<UploadedFile>>,
    #[prop(optional, into)] on_file_select: Option<Callback<web_sys::File>>,
) -> impl IntoView {
    view! {
      <div class="file-upload">
        <label class="field-label">
          {label}
          {optional.then_some(view! { <span class="meta">" (optional)"</span> })}
        </label>
        {move || match uploaded_file.get() {
            Some(file) => {
                let complete = shows_completion(&file);
                view! {
                  <div class="upload-card">
                    <div>
                      <p class="file-name">{file.name.clone()}</p>
                      <p class="meta">{file.size.clone()}</p>
                    </div>
                    <div class="row">
                      <ProgressBar value=file.progress/>
                      <span class="meta">{format!("{}%", file.progress)}</span>
                      {complete.then_some(view! {
                        <span class="upload-complete" aria-label="Upload complete">"✓"</span>
                      })}
                    </div>
                  </div>
                }
                .into_view()
            }
            None => view! {
              <div
                class="dropzone"
                on:click=move |_| {
                    if let Some(cb) = on_file_select {
                        open_picker(cb);
                    }
                }
              >
                <p>"Drag and drop your file here, or click to browse"</p>
                <p class="meta">"PDF, PNG or JPG"</p>
              </div>
            }
            .into_view(),
        }}
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_shows_only_at_full_progress() {
        assert!(shows_completion(&UploadedFile::new("bank.pdf", "1.0 MB", 100)));
        assert!(shows_completion(&UploadedFile::new("bank.pdf", "1.0 MB", 140)));
        for progress in [0, 1, 50, 99] {
            assert!(!shows_completion(&UploadedFile::new("bank.pdf", "1.0 MB", progress)));
        }
    }

    #[test]
    fn picked_file_is_complete_with_readable_size() {
        let file = picked_file("tax-return.pdf", 1536.0);
        assert_eq!(file.name, "tax-return.pdf");
        assert_eq!(file.size, "1.5 KB");
        assert!(file.is_complete());
    }
}
