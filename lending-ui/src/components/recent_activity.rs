use crate::dto::Activity;
use leptos::*;

pub fn activity_icon(kind: &str) -> &'static str {
    match kind {
        "payment" => "icon-credit-card",
        "contact" => "icon-phone",
        "document" => "icon-file-text",
        _ => "icon-bell",
    }
}

pub fn activity_tone(status: &str) -> &'static str {
    if status == "success" {
        "activity-icon bg-green-100 text-green-600"
    } else {
        "activity-icon bg-blue-100 text-blue-600"
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityRow {
    pub key: String,
    pub icon: &'static str,
    pub tone: &'static str,
    pub description: String,
    pub date: String,
}

pub fn activity_rows(activities: &[Activity]) -> Vec<ActivityRow> {
    activities
        .iter()
        .map(|a| ActivityRow {
            key: a.id.clone(),
            icon: activity_icon(&a.kind),
            tone: activity_tone(&a.status),
            description: a.description.clone(),
            date: a.date.clone(),
        })
        .collect()
}

#[component]
pub fn RecentActivity(#[prop(into)] activities: MaybeSignal<Vec<Activity>>) -> impl IntoView {
    view! {
      <section class="card">
        <h2>"Recent Activity"</h2>
        <ul class="activity-list">
          <For
            each=move || activities.with(|list| activity_rows(list))
            key=|row| row.key.clone()
            children=move |row| view! {
              <li class="row">
                <span class=row.tone><i class=row.icon></i></span>
                <div>
                  <p>{row.description}</p>
                  <p class="meta">{row.date}</p>
                </div>
              </li>
            }
          />
        </ul>
      </section>
    }
}
