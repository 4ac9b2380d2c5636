use crate::components::status_badge::NEUTRAL_BADGE;
use crate::dto::Task;
use leptos::*;

pub fn priority_class(priority: &str) -> &'static str {
    match priority {
        "high" => "badge bg-red-100 text-red-800",
        "medium" => "badge bg-yellow-100 text-yellow-800",
        "low" => "badge bg-green-100 text-green-800",
        _ => NEUTRAL_BADGE,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskRow {
    /// Position in the list; task text is not unique.
    pub key: usize,
    pub task: String,
    pub due: String,
    pub priority: String,
    pub class: &'static str,
}

pub fn task_rows(tasks: &[Task]) -> Vec<TaskRow> {
    tasks
        .iter()
        .enumerate()
        .map(|(key, t)| TaskRow {
            key,
            task: t.task.clone(),
            due: format!("Due: {}", t.due),
            priority: t.priority.clone(),
            class: priority_class(&t.priority),
        })
        .collect()
}

#[component]
pub fn UpcomingTasks(#[prop(into)] tasks: MaybeSignal<Vec<Task>>) -> impl IntoView {
    view! {
      <section class="card">
        <h2>"Upcoming Tasks"</h2>
        <Show
          when={
            let tasks = tasks.clone();
            move || tasks.with(|list| !list.is_empty())
          }
          fallback=|| view! { <p class="meta">"Nothing due right now."</p> }
        >
          <ul class="task-list">
            <For
              each={
                let tasks = tasks.clone();
                move || tasks.with(|list| task_rows(list))
              }
              key=|row| (row.key, row.task.clone())
              children=move |row| view! {
                <li class="row">
                  <div>
                    <p>{row.task}</p>
                    <p class="meta">{row.due}</p>
                  </div>
                  <span class=row.class>{row.priority}</span>
                </li>
              }
            />
          </ul>
        </Show>
      </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(text: &str, priority: &str) -> Task {
        Task {
            task: text.into(),
            due: "Friday".into(),
            priority: priority.into(),
        }
    }

    #[test]
    fn priorities_map_to_tones() {
        assert!(priority_class("high").contains("red"));
        assert!(priority_class("medium").contains("yellow"));
        assert!(priority_class("low").contains("green"));
    }

    #[test]
    fn unknown_priority_is_neutral() {
        assert_eq!(priority_class("urgent"), NEUTRAL_BADGE);
        assert_eq!(priority_class(""), NEUTRAL_BADGE);
    }

    #[test]
    fn no_tasks_yields_no_rows() {
        assert!(task_rows(&[]).is_empty());
    }

    #[test]
    fn duplicate_task_text_keeps_distinct_keys() {
        let rows = task_rows(&[task("Call lender", "high"), task("Call lender", "low")]);
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0].key, rows[1].key);
        assert_eq!(rows[0].due, "Due: Friday");
        assert!(rows[1].class.contains("green"));
    }
}
