use lending_ui::app::App;

fn main() {
    leptos::mount_to_body(App);
}
