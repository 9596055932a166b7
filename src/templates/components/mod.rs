use maud::{html, Markup};

pub mod error;
pub mod guide;
pub mod multi_day;
pub mod popup;
pub mod suggestions;
pub mod toast;

pub use error::error_page;
pub use guide::guide_modal;
pub use multi_day::{day_rows, time_select};
pub use popup::{marker_views, popup, MarkerView};
pub use suggestions::suggestion_list;
pub use toast::{status_line, toast_stack};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h3 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}
