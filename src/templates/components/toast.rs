use crate::app::state::{Status, Toast};
use maud::{html, Markup};

/// Pending toasts. `map.js` removes each one after `duration_ms`.
pub fn toast_stack(toasts: &[Toast], duration_ms: u64) -> Markup {
    html! {
        div id="toasts" class="toast-stack" data-duration=(duration_ms) aria-live="polite" {
            @for toast in toasts {
                div class={ "toast toast-" (toast.level.as_str()) } role="status" {
                    (toast.message)
                }
            }
        }
    }
}

pub fn status_line(status: &Status) -> Markup {
    html! {
        p id="status" class={ "status status-" (status.level.as_str()) } {
            (status.text)
        }
    }
}
