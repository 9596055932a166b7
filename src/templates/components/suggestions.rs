use crate::arcgis::Suggestion;
use maud::{html, Markup};

/// The dropdown under an address box. `target` is `form` or `search`.
pub fn suggestion_list(suggestions: &[Suggestion], target: &str) -> Markup {
    html! {
        ul class="suggestions" role="listbox" {
            @for suggestion in suggestions {
                li role="option" {
                    button type="button" class="suggestion"
                        hx-post="/address/select"
                        hx-vals=(select_vals(suggestion, target))
                        hx-target="#panel"
                        hx-swap="outerHTML" {
                        (suggestion.text)
                    }
                }
            }
        }
    }
}

fn select_vals(suggestion: &Suggestion, target: &str) -> String {
    serde_json::json!({
        "text": suggestion.text,
        "magic_key": suggestion.magic_key.as_deref().unwrap_or(""),
        "target": target,
    })
    .to_string()
}
