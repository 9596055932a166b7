use crate::config::Config;
use maud::{html, Markup};

pub fn guide_modal(config: &Config) -> Markup {
    html! {
        div id="guide" class="modal" role="dialog" aria-labelledby="guide-title" {
            div class="modal-content" {
                h2 id="guide-title" { "How to manage garage sales" }
                ol {
                    li { strong { "New Sale: " } "press " em { "New Sale" } ", then click the map where the sale is. The address fills in automatically when it can be found." }
                    li { strong { "Details: " } "pick the date and times and list the items for sale. The description is written for you." }
                    @if config.multi_day_sales {
                        li { strong { "Multi-day: " } "tick " em { "Multiple days" } " to give each day its own hours." }
                    }
                    li { strong { "Edit: " } "click a marker and choose " em { "Edit Sale" } ". Click the map to move the pin." }
                    li { strong { "Delete: " } "open a sale for editing and press " em { "Delete" } "." }
                    @if config.auto_save_drafts {
                        li { "Unsaved changes are kept as a draft for 24 hours." }
                    }
                }
                p class="muted" {
                    (config.organization.name) ", " (config.organization.state)
                    @if !config.organization.contact.is_empty() {
                        " · " a href={ "mailto:" (config.organization.contact) } { (config.organization.contact) }
                    }
                }
                button type="button" class="btn" onclick="this.closest('.modal').remove()" { "Close" }
            }
        }
    }
}
