use crate::domain::description::DAY_NAMES;
use crate::domain::{DayEntry, Meridiem, TimeOfDay};
use maud::{html, Markup};

/// Every half hour of the day, midnight first.
fn half_hours() -> impl Iterator<Item = TimeOfDay> {
    (0..48u8).map(|slot| {
        let hour24 = slot / 2;
        let minute = (slot % 2) * 30;
        let meridiem = if hour24 < 12 { Meridiem::AM } else { Meridiem::PM };
        let hour = match hour24 % 12 {
            0 => 12,
            h => h,
        };
        TimeOfDay::new(hour, minute, meridiem)
    })
}

/// A `<select>` of half-hour times. A value off the half-hour grid (from an
/// older listing) is kept as an extra option.
pub fn time_select(name: &str, selected: TimeOfDay) -> Markup {
    let on_grid = selected.minute % 30 == 0;
    html! {
        select name=(name) {
            @if !on_grid {
                option value=(selected.to_string()) selected { (selected.to_string()) }
            }
            @for time in half_hours() {
                option value=(time.to_string()) selected[time == selected] { (time.to_string()) }
            }
        }
    }
}

pub fn day_rows(days: &[DayEntry]) -> Markup {
    html! {
        div id="day-rows" {
            @for day in days {
                div class="day-row"
                    hx-post={ "/form/days/" (day.id) }
                    hx-trigger="change"
                    hx-include="closest .day-row"
                    hx-target="#panel"
                    hx-swap="outerHTML" {
                    select name="day_weekday" aria-label="Day" {
                        @for (i, name) in DAY_NAMES.iter().enumerate() {
                            option value=(i) selected[i == day.weekday as usize] { (name) }
                        }
                    }
                    (time_select("day_start", day.start))
                    span { "to" }
                    (time_select("day_end", day.end))
                    button type="button" class="btn btn-small btn-ghost"
                        hx-post={ "/form/days/" (day.id) "/remove" }
                        hx-target="#panel"
                        hx-swap="outerHTML"
                        aria-label={ "Remove " (day.day_name()) } { "✕" }
                }
            }
            button type="button" class="btn btn-small"
                hx-post="/form/days/add"
                hx-target="#panel"
                hx-swap="outerHTML" { "+ Add day" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_the_day() {
        let times: Vec<String> = half_hours().map(|t| t.to_string()).collect();
        assert_eq!(times.len(), 48);
        assert_eq!(times[0], "12:00 AM");
        assert_eq!(times[14], "7:00 AM");
        assert_eq!(times[28], "2:00 PM");
        assert_eq!(times[47], "11:30 PM");
    }

    #[test]
    fn off_grid_time_stays_selected() {
        let html = time_select("start", TimeOfDay::new(9, 15, Meridiem::AM)).into_string();
        assert!(html.contains(r#"<option value="9:15 AM" selected>9:15 AM</option>"#));
    }
}
