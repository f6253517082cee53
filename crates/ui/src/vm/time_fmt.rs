/// `m:ss`, as shown on the quiz timer.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[must_use]
pub fn format_time_spent(seconds: u32) -> String {
    format!("Time spent: {seconds} seconds")
}
