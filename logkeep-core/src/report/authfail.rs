use crate::report::table::TwoColumn;
use crate::store::AuthFailGroup;

/// Render the failed-SSH-logins fragment: attempts per source address.
pub fn render(groups: &[AuthFailGroup]) -> String {
    let mut table = TwoColumn::new("Attempts", "IP Address");
    for group in groups {
        table.add_row(group.attempts.to_string(), group.src_addr.clone());
    }
    format!(
        "Failed SSH login attempts in the past 24 hours:\n{}\n",
        table.render()
    )
}
