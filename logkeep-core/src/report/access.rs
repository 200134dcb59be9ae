use crate::report::format::longint;
use crate::report::table::TwoColumn;
use crate::store::AccessGroup;

/// Render the website-activity fragment: hits-per-request table plus byte
/// totals. "Sent" is traffic out of the server, "received" is traffic in.
pub fn render(groups: &[AccessGroup]) -> String {
    let mut table = TwoColumn::new("Hits", "Request");
    let mut bytes_in: u64 = 0;
    let mut bytes_out: u64 = 0;
    for group in groups {
        table.add_row(group.hits.to_string(), group.reqline.clone());
        bytes_in += group.bytes_in as u64;
        bytes_out += group.bytes_out as u64;
    }

    let sent = longint(bytes_out);
    let received = longint(bytes_in);
    let width = sent.len().max(received.len());
    format!(
        "Website activity in the past 24 hours:\n{}\n\
         Total bytes sent:     {sent:>width$}\n\
         Total bytes received: {received:>width$}\n",
        table.render(),
    )
}
