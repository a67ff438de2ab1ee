//! Plain-text rendering of a sync snapshot.

use std::fmt::Write as _;

use client_core::{FormMode, SyncSnapshot};
use shared::domain::UserRecord;

/// Mirrors the screen states: loading, an error replacing everything, or
/// both tables.
pub fn render(snapshot: &SyncSnapshot) -> String {
    if snapshot.is_loading {
        return "Loading users...\n".to_string();
    }
    if let Some(err) = &snapshot.current_error {
        return format!("{}\n", err.user_message());
    }

    let mut out = String::new();
    out.push_str("User List\n");
    match &snapshot.form_mode {
        FormMode::Create => out.push_str("[form: add user]\n"),
        FormMode::Edit(id) => {
            let _ = writeln!(out, "[form: update user {id}]");
        }
    }
    if snapshot.primary_is_empty() {
        out.push_str("No users found.\n");
    } else {
        write_table(&mut out, &snapshot.primary_records, true);
    }

    out.push_str("\nPlaceholder Users\n");
    if snapshot.read_only_is_empty() {
        out.push_str("No placeholder users found.\n");
    } else {
        write_table(&mut out, &snapshot.read_only_records, false);
    }
    out
}

fn write_table(out: &mut String, records: &[UserRecord], with_id: bool) {
    for record in records {
        if with_id {
            let _ = write!(out, "{:>4}  ", record.id);
        }
        let _ = writeln!(
            out,
            "{:<24} {:<28} {:<24} {}",
            record.name,
            record.email,
            record.phone,
            record.website_url()
        );
    }
}
