//! Checked command for listing what was completed on the current logical day.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::Args;
use ht_core::{Check, CheckedIdSet, Clock, DayCalendar};

#[derive(Debug, Args)]
pub struct CheckedArgs {
    /// Read checks from this file instead of stdin.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Only report these sub-habit ids (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub allow: Option<Vec<i64>>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Reads checks as a JSON array (or `null`), a single JSON object, or JSON Lines.
///
/// Entries that do not decode as a check are skipped with a warning.
pub fn parse_checks<R: Read>(mut reader: R) -> Result<Vec<Check>> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .context("failed to read checks")?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') || trimmed == "null" {
        let entries: Option<Vec<serde_json::Value>> =
            serde_json::from_str(trimmed).context("invalid JSON check list")?;
        return Ok(decode_entries(entries.unwrap_or_default()));
    }

    // One object, possibly pretty-printed over several lines.
    if trimmed.starts_with('{') {
        if let Ok(entry) = serde_json::from_str(trimmed) {
            return Ok(decode_entries(vec![entry]));
        }
    }

    let mut checks: Vec<Check> = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(check) => checks.push(check),
            Err(error) => tracing::warn!(line = idx + 1, %error, "skipping malformed check"),
        }
    }
    Ok(checks)
}

fn decode_entries(entries: Vec<serde_json::Value>) -> Vec<Check> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
            Ok(check) => Some(check),
            Err(error) => {
                tracing::warn!(entry = idx + 1, %error, "skipping malformed check");
                None
            }
        })
        .collect()
}

fn format_ids(ids: &CheckedIdSet) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn run<R: Read, W: Write, C: Clock>(
    reader: R,
    writer: &mut W,
    calendar: &DayCalendar<C, Tz>,
    args: &CheckedArgs,
) -> Result<()> {
    let checks = parse_checks(reader)?;
    tracing::debug!(count = checks.len(), "loaded checks");

    let report = calendar.checked_summary(&checks, args.allow.as_deref());

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(writer, "Logical date: {}", report.date)?;
    writeln!(writer, "Checked habits: {}", format_ids(&report.habit_ids))?;
    writeln!(
        writer,
        "Checked sub-habits: {}",
        format_ids(&report.sub_habit_ids)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use chrono::{DateTime, Utc};
    use ht_core::{FixedClock, RolloverHour};
    use insta::assert_snapshot;

    const CHECKS: &str = r#"[
        {"habit_id": 5, "sub_habit_id": null, "check_date": "2024-05-31T20:00:00.000Z"},
        {"habit_id": 5, "sub_habit_id": 9, "check_date": "2024-06-01T01:00:00.000Z"},
        {"habit_id": 7, "sub_habit_id": null, "check_date": "2024-05-31T02:00:00.000Z"}
    ]"#;

    fn calendar() -> DayCalendar<FixedClock, Tz> {
        let now = DateTime::parse_from_rfc3339("2024-06-01T02:15:00Z")
            .unwrap()
            .with_timezone(&Utc);
        DayCalendar::new(FixedClock::new(&now), Tz::UTC, RolloverHour::DEFAULT)
    }

    fn args(allow: Option<Vec<i64>>, json: bool) -> CheckedArgs {
        CheckedArgs {
            file: None,
            allow,
            json,
        }
    }

    fn render(input: &str, args: &CheckedArgs) -> String {
        let mut output = Vec::new();
        run(Cursor::new(input), &mut output, &calendar(), args).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn checked_command_lists_habits_and_sub_habits() {
        let output = render(CHECKS, &args(None, false));
        assert_snapshot!(output, @r"
        Logical date: 2024-05-31
        Checked habits: 5
        Checked sub-habits: 9
        ");
    }

    #[test]
    fn checked_command_respects_allow_list() {
        let output = render(CHECKS, &args(Some(vec![1, 2]), false));
        assert_snapshot!(output, @r"
        Logical date: 2024-05-31
        Checked habits: 5
        Checked sub-habits: none
        ");
    }

    #[test]
    fn checked_command_json() {
        let output = render(CHECKS, &args(Some(vec![9]), true));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["date"], "2024-05-31");
        assert_eq!(value["habit_ids"], serde_json::json!([5]));
        assert_eq!(value["sub_habit_ids"], serde_json::json!([9]));
    }

    #[test]
    fn parse_checks_accepts_null_and_empty() {
        assert!(parse_checks(Cursor::new("null")).unwrap().is_empty());
        assert!(parse_checks(Cursor::new("")).unwrap().is_empty());
        assert!(parse_checks(Cursor::new("[]")).unwrap().is_empty());
    }

    #[test]
    fn parse_checks_skips_malformed_entries() {
        let input = r#"[
            {"habit_id": 1, "check_date": "2024-05-31T20:00:00Z"},
            {"habit_id": "two"},
            42,
            {"habit_id": 3, "sub_habit_id": 4, "check_date": "2024-05-31T21:00:00Z"}
        ]"#;
        let checks = parse_checks(Cursor::new(input)).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].habit_id, Some(1));
        assert_eq!(checks[1].sub_habit_id, Some(4));
    }

    #[test]
    fn parse_checks_reads_json_lines() {
        let input = concat!(
            r#"{"habit_id": 1, "check_date": "2024-05-31T20:00:00Z"}"#,
            "\n\n",
            "not json\n",
            r#"{"habit_id": 2, "check_date": "2024-05-31T21:00:00Z"}"#,
            "\n",
        );
        let checks = parse_checks(Cursor::new(input)).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[1].habit_id, Some(2));
    }

    #[test]
    fn parse_checks_reads_pretty_single_object() {
        let input = r#"{
            "habit_id": 5,
            "sub_habit_id": 9,
            "check_date": "2024-06-01T01:00:00.000Z"
        }"#;
        let checks = parse_checks(Cursor::new(input)).unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].sub_habit_id, Some(9));

        let output = render(input, &args(None, false));
        assert!(output.contains("Checked sub-habits: 9"), "{output}");
    }

    #[test]
    fn parse_checks_single_line_object() {
        let input = r#"{"habit_id": 5, "check_date": "2024-05-31T20:00:00Z"}"#;
        let checks = parse_checks(Cursor::new(input)).unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].habit_id, Some(5));
    }

    #[test]
    fn parse_checks_rejects_broken_array() {
        let err = parse_checks(Cursor::new("[{")).unwrap_err();
        assert!(err.to_string().contains("invalid JSON check list"));
    }

    #[test]
    fn format_ids_joins_sorted() {
        let ids: CheckedIdSet = [12, 3, 7].into_iter().collect();
        assert_eq!(format_ids(&ids), "3, 7, 12");
        assert_eq!(format_ids(&CheckedIdSet::new()), "none");
    }
}
