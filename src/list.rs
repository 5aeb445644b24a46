//! `--list`: every secret of the project as an aligned table.

use crate::error::{Error, Result};
use crate::store::{Secret, SecretStore};
use std::io::Write;

const HEADERS: [&str; 3] = ["NAME", "LABELS", "CREATED"];

/// Creation time format, second precision
pub const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub name: String,
    pub labels: String,
    pub created: String,
}

impl ListRow {
    pub fn from_secret(secret: &Secret) -> Self {
        Self {
            name: secret.short_name().to_string(),
            // BTreeMap keeps the keys sorted
            labels: serde_json::to_string(&secret.labels).unwrap_or_else(|_| "{}".to_string()),
            created: secret
                .create_time
                .map(|t| t.format(CREATED_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    fn cells(&self) -> [&str; 3] {
        [&self.name, &self.labels, &self.created]
    }
}

/// Render rows under a header and a dashed rule, columns separated by two
/// spaces. The last column is not padded.
pub fn render_table(rows: &[ListRow]) -> String {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS, &widths);
    let rule = widths.map(|w| "-".repeat(w));
    push_line(&mut out, [&rule[0], &rule[1], &rule[2]], &widths);
    for row in rows {
        push_line(&mut out, row.cells(), &widths);
    }
    out
}

fn push_line(out: &mut String, cells: [&str; 3], widths: &[usize; 3]) {
    let last = cells.len() - 1;
    for (i, cell) in cells.iter().enumerate() {
        if i == last {
            out.push_str(cell);
        } else {
            let pad = widths[i] - cell.chars().count();
            out.push_str(cell);
            out.push_str(&" ".repeat(pad + 2));
        }
    }
    out.push('\n');
}

/// Fetch every secret and write the table. Returns the number of secrets.
pub fn list_secrets<S: SecretStore, W: Write>(store: &S, out: &mut W) -> Result<usize> {
    let secrets = store.list_secrets()?;
    let rows: Vec<ListRow> = secrets.iter().map(ListRow::from_secret).collect();

    let text = if rows.is_empty() {
        "No secrets found\n".to_string()
    } else {
        render_table(&rows)
    };
    out.write_all(text.as_bytes())
        .map_err(|e| Error::io("failed to write secret list", e))?;

    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn secret(name: &str, labels: &[(&str, &str)]) -> Secret {
        Secret {
            name: name.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            create_time: Some(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()),
        }
    }

    #[test]
    fn test_row_from_secret() {
        let row = ListRow::from_secret(&secret("projects/p/secrets/foo", &[("z", "1"), ("a", "2")]));

        assert_eq!(row.name, "foo");
        assert_eq!(row.labels, r#"{"a":"2","z":"1"}"#);
        assert_eq!(row.created, "2024-03-09T14:05:07");
    }

    #[test]
    fn test_row_without_labels_or_time() {
        let mut s = secret("projects/p/secrets/bare", &[]);
        s.create_time = None;
        let row = ListRow::from_secret(&s);

        assert_eq!(row.labels, "{}");
        assert_eq!(row.created, "");
    }

    #[test]
    fn test_render_table_alignment() {
        let rows = vec![
            ListRow {
                name: "a".to_string(),
                labels: "{}".to_string(),
                created: "2024-01-01T00:00:00".to_string(),
            },
            ListRow {
                name: "longer-name".to_string(),
                labels: r#"{"k":"v"}"#.to_string(),
                created: "2024-01-02T00:00:00".to_string(),
            },
        ];

        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "NAME         LABELS     CREATED");
        assert_eq!(lines[1], "-----------  ---------  -------------------");
        assert_eq!(lines[2], "a            {}         2024-01-01T00:00:00");
        assert_eq!(lines[3], r#"longer-name  {"k":"v"}  2024-01-02T00:00:00"#);
    }
}
