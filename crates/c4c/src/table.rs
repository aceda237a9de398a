use c4c_core::mining::CollegeRow;

const HEADERS: [&str; 8] = [
    "College",
    "Symbol",
    "Progress",
    "Remaining",
    "Rate/h",
    "24h Yield",
    "Balance",
    "Total",
];

pub struct TableFormatter {
    widths: [usize; 8],
}

impl TableFormatter {
    pub fn new(rows: &[CollegeRow]) -> Self {
        let college_width = rows
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(16)
            .clamp(7, 40); // Between "College" header min and reasonable terminal width max

        Self {
            widths: [college_width, 6, 8, 9, 8, 9, 12, 12],
        }
    }

    pub fn print_table(&self, rows: &[CollegeRow]) {
        print!("{}", self.render(rows));
    }

    pub fn render(&self, rows: &[CollegeRow]) -> String {
        let mut out = String::new();
        out.push_str(&self.border('┌', '┬', '┐'));
        out.push_str(&self.line(&HEADERS.map(str::to_string)));
        out.push_str(&self.border('├', '┼', '┤'));
        for row in rows {
            out.push_str(&self.line(&cells(row)));
        }
        out.push_str(&self.border('└', '┴', '┘'));
        out
    }

    fn line(&self, cells: &[String; 8]) -> String {
        let body: Vec<String> = cells
            .iter()
            .zip(self.widths)
            .map(|(cell, width)| truncate(cell, width))
            .collect();
        format!("│ {} │\n", body.join(" │ "))
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self.widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}\n", segments.join(&mid.to_string()))
    }
}

fn cells(row: &CollegeRow) -> [String; 8] {
    [
        row.name.clone(),
        row.symbol.clone().unwrap_or_else(|| "-".to_string()),
        format!("{:.1}%", row.projection.progress_percent),
        row.projection.remaining.to_string(),
        format!("{:.2}", row.earning_rate),
        format!("{:.2}", row.session_yield_estimate),
        format!("{:.2}", row.wallet.balance),
        format!("{:.2}", row.wallet.total),
    ]
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Counts characters, not bytes, so multi-byte names are cut safely.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{s:<max_len$}")
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<max_len$}", format!("{truncated}..."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c4c_core::mining::{
        CollegeId, Dashboard, MiningCollege, SessionSnapshot, WalletBalance, college_rows,
    };

    fn rows() -> Vec<CollegeRow> {
        let college = CollegeId::new("7");
        college_rows(&Dashboard {
            mining_colleges: vec![MiningCollege {
                id: college.clone(),
                name: Some("State University".to_string()),
                symbol: Some("STU".to_string()),
            }],
            active_sessions: vec![SessionSnapshot {
                college: college.clone(),
                is_active: true,
                remaining_hours: 18.0,
                earning_rate: 0.35,
                current_tokens: 2.3,
            }],
            wallets: vec![WalletBalance {
                college,
                balance: 10.5,
            }],
            ..Default::default()
        })
    }

    #[test]
    fn test_render_shows_projection_and_total() {
        let rows = rows();
        let table = TableFormatter::new(&rows).render(&rows);
        assert!(table.contains("State University"));
        assert!(table.contains("25.0%"));
        assert!(table.contains("18.0h"));
        assert!(table.contains("8.40"));
        assert!(table.contains("12.80"));
    }

    #[test]
    fn test_render_lines_have_equal_width() {
        let rows = rows();
        let table = TableFormatter::new(&rows).render(&rows);
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert_eq!(widths.len(), 5);
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{table}");
    }

    #[test]
    fn test_truncate_pads_short_strings() {
        assert_eq!(truncate("abc", 6), "abc   ");
    }

    #[test]
    fn test_truncate_cuts_long_strings() {
        assert_eq!(truncate("Massachusetts Institute", 10), "Massach...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Universität München", 8), "Unive...");
    }
}
