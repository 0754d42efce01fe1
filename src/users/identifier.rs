use std::sync::LazyLock;

use regex::Regex;

static ADMISSION_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"f(\d{4})").unwrap());

/// Placeholder academic id for a new student, filled in properly once the
/// student sets their batch and branch. Campus emails look like
/// `f20210123@...`, which gives the admission year.
pub fn provisional_identifier(email: &str) -> String {
    match ADMISSION_YEAR.captures(email) {
        Some(caps) => format!("20{}XXXH", &caps[1][2..]),
        None => "20XXXXH".to_owned(),
    }
}

/// Academic id once batch and branch are known, e.g. `2021` + `A7` -> `2021A7H`.
pub fn identifier(batch: &str, branch: &str) -> String {
    format!("{batch}{branch}H")
}
