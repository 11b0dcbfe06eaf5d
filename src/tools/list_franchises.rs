//! `list_franchises` tool: browses the embedded franchise table.

use crate::franchise::{Franchise, FranchiseTable};
use crate::search::tokenize::match_key;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFranchisesRequest {
    /// Franchise id or name to show flagships for. Omit to list all franchises.
    #[serde(default)]
    pub franchise: Option<String>,
}

pub fn handle_list_franchises(
    table: &FranchiseTable,
    request: ListFranchisesRequest,
) -> Result<String, String> {
    let Some(wanted) = request.franchise.filter(|f| !f.trim().is_empty()) else {
        return Ok(format_overview(table));
    };

    let franchise = table
        .get(wanted.trim())
        .or_else(|| {
            let key = match_key(&wanted);
            table.franchises().iter().find(|f| f.name_key() == key)
        })
        .or_else(|| table.find_by_query(&wanted))
        .ok_or_else(|| format!("Unknown franchise '{}'", wanted))?;

    Ok(format_franchise(franchise))
}

fn format_overview(table: &FranchiseTable) -> String {
    let mut output = format!(
        "Known franchises ({}, data v{}):\n\n",
        table.franchises().len(),
        table.version()
    );
    for franchise in table.franchises() {
        let _ = writeln!(
            output,
            "• {} (`{}`) - {} flagships",
            franchise.name,
            franchise.id,
            franchise.flagships.len()
        );
    }
    output
}

fn format_franchise(franchise: &Franchise) -> String {
    let mut output = format!("{} (`{}`)\n\n", franchise.name, franchise.id);
    let _ = writeln!(output, "Patterns: {}", franchise.patterns.join(", "));
    if franchise.has_sisters() {
        let _ = writeln!(output, "Paired releases: {}", franchise.sister_patterns.join(", "));
    }

    output.push_str("\nFlagships:\n");
    for entry in &franchise.flagships {
        let _ = write!(output, "• {} [{}]", entry.canonical_name(), entry.tag);
        if let Some(year) = entry.year {
            let _ = write!(output, " {}", year);
        }
        if !entry.platforms.is_empty() {
            let _ = write!(output, " - {}", entry.platforms.join(", "));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    fn request(franchise: Option<&str>) -> ListFranchisesRequest {
        ListFranchisesRequest {
            franchise: franchise.map(String::from),
        }
    }

    #[test]
    fn test_overview_lists_all() {
        let table = FranchiseTable::embedded().unwrap();
        let_assert!(Ok(output) = handle_list_franchises(&table, request(None)));
        check!(output.contains("Super Mario (`mario`)"));
        check!(output.contains("Pokemon (`pokemon`)"));
    }

    #[test]
    fn test_lookup_by_id_or_name() {
        let table = FranchiseTable::embedded().unwrap();
        let_assert!(Ok(by_id) = handle_list_franchises(&table, request(Some("zelda"))));
        let_assert!(
            Ok(by_name) = handle_list_franchises(&table, request(Some("The Legend of Zelda")))
        );
        check!(by_id == by_name);
        check!(by_id.contains("Ocarina of Time"));
    }

    #[test]
    fn test_unknown_franchise() {
        let table = FranchiseTable::embedded().unwrap();
        check!(handle_list_franchises(&table, request(Some("stardew"))).is_err());
    }
}
