use super::PatternCheck;
use crate::intersect::{Fingerprint, ManifestIntersection, TagCounts, TreeIntersection};
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Items listed per section before truncating
    max_items: usize,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { max_items: 50 }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn report(&self, fingerprint: &Fingerprint, checks: &[PatternCheck]) -> Result<()> {
        println!();
        println!(
            "{}",
            format!("Family fingerprint of {} APKs", fingerprint.apk_count)
                .bold()
        );
        println!();

        if let Some(manifest) = &fingerprint.manifest {
            self.print_manifest(manifest);
        }
        if let Some(tags) = &fingerprint.tag_numbers {
            println!("{}", "Manifest tag counts (all APKs)".cyan().bold());
            self.print_tag_counts(tags);
            println!();
        }

        let lists = [
            ("Permissions", &fingerprint.permissions),
            ("Actions", &fingerprint.actions),
            ("String references", &fingerprint.string_refs),
            ("API strings", &fingerprint.apis),
            ("Dex strings", &fingerprint.dex_strings),
            ("Resources", &fingerprint.resources),
        ];
        for (title, items) in lists {
            if let Some(items) = items {
                self.print_list(title, items);
            }
        }

        if let Some(trees) = &fingerprint.trees {
            self.print_trees(trees);
        }

        if !checks.is_empty() {
            self.print_checks(checks);
        }

        Ok(())
    }

    fn print_manifest(&self, manifest: &ManifestIntersection) {
        println!(
            "{} {}",
            "Manifest pattern".cyan().bold(),
            format!("({} contributing)", manifest.contributors.len()).dimmed()
        );
        if manifest.pattern.is_empty() {
            println!("  {}", "no manifest available".yellow());
        } else {
            println!("  {}", manifest.pattern);
        }
        self.print_tag_counts(&manifest.tag_counts);
        println!();
    }

    fn print_tag_counts(&self, tags: &TagCounts) {
        for (tag, range) in tags.iter() {
            if range.is_unset() {
                println!("  {:<16} {}", tag, "-".dimmed());
            } else if range.min == range.max {
                println!("  {:<16} {}", tag, range.min);
            } else {
                println!("  {:<16} {}..{}", tag, range.min, range.max);
            }
        }
    }

    fn print_list(&self, title: &str, items: &[String]) {
        println!(
            "{} {}",
            title.cyan().bold(),
            format!("({})", items.len()).dimmed()
        );
        if items.is_empty() {
            println!("  {}", "nothing in common".yellow());
        }
        for item in items.iter().take(self.max_items) {
            println!("  {}", item);
        }
        if items.len() > self.max_items {
            println!(
                "  {}",
                format!("... {} more", items.len() - self.max_items).dimmed()
            );
        }
        println!();
    }

    fn print_trees(&self, trees: &TreeIntersection) {
        let nodes: usize = trees
            .reference
            .iter()
            .flat_map(|map| map.values())
            .map(|node| node.size())
            .sum();
        println!(
            "{} {}",
            "Dex trees".cyan().bold(),
            format!("({} shared, reference has {} nodes)", trees.hashes.len(), nodes).dimmed()
        );
        for hash in trees.hashes.iter().take(self.max_items) {
            let name = trees
                .reference
                .as_ref()
                .and_then(|map| map.get(hash))
                .map(|node| node.name.as_str())
                .unwrap_or("");
            println!("  {} {}", hash, name.dimmed());
        }
        println!();
    }

    fn print_checks(&self, checks: &[PatternCheck]) {
        println!("{}", "Pattern checks".cyan().bold());
        for check in checks {
            let verdict = match check.matched {
                Some(true) => "match".green().bold(),
                Some(false) => "no match".red().bold(),
                None => "no manifest".yellow(),
            };
            if check.tags_out_of_range.is_empty() {
                println!("  {:<32} {}", check.label, verdict);
            } else {
                println!(
                    "  {:<32} {} {}",
                    check.label,
                    verdict,
                    format!("(counts outside range: {})", check.tags_out_of_range.join(", "))
                        .dimmed()
                );
            }
        }
        println!();
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
