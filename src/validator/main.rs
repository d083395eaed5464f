//! Standalone validator for catalog data files.
//!
//! This tool checks a categories JSON file for the navigator backend:
//! structure, blank names and fields, and links that do not parse. Only a
//! document that fails to load is an error; everything else is a warning.

use std::process::ExitCode;

use clap::Parser;
use url::Url;

// Import from the main crate
use post_navigator::store::{Catalog, Post};

/// Catalog data file validator.
#[derive(Parser, Debug)]
#[command(name = "validate_catalog")]
#[command(about = "Validates category catalog files for the post navigator backend")]
#[command(version)]
struct Args {
    /// Path to the JSON catalog file to validate.
    #[arg(short, long, default_value = "data/posts.json")]
    file: String,

    /// Generate an example catalog file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show every category and post.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Handle example generation
    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    validate_catalog(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = Catalog::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example catalog written to: {output_path}");
            println!(
                "\nThe file contains {} categories with {} posts.",
                example.len(),
                example.post_count()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_catalog(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let catalog = match Catalog::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load catalog: {e}");
            return ExitCode::FAILURE;
        }
    };

    let issues = catalog.validate_all();
    let mut warnings = 0;

    for (name, posts) in &catalog {
        if verbose {
            println!("[{}] {} posts", name, posts.len());
        }

        for (index, post) in posts.iter().enumerate() {
            if verbose {
                println!("  {index}. \"{}\" -> {}", truncate(&post.title, 40), post.url);
            }

            if let Some(warning) = link_warning(post) {
                warnings += 1;
                println!("  ⚠ Warning [{name}/{index}]: {warning}");
            }
        }
    }

    for issue in &issues {
        warnings += 1;
        match issue.index {
            Some(index) => println!("  ⚠ Warning [{}/{}]: {}", issue.category, index, issue.message),
            None => println!("  ⚠ Warning [{}]: {}", issue.category, issue.message),
        }
    }

    println!();

    // Summary
    println!(
        "✓ Catalog loaded: {} categories, {} posts",
        catalog.len(),
        catalog.post_count()
    );
    if warnings > 0 {
        println!("  ({warnings} warning(s) - blank entries or links that may not open)");
    }

    ExitCode::SUCCESS
}

/// Explains why a post's link may not open, if it looks wrong.
fn link_warning(post: &Post) -> Option<String> {
    let url = post.url.trim();
    if url.is_empty() {
        return None;
    }

    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https" | "tg") => None,
        Ok(parsed) => Some(format!("unexpected link scheme '{}'", parsed.scheme())),
        Err(e) => Some(format!("link '{}' does not parse: {e}", truncate(url, 40))),
    }
}

/// Truncates a string for display.
fn truncate(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", chars[..max_len].iter().collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_warning() {
        assert!(link_warning(&Post::new("a", "https://t.me/c/1/2")).is_none());
        assert!(link_warning(&Post::new("a", "tg://resolve?domain=x")).is_none());
        assert!(link_warning(&Post::new("a", "ftp://host/file")).is_some());
        assert!(link_warning(&Post::new("a", "t.me/c/1")).is_some());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Привет, мир!", 6), "Привет...");
    }
}
