//! The `markcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create markcheck.toml
    if std::path::Path::new("markcheck.toml").exists() {
        println!("markcheck.toml already exists, skipping.");
    } else {
        std::fs::write("markcheck.toml", SAMPLE_CONFIG)?;
        println!("Created markcheck.toml");
    }

    // Create example exam
    std::fs::create_dir_all("exams")?;
    let example_path = std::path::Path::new("exams/example.toml");
    if example_path.exists() {
        println!("exams/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created exams/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit exams/example.toml with your questions and scores");
    println!("  2. Run: markcheck validate --exam exams/example.toml");
    println!("  3. Run: markcheck analyze --exam exams/example.toml --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# markcheck configuration

output_dir = "./markcheck-reports"
formats = ["json", "html"]

# Outcome success-rate change (percentage points) reported by `markcheck compare`
compare_threshold = 5.0
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
title = "Example Unit Test"
class_name = "7B"
subject = "Mathematics"
teacher = "Your Name"
date = "2026-03-14"

[[questions]]
id = 1
max_score = 4
outcome = { code = "M.7.1", description = "Adds and subtracts fractions" }

[[questions]]
id = 2
max_score = 6
outcome = { code = "M.7.1", description = "Adds and subtracts fractions" }

[[questions]]
id = 3
max_score = 10
outcome = { code = "M.7.2", description = "Solves ratio problems" }

[[students]]
id = "s01"
name = "Ada"
[students.scores]
1 = 4
2 = 5
3 = 3

[[students]]
id = "s02"
name = "Grace"
[students.scores]
1 = 3
2 = 6
3 = 6
"#;
