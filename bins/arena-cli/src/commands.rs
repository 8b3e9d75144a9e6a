// CLI commands for problem authors
use anyhow::{bail, Context, Result};
use arena_common::types::{
    BoilerplateInput, HiddenTestCaseInput, Language, ProblemContent, ProblemPayload,
    ReferenceSolutionInput, VisibleTestCaseInput,
};
use arena_common::validate::{prepare_problem, DuplicateTagPolicy};
use arena_judge::{
    validate_reference_solutions, Judge0Client, JudgeConfig, LanguageRegistry, Verdict,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct ValidateOptions {
    pub file: PathBuf,
    pub judge_url: String,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub languages: Option<PathBuf>,
    pub deadline_secs: u64,
    pub duplicate_tags: DuplicateTagPolicy,
}

fn load_payload(path: &Path) -> Result<ProblemPayload> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_registry(path: Option<&Path>) -> Result<LanguageRegistry> {
    match path {
        Some(path) => LanguageRegistry::load_from_file(path)
            .with_context(|| format!("Failed to load language table from {}", path.display())),
        None => Ok(LanguageRegistry::default()),
    }
}

/// Sanitize and structurally validate a problem file
fn prepare(path: &Path, duplicate_tags: DuplicateTagPolicy) -> Result<ProblemContent> {
    let payload = load_payload(path)?;
    prepare_problem(&payload, duplicate_tags)
        .with_context(|| format!("{} is not a valid problem", path.display()))
}

pub fn check_problem(path: &Path, duplicate_tags: DuplicateTagPolicy) -> Result<()> {
    println!("🔍 Checking {}", path.display());

    let content = prepare(path, duplicate_tags)?;

    println!("  ✅ Title: {}", content.title);
    println!("  ✅ Difficulty: {:?}", content.difficulty);
    println!(
        "  ✅ Tags: {}",
        content
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  ✅ Test cases: {} visible, {} hidden",
        content.visible_test_cases.len(),
        content.hidden_test_cases.len()
    );
    println!(
        "  ✅ Reference solutions: {}",
        content.reference_solution.len()
    );
    println!("\n✅ Structure is valid. Run `arena-cli validate` to judge the reference solutions.");
    Ok(())
}

pub async fn validate_problem(options: ValidateOptions) -> Result<()> {
    let content = prepare(&options.file, options.duplicate_tags)?;
    let languages = load_registry(options.languages.as_deref())?;

    let mut config = JudgeConfig {
        base_url: options.judge_url,
        api_key: options.api_key,
        api_host: options.api_host,
        ..Default::default()
    };
    config.poll.deadline = Duration::from_secs(options.deadline_secs);
    let judge = Judge0Client::new(&config).context("Failed to build judge client")?;

    println!(
        "⚖️  Judging {} reference solution(s) against {} visible case(s) at {}",
        content.reference_solution.len(),
        content.visible_test_cases.len(),
        config.base_url
    );

    let verdict = validate_reference_solutions(
        &judge,
        &languages,
        &config.poll,
        &content.reference_solution,
        &content.visible_test_cases,
    )
    .await
    .context("Problem validation could not be completed")?;

    match verdict {
        Verdict::Accepted { submissions } => {
            println!("✅ All {} submissions accepted", submissions);
            Ok(())
        }
        Verdict::Rejected {
            reason,
            status_id,
            language,
            test_case,
        } => {
            println!("❌ {} reference solution failed visible case #{}", language, test_case + 1);
            println!("   Status: {} ({:?})", reason, status_id);
            bail!("reference solution rejected: {}", reason)
        }
    }
}

pub fn list_languages(path: Option<&Path>) -> Result<()> {
    let registry = load_registry(path)?;

    println!("📋 Judge languages:\n");
    println!("{:<12} {:<10} {:<20}", "LANGUAGE", "JUDGE ID", "VERSION");
    println!("{}", "─".repeat(44));
    for (language, entry) in registry.entries() {
        println!("{:<12} {:<10} {:<20}", language, entry.judge_id, entry.version);
    }
    Ok(())
}

/// A structurally valid starting point: a + b, one solution per language
pub fn template() -> ProblemPayload {
    let solution = |language: Language| match language {
        Language::Cpp => "#include <iostream>\nint main() { long long a, b; std::cin >> a >> b; std::cout << a + b; }",
        Language::Java => "import java.util.*;\npublic class Main { public static void main(String[] args) { Scanner s = new Scanner(System.in); System.out.print(s.nextLong() + s.nextLong()); } }",
        Language::Python => "a, b = map(int, input().split())\nprint(a + b)",
        Language::JavaScript => "const [a, b] = require('fs').readFileSync(0, 'utf8').trim().split(/\\s+/).map(Number);\nconsole.log(a + b);",
    };

    ProblemPayload {
        title: Some("Sum of Two Numbers".to_string()),
        description: Some("Read two integers a and b and print a + b.".to_string()),
        difficulty: Some("Easy".to_string()),
        tags: Some(vec!["Math".to_string()]),
        constraints: Some(vec!["-10^9 <= a, b <= 10^9".to_string()]),
        visible_test_cases: Some(vec![VisibleTestCaseInput {
            stdin: "2 3".to_string(),
            expected_output: "5".to_string(),
            explanation: "2 + 3 = 5".to_string(),
        }]),
        hidden_test_cases: Some(vec![HiddenTestCaseInput {
            stdin: "-4 10".to_string(),
            expected_output: "6".to_string(),
        }]),
        boilerplate_code: Some(
            Language::ALL
                .iter()
                .map(|language| BoilerplateInput {
                    language: language.to_string(),
                    code: String::new(),
                })
                .collect(),
        ),
        reference_solution: Some(
            Language::ALL
                .iter()
                .map(|language| ReferenceSolutionInput {
                    language: language.to_string(),
                    source_code: solution(*language).to_string(),
                })
                .collect(),
        ),
    }
}

pub fn init_problem(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let content = serde_json::to_string_pretty(&template())?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created: {}", path.display());
    println!("\n📋 Next steps:");
    println!("  1. Edit the statement, test cases and reference solutions");
    println!("  2. Check it offline: arena-cli check --file {}", path.display());
    println!("  3. Judge it: arena-cli validate --file {}", path.display());
    Ok(())
}
