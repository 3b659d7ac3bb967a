//! The `quizcraft init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizcraft.toml").exists() {
        println!("quizcraft.toml already exists, skipping.");
    } else {
        std::fs::write("quizcraft.toml", SAMPLE_CONFIG)?;
        println!("Created quizcraft.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizcraft.toml with your API keys");
    println!("  2. Run: quizcraft take --quiz quizzes/example.toml");
    println!("  3. Run: quizcraft generate --topic \"Rust ownership\" --questions 5");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizcraft configuration

default_provider = "openai"
default_model = "gpt-4o"
default_temperature = 0.7
max_retries = 3
retry_delay_ms = 1000
output_dir = "./quizcraft-results"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

# Placeholder questions without network access
[providers.offline]
type = "mock"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
topic = "Rust basics"
difficulty = "easy"
negative_marking = true
penalty = -0.25
timer_minutes = 3

[[questions]]
id = 1
question = "Which keyword declares a mutable binding?"
options = ["let mut", "var", "mut let", "let"]
correct_answer = 0
explanation = "Bindings are immutable by default; `let mut` makes them mutable."

[[questions]]
id = 2
question = "What does the `?` operator do on an `Err` value?"
options = ["Panics", "Returns the error from the enclosing function", "Ignores it", "Converts it to `None`"]
correct_answer = 1
explanation = "`?` returns early with the error, converting it with `From` if needed."

[[questions]]
id = 3
question = "Which type owns a growable UTF-8 string?"
options = ["&str", "char", "String", "Vec<char>"]
correct_answer = 2
explanation = "`String` is the owned, growable string type; `&str` is a borrowed slice."
"#;
