//! The `vocatest init` command.

use std::path::Path;

use anyhow::Result;

use crate::config::LOCAL_CONFIG;

const SAMPLE_BANK_PATH: &str = "vocatest/questions.toml";

pub fn execute() -> Result<()> {
    // Create vocatest.toml
    if Path::new(LOCAL_CONFIG).exists() {
        println!("{LOCAL_CONFIG} already exists, skipping.");
    } else {
        std::fs::write(LOCAL_CONFIG, SAMPLE_CONFIG)?;
        println!("Created {LOCAL_CONFIG}");
    }

    // Create sample question bank
    let bank_path = Path::new(SAMPLE_BANK_PATH);
    if bank_path.exists() {
        println!("{SAMPLE_BANK_PATH} already exists, skipping.");
    } else {
        if let Some(parent) = bank_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(bank_path, SAMPLE_BANK)?;
        println!("Created {SAMPLE_BANK_PATH}");
    }

    println!("\nNext steps:");
    println!("  1. Add your own questions to {SAMPLE_BANK_PATH}");
    println!("  2. Run: vocatest validate");
    println!("  3. Run: vocatest take");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# vocatest configuration

question_bank = "vocatest/questions.toml"
results_file = "vocabulary_test_results.jsonl"

# Uncomment for reproducible question selection
# seed = 42
"#;

const SAMPLE_BANK: &str = r#"# One array of rows per difficulty tier.
# correct_option is the letter (A-D) of the right answer.

[[primary]]
question = "apple"
option_a = "a kind of fruit"
option_b = "a kind of vehicle"
option_c = "a colour"
option_d = "a musical instrument"
correct_option = "A"

[[primary]]
question = "teacher"
option_a = "a place to sleep"
option_b = "a person who helps you learn"
option_c = "a sweet food"
option_d = "a type of weather"
correct_option = "B"

[[primary]]
question = "quickly"
option_a = "loudly"
option_b = "carefully"
option_c = "at high speed"
option_d = "very late"
correct_option = "C"

[[high_school]]
question = "ancient"
option_a = "very old"
option_b = "brand new"
option_c = "extremely large"
option_d = "slightly damp"
correct_option = "A"

[[high_school]]
question = "encourage"
option_a = "to forbid"
option_b = "to give support or confidence"
option_c = "to hide"
option_d = "to measure"
correct_option = "B"

[[high_school]]
question = "efficient"
option_a = "wasteful"
option_b = "beautiful"
option_c = "working well without waste"
option_d = "dangerous"
correct_option = "C"

[[cet]]
question = "abandon"
option_a = "to keep"
option_b = "to give up completely"
option_c = "to borrow"
option_d = "to repair"
correct_option = "B"

[[cet]]
question = "inevitable"
option_a = "certain to happen"
option_b = "easy to avoid"
option_c = "impossible to see"
option_d = "pleasant to hear"
correct_option = "A"

[[cet]]
question = "reluctant"
option_a = "eager"
option_b = "unwilling"
option_c = "noisy"
option_d = "generous"
correct_option = "B"

[[ielts_toefl]]
question = "mitigate"
option_a = "to make worse"
option_b = "to make less severe"
option_c = "to move abroad"
option_d = "to copy"
correct_option = "B"

[[ielts_toefl]]
question = "ubiquitous"
option_a = "rare"
option_b = "ancient"
option_c = "found everywhere"
option_d = "invisible"
correct_option = "C"

[[ielts_toefl]]
question = "substantiate"
option_a = "to provide evidence for"
option_b = "to replace"
option_c = "to weaken"
option_d = "to dissolve"
correct_option = "A"

[[gre]]
question = "obdurate"
option_a = "easily persuaded"
option_b = "stubbornly refusing to change"
option_c = "cheerful"
option_d = "transparent"
correct_option = "B"

[[gre]]
question = "laconic"
option_a = "using very few words"
option_b = "talkative"
option_c = "lazy"
option_d = "milky"
correct_option = "A"

[[gre]]
question = "pellucid"
option_a = "murky"
option_b = "poisonous"
option_c = "translucently clear"
option_d = "argumentative"
correct_option = "C"
"#;
