use include_dir::{include_dir, Dir};

use crate::error::{ExamError, Result};
use crate::question::QuestionRecord;
use crate::setup::parse_question_set;

static BANK_DIR: Dir = include_dir!("src/banks");

/// Names of the question banks compiled into the binary.
pub fn names() -> Vec<String> {
    let mut names: Vec<String> = BANK_DIR
        .files()
        .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
        .filter_map(|f| f.path().file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Loads a built-in bank by name, e.g. `"sample"`.
pub fn load(name: &str) -> Result<Vec<QuestionRecord>> {
    let file = BANK_DIR
        .get_file(format!("{name}.json"))
        .ok_or_else(|| ExamError::UnknownBank(name.to_string()))?;
    let contents = file
        .contents_utf8()
        .ok_or_else(|| ExamError::MalformedInput(format!("bank {name} is not valid UTF-8")))?;
    parse_question_set(contents)
}
