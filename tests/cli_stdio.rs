use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

fn setup_corpus(root: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let pages = root.join("Pages");
    std::fs::create_dir_all(&pages)?;
    std::fs::write(
        pages.join("index.txt"),
        "0    https://ru.wikipedia.org/wiki/Кошка\n\
         1    https://ru.wikipedia.org/wiki/Мышь\n\
         2    https://ru.wikipedia.org/wiki/Собака\n",
    )?;
    std::fs::write(pages.join("0.txt"), "кот собака")?;
    std::fs::write(pages.join("1.txt"), "кот мышь")?;
    std::fs::write(pages.join("2.txt"), "собака мышь")?;
    Ok(pages)
}

fn run_boolsearch(
    root: &Path,
    args: &[&str],
    stdin: &str,
) -> Result<Output, Box<dyn std::error::Error>> {
    let mut child = Command::new(boolsearch_bin()?)
        .args(args)
        .env("BOOLSEARCH_DATA_DIR", root.join("data"))
        .env("BOOLSEARCH_CORPUS_DIR", root.join("Pages"))
        .env_remove("BOOLSEARCH_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut input) = child.stdin.take() {
        input.write_all(stdin.as_bytes())?;
    }

    Ok(child.wait_with_output()?)
}

#[test]
fn repl_answers_queries_from_stdin() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    setup_corpus(tempdir.path())?;

    let output = run_boolsearch(
        tempdir.path(),
        &[],
        "кот И мышь\nкот ИЛИ мышь\n!кот\nкот И\n:stats\n",
    )?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let answers: Vec<&str> = stdout
        .lines()
        .filter(|line| !line.starts_with("Enter a boolean query"))
        .collect();

    assert_eq!(answers.len(), 5, "unexpected output: {stdout}");
    assert_eq!(answers[0], "[1]");
    assert_eq!(answers[1], "[0, 1, 2]");
    assert_eq!(answers[2], "[2]");
    assert!(answers[3].starts_with("error: malformed query"));
    assert_eq!(answers[4], "documents: 3, terms: 3");

    assert!(tempdir.path().join("data").join("index.json").is_file());
    Ok(())
}

#[test]
fn search_prints_json() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_corpus(tempdir.path())?;

    let output =
        run_boolsearch(tempdir.path(), &["search", "кот И !мышь", "--json"], "")?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["query"], "кот И !мышь");
    assert_eq!(value["results"][0]["id"], 0);
    assert_eq!(
        value["results"][0]["url"],
        "https://ru.wikipedia.org/wiki/Кошка"
    );
    Ok(())
}

#[test]
fn malformed_search_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_corpus(tempdir.path())?;

    let output = run_boolsearch(tempdir.path(), &["search", "ИЛИ кот"], "")?;
    assert!(!output.status.success());
    Ok(())
}

fn boolsearch_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(bin) = std::env::var("CARGO_BIN_EXE_boolsearch") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("boolsearch");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}
