use std::path::Path;

use boolsearch::{
    Alphabet,
    BuildOptions,
    IndexOrigin,
    QueryParser,
    QuerySyntax,
    Tokenizer,
    builder,
    index_cache::{self, IndexSettings},
    manifest::MANIFEST_FILE,
    search,
};

fn write_corpus(
    dir: &Path,
    docs: &[(u64, &str)],
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let mut manifest = String::new();
    for (id, words) in docs {
        manifest.push_str(&format!("{id:<5}https://ru.wikipedia.org/{id}\n"));
        std::fs::write(dir.join(format!("{id}.txt")), words)?;
    }
    std::fs::write(dir.join(MANIFEST_FILE), manifest)?;
    Ok(())
}

const ANIMALS: &[(u64, &str)] =
    &[(0, "кот собака"), (1, "кот мышь"), (2, "собака мышь")];

#[test]
fn animal_queries() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let pages = tmp.path().join("Pages");
    write_corpus(&pages, ANIMALS)?;

    let loaded = builder::load_or_build(
        &pages,
        &tmp.path().join("index.json"),
        &BuildOptions::default(),
    );
    let parser = QueryParser::default();
    let run = |q: &str| -> Result<String, boolsearch::Error> {
        let ids = search::execute_search(&parser, &loaded.index, q)?;
        Ok(search::format_ids(&ids))
    };

    assert_eq!(run("кот ИЛИ мышь")?, "[0, 1, 2]");
    assert_eq!(run("кот И мышь")?, "[1]");
    assert_eq!(run("!кот")?, "[2]");
    assert_eq!(run("кот И !мышь")?, "[0]");
    assert_eq!(run("слон")?, "[]");
    assert!(run("кот И").is_err());
    assert!(run("И кот").is_err());
    Ok(())
}

#[test]
fn cached_index_answers_like_a_fresh_build()
-> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let pages = tmp.path().join("Pages");
    let cache = tmp.path().join("data").join("index.json");
    write_corpus(&pages, ANIMALS)?;

    let built = builder::load_or_build(&pages, &cache, &BuildOptions::default());
    assert!(matches!(built.origin, IndexOrigin::Built(_)));

    let cached = builder::load_or_build(&pages, &cache, &BuildOptions::default());
    assert_eq!(cached.origin, IndexOrigin::Cache);
    assert_eq!(cached.index, built.index);
    assert_eq!(
        index_cache::load(&cache, IndexSettings::default()),
        Some(built.index)
    );
    Ok(())
}

#[test]
fn corrupt_cache_triggers_rebuild() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let pages = tmp.path().join("Pages");
    let cache = tmp.path().join("index.json");
    write_corpus(&pages, ANIMALS)?;
    std::fs::write(&cache, "not json")?;

    let loaded = builder::load_or_build(&pages, &cache, &BuildOptions::default());
    assert!(matches!(loaded.origin, IndexOrigin::Built(_)));
    assert_eq!(loaded.index.document_count(), 3);
    assert!(index_cache::load(&cache, IndexSettings::default()).is_some());
    Ok(())
}

#[test]
fn rebuilding_twice_is_byte_identical() -> Result<(), Box<dyn std::error::Error>>
{
    let tmp = tempfile::tempdir()?;
    let pages = tmp.path().join("Pages");
    let docs: Vec<(u64, String)> = (0..40)
        .map(|id| (id, format!("слово{id} общее {}", ["кот", "пёс"][id as usize % 2])))
        .collect();
    let docs: Vec<(u64, &str)> =
        docs.iter().map(|(id, words)| (*id, words.as_str())).collect();
    write_corpus(&pages, &docs)?;

    let a = tmp.path().join("a.json");
    let b = tmp.path().join("b.json");
    builder::rebuild(&pages, &a, &BuildOptions::default());
    builder::rebuild(&pages, &b, &BuildOptions::default());

    assert_eq!(std::fs::read(&a)?, std::fs::read(&b)?);
    Ok(())
}

#[test]
fn missing_document_is_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let pages = tmp.path().join("Pages");
    write_corpus(&pages, ANIMALS)?;
    std::fs::remove_file(pages.join("0.txt"))?;

    let loaded = builder::rebuild(
        &pages,
        &tmp.path().join("index.json"),
        &BuildOptions::default(),
    );
    let IndexOrigin::Built(report) = loaded.origin else {
        panic!("expected a fresh build");
    };
    assert_eq!(report.documents_indexed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].doc_id, Some(0));

    let ids = search::execute_search(
        &QueryParser::default(),
        &loaded.index,
        "!мышь",
    )?;
    assert!(ids.is_empty());
    Ok(())
}

#[test]
fn switching_alphabet_rebuilds_instead_of_reusing_cache()
-> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let pages = tmp.path().join("Pages");
    let cache = tmp.path().join("index.json");
    write_corpus(&pages, &[(0, "кот cat")])?;

    builder::load_or_build(&pages, &cache, &BuildOptions::default());

    let tokenizer = Tokenizer::new(Alphabet::Latin);
    let options = BuildOptions {
        tokenizer,
        ..BuildOptions::default()
    };
    let loaded = builder::load_or_build(&pages, &cache, &options);
    assert!(matches!(loaded.origin, IndexOrigin::Built(_)));

    let parser =
        QueryParser::new(tokenizer).with_syntax(QuerySyntax::english());
    let ids = search::execute_search(&parser, &loaded.index, "cat")?;
    assert_eq!(search::format_ids(&ids), "[0]");
    Ok(())
}
